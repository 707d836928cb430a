fn main() -> Result<(), Box<dyn std::error::Error>> {
    traitdex_cli::run()
}
