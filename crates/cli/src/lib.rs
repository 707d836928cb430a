mod check;
mod list;
mod merge;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "traitdex",
    version,
    about = "Implementor-index tooling for generated documentation trees",
    long_about = "Traitdex reads the implementor fragments a documentation generator drops \
                  next to its pages, replays them through the registration protocol and \
                  merges them into one consistent index of which types implement each \
                  capability."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Merge every fragment under a docs tree and print the index as JSON
    #[command(
        long_about = "Loads all implementors/**/trait.*.js fragments beneath DOCS_ROOT, \
                            replays them in file order and prints the merged index as JSON. \
                            When crates.js is present its module catalog is cross-checked \
                            against the fragments."
    )]
    Merge {
        /// Path to the documentation root (the directory holding crates.js)
        #[arg(value_name = "DOCS_ROOT")]
        path: PathBuf,

        /// Print index statistics instead of the full index
        #[arg(long)]
        stats: bool,
    },
    /// Summarize merged capabilities as a table
    List {
        /// Path to the documentation root
        #[arg(value_name = "DOCS_ROOT")]
        path: PathBuf,
    },
    /// Cross-check fragments against the module catalog
    #[command(
        long_about = "Loads the catalog and every fragment, then reports skipped files, \
                            malformed payload lines, modules contributing implementors without \
                            a catalog entry and catalog modules contributing nothing. \
                            Mismatches are reported, not fatal."
    )]
    Check {
        /// Path to the documentation root
        #[arg(value_name = "DOCS_ROOT")]
        path: PathBuf,
    },
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let _guard = traitdex_core::logging::init_logging("cli", true);

    match cli.command {
        Commands::Merge { path, stats } => merge::run(path, stats),
        Commands::List { path } => list::run(path),
        Commands::Check { path } => check::run(path),
    }
}
