use std::collections::HashSet;
use std::path::PathBuf;

use traitdex_core::catalog::CATALOG_FILE;
use traitdex_core::{FragmentLoader, ModuleCatalog, SiteIndex};

/// Cross-checks a docs tree: fragments against the catalog and back again.
/// Mismatches are findings in the output, never a failed exit; only an
/// unreadable tree or catalog is an error.
pub fn run(path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = ModuleCatalog::from_path(&path.join(CATALOG_FILE))?;
    let outcome = FragmentLoader::new(&path).load()?;
    let report = outcome.report;

    let site = SiteIndex::new();
    for fragment in outcome.fragments {
        site.submit(fragment);
    }
    site.activate_with_catalog(&catalog)?;
    let snapshot = site.snapshot().ok_or("site did not activate")?;
    let stats = snapshot.stats();

    println!("Catalog modules:  {}", catalog.len());
    println!(
        "Fragment files:   {} loaded, {} skipped, {} record(s) parsed",
        report.fragments_loaded, report.files_skipped, report.records_loaded
    );
    println!("Malformed lines:  {}", report.malformed_lines);
    println!("Capabilities:     {}", stats.capability_count);
    println!("Records merged:   {}", stats.record_count);

    let unlisted = snapshot.modules_missing_from(&catalog);
    let contributing: HashSet<_> = snapshot
        .capabilities()
        .flat_map(|(_, modules)| modules.keys())
        .collect();
    let silent: Vec<_> = catalog
        .iter()
        .filter(|module| !contributing.contains(module))
        .cloned()
        .collect();

    if unlisted.is_empty() && silent.is_empty() && report.malformed_lines == 0 {
        println!();
        println!("Catalog and fragments agree.");
        return Ok(());
    }

    if !unlisted.is_empty() {
        println!();
        println!("Modules with implementors missing from the catalog:");
        for module in &unlisted {
            println!("  - {module}");
        }
    }
    if !silent.is_empty() {
        println!();
        println!("Catalog modules with no implementors:");
        for module in &silent {
            println!("  - {module}");
        }
    }
    Ok(())
}
