use std::path::{Path, PathBuf};

use tracing::info;
use traitdex_core::catalog::CATALOG_FILE;
use traitdex_core::{FragmentLoader, LoadReport, ModuleCatalog, SiteIndex};

/// Loads every fragment under `root`, replays them through the registry and
/// activates the site. The catalog cross-check engages only when `crates.js`
/// is present; merging never requires one.
pub(crate) fn merge_tree(
    root: &Path,
) -> Result<(SiteIndex, LoadReport), Box<dyn std::error::Error>> {
    let outcome = FragmentLoader::new(root).load()?;
    let site = SiteIndex::new();
    let handle = site.submit_handle();
    for fragment in outcome.fragments {
        handle.submit(fragment);
    }

    let catalog_path = root.join(CATALOG_FILE);
    let drained = if catalog_path.is_file() {
        let catalog = ModuleCatalog::from_path(&catalog_path)?;
        site.activate_with_catalog(&catalog)?
    } else {
        site.activate()?
    };
    info!("Merged {} fragment(s) from {}", drained, root.display());

    Ok((site, outcome.report))
}

pub fn run(path: PathBuf, stats: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (site, _) = merge_tree(&path)?;
    let snapshot = site.snapshot().ok_or("site did not activate")?;

    if stats {
        println!("{}", serde_json::to_string_pretty(&snapshot.stats())?);
    } else {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }
    Ok(())
}
