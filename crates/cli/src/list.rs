use std::path::PathBuf;

use tabled::{Table, Tabled, settings::Style};

/// One table row per merged capability.
#[derive(Tabled)]
struct CapabilityRow {
    name: String,
    modules: usize,
    records: usize,
    synthetic: usize,
    capability: String,
}

pub fn run(path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let (site, _) = crate::merge::merge_tree(&path)?;
    let snapshot = site.snapshot().ok_or("site did not activate")?;

    let rows: Vec<CapabilityRow> = snapshot
        .summaries()
        .into_iter()
        .map(|summary| CapabilityRow {
            name: summary.capability.name().to_string(),
            modules: summary.module_count,
            records: summary.record_count,
            synthetic: summary.synthetic_count,
            capability: summary.capability.to_string(),
        })
        .collect();

    if rows.is_empty() {
        println!("No implementor fragments found.");
    } else {
        println!("{}", Table::new(&rows).with(Style::psql()));
    }
    Ok(())
}
