//! Merged display model: capability to module to implementor records.

pub mod registrar;

pub use registrar::IndexRegistrar;

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use traitdex_api::{
    CapabilityId, CapabilitySummary, ImplementorRecord, IndexFragment, IndexStats, ModuleName,
};

use crate::catalog::ModuleCatalog;

/// Everything the site knows about who implements what.
///
/// Iteration order everywhere is first-seen order: capabilities in the order
/// their first fragment arrived, modules in the order the capability first
/// saw them.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImplementorIndex {
    capabilities: IndexMap<CapabilityId, IndexMap<ModuleName, Vec<ImplementorRecord>>>,
}

impl ImplementorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one fragment in. Each (capability, module) pair the fragment
    /// names has its record list replaced outright, never appended to;
    /// modules the fragment does not mention keep their current lists.
    /// Returns how many records the fragment contributed.
    pub fn merge_fragment(&mut self, fragment: IndexFragment) -> usize {
        if fragment.entries.is_empty() {
            // An empty fragment must not materialize a capability key.
            return 0;
        }
        let modules = self.capabilities.entry(fragment.capability).or_default();
        let mut merged = 0;
        for (module, records) in fragment.entries {
            merged += records.len();
            modules.insert(module, records);
        }
        merged
    }

    /// Module table for one capability, or `None` if nothing registered it.
    pub fn capability(&self, id: &str) -> Option<&IndexMap<ModuleName, Vec<ImplementorRecord>>> {
        self.capabilities.get(id)
    }

    /// Record list for one (capability, module) cell.
    pub fn records(&self, capability: &str, module: &str) -> Option<&[ImplementorRecord]> {
        self.capabilities
            .get(capability)?
            .get(module)
            .map(Vec::as_slice)
    }

    pub fn capabilities(
        &self,
    ) -> impl Iterator<Item = (&CapabilityId, &IndexMap<ModuleName, Vec<ImplementorRecord>>)> {
        self.capabilities.iter()
    }

    pub fn capability_count(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }

    /// Per-capability roll-ups, in capability arrival order.
    pub fn summaries(&self) -> Vec<CapabilitySummary> {
        self.capabilities
            .iter()
            .map(|(capability, modules)| CapabilitySummary {
                capability: capability.clone(),
                module_count: modules.len(),
                record_count: modules.values().map(Vec::len).sum(),
                synthetic_count: modules
                    .values()
                    .flatten()
                    .filter(|record| record.is_synthetic)
                    .count(),
            })
            .collect()
    }

    pub fn stats(&self) -> IndexStats {
        let mut modules = HashSet::new();
        let mut record_count = 0;
        for per_module in self.capabilities.values() {
            for (module, records) in per_module {
                modules.insert(module);
                record_count += records.len();
            }
        }
        IndexStats {
            capability_count: self.capabilities.len(),
            module_count: modules.len(),
            record_count,
        }
    }

    /// Modules contributing records that `catalog` does not list, in
    /// first-seen order.
    pub fn modules_missing_from(&self, catalog: &ModuleCatalog) -> Vec<ModuleName> {
        let mut missing = Vec::new();
        let mut seen = HashSet::new();
        for per_module in self.capabilities.values() {
            for module in per_module.keys() {
                if !catalog.contains(module) && seen.insert(module.clone()) {
                    missing.push(module.clone());
                }
            }
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(target: &str) -> ImplementorRecord {
        ImplementorRecord::new(format!("impl for {target}"), vec![target.to_owned()])
    }

    fn fragment(capability: &str, entries: &[(&str, &[&str])]) -> IndexFragment {
        let mut fragment = IndexFragment::new(CapabilityId::new(capability).unwrap());
        for (module, targets) in entries {
            fragment.set_module(
                ModuleName::from(*module),
                targets.iter().map(|target| record(target)).collect(),
            );
        }
        fragment
    }

    #[test]
    fn test_merge_preserves_arrival_order() {
        let mut index = ImplementorIndex::new();
        index.merge_fragment(fragment("x::B", &[("mod_b", &["b::T1"])]));
        index.merge_fragment(fragment("x::A", &[("mod_c", &["c::T2"])]));
        index.merge_fragment(fragment("x::B", &[("mod_a", &["a::T3"])]));

        let capabilities: Vec<_> = index.capabilities().map(|(id, _)| id.as_str()).collect();
        assert_eq!(capabilities, ["x::B", "x::A"]);

        let modules: Vec<_> = index.capability("x::B").unwrap().keys().cloned().collect();
        assert_eq!(modules, ["mod_b", "mod_a"]);
    }

    #[test]
    fn test_reregistration_replaces_wholesale() {
        let mut index = ImplementorIndex::new();
        index.merge_fragment(fragment("x::Trait", &[("module_x", &["x::R1", "x::R2"])]));
        index.merge_fragment(fragment("x::Trait", &[("module_x", &["x::R5"])]));

        let records = index.records("x::Trait", "module_x").unwrap();
        let targets: Vec<_> = records.iter().map(|r| r.target_type.as_str()).collect();
        assert_eq!(targets, ["x::R5"]);
    }

    #[test]
    fn test_replacement_keeps_module_position() {
        let mut index = ImplementorIndex::new();
        index.merge_fragment(fragment(
            "x::Trait",
            &[("first", &["f::T"]), ("second", &["s::T"])],
        ));
        index.merge_fragment(fragment("x::Trait", &[("first", &["f::T2"])]));

        let modules: Vec<_> = index
            .capability("x::Trait")
            .unwrap()
            .keys()
            .cloned()
            .collect();
        assert_eq!(modules, ["first", "second"]);
    }

    #[test]
    fn test_unrelated_modules_survive_merge() {
        let mut index = ImplementorIndex::new();
        index.merge_fragment(fragment("x::Trait", &[("keep", &["k::T"])]));
        index.merge_fragment(fragment("x::Trait", &[("other", &["o::T"])]));

        assert!(index.records("x::Trait", "keep").is_some());
        assert!(index.records("x::Trait", "other").is_some());
    }

    #[test]
    fn test_empty_fragment_is_a_no_op() {
        let mut index = ImplementorIndex::new();
        let merged = index.merge_fragment(fragment("x::Trait", &[]));

        assert_eq!(merged, 0);
        assert!(index.is_empty());
        assert!(index.capability("x::Trait").is_none());
    }

    #[test]
    fn test_queries_never_materialize_keys() {
        let index = ImplementorIndex::new();
        assert!(index.capability("never::Registered").is_none());
        assert!(index.records("never::Registered", "nowhere").is_none());
        assert_eq!(index.capability_count(), 0);
    }

    #[test]
    fn test_explicit_empty_list_clears_a_module() {
        let mut index = ImplementorIndex::new();
        index.merge_fragment(fragment("x::Trait", &[("module_x", &["x::R1"])]));
        index.merge_fragment(fragment("x::Trait", &[("module_x", &[])]));

        let records = index.records("x::Trait", "module_x").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_stats_count_distinct_modules() {
        let mut index = ImplementorIndex::new();
        index.merge_fragment(fragment("x::A", &[("shared", &["a::T"]), ("only_a", &["a::U"])]));
        index.merge_fragment(fragment("x::B", &[("shared", &["b::T"])]));

        let stats = index.stats();
        assert_eq!(stats.capability_count, 2);
        assert_eq!(stats.module_count, 2);
        assert_eq!(stats.record_count, 3);
    }

    #[test]
    fn test_modules_missing_from_catalog() {
        let catalog = ModuleCatalog::parse_str(r#"window.ALL_CRATES = ["known"];"#).unwrap();
        let mut index = ImplementorIndex::new();
        index.merge_fragment(fragment("x::A", &[("known", &["k::T"]), ("ghost", &["g::T"])]));

        let missing = index.modules_missing_from(&catalog);
        assert_eq!(missing, ["ghost"]);
    }
}
