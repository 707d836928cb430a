use std::sync::RwLock;

use tracing::{debug, warn};
use traitdex_api::{IndexFragment, IndexStats};
use traitdex_registry::{Registrar, RegistryError};

use super::ImplementorIndex;
use crate::catalog::ModuleCatalog;

/// Owns the merged index and folds fragments in as the bridge delivers them.
///
/// Fragments are validated here rather than trusting producers: one that
/// fails shape checks is rejected with an error and leaves the index
/// untouched.
#[derive(Default)]
pub struct IndexRegistrar {
    index: RwLock<ImplementorIndex>,
    catalog: Option<ModuleCatalog>,
}

impl IndexRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registrar that cross-checks fragment module keys against the site
    /// catalog. Unknown modules are logged, never rejected.
    pub fn with_catalog(catalog: ModuleCatalog) -> Self {
        Self {
            index: RwLock::new(ImplementorIndex::default()),
            catalog: Some(catalog),
        }
    }

    /// Clone of the current merged index.
    pub fn snapshot(&self) -> ImplementorIndex {
        match self.index.read() {
            Ok(index) => index.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn stats(&self) -> IndexStats {
        match self.index.read() {
            Ok(index) => index.stats(),
            Err(poisoned) => poisoned.into_inner().stats(),
        }
    }
}

impl Registrar<IndexFragment> for IndexRegistrar {
    fn ingest(&self, fragment: IndexFragment) -> Result<(), RegistryError> {
        let fragment = fragment
            .into_validated()
            .map_err(|err| RegistryError::Ingest(err.to_string()))?;
        if let Some(catalog) = &self.catalog {
            for module in fragment.entries.keys() {
                if !catalog.contains(module) {
                    warn!(
                        "Fragment for {} names module {:?} not listed in the site catalog",
                        fragment.capability, module
                    );
                }
            }
        }
        let capability = fragment.capability.clone();
        let mut index = self
            .index
            .write()
            .map_err(|_| RegistryError::Ingest("index lock poisoned".to_string()))?;
        let merged = index.merge_fragment(fragment);
        debug!("Merged {} record(s) for {}", merged, capability);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use traitdex_api::{CapabilityId, ImplementorRecord};

    #[test]
    fn test_ingest_rejects_invalid_fragments() {
        let registrar = IndexRegistrar::new();
        let mut fragment = IndexFragment::new(CapabilityId::new("x::Trait").unwrap());
        fragment.set_module("bad".into(), vec![ImplementorRecord::new("", vec![])]);

        assert!(registrar.ingest(fragment).is_err());
        assert!(registrar.snapshot().is_empty());
    }

    #[test]
    fn test_ingest_merges_valid_fragments() {
        let registrar = IndexRegistrar::new();
        let mut fragment = IndexFragment::new(CapabilityId::new("x::Trait").unwrap());
        fragment.set_module(
            "alpha".into(),
            vec![ImplementorRecord::new("impl", vec!["alpha::T".to_string()])],
        );

        registrar.ingest(fragment).unwrap();
        let stats = registrar.stats();
        assert_eq!(stats.capability_count, 1);
        assert_eq!(stats.record_count, 1);
    }

    #[test]
    fn test_catalog_mismatch_is_advisory() {
        let catalog = ModuleCatalog::parse_str(r#"window.ALL_CRATES = ["alpha"];"#).unwrap();
        let registrar = IndexRegistrar::with_catalog(catalog);
        let mut fragment = IndexFragment::new(CapabilityId::new("x::Trait").unwrap());
        fragment.set_module(
            "unlisted".into(),
            vec![ImplementorRecord::new("impl", vec!["unlisted::T".to_string()])],
        );

        registrar.ingest(fragment).unwrap();
        assert_eq!(registrar.stats().record_count, 1);
    }
}
