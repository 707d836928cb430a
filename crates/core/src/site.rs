//! Site facade tying loader, bridge and registrar into one lifecycle.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::info;
use traitdex_api::{IndexFragment, IndexStats};
use traitdex_registry::{BridgeStage, RegistryBridge, SubmitOutcome};

use crate::catalog::ModuleCatalog;
use crate::error::{Result, TraitdexError};
use crate::index::{ImplementorIndex, IndexRegistrar};

/// Cloneable producer handle; submits fragments whether or not the site has
/// activated yet.
#[derive(Clone)]
pub struct SubmitHandle {
    bridge: Arc<RegistryBridge<IndexFragment>>,
}

impl SubmitHandle {
    pub fn submit(&self, fragment: IndexFragment) -> SubmitOutcome {
        self.bridge.submit(fragment)
    }
}

/// One documentation site's implementor index over its whole lifecycle.
///
/// Fragments may arrive from the moment the site exists; they buffer in the
/// bridge until [`SiteIndex::activate`] attaches the registrar, which drains
/// the backlog in arrival order and switches to direct delivery.
pub struct SiteIndex {
    bridge: Arc<RegistryBridge<IndexFragment>>,
    registrar: OnceCell<Arc<IndexRegistrar>>,
}

impl SiteIndex {
    pub fn new() -> Self {
        Self {
            bridge: Arc::new(RegistryBridge::new()),
            registrar: OnceCell::new(),
        }
    }

    pub fn submit_handle(&self) -> SubmitHandle {
        SubmitHandle {
            bridge: Arc::clone(&self.bridge),
        }
    }

    pub fn submit(&self, fragment: IndexFragment) -> SubmitOutcome {
        self.bridge.submit(fragment)
    }

    pub fn stage(&self) -> BridgeStage {
        self.bridge.stage()
    }

    /// Builds the registrar and attaches it, draining anything buffered.
    /// Returns how many fragments the activation delivered.
    pub fn activate(&self) -> Result<usize> {
        self.attach_registrar(Arc::new(IndexRegistrar::new()))
    }

    /// Like [`SiteIndex::activate`], with a registrar that cross-checks each
    /// fragment's module keys against `catalog` as it lands.
    pub fn activate_with_catalog(&self, catalog: &ModuleCatalog) -> Result<usize> {
        self.attach_registrar(Arc::new(IndexRegistrar::with_catalog(catalog.clone())))
    }

    fn attach_registrar(&self, registrar: Arc<IndexRegistrar>) -> Result<usize> {
        // Bind the concrete Arc first; the trait-object coercion happens at
        // the attach call.
        let sink = Arc::clone(&registrar);
        let drained = self.bridge.attach(sink)?;
        self.registrar
            .set(registrar)
            .map_err(|_| TraitdexError::Internal("site already activated".to_string()))?;
        info!("Site activated; {} buffered fragment(s) drained", drained);
        Ok(drained)
    }

    /// Clone of the merged index, or `None` before activation.
    pub fn snapshot(&self) -> Option<ImplementorIndex> {
        self.registrar.get().map(|registrar| registrar.snapshot())
    }

    pub fn stats(&self) -> Option<IndexStats> {
        self.registrar.get().map(|registrar| registrar.stats())
    }
}

impl Default for SiteIndex {
    fn default() -> Self {
        Self::new()
    }
}
