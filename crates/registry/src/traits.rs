use std::sync::Arc;

use crate::error::RegistryError;

/// Consumer end of the bridge. Implementations merge one fragment into
/// whatever index they maintain.
///
/// `ingest` reports failures as errors rather than panicking; the bridge
/// logs a rejected fragment and keeps draining.
pub trait Registrar<F>: Send + Sync {
    fn ingest(&self, fragment: F) -> Result<(), RegistryError>;
}

pub type DynRegistrar<F> = Arc<dyn Registrar<F> + Send + Sync>;
