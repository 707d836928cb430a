use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("a registrar is already attached")]
    AlreadyAttached,
    #[error("ingest failed: {0}")]
    Ingest(String),
    #[error("registry state lock poisoned")]
    Poisoned,
}
