use thiserror::Error;

#[derive(Error, Debug)]
pub enum TraitdexError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Parsing error: {0}")]
    Parsing(String),
    #[error("Registry error: {0}")]
    Registry(#[from] traitdex_registry::RegistryError),
    #[error("Model error: {0}")]
    Model(#[from] traitdex_api::ApiError),
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, TraitdexError>;
