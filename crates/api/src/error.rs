#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid capability id {id:?}: {reason}")]
    InvalidCapability { id: String, reason: &'static str },
    #[error("Invalid module key {module:?}: {reason}")]
    InvalidModule { module: String, reason: &'static str },
    #[error("Invalid record in module {module:?}: {reason}")]
    InvalidRecord { module: String, reason: &'static str },
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
