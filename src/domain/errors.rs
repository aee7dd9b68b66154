use derive_more::Display;

/// Errors raised at the edges of the crate. The band pipeline itself never fails.
#[derive(Debug, Clone, PartialEq, Display)]
pub enum AppError {
    #[display(fmt = "Validation Error: {}", _0)]
    ValidationError(String),
    #[display(fmt = "Serialization Error: {}", _0)]
    SerializationError(String),
}

impl std::error::Error for AppError {}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        AppError::SerializationError(error.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
