use thiserror::Error;

#[derive(Debug, Error)]
pub enum LcoeError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for LcoeError {
    fn from(e: serde_json::Error) -> Self {
        LcoeError::SerializationError(e.to_string())
    }
}
