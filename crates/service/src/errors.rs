use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("seed error: {0}")]
    Seed(String),
}

impl ServiceError {
    pub fn not_found(msg: &str) -> Self { Self::NotFound(msg.to_string()) }

    pub fn validation(msg: impl Into<String>) -> Self { Self::Validation(msg.into()) }

    /// Human readable message without the variant prefix.
    pub fn detail(&self) -> &str {
        match self {
            Self::Validation(m) | Self::NotFound(m) | Self::Seed(m) => m,
        }
    }
}
