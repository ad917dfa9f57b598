use thiserror::Error;

use crate::form::FieldViolation;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Recipe not found: {0}")]
    NotFound(String),

    #[error("Invalid response body: {0}")]
    Decode(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

#[derive(Error, Debug)]
pub enum FormError {
    #[error("Form has {} invalid field(s)", .0.len())]
    Invalid(Vec<FieldViolation>),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    InvalidEnvVar { name: String, value: String },
}

#[derive(Error, Debug)]
pub enum ThumbnailError {
    #[error("Failed to read image: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image too large: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },

    #[error("Unsupported image: {0}")]
    Unsupported(String),
}
