//! Parse errors for API resource payloads.

use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Debug, Error)]
pub enum ModelError {
    /// A required field was absent or had the wrong JSON type.
    #[error("missing or invalid field '{field}' in {resource} resource")]
    MissingField {
        resource: &'static str,
        field: &'static str,
    },

    /// The resource payload was not the expected JSON shape.
    #[error("malformed {resource} resource: {detail}")]
    Malformed {
        resource: &'static str,
        detail: String,
    },
}

impl ModelError {
    pub(crate) fn missing(resource: &'static str, field: &'static str) -> Self {
        Self::MissingField { resource, field }
    }
}
