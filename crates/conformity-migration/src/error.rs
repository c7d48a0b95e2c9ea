//! Error types for migration runs.

use thiserror::Error;

pub type MigrationResult<T> = Result<T, MigrationError>;

#[derive(Debug, Error)]
pub enum MigrationError {
    /// An API call failed after exhausting its retries.
    #[error(transparent)]
    Api(#[from] conformity_client::ApiClientError),

    /// A payload from one of the deployments did not parse.
    #[error(transparent)]
    Model(#[from] conformity_api::ModelError),

    /// A resource lacked data the migration needs, e.g. an Azure group
    /// without directory credentials.
    #[error("missing data: {0}")]
    MissingData(String),
}
