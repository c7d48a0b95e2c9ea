//! Configuration migration between two Conformity deployments.
//!
//! The engine reads configuration out of a source deployment, pairs each
//! entity with its target counterpart by content-derived identity, and
//! applies only the missing or changed parts: replace-capable categories
//! delete the stale pair before re-creating it, append-only categories never
//! delete anything, and a second run over an unchanged source is a no-op.

pub mod categories;
pub mod confirm;
pub mod error;
pub mod notes;
pub mod poller;
pub mod reconcile;
pub mod recipients;

pub use categories::{MigrationContext, MigrationSettings};
pub use confirm::{AssumeAnswer, Prompter};
pub use error::{MigrationError, MigrationResult};
pub use reconcile::{missing_from_target, reconcile, ReconcileOutcome};
pub use recipients::RecipientResolver;
