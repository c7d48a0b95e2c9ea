//! Entity model shared by both sides of a Conformity migration.
//!
//! The legacy and Cloud One deployments assign their own opaque resource IDs,
//! so nothing here compares IDs across systems.  Every migrated entity instead
//! exposes a content-derived identity key (see [`identity::IdentityKey`]) that
//! is stable across deployments, plus a content fingerprint used to decide
//! whether an already-paired entity needs to be replaced.

pub mod canonical;
pub mod error;
pub mod identity;
pub mod models;
pub mod wire;

pub use error::{ModelError, ModelResult};
pub use identity::IdentityKey;
pub use models::{
    Account, AccountDetails, Check, CommunicationSetting, Group, Note, Profile, ReportConfig,
    Rule, RuleSummary, User,
};
