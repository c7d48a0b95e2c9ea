//! Migrated entity types.
//!
//! Every type here is an immutable snapshot parsed from one deployment's API
//! at a point in time.  Cross-system comparison goes through
//! [`crate::IdentityKey`], never through the system-local `*_id` fields.

pub mod account;
pub mod check;
pub mod communication;
pub mod group;
pub mod note;
pub mod profile;
pub mod report_config;
pub mod rule;
pub mod user;

pub use account::{Account, AccountDetails, RuleSummary};
pub use check::Check;
pub use communication::CommunicationSetting;
pub use group::Group;
pub use note::Note;
pub use profile::Profile;
pub use report_config::ReportConfig;
pub use rule::Rule;
pub use user::User;
