//! Cross-system identity for migrated entities.

/// Content-derived identity shared by both deployments.
///
/// `identity_key` pairs an entity on the legacy side with its counterpart on
/// the Cloud One side; it never includes system-local IDs, timestamps or
/// notes.  `content_key` is the full comparable content of the entity: when
/// two paired entities have equal content keys the target copy is already up
/// to date and must not be touched.  Types whose identity covers everything
/// that is compared (users, checks, communication settings) keep the default
/// implementation.
pub trait IdentityKey {
    /// Stable pairing key across deployments.
    fn identity_key(&self) -> String;

    /// Full content fingerprint; defaults to the identity key.
    fn content_key(&self) -> String {
        self.identity_key()
    }
}
