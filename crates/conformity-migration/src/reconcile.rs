//! Cross-deployment reconciliation.
//!
//! Entities are paired across deployments by identity key and compared by
//! content key (see [`IdentityKey`]).  A source entity whose pair carries the
//! same content is already present; one whose pair differs replaces it; one
//! with no pair is created.  Target-only entities are never touched, which
//! keeps a second run over an unchanged source a no-op.

use std::collections::HashMap;

use conformity_api::IdentityKey;

/// The outcome of reconciling a source collection against a target one.
#[derive(Debug, Clone, Default)]
pub struct ReconcileOutcome<T> {
    /// Source entities whose target pair matches in content.
    pub already_present: Vec<T>,
    /// Source entities to create on the target.
    pub to_create: Vec<T>,
    /// Target entities to delete before their source pair is created.
    pub to_replace: Vec<T>,
}

impl<T> ReconcileOutcome<T> {
    pub fn is_noop(&self) -> bool {
        self.to_create.is_empty() && self.to_replace.is_empty()
    }
}

/// Reconcile `source` against `target`.
///
/// Deletions in the returned outcome must be executed before any creation,
/// never interleaved, so a mid-run failure leaves no duplicate pair behind.
pub fn reconcile<T: IdentityKey + Clone>(source: &[T], target: &[T]) -> ReconcileOutcome<T> {
    let target_by_identity: HashMap<String, &T> =
        target.iter().map(|t| (t.identity_key(), t)).collect();

    let mut outcome = ReconcileOutcome {
        already_present: Vec::new(),
        to_create: Vec::new(),
        to_replace: Vec::new(),
    };

    for item in source {
        match target_by_identity.get(&item.identity_key()) {
            Some(paired) if paired.content_key() == item.content_key() => {
                outcome.already_present.push(item.clone());
            }
            Some(paired) => {
                outcome.to_replace.push((*paired).clone());
                outcome.to_create.push(item.clone());
            }
            None => outcome.to_create.push(item.clone()),
        }
    }

    outcome
}

/// Append-only difference: source entities with no equivalent on the target.
///
/// Used for categories where target-only entries must survive and existing
/// pairs are never rewritten.
pub fn missing_from_target<T: IdentityKey + Clone>(source: &[T], target: &[T]) -> Vec<T> {
    let target_keys: std::collections::HashSet<String> =
        target.iter().map(IdentityKey::identity_key).collect();
    source
        .iter()
        .filter(|s| !target_keys.contains(&s.identity_key()))
        .cloned()
        .collect()
}
