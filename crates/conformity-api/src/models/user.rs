//! Users of a Conformity organisation.

use std::hash::{Hash, Hasher};

use serde_json::Value;

use crate::identity::IdentityKey;

/// A human user.  The email address is the only attribute that is stable
/// across deployments, so identity, equality and hashing all reduce to it.
#[derive(Debug, Clone)]
pub struct User {
    /// System-local user ID; meaningless on the other deployment.
    pub user_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
}

impl User {
    /// Parse a user out of a JSON:API resource.
    ///
    /// Returns `None` for resources without an email address (e.g. API-key
    /// pseudo-users), which are not migratable.
    #[must_use]
    pub fn from_resource(resource: &Value) -> Option<Self> {
        let attrib = resource.get("attributes")?;
        let email = attrib.get("email")?.as_str()?;
        if email.is_empty() {
            return None;
        }
        Some(Self {
            user_id: resource.get("id")?.as_str()?.to_string(),
            email: email.to_string(),
            first_name: str_or_empty(attrib, "first-name"),
            last_name: str_or_empty(attrib, "last-name"),
            role: str_or_empty(attrib, "role"),
        })
    }

    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

fn str_or_empty(attrib: &Value, key: &str) -> String {
    attrib
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

impl IdentityKey for User {
    fn identity_key(&self) -> String {
        self.email.clone()
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.email == other.email
    }
}

impl Eq for User {}

impl Hash for User {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.email.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resource(id: &str, email: Option<&str>) -> Value {
        json!({
            "id": id,
            "attributes": {
                "email": email,
                "first-name": "Ada",
                "last-name": "Lovelace",
                "role": "ADMIN",
            }
        })
    }

    #[test]
    fn test_parse_user() {
        let user = User::from_resource(&resource("u-1", Some("ada@example.com"))).unwrap();
        assert_eq!(user.user_id, "u-1");
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.full_name(), "Ada Lovelace");
    }

    #[test]
    fn test_user_without_email_is_skipped() {
        assert!(User::from_resource(&resource("u-2", None)).is_none());
    }

    #[test]
    fn test_equality_ignores_local_id() {
        let a = User::from_resource(&resource("u-1", Some("ada@example.com"))).unwrap();
        let b = User::from_resource(&resource("u-999", Some("ada@example.com"))).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.identity_key(), b.identity_key());
    }
}
