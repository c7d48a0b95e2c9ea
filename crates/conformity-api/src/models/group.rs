//! Account groups.

use std::hash::{Hash, Hasher};

use serde_json::Value;

use crate::canonical::canonical_string;
use crate::error::{ModelError, ModelResult};
use crate::identity::IdentityKey;

/// Group type value for provider-managed groups (e.g. Azure directories).
pub const GROUP_TYPE_MANAGED: &str = "MANAGED_GROUP";

/// User-defined groups carry no group-type attribute.
pub const GROUP_TYPE_USER_DEFINED: &str = "";

/// A group of cloud accounts.  Identity is the name plus the ordered tag
/// list; the group ID is system-local.
#[derive(Debug, Clone)]
pub struct Group {
    pub group_id: String,
    pub name: String,
    pub tags: Vec<String>,
    pub group_type: String,
    pub cloud_type: Option<String>,
    pub cloud_data: Option<Value>,
}

impl Group {
    pub fn from_resource(resource: &Value) -> ModelResult<Self> {
        let attrib = resource
            .get("attributes")
            .ok_or(ModelError::missing("group", "attributes"))?;
        let name = attrib
            .get("name")
            .and_then(Value::as_str)
            .ok_or(ModelError::missing("group", "name"))?;
        let tags = attrib
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| {
                tags.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Ok(Self {
            group_id: resource
                .get("id")
                .and_then(Value::as_str)
                .ok_or(ModelError::missing("group", "id"))?
                .to_string(),
            name: name.to_string(),
            tags,
            group_type: attrib
                .get("group-type")
                .and_then(Value::as_str)
                .unwrap_or(GROUP_TYPE_USER_DEFINED)
                .to_string(),
            cloud_type: attrib
                .get("cloud-type")
                .and_then(Value::as_str)
                .map(str::to_string),
            cloud_data: attrib.get("cloud-data").cloned(),
        })
    }

    #[must_use]
    pub fn is_managed(&self) -> bool {
        self.group_type == GROUP_TYPE_MANAGED
    }
}

impl IdentityKey for Group {
    fn identity_key(&self) -> String {
        canonical_string(&serde_json::json!({
            "name": self.name,
            "tags": self.tags,
        }))
    }
}

impl PartialEq for Group {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.tags == other.tags
    }
}

impl Eq for Group {}

impl Hash for Group {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.tags.hash(state);
    }
}
