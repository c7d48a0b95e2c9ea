//! Audit notes attached to checks and rule settings.

use serde_json::Value;

/// A free-text annotation.  Immutable once fetched; "most recent" and
/// "history" orderings sort by `created_ts` descending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub note: String,
    /// Author user-id, local to the deployment the note came from.
    pub created_by: String,
    /// Creation time in milliseconds since epoch.
    pub created_ts: i64,
}

impl Note {
    /// Parse a note object.  The API spells the timestamp field differently
    /// per endpoint (`createdDate` on rule settings, `created-date` on
    /// checks), so both are accepted.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let created_ts = value
            .get("createdDate")
            .or_else(|| value.get("created-date"))?
            .as_i64()?;
        Some(Self {
            note: value.get("note")?.as_str()?.to_string(),
            created_by: value
                .get("createdBy")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            created_ts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_rule_setting_spelling() {
        let n = Note::from_value(&json!({
            "note": "tightened", "createdBy": "u-1", "createdDate": 3000_i64
        }))
        .unwrap();
        assert_eq!(n.created_ts, 3000);
    }

    #[test]
    fn test_parse_check_spelling() {
        let n = Note::from_value(&json!({
            "note": "suppressed", "createdBy": "u-1", "created-date": 1000_i64
        }))
        .unwrap();
        assert_eq!(n.created_ts, 1000);
    }
}
