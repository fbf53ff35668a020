use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::mask::mask_key;

/// Classification assigned when a key is created without one.
pub const DEFAULT_KEY_TYPE: &str = "dev";

/// A stored API key.
///
/// Field names on the wire follow the hosted table's columns (`key_value`,
/// `key_type`); the Rust API calls them `value` and `key_type`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct KeyRecord {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(rename = "key_value")]
    pub value: String,
    #[serde(default = "default_key_type", deserialize_with = "key_type_or_default")]
    pub key_type: String,
    #[serde(default, deserialize_with = "usage_or_zero")]
    #[ts(type = "number")]
    pub usage: i64,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for KeyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyRecord")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("value", &mask_key(&self.value))
            .field("key_type", &self.key_type)
            .field("usage", &self.usage)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Fields supplied by the caller when inserting a record. The store assigns
/// `id` and `created_at`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct NewKey {
    pub name: String,
    #[serde(rename = "key_value")]
    pub value: String,
    pub key_type: String,
    pub usage: i64,
}

impl fmt::Debug for NewKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewKey")
            .field("name", &self.name)
            .field("value", &mask_key(&self.value))
            .field("key_type", &self.key_type)
            .field("usage", &self.usage)
            .finish()
    }
}

/// The mutable subset of a record.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct KeyPatch {
    pub name: String,
    #[serde(rename = "key_value")]
    pub value: String,
}

impl fmt::Debug for KeyPatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPatch")
            .field("name", &self.name)
            .field("value", &mask_key(&self.value))
            .finish()
    }
}

impl KeyRecord {
    /// Materialize a record from an insert request.
    pub fn from_new(id: String, new_key: NewKey, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: new_key.name,
            value: new_key.value,
            key_type: new_key.key_type,
            usage: new_key.usage,
            created_at,
        }
    }

    /// Apply an update; only name and value change.
    pub fn apply(&mut self, patch: KeyPatch) {
        self.name = patch.name;
        self.value = patch.value;
    }

    /// Display-safe rendering of the secret.
    pub fn masked_value(&self) -> String {
        mask_key(&self.value)
    }
}

/// Sort records newest first.
pub fn sort_newest_first(records: &mut [KeyRecord]) {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

fn default_key_type() -> String {
    DEFAULT_KEY_TYPE.to_string()
}

// Hosted tables may use bigint identity columns instead of uuids.
fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(id) => id,
        RawId::Number(id) => id.to_string(),
    })
}

fn key_type_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(default_key_type))
}

fn usage_or_zero<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(id: &str, created_secs: i64) -> KeyRecord {
        KeyRecord {
            id: id.to_string(),
            name: format!("key {id}"),
            value: "sk-abcdef1234567890".to_string(),
            key_type: DEFAULT_KEY_TYPE.to_string(),
            usage: 7,
            created_at: Utc.timestamp_opt(created_secs, 0).unwrap(),
        }
    }

    #[test]
    fn test_wire_names_follow_table_columns() {
        let json = serde_json::to_value(record("abc", 1_700_000_000)).unwrap();
        assert_eq!(json["key_value"], "sk-abcdef1234567890");
        assert_eq!(json["key_type"], "dev");
        assert!(json.get("value").is_none());
        assert_eq!(json["created_at"], "2023-11-14T22:13:20Z");
    }

    #[test]
    fn test_deserialize_hosted_row() {
        let row = serde_json::json!({
            "id": 42,
            "name": "My App",
            "key_value": "sk-abcdef1234567890",
            "key_type": null,
            "usage": null,
            "created_at": "2024-05-01T12:34:56.123456+00:00"
        });

        let record: KeyRecord = serde_json::from_value(row).unwrap();
        assert_eq!(record.id, "42");
        assert_eq!(record.key_type, DEFAULT_KEY_TYPE);
        assert_eq!(record.usage, 0);
    }

    #[test]
    fn test_debug_does_not_print_secret() {
        let rendered = format!("{:?}", record("abc", 0));
        assert!(!rendered.contains("abcdef1234567890"));
        assert!(rendered.contains("sk-"));
    }

    #[test]
    fn test_apply_touches_only_name_and_value() {
        let mut stored = record("abc", 10);
        let before = stored.clone();
        stored.apply(KeyPatch {
            name: "Renamed".to_string(),
            value: "new-secret".to_string(),
        });

        assert_eq!(stored.name, "Renamed");
        assert_eq!(stored.value, "new-secret");
        assert_eq!(stored.id, before.id);
        assert_eq!(stored.key_type, before.key_type);
        assert_eq!(stored.usage, before.usage);
        assert_eq!(stored.created_at, before.created_at);
    }

    #[test]
    fn test_sort_newest_first() {
        let mut records = vec![record("old", 1), record("new", 3), record("mid", 2)];
        sort_newest_first(&mut records);
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }
}
