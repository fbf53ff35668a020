use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Result of matching a candidate string against the stored keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ValidationOutcome {
    pub success: bool,
    pub message: String,
    pub details: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_type: Option<String>,
}

impl ValidationOutcome {
    pub fn matched(name: &str, key_type: &str) -> Self {
        Self {
            success: true,
            message: "Valid API key".to_string(),
            details: format!("This key is stored under the name '{name}' (type: {key_type})"),
            key_name: Some(name.to_string()),
            key_type: Some(key_type.to_string()),
        }
    }

    pub fn not_found() -> Self {
        Self {
            success: false,
            message: "API key not found".to_string(),
            details: "Check the key or add it from the dashboard".to_string(),
            key_name: None,
            key_type: None,
        }
    }
}
