use crate::error::{KeyError, Result};
use crate::models::{DEFAULT_KEY_TYPE, KeyPatch, KeyRecord, NewKey, ValidationOutcome};
use crate::validation::validate_candidate;
use crate::AppCore;
use rand::RngExt;
use tracing::info;

/// Upper bound (exclusive) of the placeholder usage counter.
const USAGE_PLACEHOLDER_MAX: i64 = 100;

/// List all keys, newest first
pub async fn list_keys(core: &AppCore) -> Result<Vec<KeyRecord>> {
    Ok(core.store.list().await?)
}

/// Create a key. `key_type` falls back to the default classification.
pub async fn create_key(
    core: &AppCore,
    name: &str,
    value: &str,
    key_type: Option<&str>,
) -> Result<KeyRecord> {
    ensure_name_and_value(name, value)?;

    let key_type = key_type
        .filter(|key_type| !key_type.trim().is_empty())
        .unwrap_or(DEFAULT_KEY_TYPE);
    let new_key = NewKey {
        name: name.to_string(),
        value: value.to_string(),
        key_type: key_type.to_string(),
        usage: rand::rng().random_range(0..USAGE_PLACEHOLDER_MAX),
    };

    let record = core.store.insert(new_key).await?;
    info!(id = %record.id, key_type = %record.key_type, "Created API key");
    Ok(record)
}

/// Replace the name and value of an existing key
pub async fn update_key(core: &AppCore, id: &str, name: &str, value: &str) -> Result<KeyRecord> {
    ensure_name_and_value(name, value)?;

    let patch = KeyPatch {
        name: name.to_string(),
        value: value.to_string(),
    };
    let record = core.store.update(id, patch).await?;
    info!(id = %record.id, "Updated API key");
    Ok(record)
}

/// Permanently delete a key. Unknown ids are not an error.
pub async fn delete_key(core: &AppCore, id: &str) -> Result<()> {
    core.store.delete(id).await?;
    info!(id, "Deleted API key");
    Ok(())
}

/// Check a candidate against every stored key
pub async fn validate_key(core: &AppCore, candidate: &str) -> Result<ValidationOutcome> {
    if candidate.trim().is_empty() {
        return Err(KeyError::missing_candidate());
    }
    let records = list_keys(core).await?;
    let outcome = validate_candidate(candidate, &records)?;
    info!(success = outcome.success, "Validated API key candidate");
    Ok(outcome)
}

fn ensure_name_and_value(name: &str, value: &str) -> Result<()> {
    if name.trim().is_empty() || value.trim().is_empty() {
        return Err(KeyError::missing_fields());
    }
    Ok(())
}
