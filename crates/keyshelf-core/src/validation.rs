//! Candidate matching against stored key values.

use crate::error::{KeyError, Result};
use crate::models::{KeyRecord, ValidationOutcome};

/// Check whether `candidate` is one of the stored secrets.
///
/// The candidate is trimmed and compared for exact equality with each stored
/// value as-is. When several records hold the same value the most recently
/// created one is reported. A miss carries no hint about near matches.
pub fn validate_candidate(candidate: &str, records: &[KeyRecord]) -> Result<ValidationOutcome> {
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return Err(KeyError::missing_candidate());
    }

    let outcome = records
        .iter()
        .filter(|record| record.value == candidate)
        .max_by_key(|record| record.created_at)
        .map(|record| ValidationOutcome::matched(&record.name, &record.key_type))
        .unwrap_or_else(ValidationOutcome::not_found);

    Ok(outcome)
}
