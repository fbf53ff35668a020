pub mod key;
pub mod validation;

pub use key::{DEFAULT_KEY_TYPE, KeyPatch, KeyRecord, NewKey, sort_newest_first};
pub use validation::ValidationOutcome;
