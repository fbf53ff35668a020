//! API key storage - byte-level API for key record persistence.

use crate::define_simple_storage;

define_simple_storage! {
    /// Low-level API key storage with byte-level API
    pub struct KeyStorage { table: "api_keys" }
}
