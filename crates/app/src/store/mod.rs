//! Key-value store access.
//!
//! [`KvStore`] is the narrow set of hash-record commands the cart domain
//! issues. Every mutation on an existing record is guarded: it only runs when
//! a named field of the hash still holds the value the caller expects, and the
//! check and the write happen in one atomic command.

use async_trait::async_trait;
use mockall::automock;
use rustc_hash::FxHashMap;

mod errors;
pub mod memory;
pub mod redis_store;

pub use errors::StoreError;
pub use memory::MemoryStore;
pub use redis_store::RedisStore;

/// Field/value pairs of a hash record.
pub type HashFields = FxHashMap<String, String>;

/// A field that must hold an expected value for a guarded command to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guard {
    /// Field read before the command runs.
    pub field: String,
    /// Value the field must hold.
    pub expected: String,
}

impl Guard {
    /// Guard on `field` holding `expected`.
    pub fn new(field: impl Into<String>, expected: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            expected: expected.into(),
        }
    }
}

/// Outcome of a command run under a [`Guard`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guarded<T> {
    /// The key does not exist or has no guard field. Nothing was written.
    Missing,
    /// The guard field holds this other value. Nothing was written.
    Mismatch(String),
    /// The guard held and the command ran.
    Applied(T),
}

/// Hash-record commands against a key-value store.
///
/// Each method is one atomic command from the store's point of view.
#[automock]
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Read every field of a hash. Absent keys yield an empty map.
    async fn hgetall(&self, key: &str) -> Result<HashFields, StoreError>;

    /// Check whether a key exists.
    async fn exists(&self, key: &str) -> Result<bool, StoreError>;

    /// Write all `fields` in one call, only if `key` does not exist yet.
    ///
    /// Returns `false` without writing when the key is already present.
    async fn hset_if_absent(
        &self,
        key: &str,
        fields: Vec<(String, String)>,
    ) -> Result<bool, StoreError>;

    /// Read every field of a hash and delete it.
    async fn take_hash(
        &self,
        key: &str,
        guard: &Guard,
    ) -> Result<Guarded<HashFields>, StoreError>;

    /// Delete every field except the guard field, returning how many were removed.
    async fn retain_guard_field(
        &self,
        key: &str,
        guard: &Guard,
    ) -> Result<Guarded<u64>, StoreError>;

    /// Add `delta` to an integer field, returning the new value.
    ///
    /// A missing field counts as zero.
    async fn hincrby_guarded(
        &self,
        key: &str,
        guard: &Guard,
        field: &str,
        delta: i64,
    ) -> Result<Guarded<i64>, StoreError>;

    /// Subtract `delta` from an integer field, flooring at zero.
    ///
    /// A missing field counts as zero and is left unwritten.
    async fn hdecrby_floor_guarded(
        &self,
        key: &str,
        guard: &Guard,
        field: &str,
        delta: i64,
    ) -> Result<Guarded<i64>, StoreError>;

    /// Delete one field, returning whether it was present.
    async fn hdel_guarded(
        &self,
        key: &str,
        guard: &Guard,
        field: &str,
    ) -> Result<Guarded<bool>, StoreError>;
}
