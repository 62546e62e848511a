//! In-process store.

use std::sync::Arc;

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use tokio::sync::Mutex;

use crate::store::{Guard, Guarded, HashFields, KvStore, StoreError};

/// [`KvStore`] kept in process memory.
///
/// Each command holds one lock for its whole duration, which gives it the same
/// per-command atomicity a single Redis command or script has. Clones share
/// the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    hashes: Arc<Mutex<FxHashMap<String, HashFields>>>,
}

impl MemoryStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn parse_counter(key: &str, field: &str, value: &str) -> Result<i64, StoreError> {
    value
        .parse::<i64>()
        .map_err(|_error| StoreError::invalid_data(key, field, value))
}

/// The hash under `key` when `guard` holds, otherwise the outcome to report.
fn guarded_hash<'a, T>(
    hashes: &'a mut FxHashMap<String, HashFields>,
    key: &str,
    guard: &Guard,
) -> Result<&'a mut HashFields, Guarded<T>> {
    let Some(hash) = hashes.get_mut(key) else {
        return Err(Guarded::Missing);
    };

    match hash.get(&guard.field) {
        None => Err(Guarded::Missing),
        Some(actual) if *actual != guard.expected => Err(Guarded::Mismatch(actual.clone())),
        Some(_) => Ok(hash),
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn hgetall(&self, key: &str) -> Result<HashFields, StoreError> {
        let hashes = self.hashes.lock().await;

        Ok(hashes.get(key).cloned().unwrap_or_default())
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.hashes.lock().await.contains_key(key))
    }

    async fn hset_if_absent(
        &self,
        key: &str,
        fields: Vec<(String, String)>,
    ) -> Result<bool, StoreError> {
        let mut hashes = self.hashes.lock().await;

        if fields.is_empty() || hashes.contains_key(key) {
            return Ok(false);
        }

        hashes.insert(key.to_owned(), fields.into_iter().collect());

        Ok(true)
    }

    async fn take_hash(
        &self,
        key: &str,
        guard: &Guard,
    ) -> Result<Guarded<HashFields>, StoreError> {
        let mut hashes = self.hashes.lock().await;

        if let Err(outcome) = guarded_hash(&mut hashes, key, guard) {
            return Ok(outcome);
        }

        Ok(Guarded::Applied(hashes.remove(key).unwrap_or_default()))
    }

    async fn retain_guard_field(
        &self,
        key: &str,
        guard: &Guard,
    ) -> Result<Guarded<u64>, StoreError> {
        let mut hashes = self.hashes.lock().await;

        let hash = match guarded_hash(&mut hashes, key, guard) {
            Ok(hash) => hash,
            Err(outcome) => return Ok(outcome),
        };

        let before = hash.len();

        hash.retain(|name, _| *name == guard.field);

        Ok(Guarded::Applied((before - hash.len()) as u64))
    }

    async fn hincrby_guarded(
        &self,
        key: &str,
        guard: &Guard,
        field: &str,
        delta: i64,
    ) -> Result<Guarded<i64>, StoreError> {
        let mut hashes = self.hashes.lock().await;

        let hash = match guarded_hash(&mut hashes, key, guard) {
            Ok(hash) => hash,
            Err(outcome) => return Ok(outcome),
        };

        let current = match hash.get(field) {
            Some(value) => parse_counter(key, field, value)?,
            None => 0,
        };

        let next = current
            .checked_add(delta)
            .ok_or_else(|| StoreError::invalid_data(key, field, &current.to_string()))?;

        hash.insert(field.to_owned(), next.to_string());

        Ok(Guarded::Applied(next))
    }

    async fn hdecrby_floor_guarded(
        &self,
        key: &str,
        guard: &Guard,
        field: &str,
        delta: i64,
    ) -> Result<Guarded<i64>, StoreError> {
        let mut hashes = self.hashes.lock().await;

        let hash = match guarded_hash(&mut hashes, key, guard) {
            Ok(hash) => hash,
            Err(outcome) => return Ok(outcome),
        };

        let Some(value) = hash.get(field) else {
            return Ok(Guarded::Applied(0));
        };

        let remaining = parse_counter(key, field, value)?
            .saturating_sub(delta)
            .max(0);

        hash.insert(field.to_owned(), remaining.to_string());

        Ok(Guarded::Applied(remaining))
    }

    async fn hdel_guarded(
        &self,
        key: &str,
        guard: &Guard,
        field: &str,
    ) -> Result<Guarded<bool>, StoreError> {
        let mut hashes = self.hashes.lock().await;

        let hash = match guarded_hash(&mut hashes, key, guard) {
            Ok(hash) => hash,
            Err(outcome) => return Ok(outcome),
        };

        let removed = hash.remove(field).is_some();

        if hash.is_empty() {
            hashes.remove(key);
        }

        Ok(Guarded::Applied(removed))
    }
}
