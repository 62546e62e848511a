//! A store whose calls never complete.

use std::future::pending;

use async_trait::async_trait;

use crate::store::{Guard, Guarded, HashFields, KvStore, StoreError};

#[derive(Debug)]
pub(crate) struct StalledStore;

#[async_trait]
impl KvStore for StalledStore {
    async fn hgetall(&self, _key: &str) -> Result<HashFields, StoreError> {
        pending().await
    }

    async fn exists(&self, _key: &str) -> Result<bool, StoreError> {
        pending().await
    }

    async fn hset_if_absent(
        &self,
        _key: &str,
        _fields: Vec<(String, String)>,
    ) -> Result<bool, StoreError> {
        pending().await
    }

    async fn take_hash(
        &self,
        _key: &str,
        _guard: &Guard,
    ) -> Result<Guarded<HashFields>, StoreError> {
        pending().await
    }

    async fn retain_guard_field(
        &self,
        _key: &str,
        _guard: &Guard,
    ) -> Result<Guarded<u64>, StoreError> {
        pending().await
    }

    async fn hincrby_guarded(
        &self,
        _key: &str,
        _guard: &Guard,
        _field: &str,
        _delta: i64,
    ) -> Result<Guarded<i64>, StoreError> {
        pending().await
    }

    async fn hdecrby_floor_guarded(
        &self,
        _key: &str,
        _guard: &Guard,
        _field: &str,
        _delta: i64,
    ) -> Result<Guarded<i64>, StoreError> {
        pending().await
    }

    async fn hdel_guarded(
        &self,
        _key: &str,
        _guard: &Guard,
        _field: &str,
    ) -> Result<Guarded<bool>, StoreError> {
        pending().await
    }
}
