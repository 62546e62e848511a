//! Redis-compatible store backed by a multiplexed connection manager.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use redis::{
    AsyncCommands, Client, ErrorKind, FromRedisValue, RedisError, Script, Value,
    aio::ConnectionManager, from_owned_redis_value,
};

use crate::store::{Guard, Guarded, HashFields, KvStore, StoreError};

const GUARD_LUA: &str = include_str!("scripts/guard.lua");
const HSET_IF_ABSENT_LUA: &str = include_str!("scripts/hset_if_absent.lua");
const TAKE_HASH_LUA: &str = include_str!("scripts/take_hash.lua");
const RETAIN_GUARD_FIELD_LUA: &str = include_str!("scripts/retain_guard_field.lua");
const HINCRBY_GUARDED_LUA: &str = include_str!("scripts/hincrby_guarded.lua");
const HDECRBY_FLOOR_GUARDED_LUA: &str = include_str!("scripts/hdecrby_floor_guarded.lua");
const HDEL_GUARDED_LUA: &str = include_str!("scripts/hdel_guarded.lua");

const MISSING: i64 = 0;
const MISMATCH: i64 = 1;
const APPLIED: i64 = 2;
const NOT_AN_INTEGER: i64 = 3;

/// Server-side scripts backing the conditional primitives.
///
/// `Script` invokes by SHA and falls back to `EVAL` on `NOSCRIPT`, so the
/// scripts survive a server restart or `SCRIPT FLUSH`.
struct Scripts {
    hset_if_absent: Script,
    take_hash: Script,
    retain_guard_field: Script,
    hincrby_guarded: Script,
    hdecrby_floor_guarded: Script,
    hdel_guarded: Script,
}

impl Scripts {
    fn load() -> Self {
        Self {
            hset_if_absent: Script::new(HSET_IF_ABSENT_LUA),
            take_hash: guarded(TAKE_HASH_LUA),
            retain_guard_field: guarded(RETAIN_GUARD_FIELD_LUA),
            hincrby_guarded: guarded(HINCRBY_GUARDED_LUA),
            hdecrby_floor_guarded: guarded(HDECRBY_FLOOR_GUARDED_LUA),
            hdel_guarded: guarded(HDEL_GUARDED_LUA),
        }
    }
}

/// Prefix a script body with the guard check.
fn guarded(body: &str) -> Script {
    Script::new(&format!("{GUARD_LUA}\n{body}"))
}

fn unexpected_reply() -> StoreError {
    StoreError::from(RedisError::from((
        ErrorKind::TypeError,
        "unexpected guarded script reply",
    )))
}

/// Decode a `{status, payload}` reply from a guarded script.
///
/// `field` names the field a non-integer status refers to.
fn outcome<T: FromRedisValue>(
    key: &str,
    field: &str,
    reply: Vec<Value>,
) -> Result<Guarded<T>, StoreError> {
    let mut reply = reply.into_iter();

    let status: i64 = from_owned_redis_value(reply.next().ok_or_else(unexpected_reply)?)?;
    let payload = reply.next().unwrap_or(Value::Nil);

    match status {
        MISSING => Ok(Guarded::Missing),
        MISMATCH => Ok(Guarded::Mismatch(from_owned_redis_value(payload)?)),
        APPLIED => Ok(Guarded::Applied(from_owned_redis_value(payload)?)),
        NOT_AN_INTEGER => {
            let value: String = from_owned_redis_value(payload)?;

            Err(StoreError::invalid_data(key, field, &value))
        }
        _ => Err(unexpected_reply()),
    }
}

/// [`KvStore`] over Redis or any server speaking its protocol (e.g. Valkey).
///
/// Cloning is cheap: clones share the underlying multiplexed connection, which
/// reconnects on its own after a dropped connection.
#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
    scripts: Arc<Scripts>,
}

impl RedisStore {
    /// Connect to the server at `url` (`redis://`, `rediss://` or `redis+unix://`).
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the initial connection fails.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = Client::open(url)?;
        let connection = ConnectionManager::new(client).await?;

        Ok(Self {
            connection,
            scripts: Arc::new(Scripts::load()),
        })
    }

    fn connection(&self) -> ConnectionManager {
        self.connection.clone()
    }
}

impl fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn hgetall(&self, key: &str) -> Result<HashFields, StoreError> {
        let fields: HashFields = self.connection().hgetall(key).await?;

        Ok(fields)
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let exists: bool = self.connection().exists(key).await?;

        Ok(exists)
    }

    async fn hset_if_absent(
        &self,
        key: &str,
        fields: Vec<(String, String)>,
    ) -> Result<bool, StoreError> {
        if fields.is_empty() {
            return Ok(false);
        }

        let written: bool = self
            .scripts
            .hset_if_absent
            .key(key)
            .arg(fields.as_slice())
            .invoke_async(&mut self.connection())
            .await?;

        Ok(written)
    }

    async fn take_hash(
        &self,
        key: &str,
        guard: &Guard,
    ) -> Result<Guarded<HashFields>, StoreError> {
        let reply: Vec<Value> = self
            .scripts
            .take_hash
            .key(key)
            .arg(&guard.field)
            .arg(&guard.expected)
            .invoke_async(&mut self.connection())
            .await?;

        outcome(key, &guard.field, reply)
    }

    async fn retain_guard_field(
        &self,
        key: &str,
        guard: &Guard,
    ) -> Result<Guarded<u64>, StoreError> {
        let reply: Vec<Value> = self
            .scripts
            .retain_guard_field
            .key(key)
            .arg(&guard.field)
            .arg(&guard.expected)
            .invoke_async(&mut self.connection())
            .await?;

        outcome(key, &guard.field, reply)
    }

    async fn hincrby_guarded(
        &self,
        key: &str,
        guard: &Guard,
        field: &str,
        delta: i64,
    ) -> Result<Guarded<i64>, StoreError> {
        let reply: Vec<Value> = self
            .scripts
            .hincrby_guarded
            .key(key)
            .arg(&guard.field)
            .arg(&guard.expected)
            .arg(field)
            .arg(delta)
            .invoke_async(&mut self.connection())
            .await?;

        outcome(key, field, reply)
    }

    async fn hdecrby_floor_guarded(
        &self,
        key: &str,
        guard: &Guard,
        field: &str,
        delta: i64,
    ) -> Result<Guarded<i64>, StoreError> {
        let reply: Vec<Value> = self
            .scripts
            .hdecrby_floor_guarded
            .key(key)
            .arg(&guard.field)
            .arg(&guard.expected)
            .arg(field)
            .arg(delta)
            .invoke_async(&mut self.connection())
            .await?;

        outcome(key, field, reply)
    }

    async fn hdel_guarded(
        &self,
        key: &str,
        guard: &Guard,
        field: &str,
    ) -> Result<Guarded<bool>, StoreError> {
        let reply: Vec<Value> = self
            .scripts
            .hdel_guarded
            .key(key)
            .arg(&guard.field)
            .arg(&guard.expected)
            .arg(field)
            .invoke_async(&mut self.connection())
            .await?;

        outcome(key, field, reply)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::test::redis::TestRedis;

    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(field, value)| ((*field).to_owned(), (*value).to_owned()))
            .collect()
    }

    fn owner(expected: &str) -> Guard {
        Guard::new("owner", expected)
    }

    async fn seeded(
        redis: &TestRedis,
        name: &str,
        pairs: &[(&str, &str)],
    ) -> TestResult<(RedisStore, String)> {
        let store = redis.store().await?;
        let key = redis.key(name);

        store.hset_if_absent(&key, fields(pairs)).await?;

        Ok((store, key))
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn hset_if_absent_refuses_to_overwrite() -> TestResult {
        let redis = TestRedis::new().await;
        let (store, key) = seeded(&redis, "create", &[("owner", "9"), ("100", "2")]).await?;

        assert!(
            !store
                .hset_if_absent(&key, fields(&[("owner", "10")]))
                .await?
        );

        let stored = store.hgetall(&key).await?;

        assert_eq!(stored.get("owner").map(String::as_str), Some("9"));
        assert_eq!(stored.get("100").map(String::as_str), Some("2"));

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn take_hash_returns_fields_and_deletes_key() -> TestResult {
        let redis = TestRedis::new().await;
        let (store, key) = seeded(&redis, "take", &[("owner", "9"), ("7", "3")]).await?;

        let Guarded::Applied(taken) = store.take_hash(&key, &owner("9")).await? else {
            return Err("expected the hash to be taken".into());
        };

        assert_eq!(taken.get("owner").map(String::as_str), Some("9"));
        assert_eq!(taken.get("7").map(String::as_str), Some("3"));
        assert!(!store.exists(&key).await?);
        assert_eq!(store.take_hash(&key, &owner("9")).await?, Guarded::Missing);

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn guarded_primitives_skip_missing_keys() -> TestResult {
        let redis = TestRedis::new().await;
        let store = redis.store().await?;
        let key = redis.key("missing");
        let guard = owner("9");

        assert_eq!(store.hincrby_guarded(&key, &guard, "7", 3).await?, Guarded::Missing);
        assert_eq!(
            store.hdecrby_floor_guarded(&key, &guard, "7", 3).await?,
            Guarded::Missing
        );
        assert_eq!(store.hdel_guarded(&key, &guard, "7").await?, Guarded::Missing);
        assert_eq!(store.retain_guard_field(&key, &guard).await?, Guarded::Missing);
        assert!(!store.exists(&key).await?, "no primitive may create the key");

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn guarded_primitives_leave_other_owners_alone() -> TestResult {
        let redis = TestRedis::new().await;
        let (store, key) = seeded(&redis, "foreign", &[("owner", "10"), ("7", "3")]).await?;
        let guard = owner("9");
        fn mismatch<T>() -> Guarded<T> {
            Guarded::Mismatch("10".to_owned())
        }

        assert_eq!(store.hincrby_guarded(&key, &guard, "7", 1).await?, mismatch());
        assert_eq!(store.hdecrby_floor_guarded(&key, &guard, "7", 1).await?, mismatch());
        assert_eq!(store.hdel_guarded(&key, &guard, "7").await?, mismatch());
        assert_eq!(store.retain_guard_field(&key, &guard).await?, mismatch());
        assert_eq!(store.take_hash(&key, &guard).await?, mismatch());

        let stored = store.hgetall(&key).await?;

        assert_eq!(stored.get("7").map(String::as_str), Some("3"));

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn counters_accumulate_and_floor_at_zero() -> TestResult {
        let redis = TestRedis::new().await;
        let (store, key) = seeded(&redis, "counters", &[("owner", "9")]).await?;
        let guard = owner("9");

        assert_eq!(store.hincrby_guarded(&key, &guard, "7", 3).await?, Guarded::Applied(3));
        assert_eq!(store.hincrby_guarded(&key, &guard, "7", 2).await?, Guarded::Applied(5));
        assert_eq!(
            store.hdecrby_floor_guarded(&key, &guard, "7", 1).await?,
            Guarded::Applied(4)
        );
        assert_eq!(
            store.hdecrby_floor_guarded(&key, &guard, "7", 10).await?,
            Guarded::Applied(0)
        );
        assert_eq!(
            store.hdecrby_floor_guarded(&key, &guard, "8", 1).await?,
            Guarded::Applied(0)
        );

        let stored = store.hgetall(&key).await?;

        assert_eq!(stored.get("7").map(String::as_str), Some("0"));
        assert_eq!(stored.get("8"), None);

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn decrement_stays_exact_near_the_counter_limit() -> TestResult {
        let redis = TestRedis::new().await;
        let max = i64::MAX.to_string();
        let (store, key) = seeded(&redis, "limit", &[("owner", "9"), ("7", max.as_str())]).await?;

        assert_eq!(
            store.hdecrby_floor_guarded(&key, &owner("9"), "7", 1).await?,
            Guarded::Applied(i64::MAX - 1)
        );

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn retain_guard_field_keeps_only_the_guard() -> TestResult {
        let redis = TestRedis::new().await;
        let (store, key) =
            seeded(&redis, "retain", &[("owner", "9"), ("1", "1"), ("2", "2")]).await?;

        assert_eq!(
            store.retain_guard_field(&key, &owner("9")).await?,
            Guarded::Applied(2)
        );

        let remaining = store.hgetall(&key).await?;

        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining.get("owner").map(String::as_str), Some("9"));

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn hdel_guarded_reports_whether_field_was_present() -> TestResult {
        let redis = TestRedis::new().await;
        let (store, key) = seeded(&redis, "hdel", &[("owner", "9"), ("7", "1")]).await?;
        let guard = owner("9");

        assert_eq!(store.hdel_guarded(&key, &guard, "7").await?, Guarded::Applied(true));
        assert_eq!(store.hdel_guarded(&key, &guard, "7").await?, Guarded::Applied(false));

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn non_integer_counters_are_invalid_data() -> TestResult {
        let redis = TestRedis::new().await;
        let (store, key) =
            seeded(&redis, "non-integer", &[("owner", "9"), ("7", "many")]).await?;

        let result = store.hdecrby_floor_guarded(&key, &owner("9"), "7", 1).await;

        assert!(
            matches!(result, Err(StoreError::InvalidData { ref value, .. }) if value == "many"),
            "expected InvalidData, got {result:?}"
        );

        Ok(())
    }
}
