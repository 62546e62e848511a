//! Store errors.

use redis::RedisError;
use thiserror::Error;

/// Errors from key-value store calls.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The client or server reported an error.
    #[error("redis error")]
    Redis(#[source] RedisError),

    /// The call did not finish before its deadline.
    #[error("store deadline exceeded")]
    DeadlineExceeded,

    /// A stored value does not have the expected shape.
    #[error("invalid value for `{field}` in `{key}`: {value:?}")]
    InvalidData {
        /// Key holding the value.
        key: String,
        /// Field holding the value.
        field: String,
        /// The value as stored.
        value: String,
    },
}

impl StoreError {
    pub(crate) fn invalid_data(key: &str, field: &str, value: &str) -> Self {
        Self::InvalidData {
            key: key.to_owned(),
            field: field.to_owned(),
            value: value.to_owned(),
        }
    }

    /// Whether retrying the same call could succeed.
    ///
    /// Deadlines and connection-level failures are transient; malformed
    /// records, script errors and protocol errors are structural.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::DeadlineExceeded => true,
            Self::Redis(error) => {
                error.is_io_error()
                    || error.is_timeout()
                    || error.is_connection_dropped()
                    || error.is_connection_refusal()
            }
            Self::InvalidData { .. } => false,
        }
    }
}

impl From<RedisError> for StoreError {
    fn from(error: RedisError) -> Self {
        Self::Redis(error)
    }
}
