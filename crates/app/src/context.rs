//! App Context

use std::{fmt, sync::Arc, time::Duration};

use thiserror::Error;
use tracing::info;

use crate::{
    config::StoreConfig,
    deadline::Deadline,
    domain::carts::{CartsService, KvCartsService},
    store::{KvStore, MemoryStore, RedisStore, StoreError},
};

/// Errors raised while building the [`AppContext`].
#[derive(Debug, Error)]
pub enum AppInitError {
    /// The store could not be reached.
    #[error("failed to connect to key-value store")]
    Store(#[source] StoreError),

    /// The store URL names a scheme no backend handles.
    #[error("unsupported store url `{0}`")]
    UnsupportedStore(String),
}

/// Services shared by every command.
#[derive(Clone)]
pub struct AppContext {
    /// Cart operations.
    pub carts: Arc<dyn CartsService>,
    timeout: Duration,
}

impl AppContext {
    /// Build application context from store settings.
    ///
    /// # Errors
    ///
    /// Returns an error when the store URL scheme is not supported or the
    /// store connection cannot be established.
    pub async fn from_config(config: &StoreConfig) -> Result<Self, AppInitError> {
        let store = connect_store(&config.store_url).await?;

        Ok(Self::new(
            Arc::new(KvCartsService::new(store)),
            config.timeout(),
        ))
    }

    /// Context over an existing carts service.
    #[must_use]
    pub fn new(carts: Arc<dyn CartsService>, timeout: Duration) -> Self {
        Self { carts, timeout }
    }

    /// Deadline for one operation starting now.
    #[must_use]
    pub fn deadline(&self) -> Deadline {
        Deadline::after(self.timeout)
    }
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

async fn connect_store(url: &str) -> Result<Arc<dyn KvStore>, AppInitError> {
    let scheme = url.split_once("://").map(|(scheme, _)| scheme);

    match scheme {
        Some("memory") => {
            info!("using in-process memory store");

            Ok(Arc::new(MemoryStore::new()))
        }
        Some("redis" | "rediss" | "redis+unix") => {
            let store = RedisStore::connect(url)
                .await
                .map_err(AppInitError::Store)?;

            info!("connected to key-value store");

            Ok(Arc::new(store))
        }
        _ => Err(AppInitError::UnsupportedStore(url.to_owned())),
    }
}
