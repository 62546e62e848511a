//! Store Config

use std::time::Duration;

use clap::Args;

/// Key-value store settings.
#[derive(Debug, Clone, Args)]
pub struct StoreConfig {
    /// Store connection string (`redis://`, `rediss://`, `redis+unix://` or `memory://`)
    #[arg(
        long,
        env = "STORE_URL",
        hide_env_values = true,
        default_value = "redis://127.0.0.1:6379"
    )]
    pub store_url: String,

    /// Deadline for each cart operation, in milliseconds
    #[arg(long, env = "STORE_TIMEOUT_MS", default_value_t = 2_000_u64)]
    pub store_timeout_ms: u64,
}

impl StoreConfig {
    /// Per-operation deadline as a duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}
