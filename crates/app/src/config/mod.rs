//! Configuration shared by every entry point.

mod logging;
mod store;

pub use logging::{LogFormat, LoggingConfig};
pub use store::StoreConfig;
