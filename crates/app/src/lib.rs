//! Shopping carts kept as ownership-checked records in a key-value store.

pub mod config;
pub mod context;
pub mod deadline;
pub mod domain;
pub mod ids;
pub mod logging;
pub mod store;

#[cfg(test)]
mod test;
