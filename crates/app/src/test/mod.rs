//! Test support shared by unit tests.

mod context;
pub(crate) mod helpers;
mod stalled;

pub(crate) use context::TestContext;
pub(crate) use stalled::StalledStore;
