//! Test context for service-level tests.

use std::{sync::Arc, time::Duration};

use crate::{deadline::Deadline, domain::carts::KvCartsService, store::MemoryStore};

/// Deadline given to every operation a test makes.
const TEST_DEADLINE: Duration = Duration::from_secs(5);

pub(crate) struct TestContext {
    pub store: MemoryStore,
    pub carts: KvCartsService,
}

impl TestContext {
    /// A cart service over a fresh, empty in-memory store.
    pub fn new() -> Self {
        let store = MemoryStore::new();

        Self {
            carts: KvCartsService::new(Arc::new(store.clone())),
            store,
        }
    }

    pub fn deadline(&self) -> Deadline {
        Deadline::after(TEST_DEADLINE)
    }
}
