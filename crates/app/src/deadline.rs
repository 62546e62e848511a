//! Per-call deadlines.

use std::{future::Future, time::Duration};

use tokio::time::{Instant, timeout_at};

use crate::store::StoreError;

/// Upper bound on how long a store round trip may take.
///
/// Every store call an operation makes is bounded by the same deadline, so a
/// multi-step operation can never outlive it. Dropping the operation's future
/// cancels whichever call is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    /// A deadline that never expires.
    #[must_use]
    pub const fn none() -> Self {
        Self(None)
    }

    /// A deadline at a fixed instant.
    #[must_use]
    pub fn at(instant: Instant) -> Self {
        Self(Some(instant))
    }

    /// A deadline `timeout` from now.
    #[must_use]
    pub fn after(timeout: Duration) -> Self {
        Self::at(Instant::now() + timeout)
    }

    /// When the deadline expires, if ever.
    #[must_use]
    pub fn instant(self) -> Option<Instant> {
        self.0
    }

    /// Drive `call` to completion unless the deadline passes first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DeadlineExceeded`] on expiry, otherwise whatever
    /// `call` returns.
    pub async fn run<F, T>(self, call: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match self.0 {
            None => call.await,
            Some(instant) => timeout_at(instant, call)
                .await
                .map_err(|_elapsed| StoreError::DeadlineExceeded)?,
        }
    }
}

impl Default for Deadline {
    fn default() -> Self {
        Self::none()
    }
}
