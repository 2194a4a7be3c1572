// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wall-clock abstraction for job timestamps

use std::time::{SystemTime, UNIX_EPOCH};

/// Source of wall-clock time in milliseconds since the Unix epoch.
pub trait Clock: Clone + Send + Sync + 'static {
    fn epoch_ms(&self) -> u64;
}

/// Clock backed by [`SystemTime`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn epoch_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeClock;

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::Clock;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::Duration;

    /// Manually advanced clock for tests.
    #[derive(Debug, Clone)]
    pub struct FakeClock {
        now_ms: Arc<Mutex<u64>>,
    }

    impl Default for FakeClock {
        fn default() -> Self {
            Self::at(1_700_000_000_000)
        }
    }

    impl FakeClock {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn at(epoch_ms: u64) -> Self {
            Self {
                now_ms: Arc::new(Mutex::new(epoch_ms)),
            }
        }

        pub fn advance(&self, by: Duration) {
            *self.now_ms.lock() += by.as_millis() as u64;
        }

        pub fn set(&self, epoch_ms: u64) {
            *self.now_ms.lock() = epoch_ms;
        }
    }

    impl Clock for FakeClock {
        fn epoch_ms(&self) -> u64 {
            *self.now_ms.lock()
        }
    }
}
