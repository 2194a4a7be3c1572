// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status polling cadence for `tsuite run`.

use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

/// Outcome of waiting for the next poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Ready,
    /// The caller's `--wait-timeout` elapsed.
    Timeout,
    Interrupted,
}

/// Sleeps between status reads, honoring an optional deadline and Ctrl+C.
pub struct Poller {
    interval: Duration,
    deadline: Option<Instant>,
    ctrl_c: Pin<Box<dyn Future<Output = std::io::Result<()>>>>,
}

impl Poller {
    pub fn new(interval: Duration, timeout: Option<Duration>) -> Self {
        Self {
            interval,
            // A deadline past what `Instant` can represent is no deadline.
            deadline: timeout.and_then(|t| Instant::now().checked_add(t)),
            ctrl_c: Box::pin(tokio::signal::ctrl_c()),
        }
    }

    fn expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Sleep one interval, cut short by the deadline or Ctrl+C.
    pub async fn tick(&mut self) -> Tick {
        if self.expired() {
            return Tick::Timeout;
        }
        let sleep = match self.deadline {
            Some(deadline) => self
                .interval
                .min(deadline.saturating_duration_since(Instant::now())),
            None => self.interval,
        };

        tokio::select! {
            _ = &mut self.ctrl_c => Tick::Interrupted,
            _ = tokio::time::sleep(sleep) => {
                if self.expired() {
                    Tick::Timeout
                } else {
                    Tick::Ready
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "poll_tests.rs"]
mod tests;
