// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Bounded-duration keep-alive loop for e2e checks.
//!
//! [`keep_until`] runs a check at a fixed interval for a fixed period. The check
//! is expected to keep succeeding; the first failure ends the loop and is
//! returned as [`E2eError::KeepFailed`]. There is no backoff: a failure here
//! means the system under test broke an invariant, not that a call was flaky.
//!
//! The loop can be stopped early through a [`CancelSignal`].
//!
//! # Example
//!
//! ```rust,no_run
//! use operator_e2e::keep::{keep_until, CancelSignal, RetryPolicy};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), operator_e2e::errors::E2eError> {
//! let policy = RetryPolicy::new(Duration::from_secs(5), Duration::from_secs(60));
//! let outcome = keep_until(policy, CancelSignal::never(), || async {
//!     // check that the cluster is still healthy
//!     Ok(())
//! })
//! .await?;
//! println!("check ran {} times", outcome.iterations);
//! # Ok(())
//! # }
//! ```

use crate::constants::{DEFAULT_KEEP_INTERVAL, DEFAULT_KEEP_PERIOD};
use crate::errors::E2eError;
use crate::notifier::Notifier;
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Interval and total period of a keep loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Time to sleep between two invocations
    pub interval: Duration,
    /// Total time the loop keeps invoking the operation
    pub period: Duration,
}

impl RetryPolicy {
    /// Create a policy from an interval and a total period.
    #[must_use]
    pub fn new(interval: Duration, period: Duration) -> Self {
        Self { interval, period }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_KEEP_INTERVAL, DEFAULT_KEEP_PERIOD)
    }
}

/// What a keep loop did before it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepOutcome {
    /// Number of times the operation was invoked
    pub iterations: u64,
    /// `true` if the loop stopped because it was cancelled rather than because the period elapsed
    pub cancelled: bool,
}

/// Sender side of a cancellation pair.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Ask every loop holding the matching [`CancelSignal`] to stop.
    ///
    /// A loop observes the request before its next invocation or while sleeping.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// Receiver side of a cancellation pair.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    /// A signal that never fires.
    #[must_use]
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation is requested.
    ///
    /// If the handle is dropped without cancelling, this never resolves.
    pub async fn cancelled(&mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Create a connected [`CancelHandle`] / [`CancelSignal`] pair.
#[must_use]
pub fn cancellation() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelSignal { rx })
}

/// Invoke `operation` every `policy.interval` until `policy.period` has elapsed.
///
/// The deadline is checked before each invocation, so a zero period runs the
/// operation zero times. The loop sleeps for the full interval after every
/// successful invocation; the sleep is cut short only by cancellation.
///
/// # Arguments
///
/// * `policy` - Interval and total period
/// * `cancel` - Signal that stops the loop early
/// * `operation` - Async check to run; any `Err` ends the loop
///
/// # Returns
///
/// The number of invocations and whether the loop was cancelled.
///
/// # Errors
///
/// Returns [`E2eError::KeepFailed`] with the failing iteration as soon as the
/// operation fails. No further iterations run.
pub async fn keep_until<F, Fut>(
    policy: RetryPolicy,
    mut cancel: CancelSignal,
    mut operation: F,
) -> Result<KeepOutcome, E2eError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<()>>,
{
    // An unrepresentable deadline means the loop only ends on failure or cancellation
    let deadline = Instant::now().checked_add(policy.period);
    let mut iterations: u64 = 0;

    loop {
        if cancel.is_cancelled() {
            warn!(iterations, "Keep loop cancelled");
            return Ok(KeepOutcome {
                iterations,
                cancelled: true,
            });
        }

        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            break;
        }

        iterations += 1;
        if let Err(source) = operation().await {
            error!(
                iteration = iterations,
                error = %source,
                "Keep loop operation failed"
            );
            return Err(E2eError::KeepFailed {
                iteration: iterations,
                source,
            });
        }
        debug!(iteration = iterations, "Keep loop operation succeeded");

        tokio::select! {
            () = tokio::time::sleep(policy.interval) => {}
            () = cancel.cancelled() => {
                warn!(iterations, "Keep loop cancelled while sleeping");
                return Ok(KeepOutcome {
                    iterations,
                    cancelled: true,
                });
            }
        }
    }

    info!(
        iterations,
        period = ?policy.period,
        "Keep loop finished without failure"
    );
    Ok(KeepOutcome {
        iterations,
        cancelled: false,
    })
}

/// Run [`keep_until`] and hand a failure to `notifier`.
///
/// This is the orchestration-layer entry point. With
/// [`crate::notifier::PanicNotifier`] a failure never returns; with other
/// notifiers the already-reported error is handed back.
///
/// # Errors
///
/// Returns the [`E2eError::KeepFailed`] error after it has been reported, if
/// the notifier returns.
pub async fn keep_or_die<F, Fut>(
    policy: RetryPolicy,
    cancel: CancelSignal,
    operation: F,
    notifier: &dyn Notifier,
) -> Result<KeepOutcome, E2eError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<()>>,
{
    keep_until(policy, cancel, operation).await.inspect_err(|e| {
        notifier.notify(e);
    })
}

#[cfg(test)]
#[path = "keep_tests.rs"]
mod keep_tests;
