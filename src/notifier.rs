// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Fatal-failure reporting for e2e orchestration.
//!
//! The helpers in this crate return [`E2eError`] values and never terminate the
//! process themselves. Only the `*_or_die` wrappers used by test orchestration
//! hand a fatal error to a [`Notifier`], which decides what "die" means for the
//! current run.
//!
//! # Example
//!
//! ```rust,no_run
//! use operator_e2e::affinity::build_affinity_config_or_die;
//! use operator_e2e::notifier::PanicNotifier;
//!
//! // Panics (after logging) if the config cannot be rendered
//! let config = build_affinity_config_or_die("mycluster", "ns1", &PanicNotifier);
//! ```

use crate::errors::E2eError;
use tracing::error;

/// Receives fatal failures from the orchestration layer.
///
/// Implementations may return (log-only policies, recording test doubles) or
/// diverge (panic, exit). Callers must not assume either.
pub trait Notifier: Send + Sync {
    /// Report a fatal error.
    fn notify(&self, error: &E2eError);
}

/// Logs the error and panics, failing the current test.
///
/// This is the default policy for e2e runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct PanicNotifier;

impl Notifier for PanicNotifier {
    fn notify(&self, error: &E2eError) {
        error!(error = %error, "Fatal e2e failure");
        panic!("fatal e2e failure: {error}");
    }
}

/// Logs the error and returns, leaving the decision to the caller.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, error: &E2eError) {
        error!(error = %error, "E2e failure reported");
    }
}

#[cfg(test)]
#[path = "notifier_tests.rs"]
mod notifier_tests;
