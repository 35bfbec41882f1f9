// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Tracing subscriber setup for e2e binaries and test runs.
//!
//! Format: timestamp file:line LEVEL message
//!
//! Respects `RUST_LOG` (default `info`) and `RUST_LOG_FORMAT` (`json` or `text`).

use crate::constants::ENV_LOG_FORMAT;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// Returns `false` if a subscriber was already installed, which happens when
/// several tests in one binary call this.
pub fn init() -> bool {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let log_format = std::env::var(ENV_LOG_FORMAT).unwrap_or_else(|_| "text".to_string());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_file(true)
        .with_line_number(true)
        .with_thread_names(true)
        .with_target(false);

    match log_format.to_lowercase().as_str() {
        "json" => builder.json().try_init().is_ok(),
        _ => builder.with_ansi(true).compact().try_init().is_ok(),
    }
}
