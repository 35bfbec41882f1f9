// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the e2e helpers.
//!
//! This module contains the numeric and string constants used throughout the codebase.
//! Constants are organized by category so tests can substitute them by name.

use std::time::Duration;

// ============================================================================
// Kubernetes Constants
// ============================================================================

/// Namespace the control-plane components run in
pub const KUBE_SYSTEM_NAMESPACE: &str = "kube-system";

/// Page size for Kubernetes list operations
pub const KUBE_LIST_PAGE_SIZE: u32 = 100;

// ============================================================================
// Control-Plane Component Names
// ============================================================================

/// `component` label value of the API server pods
pub const COMPONENT_APISERVER: &str = "kube-apiserver";

/// `component` label value of the scheduler pods
pub const COMPONENT_SCHEDULER: &str = "kube-scheduler";

/// `component` label value of the cluster DNS pods
pub const COMPONENT_DNS: &str = "kube-dns";

/// `component` label value of the controller-manager pods
pub const COMPONENT_CONTROLLER_MANAGER: &str = "kube-controller-manager";

// ============================================================================
// Anti-Affinity Constants
// ============================================================================

/// Preference weight used for every workload kind in the generated affinity config
pub const DEFAULT_ANTI_AFFINITY_WEIGHT: i32 = 50;

/// Lowest weight Kubernetes accepts for a preferred scheduling term
pub const MIN_AFFINITY_WEIGHT: i32 = 1;

/// Highest weight Kubernetes accepts for a preferred scheduling term
pub const MAX_AFFINITY_WEIGHT: i32 = 100;

/// Topology domain the anti-affinity preference is evaluated over
pub const AFFINITY_TOPOLOGY_KEY: &str = "rack";

// ============================================================================
// Keep-Alive Loop Constants
// ============================================================================

/// Default poll interval for `keep_until` (5 seconds)
pub const DEFAULT_KEEP_INTERVAL: Duration = Duration::from_secs(5);

/// Default total period for `keep_until` (2 minutes)
pub const DEFAULT_KEEP_PERIOD: Duration = Duration::from_secs(120);

// ============================================================================
// Environment Variables
// ============================================================================

/// Seed for the process-wide node selection generator
pub const ENV_RANDOM_SEED: &str = "E2E_RANDOM_SEED";

/// Log output format (`json` or `text`)
pub const ENV_LOG_FORMAT: &str = "RUST_LOG_FORMAT";

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for the CLI's Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 2;
