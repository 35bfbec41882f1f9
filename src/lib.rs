// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # operator-e2e - End-to-end test helpers for a Kubernetes database operator
//!
//! Helpers used by the e2e suite of a distributed database operator
//! (placement driver `pd`, storage `tikv`, compute `tidb`).
//!
//! ## Modules
//!
//! - [`keep`] - Run a check at a fixed interval for a fixed period
//! - [`nodes`] - Random node selection for fault injection
//! - [`components`] - Find control-plane pods by `component` label on a node
//! - [`affinity`] - Pod anti-affinity config for the cluster under test
//! - [`notifier`] - Fatal-failure policy for the orchestration layer
//! - [`config`] - E2e run configuration
//!
//! ## Example
//!
//! ```rust
//! use operator_e2e::affinity::build_affinity_config;
//! use operator_e2e::nodes::{NodeGroup, NodeSelector};
//!
//! let config = build_affinity_config("mycluster", "ns1").unwrap();
//! assert_eq!(config.matches("weight: 50").count(), 3);
//!
//! let groups = vec![NodeGroup::new("172.16.4.39", ["node-a", "node-b"])];
//! let node = NodeSelector::from_seed(1).select(&groups).unwrap();
//! assert!(node == "node-a" || node == "node-b");
//! ```

pub mod affinity;
pub mod components;
pub mod config;
pub mod constants;
pub mod errors;
pub mod keep;
pub mod labels;
pub mod logging;
pub mod nodes;
pub mod notifier;
pub mod pagination;

#[cfg(test)]
mod test_support;
