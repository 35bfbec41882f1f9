// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! E2e run configuration.
//!
//! Loaded from a YAML file; every field except `nodes` has a default.
//!
//! ```yaml
//! clusterName: e2e-cluster
//! namespace: e2e-tidb
//! keepIntervalSecs: 5
//! keepPeriodSecs: 120
//! randomSeed: 42
//! nodes:
//!   - physicalNode: 172.16.4.39
//!     nodes:
//!       - 172.16.4.171
//!       - 172.16.4.172
//! ```
//!
//! `E2E_RANDOM_SEED` overrides `randomSeed`.

use crate::constants::{DEFAULT_KEEP_INTERVAL, DEFAULT_KEEP_PERIOD, ENV_RANDOM_SEED};
use crate::errors::E2eError;
use crate::keep::RetryPolicy;
use crate::nodes::{NodeGroup, NodeSelector};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_CLUSTER_NAME: &str = "e2e-cluster";
const DEFAULT_NAMESPACE: &str = "e2e-tidb";

/// Settings shared by the helpers of one e2e run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct E2eConfig {
    /// Name of the database cluster under test
    #[serde(default = "default_cluster_name")]
    pub cluster_name: String,

    /// Namespace the database cluster runs in
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Seconds between two keep-loop invocations
    #[serde(default = "default_keep_interval_secs")]
    pub keep_interval_secs: u64,

    /// Total seconds a keep loop runs
    #[serde(default = "default_keep_period_secs")]
    pub keep_period_secs: u64,

    /// Seed for node selection; random when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub random_seed: Option<u64>,

    /// Nodes available for fault injection, grouped by physical node
    #[serde(default)]
    pub nodes: Vec<NodeGroup>,
}

fn default_cluster_name() -> String {
    DEFAULT_CLUSTER_NAME.to_string()
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_keep_interval_secs() -> u64 {
    DEFAULT_KEEP_INTERVAL.as_secs()
}

fn default_keep_period_secs() -> u64 {
    DEFAULT_KEEP_PERIOD.as_secs()
}

impl Default for E2eConfig {
    fn default() -> Self {
        Self {
            cluster_name: default_cluster_name(),
            namespace: default_namespace(),
            keep_interval_secs: default_keep_interval_secs(),
            keep_period_secs: default_keep_period_secs(),
            random_seed: None,
            nodes: Vec::new(),
        }
    }
}

impl E2eConfig {
    /// Parse a configuration from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`E2eError::Config`] if the text is not a valid configuration.
    pub fn from_yaml(yaml: &str) -> Result<Self, E2eError> {
        serde_yaml::from_str(yaml).map_err(|e| E2eError::Config {
            path: "<inline>".to_string(),
            reason: e.to_string(),
        })
    }

    /// Load a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`E2eError::Config`] if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, E2eError> {
        let path = path.as_ref();
        let config_error = |reason: String| E2eError::Config {
            path: path.display().to_string(),
            reason,
        };

        let text = std::fs::read_to_string(path).map_err(|e| config_error(e.to_string()))?;
        let config: Self = serde_yaml::from_str(&text).map_err(|e| config_error(e.to_string()))?;

        debug!(
            path = %path.display(),
            node_groups = config.nodes.len(),
            "Loaded e2e config"
        );
        Ok(config)
    }

    /// Apply environment overrides (`E2E_RANDOM_SEED`).
    ///
    /// An unparsable value is logged and ignored.
    #[must_use]
    pub fn apply_env(mut self) -> Self {
        if let Ok(raw) = std::env::var(ENV_RANDOM_SEED) {
            match raw.trim().parse::<u64>() {
                Ok(seed) => self.random_seed = Some(seed),
                Err(e) => warn!(value = %raw, error = %e, "Ignoring invalid {}", ENV_RANDOM_SEED),
            }
        }
        self
    }

    /// Keep-loop policy from the configured interval and period.
    #[must_use]
    pub fn keep_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            Duration::from_secs(self.keep_interval_secs),
            Duration::from_secs(self.keep_period_secs),
        )
    }

    /// Node selector seeded from `random_seed`, or from OS entropy when unset.
    #[must_use]
    pub fn node_selector(&self) -> NodeSelector {
        self.random_seed
            .map_or_else(NodeSelector::from_entropy, NodeSelector::from_seed)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
