// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Random node selection for fault-injection tests.
//!
//! Nodes are grouped by the physical machine (or zone) they live on. A
//! selection first picks a group uniformly at random, then a node within that
//! group uniformly at random.
//!
//! A single process-wide generator backs [`select_node`]. It is seeded once,
//! from `E2E_RANDOM_SEED` when set so a failing run can be replayed. Tests that
//! need their own sequence construct a [`NodeSelector`] directly.

use crate::constants::ENV_RANDOM_SEED;
use crate::errors::E2eError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::{LazyLock, Mutex, PoisonError};
use tracing::{debug, info, warn};

/// Virtual nodes hosted on one physical node.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeGroup {
    /// Physical node (outer partition) the group belongs to
    pub physical_node: String,
    /// Kubernetes node names in this group
    #[serde(default)]
    pub nodes: Vec<String>,
}

impl NodeGroup {
    /// Create a group from a physical node name and its node names.
    pub fn new<I, S>(physical_node: impl Into<String>, nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            physical_node: physical_node.into(),
            nodes: nodes.into_iter().map(Into::into).collect(),
        }
    }
}

/// Uniform random selection over [`NodeGroup`]s.
#[derive(Debug, Clone)]
pub struct NodeSelector {
    rng: StdRng,
}

impl NodeSelector {
    /// Deterministic selector; the same seed yields the same sequence.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Selector seeded from OS entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Selector seeded from `E2E_RANDOM_SEED`, falling back to OS entropy.
    ///
    /// An unparsable seed is logged and ignored.
    #[must_use]
    pub fn from_env() -> Self {
        match std::env::var(ENV_RANDOM_SEED) {
            Ok(raw) => match raw.trim().parse::<u64>() {
                Ok(seed) => {
                    info!(seed, "Seeding node selector from {}", ENV_RANDOM_SEED);
                    Self::from_seed(seed)
                }
                Err(e) => {
                    warn!(value = %raw, error = %e, "Ignoring invalid {}", ENV_RANDOM_SEED);
                    Self::from_entropy()
                }
            },
            Err(_) => Self::from_entropy(),
        }
    }

    /// Pick a random node: a uniform group first, then a uniform node in it.
    ///
    /// # Errors
    ///
    /// - [`E2eError::NoNodeGroups`] if `groups` is empty
    /// - [`E2eError::EmptyNodeGroup`] if the chosen group has no nodes
    pub fn select<'a>(&mut self, groups: &'a [NodeGroup]) -> Result<&'a str, E2eError> {
        if groups.is_empty() {
            return Err(E2eError::NoNodeGroups);
        }
        let group = &groups[self.rng.gen_range(0..groups.len())];

        if group.nodes.is_empty() {
            return Err(E2eError::EmptyNodeGroup {
                physical_node: group.physical_node.clone(),
            });
        }
        let node = &group.nodes[self.rng.gen_range(0..group.nodes.len())];

        debug!(
            physical_node = %group.physical_node,
            node = %node,
            "Selected node"
        );
        Ok(node)
    }
}

static GLOBAL_SELECTOR: LazyLock<Mutex<NodeSelector>> =
    LazyLock::new(|| Mutex::new(NodeSelector::from_env()));

/// Pick a random node using the process-wide generator.
///
/// # Errors
///
/// Same as [`NodeSelector::select`].
pub fn select_node(groups: &[NodeGroup]) -> Result<&str, E2eError> {
    GLOBAL_SELECTOR
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .select(groups)
}

#[cfg(test)]
#[path = "nodes_tests.rs"]
mod nodes_tests;
