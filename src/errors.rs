// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for the e2e helpers.
//!
//! Three kinds of failure are kept apart:
//! - transport failures from the pod-listing client ([`E2eError::ListPods`]), which the
//!   caller may retry or report,
//! - precondition failures on caller input (empty node groups, bad affinity parameters),
//! - fatal failures of the keep-alive loop or template rendering, which the
//!   orchestration layer hands to a [`crate::notifier::Notifier`].
//!
//! "Pod not found" is not an error; see [`crate::components::ComponentPod`].

use thiserror::Error;

/// Boxed error returned by pod-listing implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors produced by the e2e helpers.
#[derive(Error, Debug)]
pub enum E2eError {
    /// Listing pods through the Kubernetes client failed
    ///
    /// The query never completed, so nothing can be said about whether a matching pod exists.
    #[error("Failed to list pods in namespace '{namespace}' with selector '{selector}': {source}")]
    ListPods {
        /// Namespace that was queried
        namespace: String,
        /// Label selector that was sent
        selector: String,
        /// Underlying client error
        #[source]
        source: BoxError,
    },

    /// Node selection was attempted on an empty list of node groups
    #[error("Cannot select a node: no node groups were provided")]
    NoNodeGroups,

    /// Node selection picked a group that has no nodes
    #[error("Cannot select a node: node group '{physical_node}' has no nodes")]
    EmptyNodeGroup {
        /// Physical node (outer partition) of the empty group
        physical_node: String,
    },

    /// The operation passed to `keep_until` failed
    ///
    /// The loop stops at the first failure; no further iterations run.
    #[error("Operation failed on iteration {iteration} of the keep loop: {source}")]
    KeepFailed {
        /// 1-based iteration that failed
        iteration: u64,
        /// Error returned by the operation
        #[source]
        source: anyhow::Error,
    },

    /// Affinity parameters cannot be rendered into valid YAML
    #[error("Invalid affinity parameters: {reason}")]
    InvalidAffinityParameters {
        /// Explanation of what is invalid
        reason: String,
    },

    /// A template still contains placeholders after rendering
    #[error("Failed to render template '{template}': {reason}")]
    TemplateRender {
        /// Template name
        template: String,
        /// Explanation of the failure
        reason: String,
    },

    /// A rendered affinity blob could not be parsed back
    #[error("Failed to parse affinity config: {0}")]
    AffinityParse(#[from] serde_yaml::Error),

    /// The e2e configuration file could not be loaded
    #[error("Failed to load config from '{path}': {reason}")]
    Config {
        /// Path of the configuration file
        path: String,
        /// Explanation of the failure
        reason: String,
    },
}

impl E2eError {
    /// Returns `true` for failures the orchestration layer must treat as fatal.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::KeepFailed { .. } | Self::TemplateRender { .. }
        )
    }
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
