// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Label keys used when selecting pods.
//!
//! Control-plane pods are found by the bare `component` label, while the
//! database workloads carry the standard `app.kubernetes.io/*` labels that the
//! anti-affinity rules match on.

// ============================================================================
// Kubernetes Standard Labels
// https://kubernetes.io/docs/concepts/overview/working-with-objects/common-labels/
// ============================================================================

/// Standard label for the component name within the architecture (e.g., "pd", "tikv")
pub const K8S_COMPONENT: &str = "app.kubernetes.io/component";

/// Standard label for a unique name identifying the instance of an application
pub const K8S_INSTANCE: &str = "app.kubernetes.io/instance";

// ============================================================================
// Control-Plane Labels
// ============================================================================

/// Label set by kubeadm (and most distributions) on static control-plane pods
pub const CONTROL_PLANE_COMPONENT: &str = "component";
