// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Lookup of control-plane pods by `component` label.
//!
//! Fault-injection tests need the control-plane pod running on a given node
//! (for example, to kill the scheduler on the node they are about to stop).
//! Control-plane pods live in `kube-system` and carry a bare `component`
//! label (`component=kube-apiserver`, ...).
//!
//! A query that succeeds but finds nothing returns [`ComponentPod::NotFound`];
//! a query that fails returns [`E2eError::ListPods`]. The two are never conflated.
//!
//! # Example
//!
//! ```rust,no_run
//! use operator_e2e::components::{get_scheduler_pod, ComponentPod};
//! use kube::Client;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = Client::try_default().await?;
//! match get_scheduler_pod(&client, "node-1").await? {
//!     ComponentPod::Found(pod) => println!("scheduler pod: {:?}", pod.metadata.name),
//!     ComponentPod::NotFound => println!("no scheduler on node-1"),
//! }
//! # Ok(())
//! # }
//! ```

use crate::constants::{
    COMPONENT_APISERVER, COMPONENT_CONTROLLER_MANAGER, COMPONENT_DNS, COMPONENT_SCHEDULER,
    KUBE_SYSTEM_NAMESPACE,
};
use crate::errors::{BoxError, E2eError};
use crate::labels::CONTROL_PLANE_COMPONENT;
use crate::pagination::list_all_paginated;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, ListParams};
use kube::{Client, ResourceExt};
use std::fmt;
use tracing::debug;

/// Lists pods in a namespace by label selector.
///
/// Implemented for [`kube::Client`]; tests supply their own implementations.
#[async_trait]
pub trait PodLister: Send + Sync {
    /// List the pods in `namespace` matching `label_selector`.
    ///
    /// # Errors
    ///
    /// Returns the transport or API error if the list call fails.
    async fn list_pods(&self, namespace: &str, label_selector: &str) -> Result<Vec<Pod>, BoxError>;
}

#[async_trait]
impl PodLister for Client {
    async fn list_pods(&self, namespace: &str, label_selector: &str) -> Result<Vec<Pod>, BoxError> {
        let api: Api<Pod> = Api::namespaced(self.clone(), namespace);
        let pods = list_all_paginated(&api, ListParams::default().labels(label_selector)).await?;
        Ok(pods)
    }
}

/// Result of a successful component pod query.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentPod {
    /// A pod with the component label is scheduled on the node
    Found(Box<Pod>),
    /// The query succeeded but no matching pod is scheduled on the node
    NotFound,
}

impl ComponentPod {
    /// Whether a pod was found.
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Borrow the pod, if found.
    #[must_use]
    pub fn pod(&self) -> Option<&Pod> {
        match self {
            Self::Found(pod) => Some(&**pod),
            Self::NotFound => None,
        }
    }

    /// Convert into an `Option`, dropping the tag.
    #[must_use]
    pub fn into_pod(self) -> Option<Pod> {
        match self {
            Self::Found(pod) => Some(*pod),
            Self::NotFound => None,
        }
    }
}

/// Well-known control-plane components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum ControlPlaneComponent {
    /// `kube-apiserver`
    Apiserver,
    /// `kube-scheduler`
    Scheduler,
    /// `kube-dns`
    Dns,
    /// `kube-controller-manager`
    ControllerManager,
}

impl ControlPlaneComponent {
    /// Value of the `component` label for this component.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Apiserver => COMPONENT_APISERVER,
            Self::Scheduler => COMPONENT_SCHEDULER,
            Self::Dns => COMPONENT_DNS,
            Self::ControllerManager => COMPONENT_CONTROLLER_MANAGER,
        }
    }
}

impl fmt::Display for ControlPlaneComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Label selector for pods of `component_name`.
#[must_use]
pub fn component_selector(component_name: &str) -> String {
    format!("{CONTROL_PLANE_COMPONENT}={component_name}")
}

/// Find the `kube-system` pod labelled `component=<component_name>` scheduled on `node`.
///
/// Pods are scanned in list order and the first one whose `spec.nodeName`
/// equals `node` is returned.
///
/// # Errors
///
/// Returns [`E2eError::ListPods`] if the pod list call fails.
pub async fn find_component_pod<L>(
    lister: &L,
    node: &str,
    component_name: &str,
) -> Result<ComponentPod, E2eError>
where
    L: PodLister + ?Sized,
{
    let selector = component_selector(component_name);
    let pods = lister
        .list_pods(KUBE_SYSTEM_NAMESPACE, &selector)
        .await
        .map_err(|source| E2eError::ListPods {
            namespace: KUBE_SYSTEM_NAMESPACE.to_string(),
            selector: selector.clone(),
            source,
        })?;

    let candidates = pods.len();
    let found = pods.into_iter().find(|pod| {
        pod.spec
            .as_ref()
            .and_then(|spec| spec.node_name.as_deref())
            == Some(node)
    });

    match found {
        Some(pod) => {
            debug!(
                component = component_name,
                node,
                pod = %pod.name_any(),
                "Found component pod"
            );
            Ok(ComponentPod::Found(Box::new(pod)))
        }
        None => {
            debug!(
                component = component_name,
                node,
                candidates,
                "No component pod scheduled on node"
            );
            Ok(ComponentPod::NotFound)
        }
    }
}

/// Find the API server pod on `node`.
///
/// # Errors
///
/// See [`find_component_pod`].
pub async fn get_apiserver_pod<L>(lister: &L, node: &str) -> Result<ComponentPod, E2eError>
where
    L: PodLister + ?Sized,
{
    find_component_pod(lister, node, COMPONENT_APISERVER).await
}

/// Find the scheduler pod on `node`.
///
/// # Errors
///
/// See [`find_component_pod`].
pub async fn get_scheduler_pod<L>(lister: &L, node: &str) -> Result<ComponentPod, E2eError>
where
    L: PodLister + ?Sized,
{
    find_component_pod(lister, node, COMPONENT_SCHEDULER).await
}

/// Find the DNS pod on `node`.
///
/// # Errors
///
/// See [`find_component_pod`].
pub async fn get_dns_pod<L>(lister: &L, node: &str) -> Result<ComponentPod, E2eError>
where
    L: PodLister + ?Sized,
{
    find_component_pod(lister, node, COMPONENT_DNS).await
}

/// Find the controller-manager pod on `node`.
///
/// # Errors
///
/// See [`find_component_pod`].
pub async fn get_controller_manager_pod<L>(
    lister: &L,
    node: &str,
) -> Result<ComponentPod, E2eError>
where
    L: PodLister + ?Sized,
{
    find_component_pod(lister, node, COMPONENT_CONTROLLER_MANAGER).await
}

#[cfg(test)]
#[path = "components_tests.rs"]
mod components_tests;
