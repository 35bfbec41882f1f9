// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared fixtures for unit tests that talk to a fake Kubernetes API.

use crate::constants::ENV_RANDOM_SEED;
use k8s_openapi::api::core::v1::Pod;
use serde_json::{json, Value};
use std::sync::{Mutex, MutexGuard};
use wiremock::MockServer;

/// Serializes tests that touch `E2E_RANDOM_SEED`.
static SEED_ENV_LOCK: Mutex<()> = Mutex::new(());

/// Holds `E2E_RANDOM_SEED` at a fixed value and removes it on drop.
pub struct SeedEnv {
    _lock: MutexGuard<'static, ()>,
}

impl SeedEnv {
    /// Set `E2E_RANDOM_SEED` to `value` until the guard is dropped.
    pub fn set(value: &str) -> Self {
        let lock = SEED_ENV_LOCK
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        std::env::set_var(ENV_RANDOM_SEED, value);
        Self { _lock: lock }
    }
}

impl Drop for SeedEnv {
    fn drop(&mut self) {
        std::env::remove_var(ENV_RANDOM_SEED);
    }
}

/// Build a `kube::Client` that sends every request to `server`.
pub fn mock_client(server: &MockServer) -> kube::Client {
    let uri: http::Uri = server.uri().parse().expect("wiremock uri is valid");
    let config = kube::Config::new(uri);
    kube::Client::try_from(config).expect("client builds from plain http config")
}

/// JSON for a `kube-system` pod carrying a `component` label.
pub fn pod_json(name: &str, node: &str, component: &str) -> Value {
    json!({
        "apiVersion": "v1",
        "kind": "Pod",
        "metadata": {
            "name": name,
            "namespace": "kube-system",
            "labels": { "component": component }
        },
        "spec": {
            "nodeName": node,
            "containers": []
        }
    })
}

/// Typed variant of [`pod_json`].
pub fn pod(name: &str, node: &str, component: &str) -> Pod {
    serde_json::from_value(pod_json(name, node, component)).expect("pod fixture is valid")
}

/// JSON for a `PodList` page.
pub fn pod_list_json(items: Vec<Value>, continue_token: Option<&str>) -> Value {
    let mut metadata = json!({ "resourceVersion": "1" });
    if let Some(token) = continue_token {
        metadata["continue"] = json!(token);
    }
    json!({
        "apiVersion": "v1",
        "kind": "PodList",
        "metadata": metadata,
        "items": items
    })
}
