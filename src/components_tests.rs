// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `components.rs`

#[cfg(test)]
mod tests {
    use super::super::{
        component_selector, find_component_pod, get_apiserver_pod, get_controller_manager_pod,
        get_dns_pod, get_scheduler_pod, ComponentPod, ControlPlaneComponent, PodLister,
    };
    use crate::errors::{BoxError, E2eError};
    use crate::test_support::{mock_client, pod, pod_json, pod_list_json};
    use async_trait::async_trait;
    use k8s_openapi::api::core::v1::Pod;
    use kube::ResourceExt;
    use std::sync::Mutex;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// In-memory lister that filters on the `component` label and records queries
    struct FakeLister {
        pods: Vec<Pod>,
        queries: Mutex<Vec<(String, String)>>,
    }

    impl FakeLister {
        fn new(pods: Vec<Pod>) -> Self {
            Self {
                pods,
                queries: Mutex::new(Vec::new()),
            }
        }

        fn queries(&self) -> Vec<(String, String)> {
            self.queries.lock().expect("lock poisoned").clone()
        }
    }

    #[async_trait]
    impl PodLister for FakeLister {
        async fn list_pods(
            &self,
            namespace: &str,
            label_selector: &str,
        ) -> Result<Vec<Pod>, BoxError> {
            self.queries
                .lock()
                .expect("lock poisoned")
                .push((namespace.to_string(), label_selector.to_string()));

            let (key, value) = label_selector
                .split_once('=')
                .ok_or("fake lister only supports equality selectors")?;
            Ok(self
                .pods
                .iter()
                .filter(|p| p.labels().get(key).map(String::as_str) == Some(value))
                .cloned()
                .collect())
        }
    }

    /// Lister whose every call fails
    struct FailingLister;

    #[async_trait]
    impl PodLister for FailingLister {
        async fn list_pods(&self, _namespace: &str, _selector: &str) -> Result<Vec<Pod>, BoxError> {
            Err("connection refused".into())
        }
    }

    fn dns_pods() -> Vec<Pod> {
        vec![
            pod("kube-dns-a", "a", "kube-dns"),
            pod("kube-dns-b", "b", "kube-dns"),
            pod("kube-dns-c", "c", "kube-dns"),
        ]
    }

    #[test]
    fn test_component_selector() {
        assert_eq!(component_selector("kube-dns"), "component=kube-dns");
    }

    #[test]
    fn test_control_plane_labels() {
        assert_eq!(ControlPlaneComponent::Apiserver.label(), "kube-apiserver");
        assert_eq!(ControlPlaneComponent::Scheduler.label(), "kube-scheduler");
        assert_eq!(ControlPlaneComponent::Dns.label(), "kube-dns");
        assert_eq!(
            ControlPlaneComponent::ControllerManager.to_string(),
            "kube-controller-manager"
        );
    }

    #[tokio::test]
    async fn test_finds_pod_on_node() {
        let lister = FakeLister::new(dns_pods());

        let result = find_component_pod(&lister, "b", "kube-dns")
            .await
            .expect("query should succeed");

        let found = result.into_pod().expect("pod on node b should be found");
        assert_eq!(found.name_any(), "kube-dns-b");
        assert_eq!(
            lister.queries(),
            vec![("kube-system".to_string(), "component=kube-dns".to_string())]
        );
    }

    #[tokio::test]
    async fn test_missing_node_is_not_found_not_error() {
        let lister = FakeLister::new(dns_pods());

        let result = find_component_pod(&lister, "z", "kube-dns")
            .await
            .expect("not found is not an error");

        assert_eq!(result, ComponentPod::NotFound);
        assert!(!result.is_found());
        assert!(result.pod().is_none());
    }

    #[tokio::test]
    async fn test_first_match_wins() {
        let lister = FakeLister::new(vec![
            pod("sched-1", "a", "kube-scheduler"),
            pod("sched-2", "a", "kube-scheduler"),
        ]);

        let result = get_scheduler_pod(&lister, "a").await.expect("ok");
        assert_eq!(result.pod().map(ResourceExt::name_any).as_deref(), Some("sched-1"));
    }

    #[tokio::test]
    async fn test_pod_without_node_is_skipped() {
        let mut pending = pod("apiserver-pending", "a", "kube-apiserver");
        if let Some(spec) = pending.spec.as_mut() {
            spec.node_name = None;
        }
        let lister = FakeLister::new(vec![pending, pod("apiserver-a", "a", "kube-apiserver")]);

        let result = get_apiserver_pod(&lister, "a").await.expect("ok");
        assert_eq!(
            result.pod().map(ResourceExt::name_any).as_deref(),
            Some("apiserver-a")
        );
    }

    #[tokio::test]
    async fn test_wrappers_bind_component_labels() {
        let lister = FakeLister::new(Vec::new());

        get_apiserver_pod(&lister, "n").await.expect("ok");
        get_scheduler_pod(&lister, "n").await.expect("ok");
        get_dns_pod(&lister, "n").await.expect("ok");
        get_controller_manager_pod(&lister, "n").await.expect("ok");

        let selectors: Vec<String> = lister.queries().into_iter().map(|(_, s)| s).collect();
        assert_eq!(
            selectors,
            vec![
                "component=kube-apiserver",
                "component=kube-scheduler",
                "component=kube-dns",
                "component=kube-controller-manager",
            ]
        );
    }

    #[tokio::test]
    async fn test_transport_failure_is_an_error() {
        let result = get_dns_pod(&FailingLister, "a").await;

        match result {
            Err(E2eError::ListPods {
                namespace,
                selector,
                source,
            }) => {
                assert_eq!(namespace, "kube-system");
                assert_eq!(selector, "component=kube-dns");
                assert_eq!(source.to_string(), "connection refused");
            }
            other => panic!("expected ListPods error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_works_through_trait_object() {
        let lister: Box<dyn PodLister> = Box::new(FakeLister::new(dns_pods()));
        let result = get_dns_pod(lister.as_ref(), "c").await.expect("ok");
        assert!(result.is_found());
    }

    #[tokio::test]
    async fn test_kube_client_sends_component_selector() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/namespaces/kube-system/pods"))
            .and(query_param("labelSelector", "component=kube-dns"))
            .respond_with(ResponseTemplate::new(200).set_body_json(pod_list_json(
                vec![
                    pod_json("kube-dns-a", "a", "kube-dns"),
                    pod_json("kube-dns-b", "b", "kube-dns"),
                ],
                None,
            )))
            .expect(1)
            .mount(&server)
            .await;

        let client = mock_client(&server);
        let result = get_dns_pod(&client, "b").await.expect("query should succeed");

        assert_eq!(
            result.pod().map(ResourceExt::name_any).as_deref(),
            Some("kube-dns-b")
        );
    }

    #[tokio::test]
    async fn test_kube_client_api_error_maps_to_list_pods() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/namespaces/kube-system/pods"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "apiVersion": "v1",
                "kind": "Status",
                "status": "Failure",
                "message": "etcdserver: request timed out",
                "reason": "InternalError",
                "code": 500
            })))
            .mount(&server)
            .await;

        let client = mock_client(&server);
        let result = get_scheduler_pod(&client, "a").await;
        assert!(matches!(result, Err(E2eError::ListPods { .. })));
    }
}
