// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for e2e error types.

#[cfg(test)]
mod tests {
    use crate::errors::*;
    use std::error::Error as _;

    #[test]
    fn test_list_pods_error() {
        let error = E2eError::ListPods {
            namespace: "kube-system".to_string(),
            selector: "component=kube-dns".to_string(),
            source: "connection refused".into(),
        };

        assert_eq!(
            error.to_string(),
            "Failed to list pods in namespace 'kube-system' with selector 'component=kube-dns': connection refused"
        );
        assert!(error.source().is_some());
        assert!(!error.is_fatal());
    }

    #[test]
    fn test_empty_node_group_error() {
        let error = E2eError::EmptyNodeGroup {
            physical_node: "172.16.4.39".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "Cannot select a node: node group '172.16.4.39' has no nodes"
        );
    }

    #[test]
    fn test_keep_failed_error_keeps_source() {
        let error = E2eError::KeepFailed {
            iteration: 3,
            source: anyhow::anyhow!("tikv store is down"),
        };

        assert_eq!(
            error.to_string(),
            "Operation failed on iteration 3 of the keep loop: tikv store is down"
        );
        assert_eq!(
            error.source().map(ToString::to_string).as_deref(),
            Some("tikv store is down")
        );
        assert!(error.is_fatal());
    }

    #[test]
    fn test_template_render_is_fatal() {
        let error = E2eError::TemplateRender {
            template: "affinity".to_string(),
            reason: "unresolved placeholder {{WEIGHT}}".to_string(),
        };

        assert!(error.is_fatal());
        assert_eq!(
            error.to_string(),
            "Failed to render template 'affinity': unresolved placeholder {{WEIGHT}}"
        );
    }

    #[test]
    fn test_precondition_errors_are_not_fatal() {
        assert!(!E2eError::NoNodeGroups.is_fatal());
        assert!(!E2eError::InvalidAffinityParameters {
            reason: "empty".to_string()
        }
        .is_fatal());
    }
}
