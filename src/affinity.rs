// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Pod anti-affinity configuration for database clusters under test.
//!
//! The e2e suite deploys clusters with a values blob that spreads the pods of
//! each workload kind across racks. The blob is one YAML root key per kind
//! (`pd`, `tikv`, `tidb`), each holding a single preferred anti-affinity term:
//!
//! ```yaml
//! pd:
//!   affinity:
//!     podAntiAffinity:
//!       preferredDuringSchedulingIgnoredDuringExecution:
//!       - weight: 50
//!         podAffinityTerm:
//!           labelSelector:
//!             matchLabels:
//!               app.kubernetes.io/instance: mycluster
//!               app.kubernetes.io/component: pd
//!           topologyKey: "rack"
//!           namespaces:
//!           - ns1
//! ```
//!
//! The text comes from `templates/affinity.yaml.tmpl`. [`pod_anti_affinity`]
//! builds the same rule as typed `k8s-openapi` structs, and
//! [`parse_affinity_config`] reads a rendered blob back.

use crate::constants::{
    AFFINITY_TOPOLOGY_KEY, DEFAULT_ANTI_AFFINITY_WEIGHT, MAX_AFFINITY_WEIGHT, MIN_AFFINITY_WEIGHT,
};
use crate::errors::E2eError;
use crate::labels::{K8S_COMPONENT, K8S_INSTANCE};
use crate::notifier::Notifier;
use k8s_openapi::api::core::v1::{
    Affinity, PodAffinityTerm, PodAntiAffinity, WeightedPodAffinityTerm,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

const AFFINITY_TEMPLATE: &str = include_str!("../templates/affinity.yaml.tmpl");
const AFFINITY_TEMPLATE_NAME: &str = "affinity.yaml.tmpl";

/// Maximum length of a DNS-1123 subdomain (object names)
const MAX_SUBDOMAIN_LENGTH: usize = 253;

/// Maximum length of a DNS-1123 label (namespace names)
const MAX_LABEL_LENGTH: usize = 63;

/// DNS-1123 naming rule a value must follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NameRule {
    /// Dot-separated labels, up to 253 characters
    Subdomain,
    /// A single label without dots, up to 63 characters
    Label,
}

impl NameRule {
    fn max_length(self) -> usize {
        match self {
            Self::Subdomain => MAX_SUBDOMAIN_LENGTH,
            Self::Label => MAX_LABEL_LENGTH,
        }
    }

    fn allows(self, c: char) -> bool {
        c.is_ascii_lowercase()
            || c.is_ascii_digit()
            || c == '-'
            || (c == '.' && self == Self::Subdomain)
    }
}

/// Workload kinds of a database cluster, in render order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentKind {
    /// Placement driver (primary placement)
    Pd,
    /// Storage nodes
    Tikv,
    /// Stateless compute nodes
    Tidb,
}

impl ComponentKind {
    /// Every kind, in the order the affinity config lists them.
    pub const ALL: [ComponentKind; 3] = [Self::Pd, Self::Tikv, Self::Tidb];

    /// Value of the `app.kubernetes.io/component` label and the config root key.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pd => "pd",
            Self::Tikv => "tikv",
            Self::Tidb => "tidb",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs of one anti-affinity block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffinityParameters {
    /// Name of the database cluster (`app.kubernetes.io/instance`)
    pub cluster_name: String,
    /// Workload kind the rule applies to
    pub kind: ComponentKind,
    /// Preference weight, 1-100
    pub weight: i32,
    /// Namespace the cluster's pods run in
    pub namespace: String,
}

impl AffinityParameters {
    /// Parameters with the default weight.
    pub fn new(
        cluster_name: impl Into<String>,
        kind: ComponentKind,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            cluster_name: cluster_name.into(),
            kind,
            weight: DEFAULT_ANTI_AFFINITY_WEIGHT,
            namespace: namespace.into(),
        }
    }

    /// Replace the preference weight.
    #[must_use]
    pub fn with_weight(mut self, weight: i32) -> Self {
        self.weight = weight;
        self
    }

    /// Check that the parameters render into valid YAML that Kubernetes accepts.
    ///
    /// # Errors
    ///
    /// Returns [`E2eError::InvalidAffinityParameters`] for an out-of-range
    /// weight, a cluster name that is not a DNS-1123 subdomain, or a namespace
    /// that is not a DNS-1123 label.
    pub fn validate(&self) -> Result<(), E2eError> {
        if !(MIN_AFFINITY_WEIGHT..=MAX_AFFINITY_WEIGHT).contains(&self.weight) {
            return Err(E2eError::InvalidAffinityParameters {
                reason: format!(
                    "weight {} is outside {MIN_AFFINITY_WEIGHT}..={MAX_AFFINITY_WEIGHT}",
                    self.weight
                ),
            });
        }
        validate_name("cluster name", &self.cluster_name, NameRule::Subdomain)?;
        validate_name("namespace", &self.namespace, NameRule::Label)
    }
}

/// Names are interpolated as plain YAML scalars, so only DNS-1123 names are allowed.
fn validate_name(field: &str, value: &str, rule: NameRule) -> Result<(), E2eError> {
    let invalid = |reason: String| E2eError::InvalidAffinityParameters { reason };

    if value.is_empty() {
        return Err(invalid(format!("{field} must not be empty")));
    }
    let max_length = rule.max_length();
    if value.len() > max_length {
        return Err(invalid(format!(
            "{field} '{}' is longer than {max_length} characters",
            value.escape_debug()
        )));
    }
    if let Some(c) = value.chars().find(|c| !rule.allows(*c)) {
        return Err(invalid(format!(
            "{field} '{}' contains invalid character {c:?}",
            value.escape_debug()
        )));
    }
    let starts_ok = value.starts_with(|c: char| c.is_ascii_alphanumeric());
    let ends_ok = value.ends_with(|c: char| c.is_ascii_alphanumeric());
    if !starts_ok || !ends_ok {
        return Err(invalid(format!(
            "{field} '{}' must start and end with an alphanumeric character",
            value.escape_debug()
        )));
    }
    Ok(())
}

/// Substitute `{{KEY}}` placeholders and reject any that remain.
pub(crate) fn render_template(
    name: &str,
    template: &str,
    values: &[(&str, &str)],
) -> Result<String, E2eError> {
    let rendered = values.iter().fold(template.to_string(), |acc, (key, value)| {
        acc.replace(&format!("{{{{{key}}}}}"), value)
    });

    if let Some(start) = rendered.find("{{") {
        let placeholder = rendered[start..]
            .find("}}")
            .map_or(&rendered[start..], |end| &rendered[start..start + end + 2]);
        return Err(E2eError::TemplateRender {
            template: name.to_string(),
            reason: format!("unresolved placeholder {placeholder}"),
        });
    }

    Ok(rendered)
}

/// Render one anti-affinity block.
///
/// # Errors
///
/// - [`E2eError::InvalidAffinityParameters`] if `params` fail validation
/// - [`E2eError::TemplateRender`] if the template has placeholders left over
pub fn render_affinity(params: &AffinityParameters) -> Result<String, E2eError> {
    params.validate()?;

    let weight = params.weight.to_string();
    render_template(
        AFFINITY_TEMPLATE_NAME,
        AFFINITY_TEMPLATE,
        &[
            ("KIND", params.kind.as_str()),
            ("WEIGHT", &weight),
            ("CLUSTER_NAME", &params.cluster_name),
            ("NAMESPACE", &params.namespace),
            ("TOPOLOGY_KEY", AFFINITY_TOPOLOGY_KEY),
        ],
    )
}

/// Build the anti-affinity config for every workload kind of `cluster_name`.
///
/// Blocks for `pd`, `tikv` and `tidb` are rendered with the default weight and
/// concatenated in that order with no separator. Identical inputs always
/// produce byte-identical output.
///
/// # Example
///
/// ```rust
/// use operator_e2e::affinity::build_affinity_config;
///
/// let config = build_affinity_config("mycluster", "ns1").unwrap();
/// assert!(config.starts_with("pd:\n"));
/// assert!(config.contains("app.kubernetes.io/instance: mycluster"));
/// ```
///
/// # Errors
///
/// See [`render_affinity`].
pub fn build_affinity_config(cluster_name: &str, namespace: &str) -> Result<String, E2eError> {
    let config = ComponentKind::ALL
        .iter()
        .map(|kind| render_affinity(&AffinityParameters::new(cluster_name, *kind, namespace)))
        .collect::<Result<String, _>>()?;

    debug!(
        cluster = cluster_name,
        namespace,
        bytes = config.len(),
        "Rendered anti-affinity config"
    );
    Ok(config)
}

/// Build the config and hand any failure to `notifier`.
///
/// With [`crate::notifier::PanicNotifier`] a failure never returns.
///
/// # Errors
///
/// Returns the already-reported error if the notifier returns.
pub fn build_affinity_config_or_die(
    cluster_name: &str,
    namespace: &str,
    notifier: &dyn Notifier,
) -> Result<String, E2eError> {
    build_affinity_config(cluster_name, namespace).inspect_err(|e| notifier.notify(e))
}

/// The anti-affinity rule of one block as typed Kubernetes structs.
#[must_use]
pub fn pod_anti_affinity(params: &AffinityParameters) -> Affinity {
    let match_labels = BTreeMap::from([
        (K8S_INSTANCE.to_string(), params.cluster_name.clone()),
        (K8S_COMPONENT.to_string(), params.kind.as_str().to_string()),
    ]);

    Affinity {
        pod_anti_affinity: Some(PodAntiAffinity {
            preferred_during_scheduling_ignored_during_execution: Some(vec![
                WeightedPodAffinityTerm {
                    weight: params.weight,
                    pod_affinity_term: PodAffinityTerm {
                        label_selector: Some(LabelSelector {
                            match_labels: Some(match_labels),
                            ..Default::default()
                        }),
                        namespaces: Some(vec![params.namespace.clone()]),
                        topology_key: AFFINITY_TOPOLOGY_KEY.to_string(),
                        ..Default::default()
                    },
                },
            ]),
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[derive(Deserialize)]
struct WorkloadAffinity {
    affinity: Affinity,
}

/// Parse a rendered config back into one [`Affinity`] per root key.
///
/// # Errors
///
/// Returns [`E2eError::AffinityParse`] if `config` is not a map of
/// `<kind>: { affinity: ... }` entries.
pub fn parse_affinity_config(config: &str) -> Result<BTreeMap<String, Affinity>, E2eError> {
    let parsed: BTreeMap<String, WorkloadAffinity> = serde_yaml::from_str(config)?;
    Ok(parsed
        .into_iter()
        .map(|(kind, workload)| (kind, workload.affinity))
        .collect())
}

#[cfg(test)]
#[path = "affinity_tests.rs"]
mod affinity_tests;
