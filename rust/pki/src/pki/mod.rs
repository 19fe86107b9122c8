//! Derives the certificate identities of a NiFi cluster and the [`NifiUser`]s backing them.
//!
//! Every node gets a server certificate user whose SANs cover all the ways the node can be
//! addressed inside Kubernetes, and the cluster gets one controller user that the operator
//! authenticates with. All functions are pure, so reconciling the same cluster twice
//! produces identical users.
use std::collections::BTreeMap;

use snafu::{ensure, ResultExt, Snafu};
use stackable_operator::k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use crate::crd::{
    user::{NifiUser, NifiUserSpec},
    ClusterTopology, APP_NAME,
};

pub mod dn;
pub mod equality;
pub mod templates;

pub use dn::{CertificateSubject, SubjectAttribute, SubjectAttributeKind, UserCertificate};
pub use equality::{nifi_user_slice_contains, user_equivalent};

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Snafu, Debug)]
pub enum Error {
    #[snafu(display("node id {node_id} is not part of NifiCluster {cluster_name}"))]
    InvalidNodeId { node_id: u32, cluster_name: String },

    #[snafu(display("failed to read certificate subject"))]
    MalformedSubject { source: dn::SubjectError },
}

/// The FQDN of the service through which the cluster nodes are reachable.
pub fn common_name(topology: &ClusterTopology) -> String {
    format!(
        "{service_name}.{namespace}.svc.{cluster_domain}",
        service_name = templates::service_name(&topology.name, topology.headless_service_enabled),
        namespace = topology.namespace,
        cluster_domain = topology.cluster_domain,
    )
}

/// DNS names of a node, most qualified first, ending with the bare node name.
pub fn internal_dns_names(topology: &ClusterTopology, node_id: u32) -> Result<Vec<String>> {
    ensure!(
        topology.node_ids.contains(&node_id),
        InvalidNodeIdSnafu {
            node_id,
            cluster_name: &topology.name,
        }
    );
    Ok(node_dns_names(topology, node_id))
}

fn node_dns_names(topology: &ClusterTopology, node_id: u32) -> Vec<String> {
    let node_name = templates::node_name(&topology.name, node_id);
    let service_name = templates::service_name(&topology.name, topology.headless_service_enabled);
    let namespace = &topology.namespace;

    vec![
        format!(
            "{node_name}.{service_name}.{namespace}.svc.{cluster_domain}",
            cluster_domain = topology.cluster_domain
        ),
        format!("{node_name}.{service_name}.{namespace}.svc"),
        format!("{node_name}.{service_name}.{namespace}"),
        format!("{node_name}.{service_name}"),
        node_name,
    ]
}

pub fn labels_for_nifi_pki(cluster_name: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("app".to_string(), APP_NAME.to_string()),
        (
            templates::ISSUER_LABEL.to_string(),
            templates::node_issuer_name(cluster_name),
        ),
    ])
}

/// The canonical DN of the certificate subject, see [`dn::distinguished_name`].
pub fn distinguished_name(subject: &impl CertificateSubject) -> Result<String> {
    dn::distinguished_name(subject).context(MalformedSubjectSnafu)
}

/// One server certificate user per node, in ascending node id order.
///
/// `additional_sans` (for example externally exposed hostnames) are appended to the SANs of every
/// node after its internal DNS names. Names that a node already carries are not repeated.
pub fn node_users_for_cluster(
    topology: &ClusterTopology,
    additional_sans: &[String],
) -> Vec<NifiUser> {
    topology
        .node_ids
        .iter()
        .map(|&node_id| NifiUser {
            metadata: user_metadata(topology, templates::node_name(&topology.name, node_id)),
            spec: NifiUserSpec {
                secret_name: templates::node_server_cert_secret_name(&topology.name, node_id),
                cluster_ref: topology.cluster_ref(),
                dns_names: with_additional_sans(node_dns_names(topology, node_id), additional_sans),
                include_jks: true,
            },
            status: None,
        })
        .collect()
}

pub fn controller_user_for_cluster(topology: &ClusterTopology) -> NifiUser {
    let controller_name = templates::controller_name(&topology.name);
    NifiUser {
        metadata: user_metadata(
            topology,
            templates::controller_fqdn(
                &controller_name,
                &topology.namespace,
                &topology.cluster_domain,
            ),
        ),
        spec: NifiUserSpec {
            secret_name: controller_name,
            cluster_ref: topology.cluster_ref(),
            dns_names: Vec::new(),
            include_jks: true,
        },
        status: None,
    }
}

/// Every user that has to exist for the cluster: the node users followed by the controller user.
pub fn desired_users(topology: &ClusterTopology, additional_sans: &[String]) -> Vec<NifiUser> {
    let mut users = node_users_for_cluster(topology, additional_sans);
    users.push(controller_user_for_cluster(topology));
    users
}

fn with_additional_sans(mut dns_names: Vec<String>, additional_sans: &[String]) -> Vec<String> {
    for san in additional_sans {
        if !dns_names.contains(san) {
            dns_names.push(san.clone());
        }
    }
    dns_names
}

fn user_metadata(topology: &ClusterTopology, name: String) -> ObjectMeta {
    ObjectMeta {
        name: Some(name),
        namespace: Some(topology.namespace.clone()),
        labels: Some(labels_for_nifi_pki(&topology.name)),
        owner_references: Some(vec![topology.owner_reference.clone()]),
        ..ObjectMeta::default()
    }
}

/// The desired users of a cluster keyed by object name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DesiredUsers {
    users: BTreeMap<String, NifiUser>,
}

impl DesiredUsers {
    pub fn for_cluster(topology: &ClusterTopology, additional_sans: &[String]) -> Self {
        Self {
            users: desired_users(topology, additional_sans)
                .into_iter()
                .filter_map(|user| Some((user.metadata.name.clone()?, user)))
                .collect(),
        }
    }

    /// Whether `user` is one of the desired users, ignoring its status.
    pub fn contains(&self, user: &NifiUser) -> bool {
        user.metadata
            .name
            .as_ref()
            .and_then(|name| self.users.get(name))
            .is_some_and(|desired| user_equivalent(desired, user))
    }

    pub fn get(&self, name: &str) -> Option<&NifiUser> {
        self.users.get(name)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NifiUser> {
        self.users.values()
    }
}
