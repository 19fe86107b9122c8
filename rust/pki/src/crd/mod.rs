pub mod user;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use snafu::{ensure, OptionExt, Snafu};
use stackable_operator::{
    k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference,
    kube::{CustomResource, Resource, ResourceExt},
    schemars::{self, JsonSchema},
};

use crate::crd::user::ClusterReference;

pub const APP_NAME: &str = "nifi";

pub const DEFAULT_CLUSTER_DOMAIN: &str = "cluster.local";

#[derive(Snafu, Debug)]
pub enum Error {
    #[snafu(display("object defines no name"))]
    ObjectHasNoName,

    #[snafu(display("object defines no namespace"))]
    ObjectHasNoNamespace,

    #[snafu(display("object is missing metadata to build owner reference"))]
    ObjectMissingMetadataForOwnerRef,

    #[snafu(display("node id {node_id} is defined more than once"))]
    DuplicateNodeId { node_id: u32 },
}

/// A NiFi cluster whose members need certificate identities.
///
/// Only the parts of the cluster shape that feed into node and controller identities are modelled here.
#[derive(Clone, CustomResource, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
#[kube(
    group = "nifi.stackable.tech",
    version = "v1alpha1",
    kind = "NifiCluster",
    shortname = "nifi",
    namespaced,
    crates(
        kube_core = "stackable_operator::kube::core",
        k8s_openapi = "stackable_operator::k8s_openapi",
        schemars = "stackable_operator::schemars"
    )
)]
#[serde(rename_all = "camelCase")]
pub struct NifiClusterSpec {
    /// The nodes of the cluster. Every node id must be unique within the cluster.
    #[serde(default)]
    pub nodes: Vec<NifiNode>,

    /// If `true`, every node is addressed through the `<cluster>-headless` service,
    /// otherwise through the load balanced `<cluster>-all-node` service.
    #[serde(default)]
    pub headless_service_enabled: bool,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NifiNode {
    pub id: u32,
}

/// Snapshot of everything needed to derive the identities of a [`NifiCluster`].
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterTopology {
    pub name: String,
    pub namespace: String,
    pub node_ids: BTreeSet<u32>,
    pub headless_service_enabled: bool,
    pub cluster_domain: String,
    /// Controller reference pointing at the cluster, attached to every generated user.
    pub owner_reference: OwnerReference,
}

impl ClusterTopology {
    pub fn from_cluster(nifi: &NifiCluster, cluster_domain: &str) -> Result<Self, Error> {
        let name = nifi.metadata.name.clone().context(ObjectHasNoNameSnafu)?;
        let namespace = nifi.namespace().context(ObjectHasNoNamespaceSnafu)?;
        let owner_reference = nifi
            .controller_owner_ref(&())
            .context(ObjectMissingMetadataForOwnerRefSnafu)?;

        let mut node_ids = BTreeSet::new();
        for node in &nifi.spec.nodes {
            ensure!(
                node_ids.insert(node.id),
                DuplicateNodeIdSnafu { node_id: node.id }
            );
        }

        Ok(Self {
            name,
            namespace,
            node_ids,
            headless_service_enabled: nifi.spec.headless_service_enabled,
            cluster_domain: cluster_domain.to_string(),
            owner_reference,
        })
    }

    pub fn cluster_ref(&self) -> ClusterReference {
        ClusterReference {
            name: self.name.clone(),
            namespace: self.namespace.clone(),
        }
    }
}
