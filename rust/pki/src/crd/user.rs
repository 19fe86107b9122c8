use serde::{Deserialize, Serialize};
use stackable_operator::{
    kube::CustomResource,
    schemars::{self, JsonSchema},
};

/// A principal of a NiFi cluster (a node or the controller) that needs a signed certificate.
///
/// The certificate, key and optional Java KeyStore end up in the Secret named by `secretName`.
#[derive(Clone, CustomResource, Debug, Deserialize, JsonSchema, PartialEq, Serialize)]
#[kube(
    group = "nifi.stackable.tech",
    version = "v1alpha1",
    kind = "NifiUser",
    status = "NifiUserStatus",
    derive = "PartialEq",
    namespaced,
    crates(
        kube_core = "stackable_operator::kube::core",
        k8s_openapi = "stackable_operator::k8s_openapi",
        schemars = "stackable_operator::schemars"
    )
)]
#[serde(rename_all = "camelCase")]
pub struct NifiUserSpec {
    pub secret_name: String,

    pub cluster_ref: ClusterReference,

    /// Subject alternative names of the certificate, most qualified first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dns_names: Vec<String>,

    /// Also provide the certificate as Java KeyStore in the Secret.
    #[serde(default, rename = "includeJKS")]
    pub include_jks: bool,
}

#[derive(
    Clone, Debug, Default, Deserialize, Eq, Hash, JsonSchema, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(rename_all = "camelCase")]
pub struct ClusterReference {
    pub name: String,
    pub namespace: String,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NifiUserStatus {
    pub state: UserState,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub acls: Vec<String>,
}

/// Lifecycle of the certificate backing a [`NifiUser`], maintained by the issuer integration.
#[derive(
    strum::Display, Clone, Copy, Debug, Default, Deserialize, Eq, JsonSchema, PartialEq, Serialize,
)]
pub enum UserState {
    #[default]
    Pending,
    Created,
    Ready,
    Error,
}
