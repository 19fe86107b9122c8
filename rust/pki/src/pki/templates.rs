//! Naming templates for every identity derived from a NiFi cluster.
//!
//! Node derived names always embed the node id next to the cluster name, which keeps them
//! unique within a cluster. Controller names carry a `-controller` suffix that no node name can end with.

pub const HEADLESS_SERVICE_SUFFIX: &str = "headless";
pub const ALL_NODE_SERVICE_SUFFIX: &str = "all-node";

pub const ISSUER_LABEL: &str = "nifi_issuer";

/// Bare name of a node, also used as the name of the node's `NifiUser`.
pub fn node_name(cluster_name: &str, node_id: u32) -> String {
    format!("{cluster_name}-{node_id}-node")
}

pub fn node_server_cert_secret_name(cluster_name: &str, node_id: u32) -> String {
    format!("{cluster_name}-{node_id}-server-certificate")
}

pub fn node_issuer_name(cluster_name: &str) -> String {
    format!("{cluster_name}-issuer")
}

pub fn controller_name(cluster_name: &str) -> String {
    format!("{cluster_name}-controller")
}

pub fn controller_fqdn(controller_name: &str, namespace: &str, cluster_domain: &str) -> String {
    format!("{controller_name}.{namespace}.mgt.{cluster_domain}")
}

pub fn service_name(cluster_name: &str, headless_service_enabled: bool) -> String {
    let suffix = if headless_service_enabled {
        HEADLESS_SERVICE_SUFFIX
    } else {
        ALL_NODE_SERVICE_SUFFIX
    };
    format!("{cluster_name}-{suffix}")
}
