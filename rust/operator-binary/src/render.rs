//! Renders desired users and certificate DNs for the command line.
use snafu::{ResultExt, Snafu};
use stackable_nifi_pki::{
    crd::{self, ClusterTopology, NifiCluster},
    pki::{self, dn::SubjectError, DesiredUsers, UserCertificate},
};

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Snafu, Debug)]
pub enum Error {
    #[snafu(display("failed to parse NifiCluster manifest"))]
    ParseCluster { source: serde_yaml::Error },

    #[snafu(display("failed to derive topology of NifiCluster"))]
    BuildTopology { source: crd::Error },

    #[snafu(display("failed to serialize NifiUser {name}"))]
    SerializeUser {
        source: serde_yaml::Error,
        name: String,
    },

    #[snafu(display("failed to read certificate"))]
    ReadCertificate { source: SubjectError },

    #[snafu(display("failed to extract distinguished name"))]
    ExtractDn { source: pki::Error },
}

pub fn desired_users(
    cluster_manifest: &str,
    cluster_domain: &str,
    additional_sans: &[String],
) -> Result<DesiredUsers> {
    let nifi: NifiCluster = serde_yaml::from_str(cluster_manifest).context(ParseClusterSnafu)?;
    let topology =
        ClusterTopology::from_cluster(&nifi, cluster_domain).context(BuildTopologySnafu)?;

    tracing::debug!(
        cluster = %topology.name,
        namespace = %topology.namespace,
        nodes = topology.node_ids.len(),
        common_name = %pki::common_name(&topology),
        "Derived cluster topology"
    );

    Ok(DesiredUsers::for_cluster(&topology, additional_sans))
}

/// All desired users of the cluster as one multi document YAML stream.
pub fn render_users(
    cluster_manifest: &str,
    cluster_domain: &str,
    additional_sans: &[String],
) -> Result<String> {
    let users = desired_users(cluster_manifest, cluster_domain, additional_sans)?;

    let mut rendered = String::new();
    for user in users.iter() {
        let name = user.metadata.name.clone().unwrap_or_default();
        tracing::debug!(user = %name, secret = %user.spec.secret_name, "Rendering NifiUser");
        rendered.push_str("---\n");
        rendered.push_str(&serde_yaml::to_string(user).context(SerializeUserSnafu { name })?);
    }
    Ok(rendered)
}

pub fn render_dn(certificate_pem: &[u8]) -> Result<String> {
    let certificate = UserCertificate::from_pem(certificate_pem).context(ReadCertificateSnafu)?;
    pki::distinguished_name(&certificate).context(ExtractDnSnafu)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde::Deserialize;
    use stackable_nifi_pki::crd::{user::NifiUser, DEFAULT_CLUSTER_DOMAIN};

    use super::*;

    const CLUSTER: &str = r#"
    apiVersion: nifi.stackable.tech/v1alpha1
    kind: NifiCluster
    metadata:
      name: simple-nifi
      namespace: default
      uid: 0b1e30b5-9d3f-4bd6-a4f7-9d2d1b4c9e11
    spec:
      headlessServiceEnabled: true
      nodes:
        - id: 0
        - id: 1
    "#;

    fn parse_users(rendered: &str) -> Vec<NifiUser> {
        serde_yaml::Deserializer::from_str(rendered)
            .map(NifiUser::deserialize)
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn test_render_users() {
        let rendered = render_users(CLUSTER, DEFAULT_CLUSTER_DOMAIN, &[]).unwrap();
        let users = parse_users(&rendered);

        let desired = desired_users(CLUSTER, DEFAULT_CLUSTER_DOMAIN, &[]).unwrap();
        assert_eq!(users.len(), 3);
        assert_eq!(users.len(), desired.len());
        for user in &users {
            assert!(desired.contains(user), "{user:?} is not desired");
        }
        assert_eq!(
            users[0].spec.dns_names[0],
            "simple-nifi-0-node.simple-nifi-headless.default.svc.cluster.local"
        );
    }

    #[test]
    fn test_render_users_with_additional_sans() {
        let additional_sans = vec!["nifi.example.com".to_string()];
        let rendered = render_users(CLUSTER, DEFAULT_CLUSTER_DOMAIN, &additional_sans).unwrap();
        let users = parse_users(&rendered);

        assert_eq!(users[0].spec.dns_names.len(), 6);
        assert_eq!(users[0].spec.dns_names[5], "nifi.example.com");
        assert_eq!(users[1].spec.dns_names[5], "nifi.example.com");
        assert!(users[2].spec.dns_names.is_empty());
    }

    #[test]
    fn test_render_users_is_stable() {
        assert_eq!(
            render_users(CLUSTER, DEFAULT_CLUSTER_DOMAIN, &[]).unwrap(),
            render_users(CLUSTER, DEFAULT_CLUSTER_DOMAIN, &[]).unwrap()
        );
    }

    #[rstest]
    #[case::not_yaml("spec: [".to_string(), "ParseCluster")]
    #[case::no_namespace(CLUSTER.replace("namespace: default", ""), "BuildTopology")]
    #[case::no_uid(
        CLUSTER.replace("uid: 0b1e30b5-9d3f-4bd6-a4f7-9d2d1b4c9e11", ""),
        "BuildTopology"
    )]
    #[case::duplicate_node(CLUSTER.replace("- id: 1", "- id: 0"), "BuildTopology")]
    fn test_render_users_rejects_invalid_cluster(#[case] manifest: String, #[case] expected: &str) {
        let err = render_users(&manifest, DEFAULT_CLUSTER_DOMAIN, &[]).unwrap_err();
        let variant = match err {
            Error::ParseCluster { .. } => "ParseCluster",
            Error::BuildTopology { .. } => "BuildTopology",
            _ => "other",
        };
        assert_eq!(variant, expected, "unexpected error {err:?}");
    }

    #[rstest]
    #[case(b"definitely not PEM".as_slice())]
    #[case(b"-----BEGIN CERTIFICATE-----\n".as_slice())]
    fn test_render_dn_rejects_garbage(#[case] pem: &[u8]) {
        let err = render_dn(pem).unwrap_err();
        assert!(matches!(err, Error::ReadCertificate { .. }));
    }
}
