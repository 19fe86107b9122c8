//! Structural comparison of desired and actual [`NifiUser`]s.
//!
//! Only the fields this crate sets are compared, so fields filled in by the API server
//! (uid, resourceVersion, managedFields, ...) and the status never cause a mismatch.
use std::collections::BTreeMap;

use stackable_operator::k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use crate::crd::user::NifiUser;

pub fn user_equivalent(left: &NifiUser, right: &NifiUser) -> bool {
    metadata_equivalent(&left.metadata, &right.metadata) && left.spec == right.spec
}

/// Whether a user equivalent to `candidate` is part of `users`.
pub fn nifi_user_slice_contains(users: &[NifiUser], candidate: &NifiUser) -> bool {
    users.iter().any(|user| user_equivalent(user, candidate))
}

fn metadata_equivalent(left: &ObjectMeta, right: &ObjectMeta) -> bool {
    let empty = BTreeMap::new();
    left.name == right.name
        && left.namespace == right.namespace
        && left.labels.as_ref().unwrap_or(&empty) == right.labels.as_ref().unwrap_or(&empty)
        && left.owner_references.as_deref().unwrap_or_default()
            == right.owner_references.as_deref().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        crd::user::{NifiUserStatus, UserState},
        pki::{controller_user_for_cluster, node_users_for_cluster, tests::test_topology},
    };

    #[test]
    fn test_status_is_ignored() {
        let user = controller_user_for_cluster(&test_topology(true));
        let mut actual = user.clone();
        actual.status = Some(NifiUserStatus {
            state: UserState::Error,
            acls: vec![],
        });
        assert!(user_equivalent(&user, &actual));
    }

    #[test]
    fn test_server_populated_metadata_is_ignored() {
        let user = controller_user_for_cluster(&test_topology(true));
        let mut actual = user.clone();
        actual.metadata.uid = Some("8f1f0a36-2d8e-4a6f-9a3c-55a1b2c3d4e5".to_string());
        actual.metadata.resource_version = Some("4711".to_string());
        actual.metadata.generation = Some(1);
        assert!(user_equivalent(&user, &actual));
    }

    #[test]
    fn test_missing_labels_equal_empty_labels() {
        let mut left = controller_user_for_cluster(&test_topology(true));
        left.metadata.labels = None;
        let mut right = left.clone();
        right.metadata.labels = Some(BTreeMap::new());
        assert!(user_equivalent(&left, &right));
    }

    #[test]
    fn test_differences_are_detected() {
        let user = controller_user_for_cluster(&test_topology(true));

        let mut relabeled = user.clone();
        relabeled
            .metadata
            .labels
            .get_or_insert_with(BTreeMap::new)
            .insert("app".to_string(), "kafka".to_string());
        assert!(!user_equivalent(&user, &relabeled));

        let mut orphaned = user.clone();
        orphaned.metadata.owner_references = None;
        assert!(!user_equivalent(&user, &orphaned));

        let mut other_secret = user.clone();
        other_secret.spec.secret_name = "other".to_string();
        assert!(!user_equivalent(&user, &other_secret));

        let mut reordered = node_users_for_cluster(&test_topology(true), &[]).remove(0);
        let original = reordered.clone();
        reordered.spec.dns_names.reverse();
        assert!(!user_equivalent(&original, &reordered));
    }

    #[test]
    fn test_slice_contains() {
        let users = node_users_for_cluster(&test_topology(true), &[]);
        let controller = controller_user_for_cluster(&test_topology(true));

        assert!(nifi_user_slice_contains(&users, &users[2]));
        assert!(!nifi_user_slice_contains(&users, &controller));
        assert!(!nifi_user_slice_contains(&[], &controller));

        let headless_off = node_users_for_cluster(&test_topology(false), &[]);
        assert!(!nifi_user_slice_contains(&users, &headless_off[0]));
    }
}
