//! Instance reader (C3, spec.md §4.3).
//!
//! Resolves a slot id to a stable id via the id map, then reads the
//! member's raw repository node and validates the required fields.
//! Returns a tagged `InstanceReadResult` rather than a hard error: a
//! missing or incomplete record is an expected, handled outcome (the
//! caller decides whether to suppress it or fail the whole view), not a
//! failure of the read mechanism itself.

use clusterview_core::{ClusterViewError, InstanceInfo, InstanceReadResult};

use crate::id_map::IdMap;
use crate::repository::RepositorySession;

/// Reads and validates a single member's instance info.
///
/// `tolerant` does not change the resolution chain — the same
/// `InstanceReadResult::Missing` is produced in both modes — it only
/// shapes the diagnostic message, since the decision of whether a missing
/// instance is fatal belongs to the view builder (C7), not to this reader.
///
/// # Errors
///
/// Returns `Repository` if the underlying session read fails.
pub async fn read_instance(
    session: &dyn RepositorySession,
    id_map: &dyn IdMap,
    slot_id: i64,
    tolerant: bool,
) -> Result<InstanceReadResult, ClusterViewError> {
    let Some(stable_id) = id_map.stable_id_of(slot_id) else {
        let reason = if tolerant {
            format!("slot {slot_id} not present in id map (tolerant)")
        } else {
            format!("slot {slot_id} not present in id map")
        };
        return Ok(InstanceReadResult::Missing(reason));
    };

    let Some(node) = session.read_member_node(&stable_id).await? else {
        return Ok(InstanceReadResult::Missing(format!(
            "no instance record for stable id {stable_id} (slot {slot_id})"
        )));
    };

    let (Some(leader_election_token), Some(last_sync_token)) =
        (node.leader_election_id, node.sync_token)
    else {
        return Ok(InstanceReadResult::Missing(format!(
            "instance record for stable id {stable_id} (slot {slot_id}) is missing required fields"
        )));
    };

    Ok(InstanceReadResult::Ok(InstanceInfo {
        slot_id,
        stable_id,
        leader_election_token,
        last_sync_token,
    }))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use clusterview_core::{ClusterIdRecord, Descriptor};

    use crate::id_map::CachingIdMap;
    use crate::repository::{CommitOutcome, RawMemberNode};

    use super::*;

    struct StubSession {
        nodes: HashMap<String, RawMemberNode>,
    }

    #[async_trait]
    impl RepositorySession for StubSession {
        async fn read_descriptor(&self) -> Result<Descriptor, ClusterViewError> {
            unreachable!("not exercised by these tests")
        }

        async fn read_member_node(
            &self,
            stable_id: &str,
        ) -> Result<Option<RawMemberNode>, ClusterViewError> {
            Ok(self.nodes.get(stable_id).cloned())
        }

        async fn read_member_properties(
            &self,
            _stable_id: &str,
        ) -> Result<HashMap<String, String>, ClusterViewError> {
            Ok(HashMap::new())
        }

        async fn read_cluster_id_record(
            &self,
        ) -> Result<Option<ClusterIdRecord>, ClusterViewError> {
            Ok(None)
        }

        async fn try_define_cluster_id(
            &self,
            _record: &ClusterIdRecord,
        ) -> Result<CommitOutcome, ClusterViewError> {
            unreachable!("not exercised by these tests")
        }
    }

    #[tokio::test]
    async fn resolves_complete_record() {
        let id_map = CachingIdMap::new();
        id_map.insert(1, "s1");
        let session = StubSession {
            nodes: HashMap::from([(
                "s1".to_string(),
                RawMemberNode {
                    leader_election_id: Some("5_a".to_string()),
                    sync_token: Some(7),
                },
            )]),
        };

        let result = read_instance(&session, &id_map, 1, false).await.unwrap();
        assert_eq!(
            result,
            InstanceReadResult::Ok(InstanceInfo {
                slot_id: 1,
                stable_id: "s1".to_string(),
                leader_election_token: "5_a".to_string(),
                last_sync_token: 7,
            })
        );
    }

    #[tokio::test]
    async fn missing_from_id_map_is_missing_not_error() {
        let id_map = CachingIdMap::new();
        let session = StubSession {
            nodes: HashMap::new(),
        };

        let result = read_instance(&session, &id_map, 9, true).await.unwrap();
        assert!(matches!(result, InstanceReadResult::Missing(_)));
    }

    #[tokio::test]
    async fn incomplete_record_is_missing() {
        let id_map = CachingIdMap::new();
        id_map.insert(1, "s1");
        let session = StubSession {
            nodes: HashMap::from([(
                "s1".to_string(),
                RawMemberNode {
                    leader_election_id: Some("5_a".to_string()),
                    sync_token: None,
                },
            )]),
        };

        let result = read_instance(&session, &id_map, 1, false).await.unwrap();
        assert!(matches!(result, InstanceReadResult::Missing(_)));
    }

    #[tokio::test]
    async fn no_repository_node_is_missing() {
        let id_map = CachingIdMap::new();
        id_map.insert(1, "s1");
        let session = StubSession {
            nodes: HashMap::new(),
        };

        let result = read_instance(&session, &id_map, 1, false).await.unwrap();
        assert!(matches!(result, InstanceReadResult::Missing(_)));
    }
}
