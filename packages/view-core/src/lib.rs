//! `clusterview-core` — domain types, error taxonomy, and configuration for
//! the `LocalClusterView` computation engine.

pub mod clock;
pub mod config;
pub mod error;
pub mod types;

pub use clock::{ClockSource, SystemClock};
pub use config::EngineConfig;
pub use error::ClusterViewError;
pub use types::{
    ClusterIdRecord, Descriptor, EngineState, InstanceInfo, InstanceReadResult, LocalClusterView,
    MemberView, NO_SEQ_NUM,
};

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, HashMap};

    use super::*;

    #[test]
    fn crate_loads() {
        let _ = EngineConfig::default();
    }

    #[test]
    fn view_id_present_collapses_none_and_empty() {
        let absent_none = Descriptor {
            view_id: None,
            seq_num: 1,
            is_final: true,
            local_slot_id: 1,
            active_slot_ids: vec![1],
        };
        let absent_empty = Descriptor {
            view_id: Some(String::new()),
            ..absent_none.clone()
        };
        let present = Descriptor {
            view_id: Some("V".to_string()),
            ..absent_none.clone()
        };

        assert_eq!(absent_none.view_id_present(), None);
        assert_eq!(absent_empty.view_id_present(), None);
        assert_eq!(present.view_id_present(), Some("V"));
    }

    #[test]
    fn instance_info_sync_token_newer_or_equal() {
        let info = InstanceInfo {
            slot_id: 1,
            stable_id: "s1".to_string(),
            leader_election_token: "5_a".to_string(),
            last_sync_token: 7,
        };
        assert!(info.is_sync_token_newer_or_equal(7));
        assert!(info.is_sync_token_newer_or_equal(6));
        assert!(!info.is_sync_token_newer_or_equal(8));
    }

    #[test]
    fn engine_state_default_has_sentinels() {
        let state = EngineState::new();
        assert_eq!(state.last_seq_num, NO_SEQ_NUM);
        assert_eq!(state.lowest_seq_num, NO_SEQ_NUM);
        assert_eq!(state.partial_suppression_deadline_ms, 0);
        assert!(state.seen_local_instances.is_empty());
    }

    #[test]
    fn local_cluster_view_leader_and_local_member() {
        let view = LocalClusterView {
            cluster_id: "c1".to_string(),
            sync_token_id: "7".to_string(),
            members: vec![
                MemberView {
                    stable_id: "a".to_string(),
                    is_leader: true,
                    is_local: false,
                    properties: HashMap::default(),
                },
                MemberView {
                    stable_id: "b".to_string(),
                    is_leader: false,
                    is_local: true,
                    properties: HashMap::default(),
                },
            ],
            partially_started_slot_ids: BTreeSet::default(),
        };

        assert_eq!(view.leader().unwrap().stable_id, "a");
        assert_eq!(view.local_member().unwrap().stable_id, "b");
    }
}
