//! Domain types for the `LocalClusterView` computation engine.
//!
//! These mirror the data model in spec.md §3: a read-only `Descriptor`
//! snapshot, per-member `InstanceInfo`, the output `LocalClusterView`, and
//! the cross-call `EngineState`. None of these types perform I/O — they are
//! plain values passed between the engine's collaborators.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

/// Sentinel used for "no value yet" in `i64` sequence fields (`lastSeqNum`,
/// `lowestSeqNum` in spec.md §3).
pub const NO_SEQ_NUM: i64 = -1;

/// A membership snapshot read from the discovery-lite descriptor (spec.md §3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    /// Opaque cluster identifier, or `None` when the descriptor does not
    /// carry one (cluster id then comes from the cluster-id store, C4).
    pub view_id: Option<String>,
    /// Monotonically-advancing snapshot sequence number.
    pub seq_num: i64,
    /// `false` means the descriptor is mid-change; no view may be returned.
    pub is_final: bool,
    /// Slot id of this process.
    pub local_slot_id: i64,
    /// Slot ids constituting the active cluster. Expected non-empty; an
    /// empty set is a valid (if terminal) input, handled by the view builder.
    pub active_slot_ids: Vec<i64>,
}

impl Descriptor {
    /// Treats `view_id` of `None` and `Some("")` identically as "absent",
    /// per spec.md's Open Question on the collapsed `""`/`null` semantics.
    #[must_use]
    pub fn view_id_present(&self) -> Option<&str> {
        self.view_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Per-member repository state (spec.md §3).
///
/// `stable_id` never changes for a given member across its lifetime;
/// `leader_election_token` is assigned once at member startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceInfo {
    pub slot_id: i64,
    pub stable_id: String,
    pub leader_election_token: String,
    pub last_sync_token: i64,
}

impl InstanceInfo {
    /// `true` when this member has completed its join handshake for `seq_num`
    /// or any later one.
    #[must_use]
    pub fn is_sync_token_newer_or_equal(&self, seq_num: i64) -> bool {
        self.last_sync_token >= seq_num
    }
}

/// Outcome of reading a single member's instance record (C3).
///
/// A tagged sum rather than a `Result` with a string error: "missing" is an
/// expected, handled outcome in tolerant mode, not a failed read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceReadResult {
    Ok(InstanceInfo),
    Missing(String),
}

/// One resolved member in a `LocalClusterView`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberView {
    pub stable_id: String,
    pub is_leader: bool,
    pub is_local: bool,
    pub properties: HashMap<String, String>,
}

/// Fully-resolved, leader-elected cluster view (spec.md §3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalClusterView {
    /// Stable across restarts of the same cluster.
    pub cluster_id: String,
    /// Equal to the descriptor's `seq_num` as a string.
    pub sync_token_id: String,
    /// Ordered members; `members[0]` is the leader.
    pub members: Vec<MemberView>,
    /// Advisory-only: slot ids hidden from `members` by suppression.
    pub partially_started_slot_ids: BTreeSet<i64>,
}

impl LocalClusterView {
    /// The elected leader, if any member is present.
    #[must_use]
    pub fn leader(&self) -> Option<&MemberView> {
        self.members.first()
    }

    /// The local member, if present in the view.
    #[must_use]
    pub fn local_member(&self) -> Option<&MemberView> {
        self.members.iter().find(|m| m.is_local)
    }
}

/// Persistent cluster-id record stored once under the discovery resource
/// path (spec.md §3, §4.4).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterIdRecord {
    pub cluster_id: String,
    pub cluster_id_defined_by: String,
    pub cluster_id_defined_at: i64,
}

/// Cross-call engine state (spec.md §3 "Engine state").
///
/// Mutated only at the very end of a successful `get_local_cluster_view`
/// call; never partially updated on failure.
#[derive(Debug, Clone)]
pub struct EngineState {
    /// Last descriptor `seq_num` seen. `NO_SEQ_NUM` means none yet.
    pub last_seq_num: i64,
    /// First `seq_num` the local member ever returned successfully.
    pub lowest_seq_num: i64,
    /// Wall-clock millis; `0` means suppression is not armed.
    pub partial_suppression_deadline_ms: u64,
    /// Members from the last successful view, by slot id.
    pub seen_local_instances: HashMap<i64, InstanceInfo>,
}

impl EngineState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            last_seq_num: NO_SEQ_NUM,
            lowest_seq_num: NO_SEQ_NUM,
            partial_suppression_deadline_ms: 0,
            seen_local_instances: HashMap::new(),
        }
    }
}

impl Default for EngineState {
    /// Delegates to `new()` — a derived `Default` would zero `last_seq_num`/
    /// `lowest_seq_num` instead of setting them to `NO_SEQ_NUM`, silently
    /// violating the "`-1` = none" invariant.
    fn default() -> Self {
        Self::new()
    }
}
