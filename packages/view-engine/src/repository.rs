//! Repository abstraction.
//!
//! spec.md lists the content repository, its descriptor producer, and the
//! `ResourceResolver` factory as out-of-scope external collaborators (§1) —
//! but §6 still names the shapes this engine reads through: a descriptor,
//! per-member nodes, and the cluster-id record (§6 "Per-member layout",
//! "Cluster-id persistence layout"). `ClusterRepository` is the trait
//! boundary those shapes cross through, grounded in the teacher's
//! `ServerStorage` trait (`traits.rs`): a narrow, session-scoped,
//! async-capable persistence contract with one method per concern rather
//! than a generic get/put API.

use async_trait::async_trait;
use clusterview_core::{ClusterIdRecord, ClusterViewError, Descriptor};

/// Raw per-member node contents, prior to `InstanceInfo` validation (C3).
///
/// Either field may be absent — "record exists but lacks required fields"
/// in spec.md §4.3 is represented by a `None` here, not by omitting the
/// node entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawMemberNode {
    pub leader_election_id: Option<String>,
    pub sync_token: Option<i64>,
}

/// Outcome of an attempted commit in C4's get-or-define loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    /// Another writer committed first; the caller should re-read and retry.
    Conflict,
}

/// A scoped repository session. Dropped (released) on every exit path by
/// virtue of normal Rust ownership — the view builder never needs to call
/// an explicit `close()`.
#[async_trait]
pub trait RepositorySession: Send + Sync {
    /// Reads the current discovery-lite descriptor (C1).
    async fn read_descriptor(&self) -> Result<Descriptor, ClusterViewError>;

    /// Reads the raw node for a member's stable id, or `None` if no such
    /// child exists under `clusterInstancesPath`.
    async fn read_member_node(
        &self,
        stable_id: &str,
    ) -> Result<Option<RawMemberNode>, ClusterViewError>;

    /// Reads a member's `properties` child, excluding storage-internal keys
    /// (notably `jcr:primaryType`, per spec.md §6).
    async fn read_member_properties(
        &self,
        stable_id: &str,
    ) -> Result<std::collections::HashMap<String, String>, ClusterViewError>;

    /// Reads the persistent cluster-id record, if one has been defined.
    async fn read_cluster_id_record(&self) -> Result<Option<ClusterIdRecord>, ClusterViewError>;

    /// Ensures the discovery resource parent node exists (auto-create),
    /// then attempts to commit `record` as the cluster-id record.
    ///
    /// Implementations must be idempotent: if another writer already
    /// committed a record, this returns `Conflict` rather than
    /// overwriting it (spec.md §4.4: "last writer wins is acceptable
    /// because the losing writer will re-read and see the winner's id").
    async fn try_define_cluster_id(
        &self,
        record: &ClusterIdRecord,
    ) -> Result<CommitOutcome, ClusterViewError>;
}

/// Yields scoped `RepositorySession`s, mirroring the teacher's
/// `ResourceResolverFactory` role (named, not modeled, in spec.md §6).
#[async_trait]
pub trait ClusterRepository: Send + Sync {
    async fn open_session(&self) -> Result<Box<dyn RepositorySession>, ClusterViewError>;
}
