//! `clusterview-engine` — the `LocalClusterView` computation engine.
//!
//! Wires the seven collaborators from spec.md §4 (C1 descriptor reader, C2
//! id map, C3 instance reader, C4 cluster-id store, C5 suppression policy,
//! C6 leader-election sort, C7 view builder) behind a narrow
//! `ClusterRepository` abstraction, mirroring the teacher's split between
//! domain types (`clusterview-core`) and the orchestration layer that reads
//! and writes them (this crate).

pub mod cluster_id_store;
pub mod descriptor;
pub mod id_map;
pub mod in_memory;
pub mod instance_reader;
pub mod leader_election;
pub mod repository;
pub mod suppression;
pub mod view_builder;

pub use cluster_id_store::{Sleeper, TokioSleeper};
pub use id_map::{CachingIdMap, IdMap};
pub use in_memory::InMemoryRepository;
pub use leader_election::LeaderElectionMode;
pub use repository::{ClusterRepository, CommitOutcome, RawMemberNode, RepositorySession};
pub use view_builder::{LocalSettings, ViewBuilder};
