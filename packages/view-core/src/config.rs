//! Engine configuration (spec.md §6 "Config").
//!
//! A plain struct with a hand-written `Default`, in the style of the
//! teacher's `ClusterConfig`/`ServerConfig` — no env/file loading, since
//! this system has no environment variables of its own (spec.md §6).

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Absolute repository path holding one child per stable member id.
    pub cluster_instances_path: String,
    pub sync_token_enabled: bool,
    pub suppress_partially_started_instances: bool,
    /// `<= 0` disables arming the suppression deadline.
    pub suppression_timeout_seconds: i64,
    pub invert_leader_election_prefix_order: bool,
    /// Bound on C4's get-or-define retry loop (spec.md §4.4: "up to 5 times").
    pub cluster_id_define_retries: u32,
    /// Backoff between C4 write-conflict retries (spec.md §4.4: "sleep 1s").
    pub cluster_id_retry_backoff_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cluster_instances_path: "/var/discovery/clusterInstances".to_string(),
            sync_token_enabled: true,
            suppress_partially_started_instances: true,
            suppression_timeout_seconds: 300,
            invert_leader_election_prefix_order: false,
            cluster_id_define_retries: 5,
            cluster_id_retry_backoff_ms: 1000,
        }
    }
}
