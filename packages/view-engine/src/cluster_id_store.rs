//! Cluster-id store (C4, spec.md §4.4).
//!
//! Implements the bounded read-before-write retry loop as a free function
//! over the `RepositorySession`/`Sleeper` capabilities, per the §9 design
//! note ("represent as a bounded loop with explicit sleep; make the sleep
//! injectable to keep tests fast").

use std::time::Duration;

use async_trait::async_trait;
use clusterview_core::{ClockSource, ClusterIdRecord, ClusterViewError, EngineConfig};
use uuid::Uuid;

use crate::repository::{CommitOutcome, RepositorySession};

/// Injectable delay so C4's retry backoff doesn't slow down tests.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps for the real duration via `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Reads the persisted cluster id, defining it on first use.
///
/// Read-before-write: on each attempt, a pre-existing record wins outright.
/// Only when no record exists does this writer attempt to define one, and a
/// losing writer (write-conflict) simply retries — it will observe the
/// winner's id on its next read (spec.md §4.4).
///
/// # Errors
///
/// Returns `Repository` if the session reports a failure, or if no id could
/// be persisted after `config.cluster_id_define_retries` attempts.
pub async fn read_or_define_cluster_id(
    session: &dyn RepositorySession,
    config: &EngineConfig,
    sleeper: &dyn Sleeper,
    clock: &dyn ClockSource,
    local_stable_id: &str,
) -> Result<String, ClusterViewError> {
    for attempt in 0..config.cluster_id_define_retries {
        if let Some(record) = session.read_cluster_id_record().await? {
            if !record.cluster_id.is_empty() {
                return Ok(record.cluster_id);
            }
        }

        let candidate = ClusterIdRecord {
            cluster_id: Uuid::new_v4().to_string(),
            cluster_id_defined_by: local_stable_id.to_string(),
            cluster_id_defined_at: i64::try_from(clock.now_ms()).unwrap_or(i64::MAX),
        };

        match session.try_define_cluster_id(&candidate).await? {
            CommitOutcome::Committed => return Ok(candidate.cluster_id),
            CommitOutcome::Conflict => {
                tracing::warn!(attempt, "cluster id write conflict, retrying");
                sleeper
                    .sleep(Duration::from_millis(config.cluster_id_retry_backoff_ms))
                    .await;
            }
        }
    }

    Err(ClusterViewError::repository(format!(
        "could not persist cluster id after {} retries",
        config.cluster_id_define_retries
    )))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use clusterview_core::{Descriptor, SystemClock};

    use crate::repository::RawMemberNode;

    use super::*;

    #[derive(Default)]
    struct NoopSleeper {
        calls: AtomicU32,
    }

    #[async_trait]
    impl Sleeper for NoopSleeper {
        async fn sleep(&self, _duration: Duration) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct StubSession {
        record: Mutex<Option<ClusterIdRecord>>,
        conflicts_remaining: Mutex<u32>,
    }

    #[async_trait]
    impl RepositorySession for StubSession {
        async fn read_descriptor(&self) -> Result<Descriptor, ClusterViewError> {
            unreachable!()
        }

        async fn read_member_node(
            &self,
            _stable_id: &str,
        ) -> Result<Option<RawMemberNode>, ClusterViewError> {
            unreachable!()
        }

        async fn read_member_properties(
            &self,
            _stable_id: &str,
        ) -> Result<HashMap<String, String>, ClusterViewError> {
            unreachable!()
        }

        async fn read_cluster_id_record(
            &self,
        ) -> Result<Option<ClusterIdRecord>, ClusterViewError> {
            Ok(self.record.lock().unwrap().clone())
        }

        async fn try_define_cluster_id(
            &self,
            record: &ClusterIdRecord,
        ) -> Result<CommitOutcome, ClusterViewError> {
            let mut remaining = self.conflicts_remaining.lock().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                return Ok(CommitOutcome::Conflict);
            }
            *self.record.lock().unwrap() = Some(record.clone());
            Ok(CommitOutcome::Committed)
        }
    }

    #[tokio::test]
    async fn returns_existing_record_without_writing() {
        let session = StubSession {
            record: Mutex::new(Some(ClusterIdRecord {
                cluster_id: "existing".to_string(),
                cluster_id_defined_by: "s1".to_string(),
                cluster_id_defined_at: 0,
            })),
            conflicts_remaining: Mutex::new(0),
        };
        let config = EngineConfig::default();
        let sleeper = NoopSleeper::default();

        let id = read_or_define_cluster_id(&session, &config, &sleeper, &SystemClock, "s1")
            .await
            .unwrap();
        assert_eq!(id, "existing");
        assert_eq!(sleeper.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn defines_fresh_uuid_when_absent() {
        let session = StubSession {
            record: Mutex::new(None),
            conflicts_remaining: Mutex::new(0),
        };
        let config = EngineConfig::default();
        let sleeper = NoopSleeper::default();

        let id = read_or_define_cluster_id(&session, &config, &sleeper, &SystemClock, "s1")
            .await
            .unwrap();
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[tokio::test]
    async fn retries_past_write_conflicts_then_succeeds() {
        let session = StubSession {
            record: Mutex::new(None),
            conflicts_remaining: Mutex::new(2),
        };
        let config = EngineConfig::default();
        let sleeper = NoopSleeper::default();

        let id = read_or_define_cluster_id(&session, &config, &sleeper, &SystemClock, "s1")
            .await
            .unwrap();
        assert!(Uuid::parse_str(&id).is_ok());
        assert_eq!(sleeper.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn permanent_failure_after_bounded_retries() {
        let session = StubSession {
            record: Mutex::new(None),
            conflicts_remaining: Mutex::new(100),
        };
        let config = EngineConfig {
            cluster_id_define_retries: 3,
            ..EngineConfig::default()
        };
        let sleeper = NoopSleeper::default();

        let err = read_or_define_cluster_id(&session, &config, &sleeper, &SystemClock, "s1")
            .await
            .unwrap_err();
        assert!(matches!(err, ClusterViewError::Repository { .. }));
        assert_eq!(sleeper.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn read_or_define_is_idempotent_across_calls_in_same_process() {
        let session = StubSession {
            record: Mutex::new(None),
            conflicts_remaining: Mutex::new(0),
        };
        let config = EngineConfig::default();
        let sleeper = NoopSleeper::default();

        let first = read_or_define_cluster_id(&session, &config, &sleeper, &SystemClock, "s1")
            .await
            .unwrap();
        let second = read_or_define_cluster_id(&session, &config, &sleeper, &SystemClock, "s1")
            .await
            .unwrap();
        assert_eq!(first, second);
    }
}
