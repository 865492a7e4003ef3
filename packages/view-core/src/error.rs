//! Error taxonomy for the view computation engine (spec.md §7).
//!
//! A tagged sum with exactly the three kinds §7 names, each carrying a
//! message — not a string hierarchy. Grounded in the teacher's
//! `OperationError`/`ClassifyError` (`service/operation.rs`).

/// Errors surfaced by `get_local_cluster_view`.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ClusterViewError {
    /// Descriptor not final, empty active set, unresolvable (non-suppressible)
    /// member, or missing local instance.
    #[error("no established view: {reason}")]
    NoEstablishedView { reason: String },

    /// The computed view does not include the local member.
    #[error("local member is isolated from the topology")]
    IsolatedFromTopology,

    /// Repository read/write failure, parse failure, or inability to persist
    /// a cluster id after bounded retries.
    #[error("repository exception: {message}")]
    Repository { message: String },
}

impl ClusterViewError {
    #[must_use]
    pub fn no_established_view(reason: impl Into<String>) -> Self {
        Self::NoEstablishedView {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn repository(message: impl Into<String>) -> Self {
        Self::Repository {
            message: message.into(),
        }
    }
}
