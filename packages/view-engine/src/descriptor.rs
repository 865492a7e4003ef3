//! Descriptor reader (C1, spec.md §4.1).
//!
//! A thin, logged wrapper over `RepositorySession::read_descriptor` — the
//! actual parsing lives in the repository implementation, since the wire
//! shape of a discovery-lite descriptor is repository-specific and out of
//! this crate's scope (spec.md §1).

use clusterview_core::{ClusterViewError, Descriptor};

use crate::repository::RepositorySession;

/// Reads the current descriptor, logging its shape at `debug` and surfacing
/// any repository failure as `ClusterViewError::Repository`.
///
/// # Errors
///
/// Returns `Repository` if the underlying session read fails.
pub async fn read_descriptor(
    session: &dyn RepositorySession,
) -> Result<Descriptor, ClusterViewError> {
    let descriptor = session.read_descriptor().await?;
    tracing::debug!(
        seq_num = descriptor.seq_num,
        is_final = descriptor.is_final,
        active_count = descriptor.active_slot_ids.len(),
        "read discovery-lite descriptor"
    );
    Ok(descriptor)
}
