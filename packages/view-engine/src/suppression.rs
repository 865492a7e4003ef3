//! Suppression policy (C5, spec.md §4.5).
//!
//! Pure functions over `EngineConfig`/`EngineState`, not a stateful struct —
//! the policy has no identity of its own, since the state it reasons about
//! already lives in `EngineState` (mirrors the free-function style of the
//! teacher's `cluster::assignment` rather than the stateful-struct style of
//! `cluster::failure_detector`).

use clusterview_core::{EngineConfig, EngineState, InstanceInfo};

/// Evaluates whether partially-started members may be suppressed for this
/// call. All four rules in spec.md §4.5 must hold.
#[must_use]
pub fn suppression_enabled(
    config: &EngineConfig,
    state: &EngineState,
    local_info: &InstanceInfo,
    now_ms: u64,
) -> bool {
    if !config.sync_token_enabled || !config.suppress_partially_started_instances {
        return false;
    }

    let deadline = state.partial_suppression_deadline_ms;
    if deadline != 0 && deadline <= now_ms {
        return false;
    }

    local_info.last_sync_token >= state.lowest_seq_num
}

/// Updates the suppression deadline at the end of a successful view build
/// (spec.md §4.5 "Deadline management").
pub fn update_suppression_deadline(
    config: &EngineConfig,
    state: &mut EngineState,
    any_suppressed: bool,
    now_ms: u64,
) {
    if !any_suppressed {
        state.partial_suppression_deadline_ms = 0;
        return;
    }

    if state.partial_suppression_deadline_ms == 0 && config.suppression_timeout_seconds > 0 {
        let timeout_ms =
            u64::try_from(config.suppression_timeout_seconds).unwrap_or(0).saturating_mul(1000);
        state.partial_suppression_deadline_ms = now_ms.saturating_add(timeout_ms);
        tracing::warn!(
            deadline_ms = state.partial_suppression_deadline_ms,
            "armed partial-start suppression deadline"
        );
    }
}
