//! View builder (C7, spec.md §4.7).
//!
//! Orchestrates C1–C6 into the 20-step algorithm that produces a
//! `LocalClusterView`. Collaborators are modeled as capability sets passed
//! in at construction (§9 design note), not as dynamic dispatch scattered
//! through the method body — the same shape as the teacher's
//! `ClusterService`/`MembershipService` traits being backed by a
//! concrete struct holding `Arc`s to its dependencies.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use clusterview_core::{
    ClockSource, ClusterViewError, Descriptor, EngineConfig, EngineState, InstanceInfo,
    InstanceReadResult, LocalClusterView, MemberView,
};

use crate::cluster_id_store::{read_or_define_cluster_id, Sleeper};
use crate::descriptor::read_descriptor;
use crate::id_map::IdMap;
use crate::instance_reader::read_instance;
use crate::leader_election::{sort_members, LeaderElectionMode};
use crate::repository::ClusterRepository;
use crate::suppression::{suppression_enabled, update_suppression_deadline};

/// `settings.localStableId()` from spec.md §6.
pub trait LocalSettings: Send + Sync {
    fn local_stable_id(&self) -> String;
}

/// Orchestrates a full `get_local_cluster_view` call.
///
/// Holds the `EngineState` described in spec.md §3 across calls; the
/// calling layer is responsible for serializing invocations (spec.md §5).
pub struct ViewBuilder {
    repository: Arc<dyn ClusterRepository>,
    id_map: Arc<dyn IdMap>,
    settings: Arc<dyn LocalSettings>,
    sleeper: Arc<dyn Sleeper>,
    clock: Arc<dyn ClockSource>,
    config: EngineConfig,
    state: EngineState,
}

impl ViewBuilder {
    pub fn new(
        repository: Arc<dyn ClusterRepository>,
        id_map: Arc<dyn IdMap>,
        settings: Arc<dyn LocalSettings>,
        sleeper: Arc<dyn Sleeper>,
        clock: Arc<dyn ClockSource>,
        config: EngineConfig,
    ) -> Self {
        Self {
            repository,
            id_map,
            settings,
            sleeper,
            clock,
            config,
            state: EngineState::new(),
        }
    }

    /// Read-only view of the cross-call engine state, mainly for tests.
    #[must_use]
    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// Runs the full 20-step algorithm from spec.md §4.7.
    ///
    /// # Errors
    ///
    /// Returns `NoEstablishedView` when the descriptor is mid-change, empty,
    /// or a non-suppressible member can't be resolved; `IsolatedFromTopology`
    /// when the local member ends up outside the computed view; and
    /// `Repository` on any underlying repository failure.
    #[allow(clippy::too_many_lines)] // one literal 20-step algorithm, not several concerns
    #[tracing::instrument(skip(self))]
    pub async fn get_local_cluster_view(&mut self) -> Result<LocalClusterView, ClusterViewError> {
        // Step 1: acquire a scoped repository session. Dropped on every
        // exit path via normal Rust ownership.
        let session = self.repository.open_session().await?;

        // Step 2: read the descriptor.
        let descriptor = read_descriptor(session.as_ref()).await?;

        // Step 3: invalidate the id map on sequence change. `last_seq_num`
        // is updated here, immediately, even if the rest of the call later
        // fails (spec.md §8 S6: "engine state unchanged except possibly
        // lastSeqNum").
        if descriptor.seq_num != self.state.last_seq_num {
            self.id_map.clear_cache();
            self.state.last_seq_num = descriptor.seq_num;
        }

        // Step 4: resolve the cluster id.
        let cluster_id = match descriptor.view_id_present() {
            Some(view_id) => view_id.to_string(),
            None => {
                read_or_define_cluster_id(
                    session.as_ref(),
                    &self.config,
                    self.sleeper.as_ref(),
                    self.clock.as_ref(),
                    &self.settings.local_stable_id(),
                )
                .await?
            }
        };

        // Step 5: non-final descriptors never yield a view.
        if !descriptor.is_final {
            return Err(ClusterViewError::no_established_view(
                "descriptor is not final",
            ));
        }

        // Step 6: an empty active set is terminal.
        if descriptor.active_slot_ids.is_empty() {
            return Err(ClusterViewError::no_established_view(
                "descriptor has no active slot ids",
            ));
        }

        // Step 7: the local instance must resolve, non-tolerant.
        let local_info =
            match read_instance(session.as_ref(), self.id_map.as_ref(), descriptor.local_slot_id, false)
                .await?
            {
                InstanceReadResult::Ok(info) => info,
                InstanceReadResult::Missing(reason) => {
                    return Err(ClusterViewError::no_established_view(format!(
                        "local instance unresolved: {reason}"
                    )))
                }
            };

        // Step 8: suppression eligibility.
        let now_ms = self.clock.now_ms();
        let suppression_on = suppression_enabled(&self.config, &self.state, &local_info, now_ms);

        // Step 9: classify every active slot into regular or partially-started.
        let mut regulars: Vec<InstanceInfo> = Vec::with_capacity(descriptor.active_slot_ids.len());
        let mut partially_started: BTreeSet<i64> = BTreeSet::new();

        for &slot in &descriptor.active_slot_ids {
            if slot == descriptor.local_slot_id {
                regulars.push(local_info.clone());
                continue;
            }

            let mut result = read_instance(
                session.as_ref(),
                self.id_map.as_ref(),
                slot,
                suppression_on,
            )
            .await?;

            if matches!(result, InstanceReadResult::Missing(_)) && !suppression_on {
                // Race with a stale cache entry: clear once and retry.
                self.id_map.clear_cache();
                result = read_instance(
                    session.as_ref(),
                    self.id_map.as_ref(),
                    slot,
                    suppression_on,
                )
                .await?;
            }

            match result {
                InstanceReadResult::Ok(info) => regulars.push(info),
                InstanceReadResult::Missing(reason) => {
                    if suppression_on {
                        partially_started.insert(slot);
                    } else {
                        return Err(ClusterViewError::no_established_view(reason));
                    }
                }
            }
        }

        // Step 10/11: sort regulars; verify against the remaining active set.
        sort_members(
            LeaderElectionMode::from_config_flag(self.config.invert_leader_election_prefix_order),
            &mut regulars,
        );
        let remaining_active = descriptor.active_slot_ids.len() - partially_started.len();
        if regulars.len() != remaining_active {
            tracing::error!(
                sorted = regulars.len(),
                expected = remaining_active,
                "leader-election sort produced an unexpected member count"
            );
        }

        // Step 12: assemble members, loading per-member properties.
        let seen_all_sync_tokens = regulars
            .iter()
            .all(|m| m.is_sync_token_newer_or_equal(descriptor.seq_num));

        let mut members = Vec::with_capacity(regulars.len());
        for (index, info) in regulars.iter().enumerate() {
            if info.stable_id.trim().is_empty() {
                self.id_map.clear_cache();
                return Err(ClusterViewError::repository(format!(
                    "instance for slot {} resolved to an empty stable id",
                    info.slot_id
                )));
            }

            let raw_properties = session.read_member_properties(&info.stable_id).await?;
            let properties: HashMap<String, String> = raw_properties
                .into_iter()
                .filter(|(key, _)| !key.starts_with("jcr:"))
                .collect();

            members.push(MemberView {
                stable_id: info.stable_id.clone(),
                is_leader: index == 0,
                is_local: info.slot_id == descriptor.local_slot_id,
                properties,
            });
        }

        // Step 13: clear the id map before returning if anything was
        // suppressed or sync tokens lag, forcing fresh resolution next call.
        if !partially_started.is_empty() || !seen_all_sync_tokens {
            self.id_map.clear_cache();
        }

        let view = LocalClusterView {
            cluster_id,
            sync_token_id: descriptor.seq_num.to_string(),
            members,
            partially_started_slot_ids: partially_started.clone(), // Step 14.
        };

        // Step 15: the local member must be present in the final view.
        if view.local_member().is_none() {
            return Err(ClusterViewError::IsolatedFromTopology);
        }

        // Steps 16-19: engine state updates, grouped at the end of a
        // successful call (spec.md §3 "Lifecycle").
        if self.state.lowest_seq_num == clusterview_core::NO_SEQ_NUM {
            self.state.lowest_seq_num = descriptor.seq_num;
        }

        audit_unexplained_disappearances(&self.state, &regulars, &descriptor);

        self.state.seen_local_instances = regulars
            .into_iter()
            .map(|info| (info.slot_id, info))
            .collect();

        update_suppression_deadline(
            &self.config,
            &mut self.state,
            !partially_started.is_empty(),
            now_ms,
        );

        Ok(view)
    }
}

/// Paranoia audit (spec.md §4.7 step 17): every previously-seen instance now
/// absent from `regulars` must also be absent from the descriptor's active
/// set. A soft invariant violation; logged, never fails the call.
fn audit_unexplained_disappearances(
    state: &EngineState,
    regulars: &[InstanceInfo],
    descriptor: &Descriptor,
) {
    for (&slot, info) in &state.seen_local_instances {
        let still_present = regulars.iter().any(|r| r.slot_id == slot);
        if still_present {
            continue;
        }
        if descriptor.active_slot_ids.contains(&slot) {
            tracing::error!(
                slot_id = slot,
                stable_id = %info.stable_id,
                "previously-seen instance vanished from the view while still listed active"
            );
        }
    }
}
