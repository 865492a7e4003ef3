//! Leader-election sort (C6, spec.md §4.6).
//!
//! A pure total-order comparator over `leaderElectionToken`, per the §9
//! design note: "the inverted-prefix order is a lexicographic-on-
//! `(−prefix, rawToken)` pair with `prefix = -1` for malformed tokens".
//! The leader is the minimum element under this order.

use std::cmp::Ordering;

use clusterview_core::InstanceInfo;

/// Which of the two total orders from spec.md §4.6 to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaderElectionMode {
    Plain,
    InvertedPrefix,
}

impl LeaderElectionMode {
    #[must_use]
    pub fn from_config_flag(invert_leader_election_prefix_order: bool) -> Self {
        if invert_leader_election_prefix_order {
            Self::InvertedPrefix
        } else {
            Self::Plain
        }
    }
}

/// Parses the decimal integer prefix of a `<prefix>_<rest>` token.
///
/// Returns `-1` when the first `_` is absent or the prefix does not parse
/// as a signed decimal integer — malformed and missing-prefix tokens both
/// collapse to this sentinel and fall through to lexicographic order.
#[must_use]
pub fn prefix_of(token: &str) -> i64 {
    match token.find('_') {
        Some(idx) => token[..idx].parse::<i64>().unwrap_or(-1),
        None => -1,
    }
}

/// Total order over leader-election tokens.
#[must_use]
pub fn leader_election_cmp(mode: LeaderElectionMode, a: &str, b: &str) -> Ordering {
    match mode {
        LeaderElectionMode::Plain => a.cmp(b),
        LeaderElectionMode::InvertedPrefix => {
            let (pa, pb) = (prefix_of(a), prefix_of(b));
            if pa == pb {
                a.cmp(b)
            } else {
                // Descending by prefix: larger prefix sorts first.
                pb.cmp(&pa)
            }
        }
    }
}

/// Sorts members by leader-election token under the configured order.
/// `sorted[0]` is the elected leader.
pub fn sort_members(mode: LeaderElectionMode, members: &mut [InstanceInfo]) {
    members.sort_by(|a, b| {
        leader_election_cmp(mode, &a.leader_election_token, &b.leader_election_token)
    });
}
