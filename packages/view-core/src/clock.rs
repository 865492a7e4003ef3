//! Clock abstraction for dependency injection, grounded in the teacher's
//! `topgun_core::hlc::ClockSource`/`SystemClock` pair.
//!
//! Used for the suppression deadline (spec.md §4.5) and the cluster-id
//! record's `clusterIdDefinedAt` timestamp (spec.md §3).

use std::time::{SystemTime, UNIX_EPOCH};

/// Abstraction over the system clock so tests can supply a virtual one.
pub trait ClockSource: Send + Sync {
    /// Current time as milliseconds since the Unix epoch.
    fn now_ms(&self) -> u64;
}

/// Default clock source that reads the real system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ClockSource for SystemClock {
    fn now_ms(&self) -> u64 {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock is before Unix epoch")
            .as_millis();
        u64::try_from(millis).unwrap_or(u64::MAX)
    }
}
