//! Controller configuration.
//!
//! Typically built by the host (or deserialized from its settings file with
//! the `serde` feature) and handed to the scheduler builder.

use std::time::Duration;

use crate::{CoreError, CoreResult};

/// Scheduler-wide settings.  Per-task parameters live in task specs.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ControllerConfig {
    /// Milliseconds between evaluation cycles.  Must be non-zero.
    pub cadence_ms: u64,

    /// Spatial data older than this is reported stale.  Tasks still receive
    /// it and decide how much to trust it.
    pub stale_after_ms: u64,

    /// Consecutive faults from one task before a `PersistentFault`
    /// diagnostic is raised.
    pub fault_report_threshold: u32,

    /// Reject task sets where two tasks share a priority.  When `false`,
    /// registration order breaks ties.
    pub unique_priorities: bool,
}

impl ControllerConfig {
    #[inline]
    pub fn cadence(&self) -> Duration {
        Duration::from_millis(self.cadence_ms)
    }

    #[inline]
    pub fn stale_after(&self) -> Duration {
        Duration::from_millis(self.stale_after_ms)
    }

    /// Reject settings the scheduler cannot run with.
    pub fn validate(&self) -> CoreResult<()> {
        if self.cadence_ms == 0 {
            return Err(CoreError::ZeroCadence);
        }
        if self.fault_report_threshold == 0 {
            return Err(CoreError::Config("fault_report_threshold must be at least 1".into()));
        }
        Ok(())
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            cadence_ms:             100,
            stale_after_ms:         1_000,
            fault_report_threshold: 3,
            unique_priorities:      false,
        }
    }
}
