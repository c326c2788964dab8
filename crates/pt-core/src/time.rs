//! Controller time model.
//!
//! # Design
//!
//! Two clocks coexist:
//!
//! - [`Timestamp`] is host time in whole milliseconds since an arbitrary
//!   epoch (usually process start).  Activity deadlines and data freshness
//!   are measured in it.
//! - [`Cycle`] counts scheduler evaluation passes.  Fault quarantine and
//!   diagnostics are expressed in cycles.
//!
//! The host owns the mapping between the two.  [`CycleClock`] is the simple
//! fixed-cadence mapping used by tests and the demo:
//!
//!   now = start + cycle * cadence

use std::fmt;
use std::time::Duration;

// ── Timestamp ─────────────────────────────────────────────────────────────────

/// Host time in milliseconds.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(0);

    #[inline]
    pub fn from_millis(ms: u64) -> Self {
        Timestamp(ms)
    }

    #[inline]
    pub fn as_millis(self) -> u64 {
        self.0
    }

    /// Time elapsed from `earlier` to `self`, or zero if `earlier` is later.
    #[inline]
    pub fn saturating_since(self, earlier: Timestamp) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }
}

impl std::ops::Add<Duration> for Timestamp {
    type Output = Timestamp;
    #[inline]
    fn add(self, rhs: Duration) -> Timestamp {
        let ms = u64::try_from(rhs.as_millis()).unwrap_or(u64::MAX);
        Timestamp(self.0.saturating_add(ms))
    }
}

impl std::ops::Sub for Timestamp {
    type Output = Duration;
    #[inline]
    fn sub(self, rhs: Timestamp) -> Duration {
        self.saturating_since(rhs)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03}s", self.0 / 1_000, self.0 % 1_000)
    }
}

// ── Cycle ─────────────────────────────────────────────────────────────────────

/// Scheduler evaluation pass counter.  The first executed cycle is `C1`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cycle(pub u64);

impl Cycle {
    pub const ZERO: Cycle = Cycle(0);

    /// The cycle after `self`.
    #[inline]
    pub fn next(self) -> Cycle {
        Cycle(self.0 + 1)
    }

    /// The cycle `n` passes after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Cycle {
        Cycle(self.0 + n)
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}", self.0)
    }
}

// ── CycleClock ────────────────────────────────────────────────────────────────

/// Fixed-cadence clock: maps a cycle count onto host time.
///
/// Hosts with a real frame clock don't need this; it exists so scripted runs
/// are reproducible.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CycleClock {
    /// Host time of cycle 0.
    pub start: Timestamp,
    /// Milliseconds between cycles.
    pub cadence_ms: u64,
    /// Cycles advanced so far.
    pub current: Cycle,
}

impl CycleClock {
    pub fn new(start: Timestamp, cadence: Duration) -> Self {
        Self {
            start,
            cadence_ms: u64::try_from(cadence.as_millis()).unwrap_or(u64::MAX),
            current: Cycle::ZERO,
        }
    }

    /// Advance by one cycle and return the new host time.
    #[inline]
    pub fn advance(&mut self) -> Timestamp {
        self.current = self.current.next();
        self.now()
    }

    /// Host time corresponding to the current cycle.
    #[inline]
    pub fn now(&self) -> Timestamp {
        Timestamp(self.start.0 + self.current.0 * self.cadence_ms)
    }

    /// How many cycles span `d`? (rounds up)
    #[inline]
    pub fn cycles_for(&self, d: Duration) -> u64 {
        if self.cadence_ms == 0 {
            return 0;
        }
        let ms = u64::try_from(d.as_millis()).unwrap_or(u64::MAX);
        ms.div_ceil(self.cadence_ms)
    }
}

impl fmt::Display for CycleClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.current, self.now())
    }
}
