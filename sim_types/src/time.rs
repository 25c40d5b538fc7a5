//! Simulated time
//!
//! The co-simulation core runs on one discrete time axis measured in integer
//! ticks. The outer driver converts between its own continuous time and
//! ticks through a [`TimeResolution`] chosen once per run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

/// A point on the shared discrete time axis, in ticks
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct SimTime(u64);

impl SimTime {
    /// The origin of the time axis
    pub const ZERO: SimTime = SimTime(0);

    /// Creates a time from a raw tick count
    pub fn from_ticks(ticks: u64) -> Self {
        Self(ticks)
    }

    /// Returns the raw tick count
    pub fn as_ticks(&self) -> u64 {
        self.0
    }

    /// Advances by `delta` ticks, saturating at the end of the axis
    pub fn saturating_add(&self, delta: u64) -> Self {
        Self(self.0.saturating_add(delta))
    }

    /// Advances by `delta` ticks, or `None` on overflow
    pub fn checked_add(&self, delta: u64) -> Option<Self> {
        self.0.checked_add(delta).map(Self)
    }
}

impl Add<u64> for SimTime {
    type Output = SimTime;

    fn add(self, delta: u64) -> SimTime {
        self.saturating_add(delta)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}t", self.0)
    }
}

/// Resolution of one tick on the shared time axis
///
/// Configured once at instance construction; every duration coming from the
/// driver is scaled by the resolution before it enters the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeResolution {
    #[default]
    Seconds,
    MilliSeconds,
    MicroSeconds,
    NanoSeconds,
}

impl TimeResolution {
    /// Returns the number of ticks per second at this resolution
    pub fn scale(&self) -> f64 {
        match self {
            TimeResolution::Seconds => 1.0,
            TimeResolution::MilliSeconds => 1.0e3,
            TimeResolution::MicroSeconds => 1.0e6,
            TimeResolution::NanoSeconds => 1.0e9,
        }
    }

    /// Converts a duration in seconds to whole ticks (truncating)
    ///
    /// Negative or non-finite inputs map to time zero; validation of
    /// configured durations happens at descriptor level, before conversion.
    pub fn ticks_from_seconds(&self, seconds: f64) -> SimTime {
        let scaled = seconds * self.scale();
        if !scaled.is_finite() || scaled <= 0.0 {
            return SimTime::ZERO;
        }
        SimTime::from_ticks(scaled as u64)
    }
}
