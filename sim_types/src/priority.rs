//! Priority bands and tags
//!
//! Every kernel instance owns a disjoint, fixed-width band of priority key
//! values for the lifetime of a run. Events raised by an instance carry a
//! [`PriorityTag`] pairing the band base with the event's native priority,
//! so one physically sorted queue can hold N logically independent
//! timelines. The tag is a composite key; band membership never depends on
//! rewriting an event's own priority field.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An event's priority within its own kernel instance
///
/// Native priorities identify the event subtype and must lie in
/// `[0, band_width)`; the band width is a run-wide configuration constant
/// that upper-bounds the number of distinct subtypes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct NativePriority(u32);

impl NativePriority {
    /// Creates a native priority from a raw value
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw value
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for NativePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The half-open priority interval `[base, base + width)` owned by one
/// kernel instance
///
/// Bands of distinct instances never overlap; they are allocated in
/// registration order, each starting where the previous one ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityBand {
    base: u32,
    width: u32,
}

impl PriorityBand {
    /// Creates a band from its base and the run-wide width
    pub fn new(base: u32, width: u32) -> Self {
        Self { base, width }
    }

    /// Returns the first priority key of the band
    pub fn base(&self) -> u32 {
        self.base
    }

    /// Returns the band width
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns whether a tagged priority belongs to this band
    pub fn contains(&self, tag: &PriorityTag) -> bool {
        tag.band_base() == self.base
    }

    /// Tags a native priority into this band
    ///
    /// Returns `None` when the native priority falls outside `[0, width)`;
    /// the caller turns that into a configuration error.
    pub fn tag(&self, native: NativePriority) -> Option<PriorityTag> {
        if native.value() >= self.width {
            return None;
        }
        Some(PriorityTag::new(self.base, native))
    }
}

impl fmt::Display for PriorityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.base, self.base + self.width)
    }
}

/// The physical priority key an event carries in the shared queue
///
/// Compares lexicographically by `(band_base, native)`, which sorts an
/// event inside its instance's band without mutating the event itself.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PriorityTag {
    band_base: u32,
    native: u32,
}

impl PriorityTag {
    /// Creates a tag from a band base and a native priority
    pub fn new(band_base: u32, native: NativePriority) -> Self {
        Self {
            band_base,
            native: native.value(),
        }
    }

    /// Returns the band base encoded in the tag
    pub fn band_base(&self) -> u32 {
        self.band_base
    }

    /// Recovers the native priority, discarding the band
    pub fn untag(&self) -> NativePriority {
        NativePriority::new(self.native)
    }
}

impl fmt::Display for PriorityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.band_base, self.native)
    }
}
