//! Coordination context: band registry and readiness barrier
//!
//! Process-wide state of a co-simulation run, made explicit. The outer
//! driver constructs one [`CoordinationContext`] and injects it into every
//! kernel instance; nothing here is a global singleton, so multiple
//! independent runs (or test cases) can coexist in one process.
//!
//! Two responsibilities live here because their lifetimes coincide:
//!
//! - **Band registry**: assigns each kernel instance a disjoint, fixed-width
//!   priority band in order of first registration.
//! - **Readiness barrier**: a rendezvous requiring every registered
//!   instance to signal before an aggregate condition fires. The action
//!   taken on completion belongs to the caller; the context is agnostic.

use crate::error::ConfigError;
use sim_types::{KernelId, RtosEventKind, RunId};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Default band width, enough headroom for engine-internal event subtypes
/// beyond the ones the core distinguishes
pub const DEFAULT_BAND_WIDTH: u32 = 50;

/// Default upper bound on simultaneously registered kernel instances
pub const DEFAULT_MAX_KERNELS: usize = 64;

/// Lifecycle event recorded by the context
///
/// Used in tests to verify registration and rendezvous behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordinationEvent {
    /// A kernel registered for the first time and got a band
    BandAllocated { kernel: KernelId, base: u32 },
    /// Every registered kernel signaled readiness; the round was cleared
    RoundCompleted { participants: usize },
    /// All registry state was torn down
    ContextReset,
}

/// Shared coordination state for one co-simulation run
#[derive(Debug, Clone)]
pub struct CoordinationContext {
    run_id: RunId,
    band_width: u32,
    max_kernels: usize,
    /// kernel-id/band-base correspondence
    bands: BTreeMap<KernelId, u32>,
    /// Base of the most recently allocated band
    current_max: u32,
    /// Members of the in-flight readiness round
    ready: BTreeSet<KernelId>,
    /// Edge-triggered completion flag of the most recent round
    round_complete: bool,
    /// Audit log for lifecycle events (test-only)
    audit_log: Vec<CoordinationEvent>,
}

impl CoordinationContext {
    /// Creates a context with the default band width and instance bound
    pub fn new() -> Self {
        Self {
            run_id: RunId::new(),
            band_width: DEFAULT_BAND_WIDTH,
            max_kernels: DEFAULT_MAX_KERNELS,
            bands: BTreeMap::new(),
            current_max: 0,
            ready: BTreeSet::new(),
            round_complete: false,
            audit_log: Vec::new(),
        }
    }

    /// Creates a context with explicit limits
    ///
    /// `band_width` must cover every event subtype an instance can raise;
    /// `max_kernels` bounds band allocation so the registry cannot grow
    /// silently without limit.
    pub fn with_limits(band_width: u32, max_kernels: usize) -> Result<Self, ConfigError> {
        if band_width < RtosEventKind::COUNT {
            return Err(ConfigError::InvalidBandWidth {
                width: band_width,
                min: RtosEventKind::COUNT,
            });
        }
        Ok(Self {
            run_id: RunId::new(),
            band_width,
            max_kernels,
            bands: BTreeMap::new(),
            current_max: 0,
            ready: BTreeSet::new(),
            round_complete: false,
            audit_log: Vec::new(),
        })
    }

    /// Returns the identifier of the current run
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Returns the run-wide band width
    pub fn band_width(&self) -> u32 {
        self.band_width
    }

    /// Returns the base of the highest allocated band
    ///
    /// Zero before any registration; the stepping protocol uses this to
    /// bound its wakeup scan.
    pub fn max_band(&self) -> u32 {
        self.current_max
    }

    /// Returns the number of registered kernel instances
    pub fn registered_count(&self) -> usize {
        self.bands.len()
    }

    /// Returns whether an id has registered in the current run
    pub fn is_registered(&self, id: &KernelId) -> bool {
        self.bands.contains_key(id)
    }

    /// Returns the band base of `id`, allocating a fresh band on first sight
    ///
    /// The first registration gets base 0; each later one starts where the
    /// previous band ends. A seen id gets its existing base back, so the
    /// call is idempotent and an id re-created mid-run reuses its band.
    pub fn band_of(&mut self, id: &KernelId) -> Result<u32, ConfigError> {
        if let Some(base) = self.bands.get(id) {
            return Ok(*base);
        }
        if self.bands.len() >= self.max_kernels {
            return Err(ConfigError::TooManyKernels {
                max: self.max_kernels,
            });
        }
        if !self.bands.is_empty() {
            self.current_max = self
                .current_max
                .checked_add(self.band_width)
                .ok_or(ConfigError::TooManyKernels {
                    max: self.max_kernels,
                })?;
        }
        let base = self.current_max;
        self.bands.insert(id.clone(), base);
        debug!(run = %self.run_id, kernel = %id, base, "allocated priority band");
        self.audit_log.push(CoordinationEvent::BandAllocated {
            kernel: id.clone(),
            base,
        });
        Ok(base)
    }

    /// Signals that `id` is ready for the pending collective transition
    ///
    /// Idempotent within a round; ids that never registered are ignored.
    /// When the last registered instance signals, the round completes and
    /// is cleared, so the next `mark_ready` starts a fresh round.
    pub fn mark_ready(&mut self, id: &KernelId) {
        if !self.bands.contains_key(id) {
            return;
        }
        self.ready.insert(id.clone());

        self.round_complete = self.ready.len() == self.bands.len();
        if self.round_complete {
            let participants = self.ready.len();
            self.ready.clear();
            debug!(run = %self.run_id, participants, "readiness round completed");
            self.audit_log
                .push(CoordinationEvent::RoundCompleted { participants });
        }
    }

    /// Returns whether the most recent `mark_ready` completed a round
    ///
    /// Edge-triggered: valid during the same logical step that set it; the
    /// next `mark_ready` that does not complete a round clears it.
    pub fn all_ready(&self) -> bool {
        self.round_complete
    }

    /// Tears down all registry state
    ///
    /// Bands, readiness and the max counter are destroyed; a registration
    /// after a reset starts band numbering over from 0. A fresh run id is
    /// drawn. Intended to run exactly once, after the last sibling's
    /// destruction-readiness round completes.
    pub fn reset(&mut self) {
        self.bands.clear();
        self.ready.clear();
        self.current_max = 0;
        self.round_complete = false;
        debug!(run = %self.run_id, "coordination context reset");
        self.audit_log.push(CoordinationEvent::ContextReset);
        self.run_id = RunId::new();
    }

    /// Returns a reference to the audit log
    pub fn audit_log(&self) -> &[CoordinationEvent] {
        &self.audit_log
    }

    /// Clears the audit log
    pub fn clear_audit_log(&mut self) {
        self.audit_log.clear();
    }
}

impl Default for CoordinationContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> KernelId {
        KernelId::new(name)
    }

    #[test]
    fn test_first_band_starts_at_zero() {
        let mut ctx = CoordinationContext::new();
        assert_eq!(ctx.band_of(&id("a")).unwrap(), 0);
        assert_eq!(ctx.max_band(), 0);
    }

    #[test]
    fn test_bands_are_disjoint_and_in_registration_order() {
        let mut ctx = CoordinationContext::new();
        let width = ctx.band_width();
        let names = ["c", "a", "b", "d"];
        let mut previous_end = 0;
        for (i, name) in names.iter().enumerate() {
            let base = ctx.band_of(&id(name)).unwrap();
            assert_eq!(base, i as u32 * width);
            assert_eq!(base, previous_end);
            previous_end = base + width;
        }
        assert_eq!(ctx.max_band(), 3 * width);
    }

    #[test]
    fn test_band_of_is_idempotent() {
        let mut ctx = CoordinationContext::new();
        let first = ctx.band_of(&id("a")).unwrap();
        ctx.band_of(&id("b")).unwrap();
        assert_eq!(ctx.band_of(&id("a")).unwrap(), first);
        assert_eq!(ctx.registered_count(), 2);
    }

    #[test]
    fn test_accessors_before_any_registration() {
        let ctx = CoordinationContext::new();
        assert_eq!(ctx.max_band(), 0);
        assert_eq!(ctx.registered_count(), 0);
        assert!(!ctx.all_ready());
        assert!(!ctx.is_registered(&id("a")));
    }

    #[test]
    fn test_registration_bound_is_enforced() {
        let mut ctx = CoordinationContext::with_limits(DEFAULT_BAND_WIDTH, 2).unwrap();
        ctx.band_of(&id("a")).unwrap();
        ctx.band_of(&id("b")).unwrap();
        assert_eq!(
            ctx.band_of(&id("c")),
            Err(ConfigError::TooManyKernels { max: 2 })
        );
        // A failed registration leaves no trace
        assert_eq!(ctx.registered_count(), 2);
        // Known ids still resolve
        assert_eq!(ctx.band_of(&id("b")).unwrap(), DEFAULT_BAND_WIDTH);
    }

    #[test]
    fn test_band_width_lower_bound() {
        assert_eq!(
            CoordinationContext::with_limits(2, 8).err(),
            Some(ConfigError::InvalidBandWidth {
                width: 2,
                min: RtosEventKind::COUNT
            })
        );
    }

    #[test]
    fn test_readiness_round_fires_exactly_once() {
        let mut ctx = CoordinationContext::new();
        for name in ["a", "b", "c"] {
            ctx.band_of(&id(name)).unwrap();
        }

        ctx.mark_ready(&id("a"));
        assert!(!ctx.all_ready());
        ctx.mark_ready(&id("b"));
        assert!(!ctx.all_ready());
        ctx.mark_ready(&id("c"));
        assert!(ctx.all_ready());

        // The round cleared itself; a new signal starts a fresh round
        ctx.mark_ready(&id("a"));
        assert!(!ctx.all_ready());
    }

    #[test]
    fn test_mark_ready_is_idempotent_within_a_round() {
        let mut ctx = CoordinationContext::new();
        ctx.band_of(&id("a")).unwrap();
        ctx.band_of(&id("b")).unwrap();

        ctx.mark_ready(&id("a"));
        ctx.mark_ready(&id("a"));
        assert!(!ctx.all_ready());
        ctx.mark_ready(&id("b"));
        assert!(ctx.all_ready());
    }

    #[test]
    fn test_mark_ready_ignores_unregistered_ids() {
        let mut ctx = CoordinationContext::new();
        ctx.band_of(&id("a")).unwrap();
        ctx.mark_ready(&id("ghost"));
        assert!(!ctx.all_ready());
        ctx.mark_ready(&id("a"));
        assert!(ctx.all_ready());
    }

    #[test]
    fn test_single_instance_round() {
        let mut ctx = CoordinationContext::new();
        ctx.band_of(&id("solo")).unwrap();
        ctx.mark_ready(&id("solo"));
        assert!(ctx.all_ready());
    }

    #[test]
    fn test_reset_restarts_band_numbering() {
        let mut ctx = CoordinationContext::new();
        ctx.band_of(&id("a")).unwrap();
        ctx.band_of(&id("b")).unwrap();
        let old_run = ctx.run_id();

        ctx.reset();
        assert_eq!(ctx.registered_count(), 0);
        assert_eq!(ctx.max_band(), 0);
        assert!(!ctx.all_ready());
        assert_ne!(ctx.run_id(), old_run);

        // Numbering starts over, not a continuation
        assert_eq!(ctx.band_of(&id("c")).unwrap(), 0);
    }

    #[test]
    fn test_audit_log_records_lifecycle() {
        let mut ctx = CoordinationContext::new();
        ctx.band_of(&id("a")).unwrap();
        ctx.mark_ready(&id("a"));
        ctx.reset();

        let log = ctx.audit_log();
        assert_eq!(log.len(), 3);
        assert_eq!(
            log[0],
            CoordinationEvent::BandAllocated {
                kernel: id("a"),
                base: 0
            }
        );
        assert_eq!(log[1], CoordinationEvent::RoundCompleted { participants: 1 });
        assert_eq!(log[2], CoordinationEvent::ContextReset);
    }
}
