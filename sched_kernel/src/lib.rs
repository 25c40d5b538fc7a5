//! # Scheduling-Kernel Co-Simulation Core
//!
//! Runs N independent scheduling-kernel instances against one shared,
//! globally ordered event queue, on one shared time axis, under one
//! external driver.
//!
//! ## Philosophy
//!
//! - **Explicit coordination**: all run-wide state (band registry,
//!   readiness barrier) lives in a [`CoordinationContext`] the driver
//!   constructs and injects. No globals, no singletons; two runs can
//!   coexist in one process.
//! - **Bands over queues**: instead of a queue per instance, every
//!   instance tags its events into a disjoint priority band of the one
//!   shared queue. Cross-instance ordering comes for free; per-instance
//!   views are recovered by a directed key-order search.
//! - **Cooperative stepping**: the driver owns the clock. Instances never
//!   block; "waiting" is returning `None` from `next_event_time`.
//!
//! ## Crate layout
//!
//! - [`config`] — task-set and policy descriptors, validated up front.
//! - [`coordination`] — band allocation and the readiness rendezvous.
//! - [`instance`] — the per-kernel stepping protocol.
//! - [`task`] — the cyclic segment execution model.
//! - [`error`] — configuration and task-contract errors.

pub mod config;
pub mod coordination;
pub mod error;
pub mod instance;
pub mod task;

pub use config::{KernelConfig, SchedulingPolicy, TaskDescriptor, TaskKind};
pub use coordination::{
    CoordinationContext, CoordinationEvent, DEFAULT_BAND_WIDTH, DEFAULT_MAX_KERNELS,
};
pub use error::{ConfigError, TaskError};
pub use instance::KernelInstance;
pub use task::{Segment, SegmentDuration, SimTask};
