//! # Simulation Base Types
//!
//! Shared value types for the co-simulation core: instance and task
//! identifiers, simulated time, RTOS event kinds, and priority tags.
//!
//! ## Philosophy
//!
//! - **Names over handles**: kernel instances and tasks are identified by
//!   caller-supplied names, matching the configuration records they come
//!   from. Nothing here invents identity behind the caller's back.
//! - **Determinism first**: every type in this crate has a total order or a
//!   stable representation, so collections built on them iterate the same
//!   way on every run.
//! - **No behavior**: this is a leaf crate. The stepping protocol, the
//!   registry, and the queue live elsewhere and depend on these types, never
//!   the other way around.

pub mod events;
pub mod ids;
pub mod priority;
pub mod time;

pub use events::{RtosEvent, RtosEventKind};
pub use ids::{KernelId, RunId, TaskName};
pub use priority::{NativePriority, PriorityBand, PriorityTag};
pub use time::{SimTime, TimeResolution};
