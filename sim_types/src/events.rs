//! RTOS events
//!
//! The scheduling engine behind each kernel instance is an opaque producer
//! of timed events. The co-simulation core only distinguishes the handful
//! of subtypes the outer driver reacts to; everything else is `Other`.

use crate::ids::TaskName;
use crate::priority::NativePriority;
use crate::time::SimTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The event subtypes a scheduling engine can raise
///
/// Each kind maps to a fixed native priority, which doubles as the
/// tie-break between events of one instance occurring at the same tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RtosEventKind {
    /// A task finished one time-consuming instruction
    InstructionEnd,
    /// A task finished its whole job
    TaskEnd,
    /// The scheduler moved a running task off its core
    Preemption,
    /// Any other engine-internal event (arrivals, dispatch, ...)
    Other,
}

impl RtosEventKind {
    /// Number of distinct event subtypes
    ///
    /// The configured band width must be at least this large.
    pub const COUNT: u32 = 4;

    /// Returns the native priority identifying this subtype
    pub fn native_priority(&self) -> NativePriority {
        let value = match self {
            RtosEventKind::InstructionEnd => 0,
            RtosEventKind::TaskEnd => 1,
            RtosEventKind::Preemption => 2,
            RtosEventKind::Other => 3,
        };
        NativePriority::new(value)
    }

    /// Recovers the subtype from a native priority, if it names one
    pub fn from_native_priority(native: NativePriority) -> Option<Self> {
        match native.value() {
            0 => Some(RtosEventKind::InstructionEnd),
            1 => Some(RtosEventKind::TaskEnd),
            2 => Some(RtosEventKind::Preemption),
            3 => Some(RtosEventKind::Other),
            _ => None,
        }
    }
}

impl fmt::Display for RtosEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RtosEventKind::InstructionEnd => "InstructionEnd",
            RtosEventKind::TaskEnd => "TaskEnd",
            RtosEventKind::Preemption => "Preemption",
            RtosEventKind::Other => "Other",
        };
        write!(f, "{}", name)
    }
}

/// A timed event delivered to a kernel instance
///
/// The payload side of a queue entry. The band tagging lives in the queue
/// key, never here, so an event reads the same before and after it passes
/// through the shared queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RtosEvent {
    /// The event subtype
    pub kind: RtosEventKind,
    /// The task that generated the event
    pub task: TaskName,
    /// Occurrence time on the shared axis
    pub time: SimTime,
}

impl RtosEvent {
    /// Creates an event
    pub fn new(kind: RtosEventKind, task: TaskName, time: SimTime) -> Self {
        Self { kind, task, time }
    }
}

impl fmt::Display for RtosEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{} by {}", self.kind, self.time, self.task)
    }
}
