//! Shared-queue multiplexing contract tests
//!
//! These tests define the stable contract between kernel instances and the
//! shared event queue: disjoint band allocation, and a wakeup search that
//! sees exactly the instance's own timeline.

use event_queue::GlobalEventQueue;
use sched_kernel::KernelInstance;
use sim_types::{RtosEventKind, SimTime, TaskName};

pub fn at(ticks: u64) -> SimTime {
    SimTime::from_ticks(ticks)
}

pub fn schedule(
    inst: &KernelInstance,
    queue: &mut GlobalEventQueue,
    ticks: u64,
    kind: RtosEventKind,
) {
    inst.schedule_event(queue, at(ticks), kind, TaskName::new("tau_1"))
        .expect("native priority fits the band");
}
