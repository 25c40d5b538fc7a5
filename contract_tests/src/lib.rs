//! # Co-Simulation Contract Tests
//!
//! This crate provides "golden" tests for the cross-crate contracts of
//! the co-simulation core, so they don't drift accidentally over time.
//!
//! ## Philosophy
//!
//! - **Explicit over implicit**: The stepping and lifecycle protocols are
//!   written down as executable scenarios
//! - **Testability first**: Contract tests fail when observable queue or
//!   rendezvous behavior changes
//! - **Mechanism not policy**: Verify what every driver can rely on, not
//!   one driver's usage pattern
//!
//! ## Structure
//!
//! - [`multiplex`] — band disjointness and the shared-queue wakeup search
//! - [`lifecycle`] — workload/finish rendezvous and run teardown
//! - [`descriptors`] — wire shape of the configuration records

pub mod descriptors;
pub mod lifecycle;
pub mod multiplex;

/// Common helpers for driving multi-instance scenarios
pub mod test_helpers {
    use sched_kernel::{
        CoordinationContext, KernelConfig, KernelInstance, SchedulingPolicy, TaskDescriptor,
    };
    use sim_types::{KernelId, TimeResolution};

    /// Builds a single-core EDF configuration with the given task names
    pub fn kernel_config(name: &str, task_names: &[&str]) -> KernelConfig {
        KernelConfig {
            name: KernelId::new(name),
            policy: SchedulingPolicy::EarliestDeadlineFirst,
            core_count: 1,
            time_resolution: TimeResolution::MilliSeconds,
            tasks: task_names
                .iter()
                .map(|t| TaskDescriptor::periodic(*t, 0.01, 0.01))
                .collect(),
        }
    }

    /// Constructs and registers an instance with one task named `tau_1`
    pub fn simple_instance(ctx: &mut CoordinationContext, name: &str) -> KernelInstance {
        KernelInstance::new(ctx, kernel_config(name, &["tau_1"]))
            .expect("valid configuration must construct")
    }

    /// Serializes a descriptor to the canonical JSON the contract pins
    pub fn to_canonical_json<T: serde::Serialize>(value: &T) -> String {
        serde_json::to_string_pretty(value).expect("descriptor types serialize infallibly")
    }
}
