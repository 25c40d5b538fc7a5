//! Error types for configuration and task-model violations

use sim_types::{KernelId, TaskName};
use thiserror::Error;

/// Non-recoverable configuration errors
///
/// Raised before a run starts; a kernel instance whose configuration fails
/// validation is never constructed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A kernel instance needs at least one task
    #[error("kernel {0} has an empty task set")]
    EmptyTaskSet(KernelId),

    /// Task names must be unique within an instance
    #[error("duplicate task name {0}")]
    DuplicateTaskName(TaskName),

    /// Periodic and sporadic tasks need a positive inter-arrival time
    #[error("task {task}: inter-arrival time {value} is not positive")]
    InvalidInterArrivalTime { task: TaskName, value: f64 },

    /// Relative deadlines must be positive
    #[error("task {task}: relative deadline {value} is not positive")]
    InvalidDeadline { task: TaskName, value: f64 },

    /// Activation phases must be non-negative
    #[error("task {task}: phase {value} is negative")]
    InvalidPhase { task: TaskName, value: f64 },

    /// At least one core is required
    #[error("core count must be at least 1, got {0}")]
    InvalidCoreCount(u32),

    /// Explicit task priorities only make sense under a priority-driven policy
    #[error("task {task}: explicit priority is not applicable under policy {policy}")]
    PriorityNotApplicable { task: TaskName, policy: String },

    /// The band width must cover every event subtype an instance can raise
    #[error("band width {width} is below the minimum of {min}")]
    InvalidBandWidth { width: u32, min: u32 },

    /// The registry was sized for fewer instances
    #[error("cannot register another kernel: the registry is sized for {max} instances")]
    TooManyKernels { max: usize },

    /// A native priority fell outside the configured band width
    #[error("native priority {native} outside [0, {width})")]
    NativePriorityOutOfRange { native: u32, width: u32 },

    /// Workload durations must match the task set one-to-one
    #[error("workload has {got} durations for {expected} tasks")]
    WorkloadSizeMismatch { expected: usize, got: usize },

    /// A fed duration could not be turned into a segment
    #[error("task {task}: workload duration {value} is not a positive finite number")]
    InvalidWorkloadDuration { task: TaskName, value: f64 },

    /// An aperiodic activation request index with no matching task
    #[error("no aperiodic task for activation request index {0}")]
    UnknownAperiodicRequest(usize),
}

/// Violations of the cyclic task execution contract
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TaskError {
    /// The task has no segments; append one before stepping it
    #[error("task {0} has an empty segment sequence")]
    EmptyTaskBody(TaskName),

    /// Segment durations must be positive finite numbers
    #[error("segment duration {0} is not a positive finite number")]
    InvalidDuration(f64),
}
