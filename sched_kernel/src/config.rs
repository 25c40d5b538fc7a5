//! Configuration descriptors for kernel instances
//!
//! One [`KernelConfig`] is consumed once, at construction. Validation is
//! all-or-nothing: a descriptor that fails any check leaves no instance
//! behind (and no band allocated).

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use sim_types::{KernelId, TaskName, TimeResolution};
use std::collections::BTreeSet;
use std::fmt;

/// How a task gets activated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskKind {
    /// Activated by a timer every inter-arrival time
    Periodic,
    /// Activated by an external request, no minimum separation
    Aperiodic,
    /// Activated by an external event with a minimum inter-arrival time
    Sporadic,
}

/// One row of the task-set description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDescriptor {
    /// Activation model
    pub kind: TaskKind,
    /// Unique name within the instance; doubles as the port map key
    pub name: TaskName,
    /// Period (periodic) or minimum separation (sporadic), in seconds;
    /// ignored for aperiodic tasks
    pub inter_arrival_time: f64,
    /// Relative deadline, in seconds
    pub relative_deadline: f64,
    /// Activation offset from the start of the run, in seconds
    pub phase: f64,
    /// Explicit priority, only meaningful under priority-driven policies
    #[serde(default)]
    pub priority: Option<u32>,
}

impl TaskDescriptor {
    /// Creates a periodic task descriptor with zero phase
    pub fn periodic(name: impl Into<TaskName>, period: f64, deadline: f64) -> Self {
        Self {
            kind: TaskKind::Periodic,
            name: name.into(),
            inter_arrival_time: period,
            relative_deadline: deadline,
            phase: 0.0,
            priority: None,
        }
    }

    /// Creates an aperiodic task descriptor
    pub fn aperiodic(name: impl Into<TaskName>, deadline: f64) -> Self {
        Self {
            kind: TaskKind::Aperiodic,
            name: name.into(),
            // Unused for aperiodic activation; kept positive so the record
            // validates uniformly.
            inter_arrival_time: deadline,
            relative_deadline: deadline,
            phase: 0.0,
            priority: None,
        }
    }
}

/// The scheduling policy run by the engine behind an instance
///
/// The policy itself is opaque to the co-simulation core; it is carried so
/// the engine glue can construct the right scheduler, and so descriptor
/// validation can reject options the policy cannot honor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SchedulingPolicy {
    EarliestDeadlineFirst,
    FixedPriority,
    DeadlineMonotonic,
    RoundRobin,
    /// Engine-specific policy, passed through by name
    Custom { name: String, params: Vec<f64> },
}

impl SchedulingPolicy {
    /// Returns whether explicit per-task priorities are honored
    pub fn honors_explicit_priorities(&self) -> bool {
        matches!(
            self,
            SchedulingPolicy::FixedPriority | SchedulingPolicy::Custom { .. }
        )
    }
}

impl fmt::Display for SchedulingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulingPolicy::EarliestDeadlineFirst => write!(f, "EarliestDeadlineFirst"),
            SchedulingPolicy::FixedPriority => write!(f, "FixedPriority"),
            SchedulingPolicy::DeadlineMonotonic => write!(f, "DeadlineMonotonic"),
            SchedulingPolicy::RoundRobin => write!(f, "RoundRobin"),
            SchedulingPolicy::Custom { name, .. } => write!(f, "Custom({})", name),
        }
    }
}

/// Full configuration of one kernel instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KernelConfig {
    /// Unique instance name
    pub name: KernelId,
    /// Scheduling policy for the engine
    pub policy: SchedulingPolicy,
    /// Number of CPU cores the engine simulates
    pub core_count: u32,
    /// Tick resolution of the shared time axis
    #[serde(default)]
    pub time_resolution: TimeResolution,
    /// Task-set description, in port order
    pub tasks: Vec<TaskDescriptor>,
}

impl KernelConfig {
    /// Validates the whole descriptor
    ///
    /// Checks run in declaration order and stop at the first failure, so
    /// error messages point at one concrete field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.core_count == 0 {
            return Err(ConfigError::InvalidCoreCount(self.core_count));
        }
        if self.tasks.is_empty() {
            return Err(ConfigError::EmptyTaskSet(self.name.clone()));
        }

        let mut seen = BTreeSet::new();
        for task in &self.tasks {
            if !seen.insert(task.name.clone()) {
                return Err(ConfigError::DuplicateTaskName(task.name.clone()));
            }
            if !task.inter_arrival_time.is_finite() || task.inter_arrival_time <= 0.0 {
                return Err(ConfigError::InvalidInterArrivalTime {
                    task: task.name.clone(),
                    value: task.inter_arrival_time,
                });
            }
            if !task.relative_deadline.is_finite() || task.relative_deadline <= 0.0 {
                return Err(ConfigError::InvalidDeadline {
                    task: task.name.clone(),
                    value: task.relative_deadline,
                });
            }
            if !task.phase.is_finite() || task.phase < 0.0 {
                return Err(ConfigError::InvalidPhase {
                    task: task.name.clone(),
                    value: task.phase,
                });
            }
            if task.priority.is_some() && !self.policy.honors_explicit_priorities() {
                return Err(ConfigError::PriorityNotApplicable {
                    task: task.name.clone(),
                    policy: self.policy.to_string(),
                });
            }
        }
        Ok(())
    }
}
