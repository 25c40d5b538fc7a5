//! Kernel instances and the co-simulation stepping protocol
//!
//! A [`KernelInstance`] wraps one scheduling engine behind a band-tagged
//! view of the shared event queue. The outer driver steps every instance
//! once per tick: ask for the next wakeup time, consume events while they
//! sit on the tick boundary, then move on. All the multiplexing logic
//! lives in the wakeup search; the queue itself stays band-agnostic.

use crate::config::{KernelConfig, SchedulingPolicy, TaskKind};
use crate::coordination::CoordinationContext;
use crate::error::ConfigError;
use crate::task::{Segment, SimTask};
use event_queue::{QueueKey, SharedEventQueue};
use sim_types::{
    KernelId, NativePriority, PriorityBand, PriorityTag, RtosEvent, RtosEventKind, SimTime,
    TaskName, TimeResolution,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, trace};

/// One scheduling-kernel instance participating in a co-simulation run
#[derive(Debug)]
pub struct KernelInstance {
    id: KernelId,
    band: PriorityBand,
    policy: SchedulingPolicy,
    core_count: u32,
    time_resolution: TimeResolution,
    tasks: Vec<SimTask>,
    /// task-name/output-port correspondence, in descriptor order
    ports: BTreeMap<TaskName, usize>,
    /// Tasks whose current job has already been announced to the driver
    jobs_started: BTreeMap<TaskName, bool>,
    /// Tasks whose ports must fire on the next driver poll
    trigger_queue: BTreeSet<TaskName>,
    /// request-index/task correspondence for aperiodic activation
    aperiodic_requests: BTreeMap<usize, TaskName>,
}

impl KernelInstance {
    /// Constructs an instance from a validated configuration
    ///
    /// Registration with the coordination context happens here: the
    /// instance receives its priority band before any event is raised.
    /// Validation failures leave the context untouched.
    pub fn new(
        ctx: &mut CoordinationContext,
        config: KernelConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let base = ctx.band_of(&config.name)?;
        let band = PriorityBand::new(base, ctx.band_width());

        let mut tasks = Vec::with_capacity(config.tasks.len());
        let mut ports = BTreeMap::new();
        let mut jobs_started = BTreeMap::new();
        let mut aperiodic_requests = BTreeMap::new();
        for (port, descriptor) in config.tasks.iter().enumerate() {
            tasks.push(SimTask::new(descriptor.name.clone()));
            ports.insert(descriptor.name.clone(), port);
            jobs_started.insert(descriptor.name.clone(), false);
            if descriptor.kind == TaskKind::Aperiodic {
                let request = aperiodic_requests.len();
                aperiodic_requests.insert(request, descriptor.name.clone());
            }
        }

        debug!(kernel = %config.name, %band, tasks = tasks.len(), "kernel instance constructed");
        Ok(Self {
            id: config.name,
            band,
            policy: config.policy,
            core_count: config.core_count,
            time_resolution: config.time_resolution,
            tasks,
            ports,
            jobs_started,
            trigger_queue: BTreeSet::new(),
            aperiodic_requests,
        })
    }

    /// Returns the instance's id
    pub fn id(&self) -> &KernelId {
        &self.id
    }

    /// Returns the priority band owned by this instance
    pub fn band(&self) -> PriorityBand {
        self.band
    }

    /// Returns the scheduling policy of the engine behind this instance
    pub fn policy(&self) -> &SchedulingPolicy {
        &self.policy
    }

    /// Returns the number of simulated cores
    pub fn core_count(&self) -> u32 {
        self.core_count
    }

    /// Returns the tick resolution of this instance
    pub fn time_resolution(&self) -> TimeResolution {
        self.time_resolution
    }

    /// Returns the task with the given name
    pub fn task(&self, name: &TaskName) -> Option<&SimTask> {
        let port = *self.ports.get(name)?;
        self.tasks.get(port)
    }

    /// Returns the task with the given name, mutably
    pub fn task_mut(&mut self, name: &TaskName) -> Option<&mut SimTask> {
        let port = *self.ports.get(name)?;
        self.tasks.get_mut(port)
    }

    /// Returns the output port wired to a task
    pub fn port_of(&self, name: &TaskName) -> Option<usize> {
        self.ports.get(name).copied()
    }

    /// Tags a native priority into this instance's band
    ///
    /// A priority at or past the band width means the declared width does
    /// not cover the engine's event subtypes, which is fatal for the run.
    pub fn tag_priority(&self, native: NativePriority) -> Result<PriorityTag, ConfigError> {
        self.band
            .tag(native)
            .ok_or(ConfigError::NativePriorityOutOfRange {
                native: native.value(),
                width: self.band.width(),
            })
    }

    /// Inserts an event raised by this instance into the shared queue
    pub fn schedule_event(
        &self,
        queue: &mut impl SharedEventQueue,
        time: SimTime,
        kind: RtosEventKind,
        task: TaskName,
    ) -> Result<QueueKey, ConfigError> {
        let tag = self.tag_priority(kind.native_priority())?;
        let key = queue.insert(tag, time, RtosEvent::new(kind, task, time));
        trace!(kernel = %self.id, %key, "scheduled event");
        Ok(key)
    }

    /// Returns the time of this instance's earliest pending event
    ///
    /// `None` means no pending event, a legitimate terminal condition for
    /// the instance, never an error.
    pub fn next_event_time(
        &self,
        queue: &impl SharedEventQueue,
        ctx: &CoordinationContext,
    ) -> Option<SimTime> {
        self.earliest_in_band(queue, ctx).map(|key| key.time)
    }

    /// Removes and returns this instance's earliest pending event
    pub fn consume_event(
        &self,
        queue: &mut impl SharedEventQueue,
        ctx: &CoordinationContext,
    ) -> Option<RtosEvent> {
        let key = self.earliest_in_band(queue, ctx)?;
        queue.remove(&key)
    }

    /// Finds the key of this instance's earliest event in the shared queue
    ///
    /// Starts from the globally earliest entry and hops in key order. A
    /// candidate below this band probes forward to the band's floor at the
    /// candidate's time; a candidate above probes past the highest band,
    /// landing on the next occupied time. Each hop strictly advances, so
    /// the scan visits at most one candidate per (time, band) pair.
    fn earliest_in_band(
        &self,
        queue: &impl SharedEventQueue,
        ctx: &CoordinationContext,
    ) -> Option<QueueKey> {
        let (mut key, _) = queue.peek_earliest()?;
        loop {
            if self.band.contains(&key.tag) {
                return Some(key);
            }
            let probe = if key.tag.band_base() < self.band.base() {
                PriorityTag::new(self.band.base(), NativePriority::new(0))
            } else {
                // Past every allocated band: no tag at this time matches,
                // so the probe lands on the next occupied time
                PriorityTag::new(
                    ctx.max_band().saturating_add(ctx.band_width()),
                    NativePriority::new(0),
                )
            };
            match queue.first_at_or_after(key.time, probe) {
                Some((next, _)) => key = next,
                None => return None,
            }
        }
    }

    /// Seeds every task's first segment from a workload vector
    ///
    /// Durations arrive in port order, one per task. Once all segments are
    /// placed the instance signals workload readiness; when the last
    /// sibling does the same, the collective start condition fires.
    pub fn load_workload(
        &mut self,
        ctx: &mut CoordinationContext,
        durations: &[f64],
    ) -> Result<(), ConfigError> {
        if durations.len() != self.tasks.len() {
            return Err(ConfigError::WorkloadSizeMismatch {
                expected: self.tasks.len(),
                got: durations.len(),
            });
        }
        // All-or-nothing: every duration is validated before any task is
        // touched, so a failed load can be corrected and retried without
        // leaving earlier tasks double-seeded.
        let mut segments = Vec::with_capacity(durations.len());
        for (task, &duration) in self.tasks.iter().zip(durations) {
            let segment =
                Segment::fixed(duration).map_err(|_| ConfigError::InvalidWorkloadDuration {
                    task: task.name().clone(),
                    value: duration,
                })?;
            segments.push(segment);
        }
        for (task, segment) in self.tasks.iter_mut().zip(segments) {
            task.add_instruction(segment);
        }
        debug!(kernel = %self.id, "workload loaded");
        ctx.mark_ready(&self.id);
        Ok(())
    }

    /// Activates aperiodic tasks by request index
    ///
    /// Each index refers to an aperiodic task in descriptor order. An
    /// activation enqueues an engine event at `time` and queues the task
    /// for port triggering.
    pub fn activate_aperiodic(
        &mut self,
        queue: &mut impl SharedEventQueue,
        requests: &[usize],
        time: SimTime,
    ) -> Result<(), ConfigError> {
        for &request in requests {
            let task = self
                .aperiodic_requests
                .get(&request)
                .cloned()
                .ok_or(ConfigError::UnknownAperiodicRequest(request))?;
            self.schedule_event(queue, time, RtosEventKind::Other, task.clone())?;
            self.trigger_queue.insert(task);
        }
        Ok(())
    }

    /// Queues one task for port triggering on the next driver poll
    pub fn add_task_to_trigger_queue(&mut self, name: &TaskName) {
        if self.ports.contains_key(name) {
            self.trigger_queue.insert(name.clone());
        }
    }

    /// Queues every newly running task whose job start was not yet announced
    ///
    /// Tasks already marked keep their mark; the driver clears it when the
    /// job finishes.
    pub fn mark_new_scheduled_tasks(&mut self, running: &[TaskName]) {
        for name in running {
            match self.jobs_started.get_mut(name) {
                Some(started) if !*started => {
                    *started = true;
                    self.trigger_queue.insert(name.clone());
                }
                _ => {}
            }
        }
    }

    /// Clears a task's job-start mark so its next job is announced again
    pub fn clear_start_task_mark(&mut self, name: &TaskName) {
        if let Some(started) = self.jobs_started.get_mut(name) {
            *started = false;
        }
    }

    /// Returns whether a task's current job start was announced
    pub fn job_started(&self, name: &TaskName) -> bool {
        self.jobs_started.get(name).copied().unwrap_or(false)
    }

    /// Drains the trigger queue into output-port indices
    ///
    /// Ports come out in ascending order; the queue is left empty.
    pub fn ports_to_trigger(&mut self) -> Vec<usize> {
        let names = std::mem::take(&mut self.trigger_queue);
        let mut ports: Vec<usize> = names
            .iter()
            .filter_map(|name| self.ports.get(name).copied())
            .collect();
        ports.sort_unstable();
        ports
    }

    /// Destroys the instance, completing the finish rendezvous
    ///
    /// Signals destruction readiness; when this was the last live sibling,
    /// the shared queue is wiped and the coordination context reset so the
    /// next run in this process starts clean. Returns whether this call
    /// performed the teardown.
    pub fn retire(
        self,
        ctx: &mut CoordinationContext,
        queue: &mut impl SharedEventQueue,
    ) -> bool {
        ctx.mark_ready(&self.id);
        if ctx.all_ready() {
            queue.clear();
            ctx.reset();
            debug!(kernel = %self.id, "last instance retired, run state torn down");
            true
        } else {
            debug!(kernel = %self.id, "instance retired");
            false
        }
    }
}
