//! Cyclic task execution model
//!
//! A task is an ordered sequence of execution segments walked by a cursor.
//! Stepping past the final segment wraps the cursor to the first one and
//! marks the completed cycle, which the caller reads back as a tagged
//! duration instead of inspecting cursor positions.

use crate::error::TaskError;
use serde::{Deserialize, Serialize};
use sim_types::TaskName;

/// One atomic unit of task execution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Actual execution time of the segment, in model seconds
    pub duration: f64,
    /// Worst-case execution time declared for analysis
    pub wcet: f64,
}

impl Segment {
    /// Creates a segment whose worst case equals its actual duration
    pub fn fixed(duration: f64) -> Result<Self, TaskError> {
        Self::with_wcet(duration, duration)
    }

    /// Creates a segment with a separate worst-case bound
    pub fn with_wcet(duration: f64, wcet: f64) -> Result<Self, TaskError> {
        if !duration.is_finite() || duration <= 0.0 {
            return Err(TaskError::InvalidDuration(duration));
        }
        if !wcet.is_finite() || wcet <= 0.0 {
            return Err(TaskError::InvalidDuration(wcet));
        }
        Ok(Self { duration, wcet })
    }
}

/// Duration of the segment under a task's cursor
///
/// `CycleCompleted` is reported exactly once after the final segment
/// finishes; its payload is the duration of the next cycle's first segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SegmentDuration {
    /// The cycle is still running; this segment's duration
    InProgress(f64),
    /// The cursor just wrapped; the next cycle's first-segment duration
    CycleCompleted(f64),
}

impl SegmentDuration {
    /// Returns the carried duration regardless of tag
    pub fn value(&self) -> f64 {
        match self {
            SegmentDuration::InProgress(d) | SegmentDuration::CycleCompleted(d) => *d,
        }
    }

    /// Returns whether this reading marks a completed cycle
    pub fn is_cycle_completed(&self) -> bool {
        matches!(self, SegmentDuration::CycleCompleted(_))
    }
}

/// A task under simulation: a segment sequence and a cursor cycling over it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimTask {
    name: TaskName,
    segments: Vec<Segment>,
    cursor: usize,
    /// Set when the cursor wraps, cleared by the next step
    wrapped: bool,
}

impl SimTask {
    /// Creates a task with no segments yet
    ///
    /// The task is not steppable until a segment is appended.
    pub fn new(name: TaskName) -> Self {
        Self {
            name,
            segments: Vec::new(),
            cursor: 0,
            wrapped: false,
        }
    }

    /// Returns the task's name
    pub fn name(&self) -> &TaskName {
        &self.name
    }

    /// Returns the number of segments in the sequence
    pub fn number_of_segments(&self) -> usize {
        self.segments.len()
    }

    /// Returns the duration of the segment under the cursor
    ///
    /// Tagged `CycleCompleted` when the previous step wrapped the cursor,
    /// in which case the payload is the first segment's duration for the
    /// cycle about to start.
    pub fn current_duration(&self) -> Result<SegmentDuration, TaskError> {
        let segment = self
            .segments
            .get(self.cursor)
            .ok_or_else(|| TaskError::EmptyTaskBody(self.name.clone()))?;
        if self.wrapped {
            Ok(SegmentDuration::CycleCompleted(segment.duration))
        } else {
            Ok(SegmentDuration::InProgress(segment.duration))
        }
    }

    /// Starts the segment under the cursor and advances to the next one
    ///
    /// Returns the index of the segment just started. Finishing the last
    /// segment wraps the cursor to index 0 and arms the cycle-completed
    /// tag for the next `current_duration` reading; the step after a wrap
    /// proceeds forward from index 0 as usual.
    pub fn process_segment(&mut self) -> Result<usize, TaskError> {
        if self.segments.is_empty() {
            return Err(TaskError::EmptyTaskBody(self.name.clone()));
        }
        let started = self.cursor;
        self.cursor = (started + 1) % self.segments.len();
        self.wrapped = started == self.segments.len() - 1;
        Ok(started)
    }

    /// Appends a segment to the sequence
    ///
    /// On an empty task this establishes a fresh first segment under the
    /// cursor; otherwise the cursor is left where it is.
    pub fn add_instruction(&mut self, segment: Segment) {
        if self.segments.is_empty() {
            self.cursor = 0;
            self.wrapped = false;
        }
        self.segments.push(segment);
    }

    /// Empties the segment sequence
    ///
    /// Used when a task is fully reset between logical jobs. The task is
    /// not steppable again until a segment is appended.
    pub fn discard_instructions(&mut self) {
        self.segments.clear();
        self.cursor = 0;
        self.wrapped = false;
    }
}
