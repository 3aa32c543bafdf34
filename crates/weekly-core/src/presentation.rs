//! Reveal/settle cycle for content changes.
//!
//! Each time new content is observed the previous value becomes the diff
//! baseline. A change is shown as a diff (`Revealing`) until its deadline
//! passes, then collapses back to plain content (`Settled`). Deadlines are
//! plain `Instant`s checked by [`DiffPresentation::tick`], so the whole
//! cycle can be stepped with a [`crate::clock::ManualClock`].

use crate::diff::{compute_diff, DiffSegment};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// Timings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealTimings {
    /// How long the "just updated" highlight stays on.
    pub pulse: Duration,
    /// How long a diff stays visible before settling.
    pub reveal: Duration,
}

impl Default for RevealTimings {
    fn default() -> Self {
        Self {
            pulse: Duration::from_secs(2),
            reveal: Duration::from_secs(5),
        }
    }
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Nothing observed yet, or the view was torn down.
    Idle,
    Revealing,
    Settled,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Revealing => "revealing",
            Phase::Settled => "settled",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only copy of the presentation handed to the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresentationSnapshot {
    pub phase: Phase,
    pub segments: Vec<DiffSegment>,
    pub pulse: bool,
}

// ---------------------------------------------------------------------------
// DiffPresentation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct DiffPresentation {
    timings: RevealTimings,
    previous_content: String,
    segments: Vec<DiffSegment>,
    phase: Phase,
    pulse: bool,
    pulse_deadline: Option<Instant>,
    settle_deadline: Option<Instant>,
    torn_down: bool,
}

impl DiffPresentation {
    pub fn new(timings: RevealTimings) -> Self {
        Self {
            timings,
            previous_content: String::new(),
            segments: Vec::new(),
            phase: Phase::Idle,
            pulse: false,
            pulse_deadline: None,
            settle_deadline: None,
            torn_down: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn segments(&self) -> &[DiffSegment] {
        &self.segments
    }

    pub fn pulse(&self) -> bool {
        self.pulse
    }

    pub fn previous_content(&self) -> &str {
        &self.previous_content
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Record a content value. Returns `true` when a diff started revealing.
    ///
    /// The first non-empty assignment and repeats of the current value never
    /// reveal. Every observed value becomes the next baseline.
    pub fn observe(&mut self, content: &str, now: Instant) -> bool {
        if self.torn_down {
            return false;
        }
        self.tick(now);

        let revealed = content != self.previous_content && !self.previous_content.is_empty();
        if revealed {
            self.settle_deadline = None;
            self.segments = compute_diff(&self.previous_content, content);
            self.phase = Phase::Revealing;
            self.pulse = true;
            // A duration past the clock's range means the deadline never fires.
            self.pulse_deadline = now.checked_add(self.timings.pulse);
            self.settle_deadline = now.checked_add(self.timings.reveal);
        } else if self.phase == Phase::Idle {
            self.phase = Phase::Settled;
        }

        self.previous_content.clear();
        self.previous_content.push_str(content);
        revealed
    }

    /// Apply every deadline that has passed at `now`.
    pub fn tick(&mut self, now: Instant) {
        if self.pulse_deadline.is_some_and(|d| d <= now) {
            self.pulse = false;
            self.pulse_deadline = None;
        }
        if self.settle_deadline.is_some_and(|d| d <= now) {
            self.phase = Phase::Settled;
            self.segments.clear();
            self.settle_deadline = None;
        }
    }

    /// Earliest pending deadline, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.pulse_deadline, self.settle_deadline) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Release all pending deadlines. Later observations are ignored.
    pub fn teardown(&mut self) {
        self.pulse_deadline = None;
        self.settle_deadline = None;
        self.segments.clear();
        self.pulse = false;
        self.phase = Phase::Idle;
        self.torn_down = true;
    }

    pub fn snapshot(&self) -> PresentationSnapshot {
        PresentationSnapshot {
            phase: self.phase,
            segments: self.segments.clone(),
            pulse: self.pulse,
        }
    }
}

impl Default for DiffPresentation {
    fn default() -> Self {
        Self::new(RevealTimings::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
