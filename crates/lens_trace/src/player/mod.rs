//! Trace playback.
//!
//! The trace itself is stateless. A [`TracePlayer`] pairs it with the
//! externally driven cursor the widget displays.

use crate::{Step, Trace};

/// A trace plus the index of the step on display.
#[derive(Clone, Debug, Default)]
pub struct TracePlayer {
    trace: Trace,
    current: Option<usize>,
}

impl TracePlayer {
    /// Start at the first step, if there is one.
    pub fn new(trace: Trace) -> Self {
        let current = if trace.is_empty() { None } else { Some(0) };
        TracePlayer { trace, current }
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    pub fn len(&self) -> usize {
        self.trace.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trace.is_empty()
    }

    /// Index of the step on display.
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn current_step(&self) -> Option<&Step> {
        self.trace.get(self.current?)
    }

    /// Jump to `index`. Out-of-range indices leave the cursor unchanged.
    pub fn seek(&mut self, index: usize) -> Option<&Step> {
        if index < self.trace.len() {
            self.current = Some(index);
        }
        self.current_step()
    }

    /// Advance one step, stopping at the last.
    #[allow(clippy::should_implement_trait, reason = "moves a cursor, does not consume")]
    pub fn next(&mut self) -> Option<&Step> {
        let index = self.current.map_or(0, |i| i + 1);
        self.seek(index)
    }

    /// Go back one step, stopping at the first.
    pub fn prev(&mut self) -> Option<&Step> {
        let index = self.current.map_or(0, |i| i.saturating_sub(1));
        self.seek(index)
    }

    /// Drop the trace and the cursor.
    pub fn reset(&mut self) {
        *self = TracePlayer::default();
    }
}
