//! Timeline - simulated clock and delayed actions

use super::Simulation;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

/// Work scheduled to run at a later simulated time
pub type DelayedAction = Box<dyn FnOnce(&mut Simulation) + Send>;

/// Clock and delayed-callback primitive the pipeline consumes.
/// The simulation only schedules through this; driving time is the
/// caller's job.
pub trait Timeline: Send {
    fn now(&self) -> Duration;

    /// Move the clock forward; never moves it backwards
    fn advance_to(&mut self, time: Duration);

    fn schedule(&mut self, at: Duration, action: DelayedAction);

    /// Earliest action due at or before `until`
    fn pop_due(&mut self, until: Duration) -> Option<(Duration, DelayedAction)>;

    fn pending(&self) -> usize;

    /// Drop pending actions and rewind to zero
    fn clear(&mut self);
}

struct Entry {
    at: Duration,
    seq: u64,
    action: DelayedAction,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // Reversed so the max-heap pops the earliest action, first-scheduled first
    fn cmp(&self, other: &Self) -> Ordering {
        other.at.cmp(&self.at).then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Default timeline: a min-heap of delayed actions, stable on ties
#[derive(Default)]
pub struct ActionQueue {
    now: Duration,
    next_seq: u64,
    heap: BinaryHeap<Entry>,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Timeline for ActionQueue {
    fn now(&self) -> Duration {
        self.now
    }

    fn advance_to(&mut self, time: Duration) {
        self.now = self.now.max(time);
    }

    fn schedule(&mut self, at: Duration, action: DelayedAction) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry { at, seq, action });
    }

    fn pop_due(&mut self, until: Duration) -> Option<(Duration, DelayedAction)> {
        if self.heap.peek()?.at > until {
            return None;
        }
        self.heap.pop().map(|entry| (entry.at, entry.action))
    }

    fn pending(&self) -> usize {
        self.heap.len()
    }

    fn clear(&mut self) {
        self.heap.clear();
        self.now = Duration::ZERO;
        self.next_seq = 0;
    }
}

impl std::fmt::Debug for ActionQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionQueue")
            .field("now", &self.now)
            .field("pending", &self.heap.len())
            .finish()
    }
}
