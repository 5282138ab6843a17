//! Cancellable timed tasks on one logical clock.
//!
//! [`Timeline`] is the only source of deferred work in the session worker:
//! animation pacing, the auto-mode continuation and the end-of-battle
//! teardown are all entries here. Time is measured as an offset from the
//! worker's origin so the same code runs against tokio's paused test clock.
//!
//! Popping an entry moves the logical clock to the entry's due time (not to
//! the wall clock), so delays scheduled from inside a callback chain exactly
//! regardless of how late the worker woke up.
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

use crate::playback::PlaybackTask;
use crate::session::SessionToken;

/// Handle to a scheduled entry, usable for targeted cancellation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

/// Deferred work understood by the session worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Task {
    Playback(PlaybackTask),
    AutoContinue,
}

/// A task bound to the session that scheduled it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Scheduled {
    pub session: SessionToken,
    pub task: Task,
}

impl Scheduled {
    pub const fn new(session: SessionToken, task: Task) -> Self {
        Self { session, task }
    }

    pub fn is_playback(&self) -> bool {
        matches!(self.task, Task::Playback(_))
    }
}

pub type SessionTimeline = Timeline<Scheduled>;

struct Entry<T> {
    due: Duration,
    id: TaskId,
    payload: T,
}

// Min-heap on (due, id): earlier deadlines first, FIFO among equal deadlines.
impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        (other.due, other.id).cmp(&(self.due, self.id))
    }
}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.id == other.id
    }
}

impl<T> Eq for Entry<T> {}

/// Priority queue of deferred tasks with cancellation.
pub struct Timeline<T> {
    now: Duration,
    next_id: u64,
    queue: BinaryHeap<Entry<T>>,
}

impl<T> Timeline<T> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            queue: BinaryHeap::new(),
        }
    }

    /// Current logical time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Moves the logical clock forward to `now` (never backwards).
    pub fn advance_to(&mut self, now: Duration) {
        if now > self.now {
            self.now = now;
        }
    }

    /// Schedules `payload` to become due `delay` after the logical now.
    pub fn schedule(&mut self, delay: Duration, payload: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.queue.push(Entry {
            due: self.now + delay,
            id,
            payload,
        });
        id
    }

    /// Cancels one entry. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.queue.len();
        self.queue.retain(|entry| entry.id != id);
        self.queue.len() != before
    }

    /// Cancels every entry whose payload matches. Returns how many were removed.
    pub fn cancel_where(&mut self, mut predicate: impl FnMut(&T) -> bool) -> usize {
        let before = self.queue.len();
        self.queue.retain(|entry| !predicate(&entry.payload));
        before - self.queue.len()
    }

    /// Due time of the earliest pending entry.
    pub fn next_due(&self) -> Option<Duration> {
        self.queue.peek().map(|entry| entry.due)
    }

    /// Pops the earliest entry if it is due at `now`.
    ///
    /// On success the logical clock jumps to the entry's due time; otherwise
    /// it advances to `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<T> {
        match self.queue.peek() {
            Some(entry) if entry.due <= now => {
                let entry = self.queue.pop()?;
                self.advance_to(entry.due);
                Some(entry.payload)
            }
            _ => {
                self.advance_to(now);
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl<T> Default for Timeline<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn pops_in_deadline_then_insertion_order() {
        let mut timeline = Timeline::new();
        timeline.schedule(ms(30), "late");
        timeline.schedule(ms(10), "first");
        timeline.schedule(ms(10), "second");

        assert_eq!(timeline.pop_due(ms(5)), None);
        assert_eq!(timeline.pop_due(ms(100)), Some("first"));
        assert_eq!(timeline.pop_due(ms(100)), Some("second"));
        assert_eq!(timeline.pop_due(ms(100)), Some("late"));
        assert!(timeline.is_empty());
    }

    #[test]
    fn chained_delays_are_relative_to_the_popped_deadline() {
        let mut timeline = Timeline::new();
        timeline.schedule(ms(100), 1);

        // Worker wakes up late, at 250ms.
        assert_eq!(timeline.pop_due(ms(250)), Some(1));
        assert_eq!(timeline.now(), ms(100));

        timeline.schedule(ms(100), 2);
        assert_eq!(timeline.next_due(), Some(ms(200)));
    }

    #[test]
    fn cancellation_by_id_and_predicate() {
        let mut timeline = Timeline::new();
        let keep = timeline.schedule(ms(10), 1);
        let drop = timeline.schedule(ms(20), 2);
        timeline.schedule(ms(30), 3);

        assert!(timeline.cancel(drop));
        assert!(!timeline.cancel(drop));
        assert_eq!(timeline.cancel_where(|value| *value == 3), 1);
        assert_eq!(timeline.len(), 1);
        assert!(timeline.cancel(keep));
    }

    #[test]
    fn clock_never_moves_backwards() {
        let mut timeline: Timeline<()> = Timeline::new();
        timeline.advance_to(ms(50));
        timeline.advance_to(ms(20));
        assert_eq!(timeline.now(), ms(50));
    }
}
