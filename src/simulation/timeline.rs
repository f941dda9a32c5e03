// src/simulation/timeline.rs

//! Single-threaded discrete-event timeline.
//!
//! Events fire in nondecreasing time order; events scheduled for the same
//! instant fire in the order they were scheduled. The clock never moves
//! backwards, and events past the stop time are left pending.

use crate::core::{SimTime, TeleportError, TeleportResult};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use tracing::trace;

/// The scheduling surface protocol components see.
pub trait Scheduler {
    type Event;

    /// Current simulation time.
    fn now(&self) -> SimTime;

    /// Schedules `event` at absolute time `at`. Fails if `at` is in the past.
    fn schedule(&mut self, at: SimTime, event: Self::Event) -> TeleportResult<()>;

    /// Schedules `event` at `now + delay`.
    fn schedule_after(&mut self, delay: SimTime, event: Self::Event) -> TeleportResult<SimTime> {
        let now = self.now();
        let at = now
            .checked_add(delay)
            .ok_or_else(|| TeleportError::config(format!("delay {} from {} overflows the timeline", delay, now)))?;
        self.schedule(at, event)?;
        Ok(at)
    }
}

struct Scheduled<E> {
    time: SimTime,
    seq: u64,
    event: E,
}

impl<E> PartialEq for Scheduled<E> {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.seq == other.seq
    }
}

impl<E> Eq for Scheduled<E> {}

impl<E> PartialOrd for Scheduled<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E> Ord for Scheduled<E> {
    // BinaryHeap is a max-heap: earliest (time, seq) must compare greatest.
    fn cmp(&self, other: &Self) -> Ordering {
        other.time.cmp(&self.time).then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Event queue plus clock.
pub struct Timeline<E> {
    now: SimTime,
    stop_time: Option<SimTime>,
    queue: BinaryHeap<Scheduled<E>>,
    next_seq: u64,
    executed: usize,
}

impl<E> Timeline<E> {
    /// Timeline with no horizon; `run` drains every event.
    pub fn new() -> Self {
        Self {
            now: SimTime::ZERO,
            stop_time: None,
            queue: BinaryHeap::new(),
            next_seq: 0,
            executed: 0,
        }
    }

    /// Timeline that only executes events at or before `stop_time`.
    pub fn with_stop_time(stop_time: SimTime) -> Self {
        Self { stop_time: Some(stop_time), ..Self::new() }
    }

    pub fn stop_time(&self) -> Option<SimTime> {
        self.stop_time
    }

    /// Number of events still queued.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Number of events dispatched so far.
    pub fn executed(&self) -> usize {
        self.executed
    }

    /// Time of the next event, if any.
    pub fn peek_time(&self) -> Option<SimTime> {
        self.queue.peek().map(|s| s.time)
    }

    /// Pops the next event within the horizon and advances the clock to it.
    pub fn pop_next(&mut self) -> Option<(SimTime, E)> {
        let next_time = self.peek_time()?;
        if self.stop_time.is_some_and(|stop| next_time > stop) {
            return None;
        }
        let scheduled = self.queue.pop()?;
        self.now = scheduled.time;
        self.executed += 1;
        Some((scheduled.time, scheduled.event))
    }

    /// Drains events through `handler` until the queue is empty or the horizon
    /// is reached. The handler may schedule further events. The first handler
    /// error stops the run and is returned.
    pub fn run<F>(&mut self, mut handler: F) -> TeleportResult<usize>
    where
        F: FnMut(&mut Self, E) -> TeleportResult<()>,
    {
        let mut dispatched = 0;
        while let Some((time, event)) = self.pop_next() {
            trace!(%time, "dispatching event");
            handler(self, event)?;
            dispatched += 1;
        }
        Ok(dispatched)
    }
}

impl<E> Default for Timeline<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Scheduler for Timeline<E> {
    type Event = E;

    fn now(&self) -> SimTime {
        self.now
    }

    fn schedule(&mut self, at: SimTime, event: E) -> TeleportResult<()> {
        if at < self.now {
            return Err(TeleportError::Schedule { at, now: self.now });
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Scheduled { time: at, seq, event });
        Ok(())
    }
}
