mod event;
mod event_holder;

pub use event::{Event, EventKind};

use crate::{Error, Result, Timestamp};
use event_holder::EventHolder;

use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Priority queue of pending events.
///
/// Events leave the queue in ascending order of timestamp, with ties broken by the order in which they were pushed.
/// The tiebreaker is an explicit, monotonic insertion counter kept alongside each event, so the order of equal-time
/// events is part of the queue's contract rather than an accident of the heap layout. The station state machine relies
/// on this: a Process scheduled "now" must not overtake an event that was already pending for the same instant.
///
/// The queue also tracks the current clock time, which advances to the timestamp of each popped event. Attempting to
/// push an event for a time that has already passed results in an [`Error::BackInTime`] without modifying the queue.
///
/// [`snapshot_sorted()`] exposes the pending set, in the exact order [`pop_min()`] would produce it, to the dependency
/// classifier.
///
/// [`snapshot_sorted()`]: EventQueue::snapshot_sorted
/// [`pop_min()`]: EventQueue::pop_min
#[derive(Debug, Clone)]
pub struct EventQueue {
    events: BinaryHeap<Reverse<EventHolder>>,
    last_execution_time: Timestamp,
    events_added: usize,
}

impl EventQueue {
    /// Construct a new [`EventQueue`] with no pending events and a clock initialized to the provided time.
    pub fn new(start_time: Timestamp) -> Self {
        Self {
            events: BinaryHeap::default(),
            last_execution_time: start_time,
            events_added: 0,
        }
    }

    /// Insert an event. O(log n).
    ///
    /// # Errors
    ///
    /// If the event's timestamp is less than the current clock time, returns an [`Error::BackInTime`] to indicate the
    /// likely presence of a logical bug at the call site, with no modifications to the queue.
    pub fn push(&mut self, event: Event) -> Result {
        if event.timestamp < self.last_execution_time {
            return Err(Error::BackInTime);
        }

        let count = self.increment_event_count();
        self.events.push(Reverse(EventHolder {
            event,
            insertion_sequence: count,
        }));
        Ok(())
    }

    /// Schedule an event of `kind` at `station` for the current clock time. Events previously scheduled for "now" will
    /// still leave the queue before this one does.
    pub fn schedule_now(&mut self, kind: EventKind, station: usize) -> Result {
        let event_time = self.last_execution_time;
        self.push(Event::new(event_time, kind, station))
    }

    /// Schedule an event of `kind` at `station` for `delay` time units after the current clock time.
    ///
    /// # Errors
    ///
    /// A negative `delay` results in an [`Error::BackInTime`].
    pub fn schedule_with_delay(&mut self, kind: EventKind, station: usize, delay: f64) -> Result {
        let event_time = self.last_execution_time.after(delay);
        self.push(Event::new(event_time, kind, station))
    }

    /// Helper function to make sure incrementing the internal count of added events occurs the same way across all
    /// scheduling methods.
    fn increment_event_count(&mut self) -> usize {
        let count = self.events_added;
        self.events_added += 1;
        count
    }

    /// Remove and return the event with the smallest `(timestamp, insertion sequence)` key. Updates the current clock
    /// time to match the timestamp of the popped event.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyQueue`] if no events are pending.
    pub fn pop_min(&mut self) -> Result<Event> {
        let Reverse(holder) = self.events.pop().ok_or(Error::EmptyQueue)?;
        self.last_execution_time = holder.event.timestamp;
        Ok(holder.event)
    }

    /// All pending events in the order [`pop_min()`] would return them, without removing any.
    ///
    /// The heap is left untouched; the sort happens on a borrowed view only when a snapshot is requested.
    ///
    /// [`pop_min()`]: EventQueue::pop_min
    pub fn snapshot_sorted(&self) -> Vec<Event> {
        let mut holders: Vec<&EventHolder> = self.events.iter().map(|Reverse(holder)| holder).collect();
        holders.sort_unstable();
        holders.into_iter().map(|holder| holder.event).collect()
    }

    /// Timestamp of the next event [`pop_min()`] would return.
    ///
    /// [`pop_min()`]: EventQueue::pop_min
    pub fn peek_time(&self) -> Option<Timestamp> {
        self.events.peek().map(|Reverse(holder)| holder.event.timestamp)
    }

    /// Get the simulation's current clock time.
    pub fn current_time(&self) -> Timestamp {
        self.last_execution_time
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no events are pending.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl std::fmt::Display for EventQueue {
    fn fmt(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            formatter,
            "EventQueue with {} pending events at current time {}",
            self.events.len(),
            self.last_execution_time
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(time: f64) -> Timestamp {
        Timestamp::new(time).unwrap()
    }

    fn queue_with(events: &[(f64, EventKind, usize)]) -> EventQueue {
        let mut queue = EventQueue::new(at(0.0));
        for &(time, kind, station) in events {
            queue.push(Event::new(at(time), kind, station)).unwrap();
        }
        queue
    }

    #[test]
    fn pops_in_timestamp_order() {
        let mut queue = queue_with(&[
            (3.0, EventKind::Depart, 1),
            (1.0, EventKind::Arrive, 1),
            (2.0, EventKind::Process, 1),
        ]);

        let times: Vec<f64> = std::iter::from_fn(|| queue.pop_min().ok())
            .map(|event| event.timestamp.value())
            .collect();
        assert_eq!(vec![1.0, 2.0, 3.0], times);
    }

    #[test]
    fn equal_timestamps_leave_in_insertion_order() {
        let mut queue = queue_with(&[
            (1.0, EventKind::Depart, 3),
            (1.0, EventKind::Arrive, 1),
            (1.0, EventKind::Process, 2),
            (1.0, EventKind::Arrive, 4),
        ]);

        let stations: Vec<usize> = std::iter::from_fn(|| queue.pop_min().ok())
            .map(|event| event.station)
            .collect();
        assert_eq!(vec![3, 1, 2, 4], stations, "ties did not preserve enqueue order");
    }

    #[test]
    fn pop_on_empty_queue_fails() {
        let mut queue = EventQueue::new(at(0.0));
        assert_eq!(Err(Error::EmptyQueue), queue.pop_min());
    }

    #[test]
    fn pop_advances_clock() {
        let mut queue = queue_with(&[(2.5, EventKind::Arrive, 1)]);
        queue.pop_min().unwrap();
        assert_eq!(at(2.5), queue.current_time());
    }

    #[test]
    fn snapshot_matches_pop_order_and_leaves_queue_intact() {
        let mut queue = queue_with(&[
            (2.0, EventKind::Arrive, 1),
            (0.5, EventKind::Depart, 2),
            (2.0, EventKind::Process, 1),
            (0.5, EventKind::Arrive, 3),
        ]);

        let snapshot = queue.snapshot_sorted();
        assert_eq!(4, queue.len());

        let popped: Vec<Event> = std::iter::from_fn(|| queue.pop_min().ok()).collect();
        assert_eq!(popped, snapshot);
    }

    #[test]
    fn rejects_events_in_the_past() {
        let mut queue = queue_with(&[(2.0, EventKind::Arrive, 1)]);
        queue.pop_min().unwrap();

        let result = queue.push(Event::new(at(1.0), EventKind::Arrive, 1));
        assert_eq!(Err(Error::BackInTime), result);
        assert!(queue.is_empty());
    }

    #[test]
    fn schedule_helpers_offset_from_current_time() {
        let mut queue = queue_with(&[(1.0, EventKind::Arrive, 1)]);
        queue.pop_min().unwrap();

        queue.schedule_with_delay(EventKind::Depart, 1, 0.5).unwrap();
        queue.schedule_now(EventKind::Process, 1).unwrap();

        let snapshot = queue.snapshot_sorted();
        assert_eq!(Event::new(at(1.0), EventKind::Process, 1), snapshot[0]);
        assert_eq!(Event::new(at(1.5), EventKind::Depart, 1), snapshot[1]);
        assert_eq!(Some(at(1.0)), queue.peek_time());
    }
}
