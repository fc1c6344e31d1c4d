use super::Event;
use std::cmp::Ordering;

/// Helper struct for the event queue. Holds the event alongside a record of its insertion sequence, which together
/// with the event's timestamp forms the priority key.
///
/// The implementation of [`Ord`] on this struct cares first about the timestamp, comparing the insertion sequences only
/// to break ties. Two events scheduled for the same instant therefore leave the queue in the order they entered it,
/// independent of how [`BinaryHeap`] happens to arrange equal keys.
///
/// [`BinaryHeap`]: std::collections::BinaryHeap
#[derive(Debug, Clone, Copy)]
pub(super) struct EventHolder {
    pub event: Event,
    pub insertion_sequence: usize,
}

impl PartialEq<Self> for EventHolder {
    fn eq(&self, other: &Self) -> bool {
        self.insertion_sequence == other.insertion_sequence && self.event.timestamp == other.event.timestamp
    }
}

impl Eq for EventHolder {}

impl PartialOrd<Self> for EventHolder {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EventHolder {
    fn cmp(&self, other: &Self) -> Ordering {
        let comparison = self.event.timestamp.cmp(&other.event.timestamp);
        match comparison {
            Ordering::Equal => self.insertion_sequence.cmp(&other.insertion_sequence),
            _ => comparison,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use crate::Timestamp;

    fn holder(time: f64, sequence: usize) -> EventHolder {
        EventHolder {
            event: Event::new(Timestamp::new(time).unwrap(), EventKind::Arrive, 1),
            insertion_sequence: sequence,
        }
    }

    #[test]
    fn earlier_time_wins_over_sequence() {
        assert!(holder(1.0, 5) < holder(2.0, 0));
    }

    #[test]
    fn sequence_breaks_ties() {
        assert!(holder(1.0, 0) < holder(1.0, 1));
        assert_eq!(Ordering::Equal, holder(1.0, 3).cmp(&holder(1.0, 3)));
    }
}
