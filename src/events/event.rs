use crate::Timestamp;
use std::fmt::{Display, Formatter};

/// What happens to a job at a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A job reaches a station, either from outside the network (station 1) or in transit from the previous station.
    Arrive,
    /// A job seizes the station's processing unit.
    Process,
    /// A job finishes processing and leaves the station.
    Depart,
}

impl EventKind {
    /// Every kind, in declaration order.
    pub const ALL: [EventKind; 3] = [EventKind::Arrive, EventKind::Process, EventKind::Depart];

    /// The name used in textual traces.
    pub fn name(self) -> &'static str {
        match self {
            EventKind::Arrive => "Arrive",
            EventKind::Process => "Process",
            EventKind::Depart => "Depart",
        }
    }

    /// Single-letter abbreviation used in compact reports.
    pub fn initial(self) -> char {
        match self {
            EventKind::Arrive => 'A',
            EventKind::Process => 'P',
            EventKind::Depart => 'D',
        }
    }
}

impl Display for EventKind {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A scheduled occurrence in the tandem network. Immutable once created.
///
/// Stations are numbered from 1, matching the order jobs visit them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Event {
    /// When the event executes.
    pub timestamp: Timestamp,
    /// What the event does.
    pub kind: EventKind,
    /// Which station the event occurs at.
    pub station: usize,
}

impl Event {
    /// Create a new event.
    pub fn new(timestamp: Timestamp, kind: EventKind, station: usize) -> Self {
        Self {
            timestamp,
            kind,
            station,
        }
    }

    /// Whether both events are processing starts.
    pub fn both_process(&self, other: &Event) -> bool {
        self.kind == EventKind::Process && other.kind == EventKind::Process
    }
}

impl Display for Event {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.timestamp, self.kind, self.station)
    }
}
