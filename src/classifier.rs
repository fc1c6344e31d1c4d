//! Online dependency classification of the pending-event set.
//!
//! After every executed event the pending set, sorted exactly as the queue would pop it, is partitioned into three
//! classes. Each event is compared against every event ahead of it in the snapshot:
//!
//! * **Direct** if some earlier event is at the same station, unless both are Process events. Such pairs compete for
//!   the same processing unit and must keep program order.
//! * **Indirect** if some earlier event at an upstream station could, given the minimum processing and transit delays
//!   of the network, have produced a causal chain reaching this event's station by its timestamp.
//! * **Independent** otherwise. These events may be dispatched out of timestamp order, or concurrently, without
//!   changing the outcome of the simulation.
//!
//! The first earlier event that triggers a rule decides the class. The classification is stateless and recomputed
//! from scratch for every snapshot.

use crate::config::NetworkConfig;
use crate::events::{Event, EventKind};

use tracing::trace;

/// The dependency class of one pending event relative to the events ahead of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyClass {
    /// Shares a station with an earlier pending event; requires same-station serialization.
    Direct,
    /// May be causally reached by an earlier pending event; requires a happens-before edge.
    Indirect,
    /// Provably unaffected by every earlier pending event; safe to execute out of order.
    Independent,
}

impl DependencyClass {
    /// Single-letter label used in traces.
    pub fn label(self) -> &'static str {
        match self {
            DependencyClass::Direct => "D",
            DependencyClass::Indirect => "I",
            DependencyClass::Independent => "R",
        }
    }
}

/// Conservative lower bounds on how quickly effects propagate through the tandem line, derived from the minimum
/// processing and transit delays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookaheadBounds {
    min_processing: f64,
    min_transit: f64,
}

impl LookaheadBounds {
    /// Bounds for the given minimum delays.
    pub fn new(min_processing: f64, min_transit: f64) -> Self {
        Self {
            min_processing,
            min_transit,
        }
    }

    /// Bounds for the network described by `config`.
    pub fn from_config(config: &NetworkConfig) -> Self {
        Self::new(config.processing.min, config.transit.min)
    }

    /// Minimum delay before an event of `kind` can produce a successor that reaches another station.
    ///
    /// Arrive and Process both still need a full processing stage and a transit hop. Depart only needs the hop.
    pub fn next_min(&self, kind: EventKind) -> f64 {
        match kind {
            EventKind::Arrive | EventKind::Process => self.min_processing + self.min_transit,
            EventKind::Depart => self.min_transit,
        }
    }

    /// Minimum delay that must already have elapsed at a station before an event of `kind` can occur there.
    pub fn start_min(&self, kind: EventKind) -> f64 {
        match kind {
            EventKind::Arrive | EventKind::Process => 0.0,
            EventKind::Depart => self.min_processing,
        }
    }

    /// Lower bound on the simulated time needed for `earlier` to influence `later`.
    ///
    /// Only defined when `later` sits at a downstream station; otherwise no causal path exists and the result is
    /// [`f64::INFINITY`]. Intervening stations contribute one transit hop each but only a single processing stage in
    /// total. The bound is loose, never tight, and must stay that way for Indirect results to remain sound.
    pub fn min_distance(&self, earlier: &Event, later: &Event) -> f64 {
        if later.station <= earlier.station {
            return f64::INFINITY;
        }

        let hops = (later.station - earlier.station - 1) as f64;
        self.next_min(earlier.kind)
            + self.min_processing
            + self.min_transit * hops
            + self.start_min(later.kind)
    }
}

/// The D / I / R partition of one sorted pending-event snapshot.
///
/// Holds the snapshot alongside one class per event, so the three sets are disjoint and together cover the snapshot by
/// construction. Every accessor preserves snapshot order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    events: Vec<Event>,
    classes: Vec<DependencyClass>,
}

impl Classification {
    /// The classified snapshot, in scan order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Every event paired with its class, in scan order.
    pub fn iter(&self) -> impl Iterator<Item = (&Event, DependencyClass)> + '_ {
        self.events.iter().zip(self.classes.iter().copied())
    }

    /// Class of the event at `index` in the snapshot.
    pub fn class_of(&self, index: usize) -> Option<DependencyClass> {
        self.classes.get(index).copied()
    }

    /// Events of the given class, in scan order.
    pub fn of_class(&self, class: DependencyClass) -> Vec<Event> {
        self.iter()
            .filter(|(_, assigned)| *assigned == class)
            .map(|(event, _)| *event)
            .collect()
    }

    /// The Direct set.
    pub fn direct(&self) -> Vec<Event> {
        self.of_class(DependencyClass::Direct)
    }

    /// The Indirect set.
    pub fn indirect(&self) -> Vec<Event> {
        self.of_class(DependencyClass::Indirect)
    }

    /// The Independent set.
    pub fn independent(&self) -> Vec<Event> {
        self.of_class(DependencyClass::Independent)
    }

    /// The events that may be dispatched out of timestamp order, concurrently with the head of the queue.
    ///
    /// This is the Independent set under its scheduling name.
    pub fn ready(&self) -> Vec<Event> {
        self.independent()
    }

    /// Number of events assigned to `class`.
    pub fn count(&self, class: DependencyClass) -> usize {
        self.classes.iter().filter(|assigned| **assigned == class).count()
    }

    /// Number of classified events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the snapshot was empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Classifies pending-event snapshots for one network.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classifier {
    bounds: LookaheadBounds,
}

impl Classifier {
    /// A classifier using the given bounds.
    pub fn new(bounds: LookaheadBounds) -> Self {
        Self { bounds }
    }

    /// The bounds in use.
    pub fn bounds(&self) -> &LookaheadBounds {
        &self.bounds
    }

    /// Partition `snapshot`, which must be sorted by `(timestamp, insertion sequence)`.
    ///
    /// O(k²) in the snapshot length: each event is checked against every event ahead of it until a rule fires.
    pub fn classify(&self, snapshot: &[Event]) -> Classification {
        let classes: Vec<DependencyClass> = snapshot
            .iter()
            .enumerate()
            .map(|(k, later)| self.classify_event(&snapshot[..k], later))
            .collect();

        let classification = Classification {
            events: snapshot.to_vec(),
            classes,
        };
        trace!(
            pending = classification.len(),
            direct = classification.count(DependencyClass::Direct),
            indirect = classification.count(DependencyClass::Indirect),
            independent = classification.count(DependencyClass::Independent),
            "Classified pending events"
        );
        classification
    }

    /// Class of `later` given the events ahead of it.
    fn classify_event(&self, earlier_events: &[Event], later: &Event) -> DependencyClass {
        for earlier in earlier_events {
            if earlier.station == later.station && !earlier.both_process(later) {
                return DependencyClass::Direct;
            }
            if self.bounds.min_distance(earlier, later) <= later.timestamp.since(earlier.timestamp) {
                return DependencyClass::Indirect;
            }
        }
        DependencyClass::Independent
    }
}

impl From<&NetworkConfig> for Classifier {
    fn from(config: &NetworkConfig) -> Self {
        Self::new(LookaheadBounds::from_config(config))
    }
}
