//! # Overview
//!
//! ooo-tandem simulates an open tandem network of single-capacity service stations and, after every executed event,
//! certifies which of the still-pending events could be executed out of timestamp order without changing the outcome
//! of the simulation.
//!
//! Jobs arrive at station 1, are processed, depart, and travel on to the next station until they leave the line after
//! the last one. The reference simulation executes strictly in timestamp order. Alongside it, a [`Classifier`] derives
//! conservative lower bounds on how quickly one event's effects can propagate through the line, from the minimum
//! processing and transit delays, and sorts every pending event into one of three classes:
//!
//! * [`DependencyClass::Direct`] events share a station with an earlier pending event and must be serialized with it.
//! * [`DependencyClass::Indirect`] events could be causally reached by an earlier pending event and need a
//!   happens-before edge.
//! * [`DependencyClass::Independent`] events are provably unaffected by everything ahead of them, and form the set an
//!   out-of-order or parallel executor may dispatch freely.
//!
//! The crate is organised the way a small discrete-event framework is:
//!
//! * An [`EventQueue`] hands out events in `(timestamp, insertion sequence)` order.
//! * A [`SimulationState`] owns the stations and the seeded random-number generator, and applies the transition for
//!   each popped event with exclusive access to both itself and the queue.
//! * A [`Simulation`] drives the loop, classifies the pending set after each step, and yields [`StepRecord`]s until it
//!   halts.
//!
//! Identical configuration and seed reproduce an identical run, draw for draw.
//!
//! ```
//! use ooo_tandem::{NetworkConfig, Simulation};
//!
//! let mut sim = Simulation::new(&NetworkConfig::default()).unwrap();
//! let summary = sim.run(|record| {
//!     assert_eq!(record.pending().len(), record.classification.len());
//! }).unwrap();
//! assert_eq!(40, summary.steps);
//! ```

mod classifier;
mod config;
mod error;
mod events;
pub mod report;
mod simulation;
mod station;
mod time;

pub use classifier::{Classification, Classifier, DependencyClass, LookaheadBounds};
pub use config::{DelayRange, InitialEvent, NetworkConfig};
pub use error::{Error, Result};
pub use events::{Event, EventKind, EventQueue};
pub use simulation::{DriverState, HaltReason, RunSummary, Simulation, StepRecord};
pub use station::{SimulationState, Station, STATION_CAPACITY};
pub use time::{truncate_decimals, Timestamp};
