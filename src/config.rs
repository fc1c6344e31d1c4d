//! Configuration types for a tandem-network run.

use crate::events::{Event, EventKind};
use crate::{Error, Result, Timestamp};
use rand_distr::Uniform;

/// A closed interval `[min, max]` from which a uniform delay is drawn whenever a follow-on event is scheduled.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DelayRange {
    /// Smallest delay that may be drawn. Also the bound used by the dependency classifier.
    pub min: f64,
    /// Largest delay that may be drawn.
    pub max: f64,
}

impl DelayRange {
    /// Create a new delay range. Validation happens in [`NetworkConfig::validate()`].
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// A degenerate range that always yields `delay`.
    pub fn fixed(delay: f64) -> Self {
        Self::new(delay, delay)
    }

    fn validate(&self, name: &str) -> Result {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(Error::MalformedConfiguration(format!(
                "{name} range [{}, {}] is not finite",
                self.min, self.max
            )));
        }
        if self.min < 0.0 {
            return Err(Error::MalformedConfiguration(format!(
                "{name} range has negative min {}",
                self.min
            )));
        }
        if self.min > self.max {
            return Err(Error::MalformedConfiguration(format!(
                "{name} range has min {} > max {}",
                self.min, self.max
            )));
        }
        Ok(())
    }

    /// Build the sampler used by the station state machine.
    pub(crate) fn sampler(&self, name: &str) -> Result<Uniform<f64>> {
        self.validate(name)?;
        Uniform::new_inclusive(self.min, self.max)
            .map_err(|e| Error::MalformedConfiguration(format!("{name} range: {e}")))
    }
}

/// Configuration for a simulation run. Fixed at start, never mutated by the run itself.
///
/// The [`Default`] is the reference scenario: four stations, inter-arrival `[1, 2]`, processing `[2, 10]`, transit
/// `[0.1, 0.2]`, seed 0, a single arrival at station 1 at time zero, and a budget of 40 iterations.
#[derive(Clone, Debug, PartialEq)]
pub struct NetworkConfig {
    /// Number of stations in the tandem line.
    pub num_stations: usize,

    /// Delay between consecutive external arrivals at station 1.
    pub inter_arrival: DelayRange,

    /// Processing (service) time at any station.
    pub processing: DelayRange,

    /// Transit time from a station's departure to the next station's arrival.
    pub transit: DelayRange,

    /// Seed for the random-number generator. Identical seed and configuration reproduce an identical run.
    pub seed: u64,

    /// Maximum number of events the driver executes.
    pub iterations: usize,

    /// Optional simulated-time horizon. The driver halts once the next pending event lies strictly beyond it.
    pub max_time: Option<f64>,

    /// The event that starts the run.
    pub initial_event: InitialEvent,
}

/// Description of the event a run is seeded with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InitialEvent {
    /// Simulated time of the event.
    pub time: f64,
    /// Kind of the event.
    pub kind: EventKind,
    /// Station the event occurs at.
    pub station: usize,
}

impl Default for InitialEvent {
    fn default() -> Self {
        Self {
            time: 0.0,
            kind: EventKind::Arrive,
            station: 1,
        }
    }
}

impl NetworkConfig {
    /// Create a configuration with `num_stations` stations and the reference delays.
    pub fn new(num_stations: usize) -> Self {
        Self {
            num_stations,
            inter_arrival: DelayRange::new(1.0, 2.0),
            processing: DelayRange::new(2.0, 10.0),
            transit: DelayRange::new(0.1, 0.2),
            seed: 0,
            iterations: 40,
            max_time: None,
            initial_event: InitialEvent::default(),
        }
    }

    /// Set the inter-arrival delay range.
    pub fn with_inter_arrival(mut self, range: DelayRange) -> Self {
        self.inter_arrival = range;
        self
    }

    /// Set the processing delay range.
    pub fn with_processing(mut self, range: DelayRange) -> Self {
        self.processing = range;
        self
    }

    /// Set the transit delay range.
    pub fn with_transit(mut self, range: DelayRange) -> Self {
        self.transit = range;
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the iteration budget.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the simulated-time horizon.
    pub fn with_max_time(mut self, max_time: f64) -> Self {
        self.max_time = Some(max_time);
        self
    }

    /// Set the event the run starts with.
    pub fn with_initial_event(mut self, time: f64, kind: EventKind, station: usize) -> Self {
        self.initial_event = InitialEvent { time, kind, station };
        self
    }

    /// Check that the configuration describes a runnable network.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedConfiguration`] if there are no stations, if any delay range has `min > max` or a
    /// negative or non-finite bound, or if the time horizon or initial time is not a valid timestamp.
    /// Returns [`Error::InvalidStation`] if the initial event is placed outside the network.
    pub fn validate(&self) -> Result {
        if self.num_stations < 1 {
            return Err(Error::MalformedConfiguration(
                "network needs at least one station".into(),
            ));
        }
        self.inter_arrival.validate("inter-arrival")?;
        self.processing.validate("processing")?;
        self.transit.validate("transit")?;
        if let Some(max_time) = self.max_time {
            Timestamp::new(max_time)?;
        }
        self.initial_event()?;
        Ok(())
    }

    /// The simulated-time horizon as a timestamp, if one is set.
    pub(crate) fn horizon(&self) -> Result<Option<Timestamp>> {
        self.max_time.map(Timestamp::new).transpose()
    }

    /// The initial event, checked against the network bounds.
    pub(crate) fn initial_event(&self) -> Result<Event> {
        let InitialEvent { time, kind, station } = self.initial_event;
        if !(1..=self.num_stations).contains(&station) {
            return Err(Error::InvalidStation {
                station,
                num_stations: self.num_stations,
            });
        }
        Ok(Event::new(Timestamp::new(time)?, kind, station))
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::new(4)
    }
}
