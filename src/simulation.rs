use crate::classifier::{Classification, Classifier, DependencyClass};
use crate::config::NetworkConfig;
use crate::events::{Event, EventQueue};
use crate::station::SimulationState;
use crate::{Error, Result, Timestamp};

use std::fmt::{Display, Formatter};
use tracing::{debug, info};

/// Why a [`Simulation`] stopped. Every variant is a normal termination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    /// No pending events remain.
    QueueEmpty,
    /// The configured number of iterations has been executed.
    IterationBudget,
    /// The next pending event lies beyond the configured time horizon.
    TimeHorizon,
}

/// Driver state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Events remain and the budget is not exhausted.
    Running,
    /// No further steps will execute.
    Halted(HaltReason),
}

/// Everything observable about one executed step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    /// Zero-based iteration index.
    pub iteration: usize,
    /// The event that was popped and applied.
    pub executed: Event,
    /// Free units per station after the transition.
    pub free_units: Vec<usize>,
    /// Backlog per station after the transition.
    pub queue_lengths: Vec<usize>,
    /// The D / I / R partition of the remaining pending events.
    pub classification: Classification,
}

impl StepRecord {
    /// The pending events after the step, sorted as the queue would pop them.
    pub fn pending(&self) -> &[Event] {
        self.classification.events()
    }
}

/// Outcome of [`Simulation::run()`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    /// Number of executed steps.
    pub steps: usize,
    /// Why the run stopped.
    pub halt_reason: HaltReason,
    /// Clock time of the last executed event.
    pub final_time: Timestamp,
    /// Indirect classifications summed over every step.
    pub indirect_total: usize,
}

/// Owns the event queue, the station state, and the classifier of a tandem-network run.
///
/// The expected workflow is:
///
/// 1. Build and tweak a [`NetworkConfig`].
/// 2. Pass it to [`new()`], which validates it, builds the stations, and schedules the initial event.
/// 3. Call [`step()`] repeatedly, or [`run()`] with an observer, to consume [`StepRecord`]s.
/// 4. Use the [`state()`] or [`event_queue()`] accessors to inspect what is left.
///
/// Each step pops the earliest event, applies its transition, snapshots the remaining queue, and classifies that
/// snapshot. Steps run to completion one at a time.
///
/// [`new()`]: Simulation::new
/// [`step()`]: Simulation::step
/// [`run()`]: Simulation::run
/// [`state()`]: Simulation::state
/// [`event_queue()`]: Simulation::event_queue
#[derive(Debug, Clone)]
pub struct Simulation {
    /// Pending events, ordered ascending by `(timestamp, insertion sequence)`.
    event_queue: EventQueue,
    /// Station state. Exclusive access is granted to each event that executes.
    state: SimulationState,
    classifier: Classifier,
    iteration_budget: usize,
    horizon: Option<Timestamp>,
    iterations: usize,
    indirect_total: usize,
    status: DriverState,
}

impl Simulation {
    /// Validate `config`, build idle stations, and schedule the initial event.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedConfiguration`] or [`Error::InvalidStation`] if the configuration fails validation.
    pub fn new(config: &NetworkConfig) -> Result<Self> {
        let state = SimulationState::new(config)?;
        let initial_event = config.initial_event()?;

        let mut simulation = Self {
            event_queue: EventQueue::new(initial_event.timestamp),
            state,
            classifier: Classifier::from(config),
            iteration_budget: config.iterations,
            horizon: config.horizon()?,
            iterations: 0,
            indirect_total: 0,
            status: DriverState::Running,
        };
        simulation.schedule(initial_event)?;

        info!(
            stations = config.num_stations,
            seed = config.seed,
            iterations = config.iterations,
            initial = %initial_event,
            "Simulation initialized"
        );
        Ok(simulation)
    }

    /// Add an event to the pending set, e.g. to seed a run with more than one job.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStation`] if the event lies outside the network, or [`Error::BackInTime`] if it is
    /// earlier than the current clock.
    pub fn schedule(&mut self, event: Event) -> Result {
        self.state.station(event.station)?;
        self.event_queue.push(event)
    }

    /// Execute one event and classify what remains.
    ///
    /// Returns `Ok(None)` once the simulation has halted, which happens when the iteration budget is exhausted, the
    /// queue runs empty, or the next event lies beyond the time horizon. Halting is sticky.
    ///
    /// # Errors
    ///
    /// Propagates [`Error::InvalidStation`] and [`Error::BackInTime`] from the transition. Both indicate a bug in how
    /// events were constructed and leave the simulation in an unspecified state.
    pub fn step(&mut self) -> Result<Option<StepRecord>> {
        if let DriverState::Halted(_) = self.status {
            return Ok(None);
        }

        if self.iterations >= self.iteration_budget {
            return Ok(self.halt(HaltReason::IterationBudget));
        }

        if let (Some(horizon), Some(next_time)) = (self.horizon, self.event_queue.peek_time()) {
            if next_time > horizon {
                return Ok(self.halt(HaltReason::TimeHorizon));
            }
        }

        let executed = match self.event_queue.pop_min() {
            Ok(event) => event,
            Err(Error::EmptyQueue) => return Ok(self.halt(HaltReason::QueueEmpty)),
            Err(e) => return Err(e),
        };
        self.state.execute(&executed, &mut self.event_queue)?;

        let pending = self.event_queue.snapshot_sorted();
        let classification = self.classifier.classify(&pending);
        self.indirect_total += classification.count(DependencyClass::Indirect);

        debug!(
            iteration = self.iterations,
            executed = %executed,
            pending = pending.len(),
            ready = classification.count(DependencyClass::Independent),
            "Executed event"
        );

        let record = StepRecord {
            iteration: self.iterations,
            executed,
            free_units: self.state.free_units(),
            queue_lengths: self.state.queue_lengths(),
            classification,
        };
        self.iterations += 1;
        Ok(Some(record))
    }

    /// Step until halted, handing each record to `observer`.
    ///
    /// # Errors
    ///
    /// Errors from [`step()`] are passed back to the caller, unchanged.
    ///
    /// [`step()`]: Simulation::step
    pub fn run<F>(&mut self, mut observer: F) -> Result<RunSummary>
    where
        F: FnMut(&StepRecord),
    {
        loop {
            match self.step()? {
                Some(record) => observer(&record),
                None => {
                    if let DriverState::Halted(reason) = self.status {
                        return Ok(self.summary_for(reason));
                    }
                },
            }
        }
    }

    /// Step until halted, collecting every record.
    ///
    /// # Errors
    ///
    /// Errors from [`step()`] are passed back to the caller, unchanged.
    ///
    /// [`step()`]: Simulation::step
    pub fn collect_records(&mut self) -> Result<Vec<StepRecord>> {
        let mut records = Vec::with_capacity(self.iteration_budget.saturating_sub(self.iterations));
        self.run(|record| records.push(record.clone()))?;
        Ok(records)
    }

    fn halt(&mut self, reason: HaltReason) -> Option<StepRecord> {
        info!(
            ?reason,
            steps = self.iterations,
            time = %self.event_queue.current_time(),
            remaining = self.event_queue.len(),
            indirect_total = self.indirect_total,
            "Simulation halted"
        );
        self.status = DriverState::Halted(reason);
        None
    }

    /// Summary of a finished run, or `None` while the simulation is still running.
    pub fn summary(&self) -> Option<RunSummary> {
        match self.status {
            DriverState::Halted(reason) => Some(self.summary_for(reason)),
            DriverState::Running => None,
        }
    }

    fn summary_for(&self, halt_reason: HaltReason) -> RunSummary {
        RunSummary {
            steps: self.iterations,
            halt_reason,
            final_time: self.event_queue.current_time(),
            indirect_total: self.indirect_total,
        }
    }

    /// Current driver state.
    pub fn status(&self) -> DriverState {
        self.status
    }

    /// Whether no further steps will execute.
    pub fn is_halted(&self) -> bool {
        matches!(self.status, DriverState::Halted(_))
    }

    /// Get a shared reference to the station state.
    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Get a shared reference to the event queue.
    pub fn event_queue(&self) -> &EventQueue {
        &self.event_queue
    }

    /// Get a shared reference to the classifier.
    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }
}

impl Display for Simulation {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Simulation at time {} after {} steps",
            self.event_queue.current_time(),
            self.iterations
        )
    }
}
