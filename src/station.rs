use crate::config::NetworkConfig;
use crate::events::{Event, EventKind, EventQueue};
use crate::{Error, Result};

use rand::SeedableRng;
use rand_distr::{Distribution, Uniform};
use rand_pcg::Pcg64;
use tracing::trace;

/// Processing units per station in the reference network.
pub const STATION_CAPACITY: usize = 1;

/// Mutable state of one station in the tandem line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Station {
    index: usize,
    free_units: usize,
    queue_length: usize,
}

impl Station {
    /// An idle station with an empty backlog.
    pub fn new(index: usize) -> Self {
        Self {
            index,
            free_units: STATION_CAPACITY,
            queue_length: 0,
        }
    }

    /// Position of the station in the line, starting at 1.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Processing units not currently serving a job.
    pub fn free_units(&self) -> usize {
        self.free_units
    }

    /// Jobs waiting for a processing unit.
    pub fn queue_length(&self) -> usize {
        self.queue_length
    }

    /// Processing units currently serving a job.
    pub fn busy_units(&self) -> usize {
        STATION_CAPACITY - self.free_units
    }

    fn release_unit(&mut self) {
        debug_assert!(self.free_units < STATION_CAPACITY, "station {} released an idle unit", self.index);
        self.free_units += 1;
    }
}

/// Everything an executing event may touch: the stations, the delay samplers, and the random-number generator.
///
/// The state is owned by a [`Simulation`], which hands exclusive access to [`SimulationState::execute()`] for each
/// popped event. Nothing else mutates stations.
///
/// [`Simulation`]: crate::Simulation
#[derive(Debug, Clone)]
pub struct SimulationState {
    stations: Vec<Station>,
    inter_arrival: Uniform<f64>,
    processing: Uniform<f64>,
    transit: Uniform<f64>,
    rng: Pcg64,
}

impl SimulationState {
    /// Build idle stations and seed the generator from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedConfiguration`] if the configuration fails validation.
    pub fn new(config: &NetworkConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            stations: (1..=config.num_stations).map(Station::new).collect(),
            inter_arrival: config.inter_arrival.sampler("inter-arrival")?,
            processing: config.processing.sampler("processing")?,
            transit: config.transit.sampler("transit")?,
            rng: Pcg64::seed_from_u64(config.seed),
        })
    }

    /// Number of stations in the line.
    pub fn num_stations(&self) -> usize {
        self.stations.len()
    }

    /// All stations, in line order.
    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    /// Shared access to the station with the given 1-based index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStation`] if `index` is outside `1..=num_stations`.
    pub fn station(&self, index: usize) -> Result<&Station> {
        index
            .checked_sub(1)
            .and_then(|slot| self.stations.get(slot))
            .ok_or(Error::InvalidStation {
                station: index,
                num_stations: self.stations.len(),
            })
    }

    fn station_mut(&mut self, index: usize) -> Result<&mut Station> {
        let num_stations = self.stations.len();
        index
            .checked_sub(1)
            .and_then(|slot| self.stations.get_mut(slot))
            .ok_or(Error::InvalidStation {
                station: index,
                num_stations,
            })
    }

    /// Free units per station, in line order.
    pub fn free_units(&self) -> Vec<usize> {
        self.stations.iter().map(Station::free_units).collect()
    }

    /// Backlog per station, in line order.
    pub fn queue_lengths(&self) -> Vec<usize> {
        self.stations.iter().map(Station::queue_length).collect()
    }

    /// Apply the transition for `event`, mutating station state and scheduling follow-on events on `event_queue`.
    ///
    /// The queue's clock must already have advanced to the event's timestamp, which [`EventQueue::pop_min()`] does.
    ///
    /// * Arrive at station 1 first renews the external arrival stream. The job then takes the free unit and starts
    ///   processing immediately, or joins the backlog.
    /// * Process schedules the matching Depart after a processing delay.
    /// * Depart sends the job on to the next station (if any) after a transit delay, then either hands the unit to the
    ///   head of the backlog immediately or releases it.
    ///
    /// Random draws happen in exactly that order, which keeps runs reproducible for a given seed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStation`] if the event references a station outside the network, and
    /// [`Error::UnmatchedDeparture`] if a Depart reaches a station with no job in service. No state is modified and
    /// nothing is scheduled in either case.
    pub fn execute(&mut self, event: &Event, event_queue: &mut EventQueue) -> Result {
        self.station(event.station)?;
        trace!(time = %event.timestamp, kind = %event.kind, station = event.station, "Applying transition");

        match event.kind {
            EventKind::Arrive => self.arrive(event.station, event_queue),
            EventKind::Process => self.process(event.station, event_queue),
            EventKind::Depart => self.depart(event.station, event_queue),
        }
    }

    fn arrive(&mut self, station: usize, event_queue: &mut EventQueue) -> Result {
        if station == 1 {
            let delay = self.inter_arrival.sample(&mut self.rng);
            event_queue.schedule_with_delay(EventKind::Arrive, 1, delay)?;
        }

        let slot = self.station_mut(station)?;
        if slot.free_units == 0 {
            slot.queue_length += 1;
        } else {
            slot.free_units -= 1;
            event_queue.schedule_now(EventKind::Process, station)?;
        }
        Ok(())
    }

    fn process(&mut self, station: usize, event_queue: &mut EventQueue) -> Result {
        let delay = self.processing.sample(&mut self.rng);
        event_queue.schedule_with_delay(EventKind::Depart, station, delay)
    }

    fn depart(&mut self, station: usize, event_queue: &mut EventQueue) -> Result {
        if self.station(station)?.busy_units() == 0 {
            return Err(Error::UnmatchedDeparture { station });
        }

        if station < self.stations.len() {
            let delay = self.transit.sample(&mut self.rng);
            event_queue.schedule_with_delay(EventKind::Arrive, station + 1, delay)?;
        }

        let slot = self.station_mut(station)?;
        if slot.queue_length == 0 {
            slot.release_unit();
        } else {
            slot.queue_length -= 1;
            event_queue.schedule_now(EventKind::Process, station)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DelayRange;
    use crate::Timestamp;

    fn at(time: f64) -> Timestamp {
        Timestamp::new(time).unwrap()
    }

    /// Fixed delays make every follow-on timestamp exact.
    fn fixed_config(num_stations: usize) -> NetworkConfig {
        NetworkConfig::new(num_stations)
            .with_inter_arrival(DelayRange::fixed(1.5))
            .with_processing(DelayRange::fixed(4.0))
            .with_transit(DelayRange::fixed(0.25))
    }

    /// Pop the next event and apply it, as the driver does.
    fn execute_next(state: &mut SimulationState, queue: &mut EventQueue) -> Event {
        let event = queue.pop_min().unwrap();
        state.execute(&event, queue).unwrap();
        event
    }

    #[test]
    fn arrival_at_idle_first_station_starts_processing_now() {
        let mut state = SimulationState::new(&fixed_config(2)).unwrap();
        let mut queue = EventQueue::new(at(0.0));
        queue.push(Event::new(at(0.0), EventKind::Arrive, 1)).unwrap();

        execute_next(&mut state, &mut queue);

        assert_eq!(vec![0, 1], state.free_units());
        assert_eq!(vec![0, 0], state.queue_lengths());
        assert_eq!(
            vec![
                Event::new(at(0.0), EventKind::Process, 1),
                Event::new(at(1.5), EventKind::Arrive, 1),
            ],
            queue.snapshot_sorted()
        );
    }

    #[test]
    fn arrival_at_busy_station_joins_backlog() {
        let mut state = SimulationState::new(&fixed_config(2)).unwrap();
        let mut queue = EventQueue::new(at(0.0));
        queue.push(Event::new(at(0.0), EventKind::Arrive, 2)).unwrap();
        queue.push(Event::new(at(0.5), EventKind::Arrive, 2)).unwrap();

        execute_next(&mut state, &mut queue);
        execute_next(&mut state, &mut queue);
        execute_next(&mut state, &mut queue);

        assert_eq!(0, state.station(2).unwrap().free_units());
        assert_eq!(1, state.station(2).unwrap().queue_length());
    }

    #[test]
    fn only_first_station_renews_arrivals() {
        let mut state = SimulationState::new(&fixed_config(3)).unwrap();
        let mut queue = EventQueue::new(at(0.0));
        queue.push(Event::new(at(0.0), EventKind::Arrive, 2)).unwrap();

        execute_next(&mut state, &mut queue);

        assert_eq!(vec![Event::new(at(0.0), EventKind::Process, 2)], queue.snapshot_sorted());
    }

    #[test]
    fn process_schedules_departure_after_processing_delay() {
        let mut state = SimulationState::new(&fixed_config(2)).unwrap();
        let mut queue = EventQueue::new(at(0.0));
        queue.push(Event::new(at(2.0), EventKind::Process, 2)).unwrap();

        execute_next(&mut state, &mut queue);

        assert_eq!(vec![Event::new(at(6.0), EventKind::Depart, 2)], queue.snapshot_sorted());
        assert_eq!(vec![1, 1], state.free_units(), "process must not touch capacity");
    }

    #[test]
    fn departure_forwards_job_and_serves_backlog() {
        let config = fixed_config(2).with_inter_arrival(DelayRange::fixed(3.0));
        let mut state = SimulationState::new(&config).unwrap();
        let mut queue = EventQueue::new(at(0.0));
        queue.push(Event::new(at(0.0), EventKind::Arrive, 1)).unwrap();

        // Arrive(0) -> Process(0) -> Arrive(3.0, queued) -> Depart(4.0)
        execute_next(&mut state, &mut queue);
        execute_next(&mut state, &mut queue);
        execute_next(&mut state, &mut queue);
        assert_eq!(1, state.station(1).unwrap().queue_length());

        let depart = execute_next(&mut state, &mut queue);
        assert_eq!(Event::new(at(4.0), EventKind::Depart, 1), depart);
        assert_eq!(0, state.station(1).unwrap().queue_length());
        assert_eq!(0, state.station(1).unwrap().free_units());

        let pending = queue.snapshot_sorted();
        assert!(pending.contains(&Event::new(at(4.0), EventKind::Process, 1)));
        assert!(pending.contains(&Event::new(at(4.25), EventKind::Arrive, 2)));
    }

    #[test]
    fn departure_from_last_station_leaves_network() {
        let mut state = SimulationState::new(&fixed_config(2)).unwrap();
        let mut queue = EventQueue::new(at(0.0));
        queue.push(Event::new(at(0.0), EventKind::Arrive, 2)).unwrap();

        while !queue.is_empty() {
            execute_next(&mut state, &mut queue);
        }

        assert_eq!(vec![1, 1], state.free_units());
        assert_eq!(at(4.0), queue.current_time());
    }

    #[test]
    fn out_of_range_station_fails_without_side_effects() {
        let mut state = SimulationState::new(&fixed_config(2)).unwrap();
        let mut queue = EventQueue::new(at(0.0));

        let result = state.execute(&Event::new(at(0.0), EventKind::Arrive, 3), &mut queue);
        assert_eq!(
            Err(Error::InvalidStation {
                station: 3,
                num_stations: 2
            }),
            result
        );

        let result = state.execute(&Event::new(at(0.0), EventKind::Depart, 0), &mut queue);
        assert!(matches!(result, Err(Error::InvalidStation { station: 0, .. })));
        assert!(queue.is_empty());
    }

    #[test]
    fn departure_without_job_in_service_is_rejected() {
        let mut state = SimulationState::new(&fixed_config(2)).unwrap();
        let mut queue = EventQueue::new(at(0.0));

        let result = state.execute(&Event::new(at(0.0), EventKind::Depart, 1), &mut queue);
        assert_eq!(Err(Error::UnmatchedDeparture { station: 1 }), result);
        assert_eq!(vec![1, 1], state.free_units());
        assert!(queue.is_empty(), "nothing should be forwarded downstream");
    }

    #[test]
    fn draws_stay_inside_configured_range() {
        let config = NetworkConfig::new(1).with_processing(DelayRange::new(2.0, 10.0));
        let mut state = SimulationState::new(&config).unwrap();
        let mut queue = EventQueue::new(at(0.0));

        for _ in 0..100 {
            state
                .execute(&Event::new(at(0.0), EventKind::Process, 1), &mut queue)
                .unwrap();
        }
        for event in queue.snapshot_sorted() {
            assert!((2.0..=10.0).contains(&event.timestamp.value()), "{event}");
        }
    }
}
