use thiserror::Error as ThisError;

/// Errors that may be encountered while configuring or executing a simulation.
///
/// The [`EmptyQueue`] variant originates from [`EventQueue::pop_min()`] and is not a failure from the point of view of
/// a [`Simulation`]: the driver treats it as a normal transition into the halted state.
///
/// The [`InvalidStation`] and [`BackInTime`] variants indicate a logical bug in the code that constructed an event,
/// e.g. seeding the queue with a station index outside the network or forgetting to add an offset to the current time.
/// Neither is recovered from.
///
/// The [`UnmatchedDeparture`] variant is raised when a Depart reaches a station with no job in service, which can only
/// happen when a run is seeded with a Depart by hand. It is not recovered from either.
///
/// The [`MalformedConfiguration`] variant is raised while validating a [`NetworkConfig`], before any event has been
/// processed.
///
/// [`EventQueue::pop_min()`]: crate::EventQueue::pop_min
/// [`Simulation`]: crate::Simulation
/// [`NetworkConfig`]: crate::NetworkConfig
/// [`EmptyQueue`]: Error::EmptyQueue
/// [`InvalidStation`]: Error::InvalidStation
/// [`BackInTime`]: Error::BackInTime
/// [`UnmatchedDeparture`]: Error::UnmatchedDeparture
/// [`MalformedConfiguration`]: Error::MalformedConfiguration
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum Error {
    /// A pop was attempted on an event queue with no pending events.
    #[error("event queue is empty")]
    EmptyQueue,

    /// An event referenced a station outside `1..=num_stations`.
    #[error("station {station} is outside the network of {num_stations} stations")]
    InvalidStation {
        /// The offending station index.
        station: usize,
        /// Number of stations in the network.
        num_stations: usize,
    },

    /// The event queue rejected an event that would have been scheduled for a time that has already passed.
    #[error("event execution time is less than current simulation time")]
    BackInTime,

    /// A Depart was executed at a station whose processing unit was already free.
    #[error("departure from station {station}, which has no job in service")]
    UnmatchedDeparture {
        /// The station the Depart referenced.
        station: usize,
    },

    /// The network configuration cannot be used to start a simulation.
    #[error("malformed configuration: {0}")]
    MalformedConfiguration(String),
}

/// [`std::result::Result`]`<T, `[`ooo_tandem::Error`]`>`
///
/// Defaults to `()` for the many operations in this crate that only report success or failure.
///
/// [`ooo_tandem::Error`]: Error
pub type Result<T = ()> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_station_names_both_indices() {
        let error = Error::InvalidStation {
            station: 7,
            num_stations: 4,
        };
        assert_eq!("station 7 is outside the network of 4 stations", error.to_string());
    }

    #[test]
    fn unmatched_departure_names_station() {
        let error = Error::UnmatchedDeparture { station: 2 };
        assert_eq!("departure from station 2, which has no job in service", error.to_string());
    }

    #[test]
    fn malformed_configuration_carries_reason() {
        let error = Error::MalformedConfiguration("processing range has min 3 > max 2".into());
        assert_eq!(
            "malformed configuration: processing range has min 3 > max 2",
            error.to_string()
        );
    }
}
