use crate::{Error, Result};
use ordered_float::NotNan;
use std::fmt::{Display, Formatter};

/// The type used for the simulation clock and event timestamps.
///
/// Wraps a [`NotNan`] so that timestamps are totally ordered and may be used as a priority-queue key. Construction
/// through [`Timestamp::new()`] additionally rejects negative and infinite values, as the simulated clock starts at
/// zero and only ever moves forward by finite delays.
///
/// [`Display`] renders the internal three-decimal form used in traces. Reporting tooling instead consumes
/// [`Timestamp::truncated()`], which never rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(NotNan<f64>);

impl Timestamp {
    /// Construct a timestamp from a raw number of simulated time units.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedConfiguration`] if `value` is NaN, infinite, or negative.
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() || value < 0.0 {
            return Err(Error::MalformedConfiguration(format!(
                "timestamp {value} is not a finite, nonnegative number"
            )));
        }

        NotNan::new(value)
            .map(Self)
            .map_err(|_| Error::MalformedConfiguration("timestamp is NaN".into()))
    }

    /// The raw number of simulated time units.
    pub fn value(self) -> f64 {
        self.0.into_inner()
    }

    /// The timestamp `delay` units after `self`. Delays are drawn from validated ranges, so the sum stays a number.
    pub(crate) fn after(self, delay: f64) -> Self {
        Self(self.0 + delay)
    }

    /// Simulated time elapsed between `earlier` and `self`. Negative if `earlier` is actually later.
    pub fn since(self, earlier: Timestamp) -> f64 {
        self.value() - earlier.value()
    }

    /// Render with exactly `places` decimals, dropping the remaining digits instead of rounding.
    pub fn truncated(self, places: usize) -> String {
        truncate_decimals(self.value(), places)
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{:.3}", self.value())
    }
}

impl TryFrom<f64> for Timestamp {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

/// Format `value` with `places` decimals, truncating toward zero.
///
/// The cut is made on the shortest decimal rendering that round-trips to `value`, so `1.23` (stored as `1.2299999...`)
/// keeps its last digit and `1.999999999` never carries into `2.00`. Missing decimals are padded with zeros.
pub fn truncate_decimals(value: f64, places: usize) -> String {
    let rendered = value.to_string();
    if !value.is_finite() {
        return rendered;
    }

    let (whole, fraction) = rendered.split_once('.').unwrap_or((rendered.as_str(), ""));
    if places == 0 {
        return whole.to_string();
    }
    let kept = &fraction[..fraction.len().min(places)];
    format!("{whole}.{kept:0<places$}")
}
