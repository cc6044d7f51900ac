//! Time coordinates for process propagation.
//!
//! Propagation accepts two kinds of time coordinate:
//! - `TimeCoord::Stamp`: a calendar timestamp; elapsed time is a
//!   `chrono::Duration` and is normalised by the process's time unit
//!   (e.g. one trading day) into a dimensionless step
//! - `TimeCoord::Value`: a plain numeric coordinate; the difference is
//!   already dimensionless and is used as-is
//!
//! This lets drift and diffusion be expressed in a physical unit while the
//! caller supplies whichever coordinate system is natural for its loop.
//!
//! # Examples
//!
//! ```
//! use chrono::{Duration, NaiveDate};
//! use ito_core::types::time::{elapsed_step, TimeCoord};
//!
//! let t0 = TimeCoord::from(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap());
//! let t1 = TimeCoord::from(NaiveDate::from_ymd_opt(2024, 1, 3).unwrap().and_hms_opt(0, 0, 0).unwrap());
//!
//! // With a one-day unit, two calendar days are two steps.
//! let step = elapsed_step(t1, t0, Duration::days(1)).unwrap();
//! assert!((step - 2.0).abs() < 1e-12);
//! ```

use chrono::{Duration, NaiveDateTime};

use super::error::ProcessError;

/// A point on the propagation time axis.
///
/// Coordinates are compared by value; `propagate_distr(t, t, d)` is the
/// identity for any coordinate kind. Mixing kinds within one call is a
/// configuration error.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimeCoord {
    /// A calendar timestamp.
    Stamp(NaiveDateTime),
    /// A dimensionless numeric coordinate.
    Value(f64),
}

impl From<NaiveDateTime> for TimeCoord {
    fn from(stamp: NaiveDateTime) -> Self {
        TimeCoord::Stamp(stamp)
    }
}

impl From<f64> for TimeCoord {
    fn from(value: f64) -> Self {
        TimeCoord::Value(value)
    }
}

impl std::fmt::Display for TimeCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeCoord::Stamp(stamp) => write!(f, "{}", stamp),
            TimeCoord::Value(value) => write!(f, "{}", value),
        }
    }
}

/// Convert a `chrono::Duration` to fractional seconds.
fn duration_secs(duration: Duration) -> f64 {
    match duration.num_microseconds() {
        Some(us) => us as f64 * 1e-6,
        // Magnitudes beyond the microsecond range fall back to milliseconds.
        None => duration.num_milliseconds() as f64 * 1e-3,
    }
}

/// Compute the dimensionless elapsed step between two time coordinates.
///
/// For timestamp coordinates the raw difference is divided by `time_unit`;
/// for numeric coordinates it is returned as-is. The step is signed: callers
/// propagating backwards receive a negative value.
///
/// # Errors
///
/// `InvalidConfiguration` if the coordinates are of different kinds, or if
/// `time_unit` is zero-length when a timestamp difference must be
/// normalised.
pub fn elapsed_step(
    time: TimeCoord,
    time0: TimeCoord,
    time_unit: Duration,
) -> Result<f64, ProcessError> {
    match (time, time0) {
        (TimeCoord::Stamp(t), TimeCoord::Stamp(t0)) => {
            let unit = duration_secs(time_unit);
            if unit == 0.0 {
                return Err(ProcessError::config("time unit must be non-zero"));
            }
            Ok(duration_secs(t - t0) / unit)
        }
        (TimeCoord::Value(t), TimeCoord::Value(t0)) => Ok(t - t0),
        (time, time0) => Err(ProcessError::config(format!(
            "mixed time coordinates: time={}, time0={}",
            time, time0
        ))),
    }
}
