//! Interval discretization and parameter validation
//!
//! Every axis in the crate (wavepacket space and time, membrane grid) is a
//! sequence of integer multiples of its step. The realized first and last
//! samples replace the requested limits.

use crate::error::{Result, WaveError};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Relative tolerance used when deciding whether `value / step` is an integer
const SNAP_TOLERANCE: f64 = 1e-9;

/// A closed interval `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    /// Lower limit
    pub min: f64,
    /// Upper limit
    pub max: f64,
}

impl Interval {
    /// Create an interval without validation
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Check that both limits are finite and ordered
    pub fn validated(self, name: &'static str) -> Result<Self> {
        if self.min.is_finite() && self.max.is_finite() && self.min <= self.max {
            Ok(self)
        } else {
            Err(WaveError::InvalidInterval {
                name,
                min: self.min,
                max: self.max,
            })
        }
    }

    /// Length of the interval
    pub fn length(&self) -> f64 {
        self.max - self.min
    }

    /// Whether `value` lies inside the closed interval
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// A scalar `L` stands for `[0, L]`
impl From<f64> for Interval {
    fn from(length: f64) -> Self {
        Self::new(0.0, length)
    }
}

impl From<(f64, f64)> for Interval {
    fn from((min, max): (f64, f64)) -> Self {
        Self::new(min, max)
    }
}

fn nearly_integer(value: f64) -> Option<f64> {
    let rounded = value.round();
    if (value - rounded).abs() <= SNAP_TOLERANCE * rounded.abs().max(1.0) {
        Some(rounded)
    } else {
        None
    }
}

fn snap_down(value: f64) -> i64 {
    nearly_integer(value).unwrap_or_else(|| value.floor()) as i64
}

fn snap_up(value: f64) -> i64 {
    nearly_integer(value).unwrap_or_else(|| value.ceil()) as i64
}

/// Discretize `bounds` with spacing `step`, snapping outwards.
///
/// The samples are `i * step` for every integer `i` between
/// `floor(min / step)` and `ceil(max / step)`, so the realized interval
/// always covers the requested one. Ratios within a relative `1e-9` of an
/// integer are treated as that integer, hence `[0, 1]` with a step of `0.1`
/// yields exactly 11 samples.
///
/// Fails if `step` is not finite and strictly positive or if `bounds` is
/// not a finite, ordered interval.
pub fn discretize(bounds: Interval, step: f64) -> Result<Array1<f64>> {
    let step = positive("step", step)?;
    let bounds = bounds.validated("axis")?;
    let first = snap_down(bounds.min / step);
    let last = snap_up(bounds.max / step).max(first);
    Ok((first..=last).map(|i| i as f64 * step).collect())
}

/// Discretize `bounds` with spacing `step`, snapping inwards.
///
/// Only multiples of `step` lying inside `bounds` are kept. The result is
/// empty when no multiple fits. Fails under the same conditions as
/// [`discretize`].
pub fn discretize_within(bounds: Interval, step: f64) -> Result<Array1<f64>> {
    let step = positive("step", step)?;
    let bounds = bounds.validated("axis")?;
    let first = snap_up(bounds.min / step);
    let last = snap_down(bounds.max / step);
    if last < first {
        return Ok(Array1::zeros(0));
    }
    Ok((first..=last).map(|i| i as f64 * step).collect())
}

/// Realized limits of a non-empty axis
pub fn axis_bounds(axis: &Array1<f64>) -> Option<Interval> {
    Some(Interval::new(*axis.first()?, *axis.last()?))
}

/// Validate a strictly positive, finite scalar
pub fn positive(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(WaveError::InvalidParameter {
            name,
            value,
            reason: "must be finite and > 0",
        })
    }
}

/// Normalize a scalar-or-sequence value into a validated list.
///
/// Every element is checked by `predicate`; the first failing element is
/// reported through `on_invalid`. When the resulting list is empty,
/// `on_empty` decides whether that is acceptable.
pub fn collect_sequence<T, I, P, E, F>(
    values: I,
    predicate: P,
    on_invalid: E,
    on_empty: F,
) -> Result<Vec<T>>
where
    I: IntoIterator<Item = T>,
    P: Fn(&T) -> bool,
    E: Fn(usize, &T) -> WaveError,
    F: FnOnce() -> Result<()>,
{
    let mut out = Vec::new();
    for (index, value) in values.into_iter().enumerate() {
        if !predicate(&value) {
            return Err(on_invalid(index, &value));
        }
        out.push(value);
    }
    if out.is_empty() {
        on_empty()?;
    }
    Ok(out)
}
