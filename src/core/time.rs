//! Conversion between user-facing `f64` time units and the integer clock.
//!
//! The engine never compares floating point values. Everything entering a run
//! is rounded to the nearest tick once, all arithmetic happens on `Ticks`, and
//! values are converted back only when building outputs.

use crate::error::InputError;

pub type Ticks = u64;

pub const TICKS_PER_UNIT: u64 = 1_000_000;

// Per-value cap; a run whose total time outgrows the clock fails with ClockOverflow.
pub const MAX_TIME_UNITS: f64 = 1e9;

/// Tolerance for comparing converted outputs.
pub const EPSILON: f64 = 1e-9;

pub fn to_ticks(field: &'static str, value: f64) -> Result<Ticks, InputError> {
    if !value.is_finite() || value < 0.0 || value > MAX_TIME_UNITS {
        return Err(InputError::Unrepresentable { field, value });
    }
    Ok((value * TICKS_PER_UNIT as f64).round() as Ticks)
}

/// Like [`to_ticks`], but the result must be at least one tick.
pub fn to_positive_ticks(field: &'static str, value: f64) -> Result<Ticks, InputError> {
    match to_ticks(field, value)? {
        0 => Err(InputError::Unrepresentable { field, value }),
        ticks => Ok(ticks),
    }
}

/// `at + delta`, or an error once the run would outlast the clock.
pub fn later(at: Ticks, delta: Ticks) -> Result<Ticks, InputError> {
    at.checked_add(delta).ok_or(InputError::ClockOverflow { at: to_units(at) })
}

pub fn to_units(ticks: Ticks) -> f64 {
    ticks as f64 / TICKS_PER_UNIT as f64
}

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPSILON * a.abs().max(b.abs()).max(1.0)
}
