use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

/// Axis representation of a date: milliseconds since the Unix epoch.
#[must_use]
pub fn datetime_to_millis(time: DateTime<Utc>) -> f64 {
    time.timestamp_millis() as f64
}

#[must_use]
pub fn millis_to_datetime(millis: f64) -> Option<DateTime<Utc>> {
    if !millis.is_finite() || millis.abs() > i64::MAX as f64 {
        return None;
    }
    DateTime::<Utc>::from_timestamp_millis(millis.round() as i64)
}

/// Rounds `value` to `digits` decimal places without binary drift
/// (`0.1 + 0.2` snaps to `0.3`).
#[must_use]
pub fn round_to_digits(value: f64, digits: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    match Decimal::from_f64(value) {
        Some(decimal) => decimal
            .round_dp(digits.min(28))
            .to_f64()
            .unwrap_or(value),
        None => value,
    }
}

/// Largest scale `rust_decimal` can hold.
pub const MAX_DECIMAL_PLACES: u32 = 28;

/// Number of decimal places needed to print `step` exactly.
///
/// The search runs 15 significant digits past the step's leading digit, so
/// tiny steps keep their precision; the result is capped at
/// [`MAX_DECIMAL_PLACES`].
#[must_use]
pub fn decimal_places(step: f64) -> u32 {
    if !step.is_finite() || step == 0.0 {
        return 0;
    }
    let step = step.abs();
    let leading = (-step.log10().floor()).max(0.0) as u32;
    let limit = leading.saturating_add(15).min(MAX_DECIMAL_PLACES);
    for digits in 0..=limit {
        let scaled = step * 10_f64.powi(digits as i32);
        if scaled >= 0.5 && (scaled - scaled.round()).abs() <= scaled * 1e-9 {
            return digits;
        }
    }
    limit
}

/// Snaps `value` to the decimal precision of `step`. The raw value is kept
/// when snapping would move it by a noticeable share of the step, which
/// happens once the step is finer than [`MAX_DECIMAL_PLACES`] allows.
#[must_use]
pub fn snap_to_step(value: f64, step: f64) -> f64 {
    let snapped = round_to_digits(value, decimal_places(step));
    if (snapped - value).abs() <= step.abs() * 1e-6 {
        snapped
    } else {
        value
    }
}

#[must_use]
pub fn approx_equal(lhs: f64, rhs: f64) -> bool {
    let scale = lhs.abs().max(rhs.abs()).max(1.0);
    (lhs - rhs).abs() <= scale * 1e-12
}

#[cfg(test)]
mod tests {
    use super::{decimal_places, millis_to_datetime, round_to_digits, snap_to_step};

    #[test]
    fn decimal_places_tracks_step_precision() {
        assert_eq!(decimal_places(10.0), 0);
        assert_eq!(decimal_places(0.5), 1);
        assert_eq!(decimal_places(0.25), 2);
        assert_eq!(decimal_places(0.0004), 4);
        assert_eq!(decimal_places(2e-18), 18);
        assert_eq!(decimal_places(1e-40), 28);
    }

    #[test]
    fn snapping_never_collapses_tiny_steps() {
        assert_eq!(snap_to_step(0.1 + 0.2, 0.1), 0.3);
        let snapped = snap_to_step(3e-18, 1e-18);
        assert!((snapped - 3e-18).abs() <= 1e-30);
        let tiny = 3e-35;
        assert_eq!(snap_to_step(tiny, 1e-35), tiny);
    }

    #[test]
    fn rounding_removes_accumulated_noise() {
        assert_eq!(round_to_digits(0.1 + 0.2, 1), 0.3);
        assert!(round_to_digits(f64::NAN, 2).is_nan());
    }

    #[test]
    fn non_finite_millis_have_no_datetime() {
        assert!(millis_to_datetime(f64::NAN).is_none());
        assert!(millis_to_datetime(0.0).is_some());
    }
}
