//! "Nice number" helpers used by numeric tick generation.
//!
//! A nice step is a multiple of 1, 2, 4, 5 or 10 times a power of ten. The
//! step search tries the rounding ladder, then the ceiling ladder at the same
//! precision, and falls back to the plain 1/2/5 ladder when both
//! underestimate the requested spacing.

/// Rounds `x` onto the 1/2/4/5/10 ladder (`round = true`) or the ceiling
/// 1/2/5/10 ladder (`round = false`) at the given power of ten.
#[must_use]
pub fn nice_number(x: f64, exp: i32, round: bool) -> f64 {
    if x == 0.0 || !x.is_finite() {
        return x;
    }
    let x = x.abs();
    let scale = 10_f64.powi(exp);
    let fraction = x / scale;
    let nice = if round {
        if fraction < 1.5 {
            1.0
        } else if fraction < 3.0 {
            2.0
        } else if fraction < 4.5 {
            4.0
        } else if fraction < 7.0 {
            5.0
        } else {
            10.0
        }
    } else if fraction <= 1.0 {
        1.0
    } else if fraction <= 2.0 {
        2.0
    } else if fraction <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * scale
}

/// Smallest 1/2/5/10 × 10^k value that is `>= |x|`.
#[must_use]
pub fn nice_tick_number(x: f64) -> f64 {
    if x == 0.0 || !x.is_finite() {
        return x;
    }
    let x = x.abs();
    let exp = x.log10().floor() as i32;
    let scale = 10_f64.powi(exp);
    let fraction = x / scale;
    let nice = if fraction <= 1.0 {
        1.0
    } else if fraction <= 2.0 {
        2.0
    } else if fraction <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * scale
}

/// Chooses the major step for a linear axis spanning `range` with room for
/// `label_slots` labels.
#[must_use]
pub fn nice_major_step(range: f64, label_slots: usize) -> f64 {
    if !range.is_finite() || range <= 0.0 {
        return 1.0;
    }
    let target = range / label_slots.max(1) as f64;
    let exp = target.log10().floor() as i32;

    let mut step = nice_number(target, exp, true);
    if step < target {
        step = nice_number(target, exp, false);
    }
    if step < target {
        step = nice_tick_number(target);
    }
    if !step.is_finite() || step <= 0.0 {
        return range;
    }
    step
}

/// Whether `step` sits on the 1/2/4/5/10 × 10^k ladder.
#[must_use]
pub fn is_nice_step(step: f64) -> bool {
    if !step.is_finite() || step <= 0.0 {
        return false;
    }
    let exp = step.log10().floor() as i32;
    let mantissa = step / 10_f64.powi(exp);
    [1.0, 2.0, 4.0, 5.0, 10.0]
        .iter()
        .any(|candidate| (mantissa - candidate).abs() <= 1e-9 * candidate)
}
