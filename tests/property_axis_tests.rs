use chart_axes::axis::{Axis, MAX_MAJOR_TICKS, Position};
use chart_axes::core::nice::{is_nice_step, nice_major_step};
use chart_axes::core::{DataType, Rect};
use chart_axes::render::HeuristicTextMeasurer;
use proptest::prelude::*;

fn arranged(min: f64, max: f64, reversed: bool, log_base: Option<f64>) -> Axis {
    let mut axis = Axis::new(Position::Bottom);
    axis.set_reversed(reversed);
    axis.set_log_base(log_base).expect("valid base");
    axis.update_actual_limits(DataType::Number, min, max, None, None);
    axis.arrange(Rect::default(), Rect::new(10.0, 10.0, 1024.0, 512.0));
    axis
}

proptest! {
    #[test]
    fn linear_conversion_round_trips(
        min in -1_000_000.0f64..1_000_000.0,
        span in 0.001f64..1_000_000.0,
        factor in 0.0f64..1.0,
        reversed in any::<bool>()
    ) {
        let axis = arranged(min, min + span, reversed, None);
        let value = axis.actual_min() + factor * (axis.actual_max() - axis.actual_min());
        let px = axis.convert(value, None, None);
        let recovered = axis.convert_back(px);
        prop_assert!((recovered - value).abs() <= 1e-6 * span.max(1.0));
    }

    #[test]
    fn log_conversion_round_trips(
        low in 0.001f64..1_000.0,
        decades in 1.0f64..6.0,
        factor in 0.0f64..1.0
    ) {
        let axis = arranged(low, low * 10f64.powf(decades), false, Some(10.0));
        let (min, max) = (axis.actual_min(), axis.actual_max());
        let value = min * (max / min).powf(factor);
        let px = axis.convert(value, None, None);
        let recovered = axis.convert_back(px);
        prop_assert!((recovered - value).abs() <= 1e-6 * value);
    }

    #[test]
    fn major_step_is_nice_and_fits_slots(
        range in 1e-6f64..1e9,
        slots in 1usize..200
    ) {
        let step = nice_major_step(range, slots);
        prop_assert!(is_nice_step(step));
        prop_assert!(step * slots as f64 >= range * (1.0 - 1e-9));
    }

    #[test]
    fn generated_ticks_stay_in_range_and_capped(
        min in -1_000.0f64..1_000.0,
        span in 0.01f64..10_000.0,
        length in 1.0f64..4_000.0
    ) {
        let axis = arranged(min, min + span, false, None);
        let ticks = axis.generate_ticks(&HeuristicTextMeasurer, length);
        prop_assert!(ticks.major.len() <= MAX_MAJOR_TICKS);
        let tolerance = ticks.step.max(span) * 1e-9;
        for tick in &ticks.major {
            prop_assert!(tick.value >= axis.actual_min() - tolerance);
            prop_assert!(tick.value <= axis.actual_max() + tolerance);
        }
    }
}
