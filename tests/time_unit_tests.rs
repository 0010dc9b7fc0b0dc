use chart_axes::axis::{Axis, Position, TickKind};
use chart_axes::core::primitives::{datetime_to_millis, millis_to_datetime};
use chart_axes::core::time_unit::TICKS_PER_DAY;
use chart_axes::core::{DataType, Rect, TimeLevel, TimeSpan, default_format, nice_time_span};
use chart_axes::render::HeuristicTextMeasurer;
use chrono::{Datelike, TimeZone, Utc};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

fn utc_millis(year: i32, month: u32, day: u32) -> f64 {
    datetime_to_millis(
        Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
            .single()
            .expect("valid date"),
    )
}

#[test]
fn four_hundred_days_step_in_years_with_year_format() {
    let increment = nice_time_span(TimeSpan::from_days(400.0), None);
    assert_eq!(increment.level, TimeLevel::Year);
    assert!(increment.ticks() >= 400.0 * TICKS_PER_DAY);
    assert_eq!(default_format(400.0 * MILLIS_PER_DAY, 0.0), "yyyy");
}

#[test]
fn time_axis_ticks_follow_month_boundaries() {
    let min = utc_millis(2024, 1, 10);
    let max = utc_millis(2025, 2, 13);
    let mut axis = Axis::new(Position::Bottom);
    axis.update_actual_limits(DataType::Date, min, max, None, None);
    axis.arrange(Rect::default(), Rect::new(0.0, 0.0, 500.0, 300.0));

    let ticks = axis.generate_ticks(&HeuristicTextMeasurer, 500.0);
    assert_eq!(ticks.kind, TickKind::Time);
    assert!(!ticks.major.is_empty());
    for tick in &ticks.major {
        let time = millis_to_datetime(tick.value).expect("tick date");
        assert_eq!(time.day(), 1);
        assert!(tick.value >= min && tick.value <= max);
        assert!(!tick.label.is_empty());
    }
}

#[test]
fn explicit_date_format_drives_labels() {
    let mut axis = Axis::new(Position::Bottom);
    axis.set_format(Some("yyyy".to_owned()));
    axis.update_actual_limits(
        DataType::Date,
        utc_millis(2010, 6, 1),
        utc_millis(2020, 6, 1),
        None,
        None,
    );
    axis.arrange(Rect::default(), Rect::new(0.0, 0.0, 800.0, 300.0));

    let ticks = axis.generate_ticks(&HeuristicTextMeasurer, 800.0);
    assert!(!ticks.major.is_empty());
    for tick in &ticks.major {
        assert_eq!(tick.label.len(), 4);
        assert!(tick.label.starts_with("20"));
    }
}

#[test]
fn default_time_labels_follow_the_range_not_the_step() {
    let mut axis = Axis::new(Position::Bottom);
    axis.update_actual_limits(
        DataType::Date,
        utc_millis(2024, 1, 10),
        utc_millis(2025, 2, 13),
        None,
        None,
    );
    axis.arrange(Rect::default(), Rect::new(0.0, 0.0, 500.0, 300.0));

    let ticks = axis.generate_ticks(&HeuristicTextMeasurer, 500.0);
    assert!(!ticks.major.is_empty());
    for tick in &ticks.major {
        assert_eq!(tick.label.len(), 4, "label {:?}", tick.label);
        assert!(tick.label.starts_with("202"));
    }
}

#[test]
fn explicit_minor_unit_walks_whole_days() {
    let min = utc_millis(2024, 3, 1);
    let max = utc_millis(2024, 4, 1);
    let mut axis = Axis::new(Position::Bottom);
    axis.set_major_unit(Some(7.0)).expect("unit");
    axis.set_minor_unit(Some(1.0)).expect("unit");
    axis.update_actual_limits(DataType::Date, min, max, None, None);
    axis.arrange(Rect::default(), Rect::new(0.0, 0.0, 800.0, 300.0));

    let ticks = axis.generate_ticks(&HeuristicTextMeasurer, 800.0);
    let majors: Vec<f64> = ticks.major_values().collect();
    assert!(majors.len() >= 4);
    assert!(ticks.minor.len() > 4 * (majors.len() - 1));
    for minor in &ticks.minor {
        assert!(!majors.contains(minor));
        assert!(*minor >= min && *minor <= max);
        let offset = (minor - majors[0]) / MILLIS_PER_DAY;
        assert!((offset - offset.round()).abs() < 1e-9);
    }
    assert!(ticks.minor.windows(2).all(|pair| {
        let gap = (pair[1] - pair[0]) / MILLIS_PER_DAY;
        (gap - 1.0).abs() < 1e-9 || (gap - 2.0).abs() < 1e-9
    }));
}

#[test]
fn huge_year_steps_stop_at_the_calendar_edge() {
    let min = utc_millis(2000, 1, 1);
    let max = utc_millis(2020, 1, 1);
    let mut axis = Axis::new(Position::Bottom);
    axis.set_major_unit(Some(365.0 * 1e6)).expect("unit");
    axis.update_actual_limits(DataType::Date, min, max, None, None);

    let ticks = axis.generate_ticks(&HeuristicTextMeasurer, 800.0);
    assert!(ticks.major.len() <= 1);
    assert!(ticks.major_values().all(|value| value >= min && value <= max));
}
