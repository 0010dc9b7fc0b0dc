use approx::assert_relative_eq;
use chart_axes::core::{Point, hit_test, pie_segments};

const CENTER: Point = Point::new(100.0, 100.0);

#[test]
fn quarter_and_three_quarters_starting_at_top() {
    let segments = pie_segments(&[25.0, 75.0], -90.0, false, CENTER, 50.0, 0.0);
    assert_relative_eq!(segments[0].start_angle, 270.0);
    assert_relative_eq!(segments[0].sweep_angle, 90.0);
    assert_relative_eq!(segments[1].start_angle, 0.0);
    assert_relative_eq!(segments[1].sweep_angle, 270.0);

    // screen right of the center is clockwise from the top, so in the first slice
    assert_eq!(hit_test(&segments, Point::new(130.0, 80.0)), Some(0));
    assert_eq!(hit_test(&segments, Point::new(70.0, 100.0)), Some(1));
}

#[test]
fn reversed_pie_runs_counter_clockwise() {
    let segments = pie_segments(&[25.0, 75.0], -90.0, true, CENTER, 50.0, 0.0);
    assert_relative_eq!(segments[0].start_angle, 180.0);
    assert_relative_eq!(segments[0].sweep_angle, 90.0);
    assert_eq!(hit_test(&segments, Point::new(70.0, 80.0)), Some(0));
    assert_eq!(hit_test(&segments, Point::new(130.0, 80.0)), Some(1));
}

#[test]
fn negative_values_count_by_magnitude_and_nan_is_empty() {
    let segments = pie_segments(&[-1.0, f64::NAN, 1.0], 0.0, false, CENTER, 50.0, 0.0);
    assert_eq!(segments.len(), 3);
    assert_relative_eq!(segments[0].sweep_angle, 180.0);
    assert_eq!(segments[1].sweep_angle, 0.0);
    assert_relative_eq!(segments[2].sweep_angle, 180.0);
    assert_eq!(segments[0].value, -1.0);
}

#[test]
fn label_anchor_sits_on_mid_angle() {
    let segments = pie_segments(&[1.0, 1.0], 0.0, false, CENTER, 40.0, 0.0);
    let anchor = segments[0].anchor(0.5);
    assert_relative_eq!(anchor.x, 100.0, epsilon = 1e-9);
    assert_relative_eq!(anchor.y, 120.0, epsilon = 1e-9);
}

#[test]
fn donut_excludes_inner_ring() {
    let segments = pie_segments(&[1.0], 0.0, false, CENTER, 50.0, 0.4);
    assert_relative_eq!(segments[0].inner_radius, 20.0);
    assert_eq!(hit_test(&segments, Point::new(110.0, 100.0)), None);
    assert_eq!(hit_test(&segments, Point::new(140.0, 100.0)), Some(0));
}
