//! Pie and donut slice geometry.
//!
//! Angles are degrees, 0° at 3 o'clock, increasing clockwise on screen
//! (pixel y grows downward). Every segment stores its clockwise start so
//! containment tests do not care whether the pie was laid out reversed.

use serde::{Deserialize, Serialize};

use crate::core::types::Point;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PieSegment {
    /// Index of the source value.
    pub index: usize,
    pub value: f64,
    pub center: Point,
    pub radius: f64,
    pub inner_radius: f64,
    /// Clockwise start angle, normalised to `[0, 360)`.
    pub start_angle: f64,
    pub sweep_angle: f64,
}

impl PieSegment {
    #[must_use]
    pub fn mid_angle(&self) -> f64 {
        (self.start_angle + self.sweep_angle / 2.0).rem_euclid(360.0)
    }

    /// Point at `fraction` of the radius along the mid angle; used to anchor
    /// slice labels.
    #[must_use]
    pub fn anchor(&self, fraction: f64) -> Point {
        let angle = self.mid_angle().to_radians();
        let distance = self.radius * fraction;
        Point::new(
            self.center.x + distance * angle.cos(),
            self.center.y + distance * angle.sin(),
        )
    }

    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        if self.sweep_angle <= 0.0 {
            return false;
        }
        let dx = point.x - self.center.x;
        let dy = point.y - self.center.y;
        let distance = dx.hypot(dy);
        if distance > self.radius || distance < self.inner_radius {
            return false;
        }
        if self.sweep_angle >= 360.0 {
            return true;
        }
        let angle = dy.atan2(dx).to_degrees();
        (angle - self.start_angle).rem_euclid(360.0) <= self.sweep_angle
    }
}

/// Lays out one segment per value. Negative values count by magnitude and
/// non-finite values get an empty segment so indices stay aligned.
#[must_use]
pub fn pie_segments(
    values: &[f64],
    start_angle_deg: f64,
    reversed: bool,
    center: Point,
    radius: f64,
    inner_radius_ratio: f64,
) -> Vec<PieSegment> {
    let magnitudes: Vec<f64> = values
        .iter()
        .map(|value| if value.is_finite() { value.abs() } else { 0.0 })
        .collect();
    let total: f64 = magnitudes.iter().sum();
    let radius = if radius.is_finite() { radius.max(0.0) } else { 0.0 };
    let inner_radius = radius * inner_radius_ratio.clamp(0.0, 1.0);
    let start = if start_angle_deg.is_finite() {
        start_angle_deg
    } else {
        0.0
    };

    let mut cursor = start;
    values
        .iter()
        .zip(&magnitudes)
        .enumerate()
        .map(|(index, (&value, &magnitude))| {
            let sweep = if total > 0.0 {
                360.0 * magnitude / total
            } else {
                0.0
            };
            let clockwise_start = if reversed {
                cursor -= sweep;
                cursor
            } else {
                let segment_start = cursor;
                cursor += sweep;
                segment_start
            };
            PieSegment {
                index,
                value,
                center,
                radius,
                inner_radius,
                start_angle: clockwise_start.rem_euclid(360.0),
                sweep_angle: sweep,
            }
        })
        .collect()
}

/// Index of the first segment containing `point`.
#[must_use]
pub fn hit_test(segments: &[PieSegment], point: Point) -> Option<usize> {
    segments
        .iter()
        .find(|segment| segment.contains(point))
        .map(|segment| segment.index)
}

#[cfg(test)]
mod tests {
    use super::{hit_test, pie_segments};
    use crate::core::types::Point;

    #[test]
    fn sweeps_are_proportional() {
        let segments = pie_segments(&[1.0, 3.0], 0.0, false, Point::new(0.0, 0.0), 10.0, 0.0);
        assert_eq!(segments.len(), 2);
        assert!((segments[0].sweep_angle - 90.0).abs() <= 1e-9);
        assert!((segments[1].start_angle - 90.0).abs() <= 1e-9);
        assert!((segments[1].sweep_angle - 270.0).abs() <= 1e-9);
    }

    #[test]
    fn donut_hole_is_not_hit() {
        let segments = pie_segments(&[1.0], 0.0, false, Point::new(0.0, 0.0), 10.0, 0.5);
        assert_eq!(hit_test(&segments, Point::new(2.0, 0.0)), None);
        assert_eq!(hit_test(&segments, Point::new(8.0, 0.0)), Some(0));
        assert_eq!(hit_test(&segments, Point::new(11.0, 0.0)), None);
    }

    #[test]
    fn all_zero_values_produce_empty_segments() {
        let segments = pie_segments(&[0.0, f64::NAN], 0.0, false, Point::new(0.0, 0.0), 10.0, 0.0);
        assert!(segments.iter().all(|segment| segment.sweep_angle == 0.0));
        assert_eq!(hit_test(&segments, Point::new(5.0, 0.0)), None);
    }
}
