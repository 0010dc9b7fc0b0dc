use tracing::trace;

use crate::axis::{Axis, AxisType, TickMark};
use crate::core::types::{Point, Size};
use crate::render::TextMeasurer;

/// Length of a major tick mark; minor marks are half as long.
pub const TICK_LENGTH: f64 = 5.0;

/// Adjacent horizontal labels closer than this are treated as overlapping.
pub const LABEL_OVERLAP_GAP: f64 = 12.0;

/// Angle adopted by horizontal X axes whose labels overlap.
const OVERLAP_LABEL_ANGLE: f64 = -45.0;

/// Extent of a tick mark outside the plot area.
pub(crate) fn outer_tick_extent(marks: TickMark, length: f64) -> f64 {
    match marks {
        TickMark::Outside => length,
        TickMark::Cross => 0.5 * length,
        TickMark::None | TickMark::Inside => 0.0,
    }
}

/// Perpendicular extent of a label box rotated by `angle_deg`.
pub(crate) fn rotated_extent(size: Size, angle_deg: f64, horizontal: bool) -> f64 {
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    if horizontal {
        size.width * sin.abs() + size.height * cos.abs()
    } else {
        size.width * cos.abs() + size.height * sin.abs()
    }
}

fn labels_overlap(labels: &[(f64, Size)]) -> bool {
    labels.windows(2).any(|pair| {
        let separation = (pair[1].0 - pair[0].0).abs();
        pair[0].1.width + pair[1].1.width > separation - LABEL_OVERLAP_GAP
    })
}

impl Axis {
    /// Trial layout pass: returns the size the axis needs when it spans
    /// `available_len` pixels along its direction.
    ///
    /// Also fixes the label angle used by the next render pass: horizontal
    /// axes without an explicit angle switch to -45° when adjacent labels
    /// overlap.
    pub fn measure<M: TextMeasurer + ?Sized>(&mut self, measurer: &M, available_len: f64) -> Size {
        self.effective_label_angle = self.options.label_angle;
        if self.edge().is_none() {
            self.desired_size = Size::default();
            return self.desired_size;
        }
        let horizontal = self.is_horizontal();
        let padding = self.options.label_padding;

        let mut label_extent = 0.0;
        if self.options.labels {
            let mut ticks = self.generate_ticks(measurer, available_len);
            self.apply_item_formatter(&mut ticks, |tick| {
                if horizontal {
                    Point::new(tick.position, 0.0)
                } else {
                    Point::new(0.0, tick.position)
                }
            });
            let measured: Vec<(f64, Size)> = ticks
                .major
                .iter()
                .filter(|tick| !tick.label.is_empty() && tick.position.is_finite())
                .map(|tick| {
                    (
                        tick.position,
                        measurer.measure_string(&tick.label, &self.label_style),
                    )
                })
                .collect();

            if horizontal
                && self.axis_type() == AxisType::X
                && self.options.label_angle.is_none()
                && labels_overlap(&measured)
            {
                trace!(labels = measured.len(), "overlapping labels rotated");
                self.effective_label_angle = Some(OVERLAP_LABEL_ANGLE);
            }
            let angle = self.effective_label_angle.unwrap_or(0.0);
            let extent = measured
                .iter()
                .map(|(_, size)| rotated_extent(*size, angle, horizontal))
                .fold(0.0, f64::max);
            if extent > 0.0 {
                label_extent = padding + extent;
            }
        }

        let title_extent = self
            .options
            .title
            .as_deref()
            .filter(|title| !title.is_empty())
            .map_or(0.0, |title| {
                measurer.measure_string(title, &self.title_style).height + padding
            });

        let tick_extent = outer_tick_extent(self.options.major_tick_marks, TICK_LENGTH);
        let thickness = tick_extent + label_extent + title_extent;
        self.desired_size = if horizontal {
            Size::new(available_len, thickness)
        } else {
            Size::new(thickness, available_len)
        };
        trace!(
            horizontal,
            thickness,
            angle = self.effective_label_angle,
            "axis measured"
        );
        self.desired_size
    }
}

#[cfg(test)]
mod tests {
    use super::{LABEL_OVERLAP_GAP, TICK_LENGTH, labels_overlap, outer_tick_extent};
    use crate::axis::{Axis, AxisType, Position, TickMark};
    use crate::core::types::{DataType, Size};
    use crate::render::HeuristicTextMeasurer;

    fn categories(count: usize, text: &str) -> Vec<String> {
        (0..count).map(|i| format!("{text}{i}")).collect()
    }

    #[test]
    fn overlap_uses_width_sum_against_separation() {
        let a = (0.0, Size::new(20.0, 10.0));
        let b = (40.0 + LABEL_OVERLAP_GAP, Size::new(20.0, 10.0));
        assert!(!labels_overlap(&[a, b]));
        let c = (51.0, Size::new(20.0, 10.0));
        assert!(labels_overlap(&[a, c]));
    }

    #[test]
    fn tick_extent_depends_on_mode() {
        assert_eq!(outer_tick_extent(TickMark::Outside, TICK_LENGTH), 5.0);
        assert_eq!(outer_tick_extent(TickMark::Cross, TICK_LENGTH), 2.5);
        assert_eq!(outer_tick_extent(TickMark::Inside, TICK_LENGTH), 0.0);
    }

    #[test]
    fn crowded_category_axis_rotates_labels() {
        let labels = categories(20, "category ");
        let mut axis = Axis::new(Position::Bottom);
        axis.update_actual_limits(DataType::String, 0.0, 19.0, Some(&labels), None);
        let size = axis.measure(&HeuristicTextMeasurer, 400.0);
        assert_eq!(axis.effective_label_angle(), Some(-45.0));
        assert!(size.height > 40.0);
    }

    #[test]
    fn horizontal_value_axis_keeps_labels_flat() {
        let labels = categories(20, "category ");
        let mut axis = Axis::new(Position::Bottom);
        axis.set_role(Some(AxisType::Y));
        axis.update_actual_limits(DataType::String, 0.0, 19.0, Some(&labels), None);
        axis.measure(&HeuristicTextMeasurer, 400.0);
        assert_eq!(axis.effective_label_angle(), None);
    }

    #[test]
    fn explicit_angle_is_never_overridden() {
        let labels = categories(20, "category ");
        let mut axis = Axis::new(Position::Bottom);
        axis.set_label_angle(Some(0.0)).expect("angle");
        axis.update_actual_limits(DataType::String, 0.0, 19.0, Some(&labels), None);
        let _ = axis.measure(&HeuristicTextMeasurer, 400.0);
        assert_eq!(axis.effective_label_angle(), Some(0.0));
    }

    #[test]
    fn roomy_axis_keeps_horizontal_labels() {
        let labels = categories(3, "c");
        let mut axis = Axis::new(Position::Bottom);
        axis.update_actual_limits(DataType::String, 0.0, 2.0, Some(&labels), None);
        let size = axis.measure(&HeuristicTextMeasurer, 600.0);
        assert_eq!(axis.effective_label_angle(), None);
        // tick + padding + one label line
        assert!((size.height - (5.0 + 5.0 + 14.4)).abs() <= 1e-9);
        assert_eq!(size.width, 600.0);
    }

    #[test]
    fn title_and_hidden_axis_sizes() {
        let mut axis = Axis::new(Position::Left);
        axis.set_labels(false);
        axis.set_title(Some("Revenue".to_owned()));
        axis.update_actual_limits(DataType::Number, 0.0, 10.0, None, None);
        let size = axis.measure(&HeuristicTextMeasurer, 300.0);
        assert!((size.width - (5.0 + 16.8 + 5.0)).abs() <= 1e-9);

        let mut hidden = Axis::new(Position::None);
        hidden.update_actual_limits(DataType::Number, 0.0, 10.0, None, None);
        assert_eq!(hidden.measure(&HeuristicTextMeasurer, 300.0), Size::default());
    }
}
