use crate::axis::Axis;
use crate::core::series::{SeriesSource, ValueRole};
use crate::core::types::Point;
use crate::render::{LineStyle, RenderEngine, series_color};

/// Draws one series' geometry once the axes are arranged.
///
/// Plotters see the engine as a trait object so charts can swap them at
/// runtime.
pub trait SeriesPlotter {
    fn plot(
        &self,
        index: usize,
        series: &dyn SeriesSource,
        axis_x: &Axis,
        axis_y: &Axis,
        engine: &mut dyn RenderEngine,
    );
}

/// Connects consecutive points with straight segments; gaps break the line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolylinePlotter {
    pub stroke_width: f64,
}

impl Default for PolylinePlotter {
    fn default() -> Self {
        Self { stroke_width: 2.0 }
    }
}

/// Pixel point for a data pair; the X axis may run vertically on rotated
/// charts.
pub(crate) fn project(axis_x: &Axis, axis_y: &Axis, x: f64, y: f64) -> Point {
    let px = axis_x.convert(x, None, None);
    let py = axis_y.convert(y, None, None);
    if axis_x.is_horizontal() {
        Point::new(px, py)
    } else {
        Point::new(py, px)
    }
}

impl SeriesPlotter for PolylinePlotter {
    fn plot(
        &self,
        index: usize,
        series: &dyn SeriesSource,
        axis_x: &Axis,
        axis_y: &Axis,
        engine: &mut dyn RenderEngine,
    ) {
        let Some(ys) = series.values(ValueRole::Y) else {
            return;
        };
        let xs = series.values(ValueRole::X);
        let style = LineStyle::solid(series_color(index), self.stroke_width);

        let mut previous: Option<Point> = None;
        for (i, y) in ys.iter().enumerate() {
            let x = match xs {
                Some(xs) => xs.get(i).copied().flatten(),
                None => axis_x
                    .values()
                    .and_then(|values| values.get(i).copied())
                    .or(Some(i as f64)),
            };
            let point = match (x, *y) {
                (Some(x), Some(y)) => Some(project(axis_x, axis_y, x, y)),
                _ => None,
            }
            .filter(|p| p.x.is_finite() && p.y.is_finite());

            if let (Some(from), Some(to)) = (previous, point) {
                engine.draw_line(from, to, &style);
            }
            previous = point;
        }
    }
}
