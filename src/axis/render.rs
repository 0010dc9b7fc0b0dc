use tracing::trace;

use crate::axis::measure::{TICK_LENGTH, outer_tick_extent};
use crate::axis::{Axis, LabelAlign, OverlappingLabels, Position, TickMark, TickSet};
use crate::core::types::{Point, Rect, Size};
use crate::render::{LineStyle, RenderEngine};

/// Padding added around a label box before testing it against labels
/// already placed.
pub const LABEL_COLLISION_PADDING: f64 = 4.0;

/// Axis line placement: `baseline` is the line's cross coordinate and
/// `outward` the sign pointing away from the plot.
#[derive(Debug, Clone, Copy)]
struct EdgeFrame {
    horizontal: bool,
    baseline: f64,
    outward: f64,
}

impl EdgeFrame {
    fn point(self, along: f64, offset: f64) -> Point {
        let across = self.baseline + self.outward * offset;
        if self.horizontal {
            Point::new(along, across)
        } else {
            Point::new(across, along)
        }
    }

    fn points_down_or_right(self) -> bool {
        self.outward > 0.0
    }
}

/// Inner and outer offsets of a tick mark relative to the axis line.
fn tick_span(marks: TickMark, length: f64) -> Option<(f64, f64)> {
    match marks {
        TickMark::None => None,
        TickMark::Outside => Some((0.0, length)),
        TickMark::Inside => Some((-length, 0.0)),
        TickMark::Cross => Some((-0.5 * length, 0.5 * length)),
    }
}

/// Top-left corner of the unrotated box of a label anchored at `anchor`.
fn label_origin(
    frame: EdgeFrame,
    anchor: Point,
    size: Size,
    angle: f64,
    align: LabelAlign,
) -> Point {
    let outward = frame.points_down_or_right();
    if frame.horizontal {
        let y = if outward {
            anchor.y
        } else {
            anchor.y - size.height
        };
        let x = if angle == 0.0 {
            match align {
                LabelAlign::Start => anchor.x,
                LabelAlign::Center => anchor.x - 0.5 * size.width,
                LabelAlign::End => anchor.x - size.width,
            }
        } else if (angle < 0.0) == outward {
            // rotated text ends at the tick and hangs away from the axis
            anchor.x - size.width
        } else {
            anchor.x
        };
        Point::new(x, y)
    } else {
        let x = if outward {
            anchor.x
        } else {
            anchor.x - size.width
        };
        let y = match align {
            LabelAlign::Start => anchor.y,
            LabelAlign::Center => anchor.y - 0.5 * size.height,
            LabelAlign::End => anchor.y - size.height,
        };
        Point::new(x, y)
    }
}

impl Axis {
    /// Fixes the rectangles used by conversion and rendering until the next
    /// layout pass.
    pub fn arrange(&mut self, axis_rect: Rect, plot_rect: Rect) {
        self.axis_rect = axis_rect;
        self.plot_rect = plot_rect;
    }

    fn length(&self) -> f64 {
        if self.is_horizontal() {
            self.plot_rect.width
        } else {
            self.plot_rect.height
        }
    }

    fn edge_frame(&self, edge: Position) -> EdgeFrame {
        let rect = self.axis_rect;
        let (baseline, outward) = match edge {
            Position::Top => (rect.bottom(), -1.0),
            Position::Left => (rect.right(), -1.0),
            Position::Right => (rect.left, 1.0),
            Position::Bottom | Position::Auto | Position::None => (rect.top, 1.0),
        };
        EdgeFrame {
            horizontal: self.is_horizontal(),
            baseline,
            outward,
        }
    }

    /// Draws major and minor gridlines across the plot rectangle.
    pub fn render_grid<E: RenderEngine + ?Sized>(&self, engine: &mut E) {
        let show_major = self.major_grid();
        let show_minor = self.options.minor_grid;
        if !show_major && !show_minor {
            return;
        }
        let ticks = self.generate_ticks(&*engine, self.length());
        if show_major {
            let style = LineStyle::major_grid();
            for value in ticks.major_values() {
                self.draw_grid_line(engine, value, &style);
            }
        }
        if show_minor {
            let style = LineStyle::minor_grid();
            for &value in &ticks.minor {
                self.draw_grid_line(engine, value, &style);
            }
        }
    }

    fn draw_grid_line<E: RenderEngine + ?Sized>(
        &self,
        engine: &mut E,
        value: f64,
        style: &LineStyle,
    ) {
        let pixel = self.convert(value, None, None);
        if !pixel.is_finite() {
            return;
        }
        let plot = self.plot_rect;
        let (from, to) = if self.is_horizontal() {
            (Point::new(pixel, plot.top), Point::new(pixel, plot.bottom()))
        } else {
            (Point::new(plot.left, pixel), Point::new(plot.right(), pixel))
        };
        engine.draw_line(from, to, style);
    }

    /// Draws the axis line, tick marks, labels and title into the arranged
    /// rectangle. Ticks are regenerated for the final plot length.
    pub fn render<E: RenderEngine + ?Sized>(&self, engine: &mut E) {
        let Some(edge) = self.edge() else {
            return;
        };
        let frame = self.edge_frame(edge);
        let plot = self.plot_rect;
        let line_style = LineStyle::axis_line();

        if self.axis_line() {
            let (start, end) = if frame.horizontal {
                (plot.left, plot.right())
            } else {
                (plot.top, plot.bottom())
            };
            engine.draw_line(frame.point(start, 0.0), frame.point(end, 0.0), &line_style);
        }

        let mut ticks = self.generate_ticks(&*engine, self.length());
        self.apply_item_formatter(&mut ticks, |tick| {
            frame.point(self.convert(tick.value, None, None), 0.0)
        });

        if let Some((inner, outer)) = tick_span(self.options.major_tick_marks, TICK_LENGTH) {
            for value in ticks.major_values() {
                self.draw_tick(engine, frame, value, (inner, outer), &line_style);
            }
        }
        if let Some((inner, outer)) = tick_span(self.options.minor_tick_marks, 0.5 * TICK_LENGTH) {
            for &value in &ticks.minor {
                self.draw_tick(engine, frame, value, (inner, outer), &line_style);
            }
        }

        if self.options.labels {
            self.render_labels(engine, frame, &ticks);
        }
        self.render_title(engine, edge);
    }

    fn draw_tick<E: RenderEngine + ?Sized>(
        &self,
        engine: &mut E,
        frame: EdgeFrame,
        value: f64,
        (inner, outer): (f64, f64),
        style: &LineStyle,
    ) {
        let pixel = self.convert(value, None, None);
        if pixel.is_finite() {
            engine.draw_line(frame.point(pixel, inner), frame.point(pixel, outer), style);
        }
    }

    /// Places labels greedily in tick order; with [`OverlappingLabels::Auto`]
    /// a label whose padded box hits an already placed one is skipped.
    fn render_labels<E: RenderEngine + ?Sized>(
        &self,
        engine: &mut E,
        frame: EdgeFrame,
        ticks: &TickSet,
    ) {
        let offset = outer_tick_extent(self.options.major_tick_marks, TICK_LENGTH)
            + self.options.label_padding;
        let angle = self.effective_label_angle.unwrap_or(0.0);
        let align = self.options.label_align.unwrap_or(LabelAlign::Center);
        let hide_overlaps = self.options.overlapping_labels == OverlappingLabels::Auto;

        let mut placed: Vec<Rect> = Vec::with_capacity(ticks.major.len());
        let mut skipped = 0usize;
        for tick in &ticks.major {
            if tick.label.is_empty() {
                continue;
            }
            let pixel = self.convert(tick.value, None, None);
            if !pixel.is_finite() {
                continue;
            }
            let size = engine.measure_string(&tick.label, &self.label_style);
            let anchor = frame.point(pixel, offset);
            let origin = label_origin(frame, anchor, size, angle, align);
            let bounds =
                Rect::new(origin.x, origin.y, size.width, size.height).rotated_bounds(anchor, angle);
            let padded = bounds.inflate(LABEL_COLLISION_PADDING);
            if hide_overlaps && placed.iter().any(|other| other.intersects(padded)) {
                skipped += 1;
                continue;
            }
            placed.push(bounds);
            if angle == 0.0 {
                engine.draw_string(&tick.label, origin, &self.label_style);
            } else {
                engine.draw_string_rotated(&tick.label, origin, anchor, angle, &self.label_style);
            }
        }
        if skipped > 0 {
            trace!(skipped, drawn = placed.len(), "overlapping axis labels hidden");
        }
    }

    fn render_title<E: RenderEngine + ?Sized>(&self, engine: &mut E, edge: Position) {
        let Some(title) = self.options.title.as_deref().filter(|t| !t.is_empty()) else {
            return;
        };
        let size = engine.measure_string(title, &self.title_style);
        let rect = self.axis_rect;
        let plot = self.plot_rect;
        match edge {
            Position::Left | Position::Right => {
                let (x, angle) = if edge == Position::Left {
                    (rect.left + 0.5 * size.height, -90.0)
                } else {
                    (rect.right() - 0.5 * size.height, 90.0)
                };
                let center = Point::new(x, plot.center().y);
                let origin = Point::new(center.x - 0.5 * size.width, center.y - 0.5 * size.height);
                engine.draw_string_rotated(title, origin, center, angle, &self.title_style);
            }
            Position::Top => {
                let origin = Point::new(plot.center().x - 0.5 * size.width, rect.top);
                engine.draw_string(title, origin, &self.title_style);
            }
            Position::Bottom | Position::Auto | Position::None => {
                let origin = Point::new(
                    plot.center().x - 0.5 * size.width,
                    rect.bottom() - size.height,
                );
                engine.draw_string(title, origin, &self.title_style);
            }
        }
    }
}
