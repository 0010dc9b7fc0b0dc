//! Chart layout: reserves space for every active axis around the plot
//! rectangle, then arranges each axis against its final rectangle.
//!
//! Axis size depends on its labels, which depend on the scale, which depends
//! on the plot size. The circle is broken by measuring every axis against
//! the full target length first (a trial tick pass), committing margins, and
//! regenerating ticks for the real plot length at render time.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::axis::{Axis, AxisId, Position};
use crate::chart::{PlotAreaCollection, PlotAreaId, PlotMargin};
use crate::core::types::{Rect, Size};
use crate::render::TextMeasurer;

/// Substituted for host dimensions that are zero, negative or NaN.
pub const DEFAULT_HOST_SIZE: Size = Size::new(640.0, 400.0);

/// An axis never takes more than this share of the perpendicular dimension.
pub const MAX_AXIS_SHARE: f64 = 0.75;

/// Rectangles resolved by one layout pass.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartLayout {
    pub chart_rect: Rect,
    pub plot_rect: Rect,
    /// Empty for single-area charts.
    pub plot_area_rects: IndexMap<PlotAreaId, Rect>,
    pub axis_rects: IndexMap<AxisId, Rect>,
}

/// Inputs shared by single- and multi-area layout.
#[derive(Debug, Clone, Copy)]
pub struct LayoutContext<'a> {
    pub chart_rect: Rect,
    /// Space left for axes and plot after header, footer and legend.
    pub target: Rect,
    pub margin: &'a PlotMargin,
    pub plot_areas: &'a PlotAreaCollection,
    pub main_x: AxisId,
    pub main_y: AxisId,
}

#[must_use]
pub fn normalize_host_size(host: Size) -> Size {
    let pick = |value: f64, fallback: f64| {
        if value.is_finite() && value > 0.0 {
            value
        } else {
            fallback
        }
    };
    Size::new(
        pick(host.width, DEFAULT_HOST_SIZE.width),
        pick(host.height, DEFAULT_HOST_SIZE.height),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct Margins {
    top: f64,
    right: f64,
    bottom: f64,
    left: f64,
}

impl Margins {
    fn side_mut(&mut self, edge: Position) -> Option<&mut f64> {
        match edge {
            Position::Top => Some(&mut self.top),
            Position::Right => Some(&mut self.right),
            Position::Bottom => Some(&mut self.bottom),
            Position::Left => Some(&mut self.left),
            Position::None | Position::Auto => None,
        }
    }

    fn max(self, other: Self) -> Self {
        Self {
            top: self.top.max(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
            left: self.left.max(other.left),
        }
    }

    fn apply_overrides(&mut self, margin: &PlotMargin) {
        let sides = [
            (&mut self.top, margin.top),
            (&mut self.right, margin.right),
            (&mut self.bottom, margin.bottom),
            (&mut self.left, margin.left),
        ];
        for (side, explicit) in sides {
            if let Some(value) = explicit {
                *side = value;
            }
        }
    }

    /// Remaining central rectangle, never smaller than 1x1.
    fn plot_rect(self, target: Rect) -> Rect {
        Rect::new(
            target.left + self.left,
            target.top + self.top,
            (target.width - self.left - self.right).max(1.0),
            (target.height - self.top - self.bottom).max(1.0),
        )
    }
}

#[derive(Debug, Clone, Copy)]
struct MeasuredAxis {
    id: AxisId,
    edge: Option<Position>,
    horizontal: bool,
    thickness: f64,
    /// Normalized position of the crossing on the perpendicular main axis.
    origin: Option<f64>,
    /// Column index for horizontal axes, row index for vertical ones.
    bucket: usize,
    /// Space taken by axes stacked closer to the plot on the same edge.
    offset: f64,
}

/// Lays out `active` axes (ids into `axes`) and arranges each of them.
///
/// Unknown ids in `active` are skipped.
pub fn layout<M: TextMeasurer + ?Sized>(
    ctx: &LayoutContext<'_>,
    measurer: &M,
    axes: &mut IndexMap<AxisId, Axis>,
    active: &[AxisId],
) -> ChartLayout {
    let layout = if ctx.plot_areas.is_empty() {
        layout_single(ctx, measurer, axes, active)
    } else {
        layout_multiple(ctx, measurer, axes, active)
    };
    trace!(
        plot_left = layout.plot_rect.left,
        plot_top = layout.plot_rect.top,
        plot_width = layout.plot_rect.width,
        plot_height = layout.plot_rect.height,
        axes = layout.axis_rects.len(),
        areas = layout.plot_area_rects.len(),
        "chart layout resolved"
    );
    layout
}

fn origin_fraction(ctx: &LayoutContext<'_>, axes: &IndexMap<AxisId, Axis>, axis: &Axis) -> Option<f64> {
    let origin = axis.options().origin?;
    let perpendicular = [ctx.main_x, ctx.main_y]
        .iter()
        .filter_map(|id| axes.get(id))
        .find(|other| other.is_horizontal() != axis.is_horizontal())?;
    let inside = origin > perpendicular.actual_min() && origin < perpendicular.actual_max();
    if !inside {
        return None;
    }
    let fraction = perpendicular.fraction(origin);
    fraction.is_finite().then_some(fraction)
}

fn measure_axes<M: TextMeasurer + ?Sized>(
    ctx: &LayoutContext<'_>,
    measurer: &M,
    axes: &mut IndexMap<AxisId, Axis>,
    active: &[AxisId],
    lengths: (f64, f64),
    with_origins: bool,
) -> Vec<MeasuredAxis> {
    let target = ctx.target;
    let mut measured = Vec::with_capacity(active.len());
    for &id in active {
        let origin = match axes.get(&id) {
            Some(axis) if with_origins => origin_fraction(ctx, axes, axis),
            Some(_) => None,
            None => continue,
        };
        let Some(axis) = axes.get_mut(&id) else {
            continue;
        };
        let horizontal = axis.is_horizontal();
        let (length, cap) = if horizontal {
            (lengths.0, MAX_AXIS_SHARE * target.height)
        } else {
            (lengths.1, MAX_AXIS_SHARE * target.width)
        };
        let size = axis.measure(measurer, length);
        let thickness = if horizontal { size.height } else { size.width };
        let bucket = axis
            .options()
            .plot_area
            .and_then(|area| ctx.plot_areas.get(area))
            .map_or(0, |area| if horizontal { area.column } else { area.row });
        measured.push(MeasuredAxis {
            id,
            edge: axis.edge(),
            horizontal,
            thickness: thickness.min(cap).max(0.0),
            origin,
            bucket,
            offset: 0.0,
        });
    }
    measured
}

/// Rectangle of an axis flush against `span`'s `edge`, `offset` pixels out.
fn edge_rect(edge: Position, offset: f64, thickness: f64, span: Rect) -> Rect {
    match edge {
        Position::Bottom => Rect::new(span.left, span.bottom() + offset, span.width, thickness),
        Position::Top => Rect::new(span.left, span.top - offset - thickness, span.width, thickness),
        Position::Left => Rect::new(span.left - offset - thickness, span.top, thickness, span.height),
        Position::Right => Rect::new(span.right() + offset, span.top, thickness, span.height),
        Position::None | Position::Auto => Rect::new(span.left, span.top, 0.0, 0.0),
    }
}

/// Rectangle of an axis crossing the plot at normalized `fraction`.
fn origin_rect(edge: Position, fraction: f64, thickness: f64, plot: Rect) -> Rect {
    let x = plot.left + fraction * plot.width;
    let y = plot.bottom() - fraction * plot.height;
    match edge {
        Position::Bottom => Rect::new(plot.left, y, plot.width, thickness),
        Position::Top => Rect::new(plot.left, y - thickness, plot.width, thickness),
        Position::Left => Rect::new(x - thickness, plot.top, thickness, plot.height),
        Position::Right => Rect::new(x, plot.top, thickness, plot.height),
        Position::None | Position::Auto => Rect::new(plot.left, plot.top, 0.0, 0.0),
    }
}

/// Pixels between a crossing axis and the plot edge it extends toward.
fn origin_room(edge: Position, fraction: f64, plot: Rect) -> f64 {
    match edge {
        Position::Bottom => fraction * plot.height,
        Position::Top => (1.0 - fraction) * plot.height,
        Position::Left => fraction * plot.width,
        Position::Right => (1.0 - fraction) * plot.width,
        Position::None | Position::Auto => f64::INFINITY,
    }
}

fn stack_on_edges(measured: &mut [MeasuredAxis], margins: &mut Margins) {
    for axis in measured.iter_mut().filter(|axis| axis.origin.is_none()) {
        if let Some(side) = axis.edge.and_then(|edge| margins.side_mut(edge)) {
            axis.offset = *side;
            *side += axis.thickness;
        }
    }
}

fn layout_single<M: TextMeasurer + ?Sized>(
    ctx: &LayoutContext<'_>,
    measurer: &M,
    axes: &mut IndexMap<AxisId, Axis>,
    active: &[AxisId],
) -> ChartLayout {
    let target = ctx.target;
    let mut measured = measure_axes(
        ctx,
        measurer,
        axes,
        active,
        (target.width, target.height),
        true,
    );

    let mut margins = Margins::default();
    stack_on_edges(&mut measured, &mut margins);

    // Crossing axes only claim the part of their footprint that would
    // overflow past the plot edge.
    let provisional = margins.plot_rect(target);
    for axis in &measured {
        let (Some(fraction), Some(edge)) = (axis.origin, axis.edge) else {
            continue;
        };
        let overflow = axis.thickness - origin_room(edge, fraction, provisional);
        if overflow > 0.0 {
            if let Some(side) = margins.side_mut(edge) {
                *side = side.max(overflow);
            }
        }
    }

    margins.apply_overrides(ctx.margin);
    let plot = margins.plot_rect(target);

    let mut axis_rects = IndexMap::with_capacity(measured.len());
    for axis in &measured {
        let rect = match (axis.edge, axis.origin) {
            (None, _) => Rect::new(plot.left, plot.top, 0.0, 0.0),
            (Some(edge), Some(fraction)) => origin_rect(edge, fraction, axis.thickness, plot),
            (Some(edge), None) => edge_rect(edge, axis.offset, axis.thickness, plot),
        };
        if let Some(target_axis) = axes.get_mut(&axis.id) {
            target_axis.arrange(rect, plot);
        }
        axis_rects.insert(axis.id, rect);
    }

    ChartLayout {
        chart_rect: ctx.chart_rect,
        plot_rect: plot,
        plot_area_rects: IndexMap::new(),
        axis_rects,
    }
}

/// Grid layout: horizontal axes are bucketed by column and vertical axes by
/// row. Per-bucket margins are reconciled by taking the maximum so every
/// cell shares one plot grid. Axis origins are not honoured here.
fn layout_multiple<M: TextMeasurer + ?Sized>(
    ctx: &LayoutContext<'_>,
    measurer: &M,
    axes: &mut IndexMap<AxisId, Axis>,
    active: &[AxisId],
) -> ChartLayout {
    let target = ctx.target;
    let areas = ctx.plot_areas;
    let rows = areas.row_count().max(1);
    let columns = areas.column_count().max(1);

    let mut measured = measure_axes(
        ctx,
        measurer,
        axes,
        active,
        (target.width / columns as f64, target.height / rows as f64),
        false,
    );
    for axis in &mut measured {
        let buckets = if axis.horizontal { columns } else { rows };
        axis.bucket = axis.bucket.min(buckets - 1);
    }

    let mut bucket_margins = vec![Margins::default(); rows.max(columns)];
    for axis in &mut measured {
        let (Some(edge), Some(margins)) = (axis.edge, bucket_margins.get_mut(axis.bucket)) else {
            continue;
        };
        // rows and columns share the vector; they stack on different sides
        if let Some(side) = margins.side_mut(edge) {
            axis.offset = *side;
            *side += axis.thickness;
        }
    }
    let mut shared = bucket_margins
        .iter()
        .fold(Margins::default(), |acc, margins| acc.max(*margins));
    shared.apply_overrides(ctx.margin);
    let plot = shared.plot_rect(target);

    let row_spans = areas.row_spans(plot.top, plot.height);
    let column_spans = areas.column_spans(plot.left, plot.width);
    let plot_area_rects: IndexMap<PlotAreaId, Rect> = areas.cell_rects(plot).into_iter().collect();

    let mut axis_rects = IndexMap::with_capacity(measured.len());
    for axis in &measured {
        let span = if axis.horizontal {
            column_spans.get(axis.bucket).map_or(plot, |column| {
                Rect::new(column.start, plot.top, column.length, plot.height)
            })
        } else {
            row_spans.get(axis.bucket).map_or(plot, |row| {
                Rect::new(plot.left, row.start, plot.width, row.length)
            })
        };
        let rect = match axis.edge {
            Some(edge) => edge_rect(edge, axis.offset, axis.thickness, span),
            None => Rect::new(span.left, span.top, 0.0, 0.0),
        };
        if let Some(target_axis) = axes.get_mut(&axis.id) {
            target_axis.arrange(rect, span);
        }
        axis_rects.insert(axis.id, rect);
    }

    ChartLayout {
        chart_rect: ctx.chart_rect,
        plot_rect: plot,
        plot_area_rects,
        axis_rects,
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::{LayoutContext, MAX_AXIS_SHARE, layout, normalize_host_size};
    use crate::axis::{Axis, AxisId, Position};
    use crate::chart::{PlotAreaCollection, PlotMargin};
    use crate::core::types::{DataType, Rect, Size};
    use crate::render::HeuristicTextMeasurer;

    const X: AxisId = AxisId::new(0);
    const Y: AxisId = AxisId::new(1);

    fn main_axes() -> IndexMap<AxisId, Axis> {
        let mut x = Axis::new(Position::Bottom);
        x.update_actual_limits(DataType::Number, 0.0, 10.0, None, None);
        let mut y = Axis::new(Position::Left);
        y.update_actual_limits(DataType::Number, -10.0, 10.0, None, None);
        IndexMap::from([(X, x), (Y, y)])
    }

    fn run(
        axes: &mut IndexMap<AxisId, Axis>,
        margin: &PlotMargin,
        areas: &PlotAreaCollection,
        target: Rect,
    ) -> super::ChartLayout {
        let ctx = LayoutContext {
            chart_rect: target,
            target,
            margin,
            plot_areas: areas,
            main_x: X,
            main_y: Y,
        };
        let active: Vec<AxisId> = axes.keys().copied().collect();
        layout(&ctx, &HeuristicTextMeasurer, axes, &active)
    }

    #[test]
    fn host_size_falls_back_per_dimension() {
        assert_eq!(normalize_host_size(Size::new(0.0, f64::NAN)), Size::new(640.0, 400.0));
        assert_eq!(normalize_host_size(Size::new(300.0, -1.0)), Size::new(300.0, 400.0));
    }

    #[test]
    fn margins_come_from_axis_thickness() {
        let mut axes = main_axes();
        let target = Rect::new(0.0, 0.0, 400.0, 300.0);
        let result = run(&mut axes, &PlotMargin::default(), &PlotAreaCollection::default(), target);

        let x_thickness = axes[&X].desired_size().height;
        let y_thickness = axes[&Y].desired_size().width;
        assert!((result.plot_rect.left - y_thickness).abs() <= 1e-9);
        assert!((result.plot_rect.bottom() - (300.0 - x_thickness)).abs() <= 1e-9);
        assert_eq!(result.axis_rects[&X].top, result.plot_rect.bottom());
        assert_eq!(result.axis_rects[&Y].right(), result.plot_rect.left);
        assert_eq!(axes[&X].plot_rect(), result.plot_rect);
    }

    #[test]
    fn explicit_margins_replace_computed_sides() {
        let mut axes = main_axes();
        let margin: PlotMargin = "10 auto auto 50".parse().expect("margin");
        let result = run(
            &mut axes,
            &margin,
            &PlotAreaCollection::default(),
            Rect::new(0.0, 0.0, 400.0, 300.0),
        );
        assert_eq!(result.plot_rect.top, 10.0);
        assert_eq!(result.plot_rect.left, 50.0);
    }

    #[test]
    fn crossing_axis_does_not_reserve_its_edge() {
        let mut axes = main_axes();
        axes[&X].set_origin(Some(0.0));
        let result = run(
            &mut axes,
            &PlotMargin::default(),
            &PlotAreaCollection::default(),
            Rect::new(0.0, 0.0, 400.0, 300.0),
        );
        let plot = result.plot_rect;
        assert_eq!(plot.bottom(), 300.0);
        let x_rect = result.axis_rects[&X];
        assert!((x_rect.top - (plot.top + 0.5 * plot.height)).abs() <= 1e-9);
    }

    #[test]
    fn thick_axes_are_capped_and_plot_stays_positive() {
        let long = vec!["x".repeat(200)];
        let mut axes = main_axes();
        axes[&X].set_label_angle(Some(90.0)).expect("angle");
        axes[&X].update_actual_limits(DataType::String, 0.0, 0.0, Some(&long), None);
        let target = Rect::new(0.0, 0.0, 400.0, 300.0);
        let result = run(&mut axes, &PlotMargin::default(), &PlotAreaCollection::default(), target);
        assert!((result.axis_rects[&X].height - MAX_AXIS_SHARE * 300.0).abs() <= 1e-9);

        let tiny = Rect::new(0.0, 0.0, 20.0, 20.0);
        let result = run(&mut axes, &PlotMargin::default(), &PlotAreaCollection::default(), tiny);
        assert!(result.plot_rect.width >= 1.0);
        assert!(result.plot_rect.height >= 1.0);
    }

    #[test]
    fn multiple_areas_share_one_grid() {
        let mut areas = PlotAreaCollection::default();
        let top = areas.add(0, 0);
        let bottom = areas.add(1, 0);
        let mut axes = main_axes();
        axes[&Y].set_plot_area(Some(top));
        let mut lower = Axis::new(Position::Left);
        lower.set_plot_area(Some(bottom));
        lower.update_actual_limits(DataType::Number, 0.0, 1_000_000.0, None, None);
        axes.insert(AxisId::new(2), lower);

        let result = run(
            &mut axes,
            &PlotMargin::default(),
            &areas,
            Rect::new(0.0, 0.0, 400.0, 400.0),
        );
        let top_cell = result.plot_area_rects[&top];
        let bottom_cell = result.plot_area_rects[&bottom];
        assert_eq!(top_cell.left, bottom_cell.left);
        assert!((top_cell.bottom() - bottom_cell.top).abs() <= 1e-9);
        assert_eq!(axes[&Y].plot_rect().top, top_cell.top);
        assert_eq!(axes[&AxisId::new(2)].plot_rect().top, bottom_cell.top);
        let widest = axes[&Y].desired_size().width.max(axes[&AxisId::new(2)].desired_size().width);
        assert!((result.plot_rect.left - widest).abs() <= 1e-9);
    }
}
