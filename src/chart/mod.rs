//! Chart host: owns the axis and series collections, plot areas and chart
//! decorations, and drives one synchronous render pass:
//! aggregate data, resolve axis ranges, lay out, draw.

mod config;
mod layout;
mod legend;
mod margin;
mod plot_area;
mod plotter;

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::debug;

use crate::axis::{Axis, AxisId, AxisType, Position};
use crate::core::data_info::{Stacking, analyse, value_range};
use crate::core::series::{SeriesSource, ValueRole};
use crate::core::types::{DataType, Point, Rect, Size};
use crate::error::{ChartError, ChartResult};
use crate::render::{RenderEngine, TextClass, TextStyle, series_color};

pub use config::ChartConfig;
pub use layout::{
    ChartLayout, DEFAULT_HOST_SIZE, LayoutContext, MAX_AXIS_SHARE, layout, normalize_host_size,
};
pub use legend::{Legend, LegendEntry, LegendPosition};
pub use margin::PlotMargin;
pub use plot_area::{PlotArea, PlotAreaCollection, PlotAreaId, Span, distribute};
pub use plotter::{PolylinePlotter, SeriesPlotter};

/// Blank space kept around the whole chart.
const CHART_PADDING: f64 = 5.0;
/// Gap between the header/footer and the plot.
const TITLE_GAP: f64 = 5.0;

/// Position a main axis takes when the chart is rotated.
fn rotate_position(position: Position) -> Position {
    match position {
        Position::Bottom => Position::Left,
        Position::Left => Position::Bottom,
        Position::Top => Position::Right,
        Position::Right => Position::Top,
        Position::None | Position::Auto => position,
    }
}

/// Cuts a strip of `height` pixels off the top or bottom of `area`.
fn take_strip(area: &mut Rect, height: f64, top: bool) -> Rect {
    let height = height.min(area.height).max(0.0);
    let strip = if top {
        let strip = Rect::new(area.left, area.top, area.width, height);
        area.top += height;
        strip
    } else {
        Rect::new(area.left, area.bottom() - height, area.width, height)
    };
    area.height -= height;
    strip
}

pub struct Chart {
    axes: IndexMap<AxisId, Axis>,
    next_axis_id: u32,
    axis_x: AxisId,
    axis_y: AxisId,
    series: Vec<Box<dyn SeriesSource>>,
    plot_areas: PlotAreaCollection,
    rotated: bool,
    stacking: Stacking,
    plot_margin: PlotMargin,
    header: Option<String>,
    footer: Option<String>,
    legend: Legend,
    x_labels: Option<Vec<String>>,
    x_values: Option<Vec<f64>>,
    invalidated: Rc<Cell<bool>>,
    plotter: Box<dyn SeriesPlotter>,
    last_layout: Option<ChartLayout>,
}

impl fmt::Debug for Chart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chart")
            .field("axes", &self.axes)
            .field("axis_x", &self.axis_x)
            .field("axis_y", &self.axis_y)
            .field("series", &self.series.len())
            .field("plot_areas", &self.plot_areas)
            .field("rotated", &self.rotated)
            .field("stacking", &self.stacking)
            .field("invalidated", &self.invalidated.get())
            .finish_non_exhaustive()
    }
}

impl Default for Chart {
    fn default() -> Self {
        Self::new()
    }
}

impl Chart {
    /// Creates a chart with a bottom X axis and a left Y axis.
    #[must_use]
    pub fn new() -> Self {
        let mut chart = Self {
            axes: IndexMap::new(),
            next_axis_id: 0,
            axis_x: AxisId::new(0),
            axis_y: AxisId::new(1),
            series: Vec::new(),
            plot_areas: PlotAreaCollection::default(),
            rotated: false,
            stacking: Stacking::None,
            plot_margin: PlotMargin::default(),
            header: None,
            footer: None,
            legend: Legend::default(),
            x_labels: None,
            x_values: None,
            invalidated: Rc::new(Cell::new(true)),
            plotter: Box::new(PolylinePlotter::default()),
            last_layout: None,
        };
        chart.axis_x = chart.insert_axis(Axis::new(Position::Bottom));
        chart.axis_y = chart.insert_axis(Axis::new(Position::Left));
        chart.assign_roles();
        chart
    }

    fn insert_axis(&mut self, mut axis: Axis) -> AxisId {
        let id = AxisId::new(self.next_axis_id);
        self.next_axis_id = self.next_axis_id.saturating_add(1);
        axis.attach(&self.invalidated);
        axis.set_rotated(self.rotated);
        self.axes.insert(id, axis);
        id
    }

    fn assign_roles(&mut self) {
        let (main_x, main_y) = (self.axis_x, self.axis_y);
        for (id, axis) in &mut self.axes {
            let role = if *id == main_x {
                Some(AxisType::X)
            } else if *id == main_y {
                Some(AxisType::Y)
            } else {
                None
            };
            axis.set_role(role);
        }
    }

    // --- invalidation ---------------------------------------------------

    /// Marks the chart dirty; the next render pass picks up every change.
    pub fn invalidate(&self) {
        self.invalidated.set(true);
    }

    #[must_use]
    pub fn is_invalidated(&self) -> bool {
        self.invalidated.get()
    }

    // --- axes -----------------------------------------------------------------

    #[must_use]
    pub fn axis_x_id(&self) -> AxisId {
        self.axis_x
    }

    #[must_use]
    pub fn axis_y_id(&self) -> AxisId {
        self.axis_y
    }

    #[must_use]
    pub fn axis_x(&self) -> &Axis {
        // Invariant: main axes cannot be removed.
        &self.axes[&self.axis_x]
    }

    #[must_use]
    pub fn axis_y(&self) -> &Axis {
        &self.axes[&self.axis_y]
    }

    pub fn axis_x_mut(&mut self) -> &mut Axis {
        let id = self.axis_x;
        &mut self.axes[&id]
    }

    pub fn axis_y_mut(&mut self) -> &mut Axis {
        let id = self.axis_y;
        &mut self.axes[&id]
    }

    #[must_use]
    pub fn axis(&self, id: AxisId) -> Option<&Axis> {
        self.axes.get(&id)
    }

    pub fn axis_mut(&mut self, id: AxisId) -> Option<&mut Axis> {
        self.axes.get_mut(&id)
    }

    pub fn axes(&self) -> impl Iterator<Item = (AxisId, &Axis)> + '_ {
        self.axes.iter().map(|(id, axis)| (*id, axis))
    }

    /// Adds an auxiliary axis. The chart takes ownership; the axis keeps a
    /// weak link back for invalidation.
    pub fn add_axis(&mut self, axis: Axis) -> ChartResult<AxisId> {
        if axis.is_attached() {
            return Err(ChartError::InvalidData(
                "axis is already attached to a chart".to_owned(),
            ));
        }
        if let Some(area) = axis.options().plot_area {
            if !self.plot_areas.contains(area) {
                return Err(ChartError::UnknownPlotArea(area));
            }
        }
        let id = self.insert_axis(axis);
        self.invalidate();
        Ok(id)
    }

    /// Removes an auxiliary axis and hands it back detached.
    pub fn remove_axis(&mut self, id: AxisId) -> ChartResult<Axis> {
        if id == self.axis_x || id == self.axis_y {
            return Err(ChartError::AxisInUse {
                axis: id,
                reason: "main axis",
            });
        }
        if self
            .series
            .iter()
            .any(|series| series.axis_x() == Some(id) || series.axis_y() == Some(id))
        {
            return Err(ChartError::AxisInUse {
                axis: id,
                reason: "referenced by a series",
            });
        }
        let mut axis = self
            .axes
            .shift_remove(&id)
            .ok_or(ChartError::UnknownAxis(id))?;
        axis.detach();
        self.invalidate();
        Ok(axis)
    }

    /// Makes `id` the main X axis; the previous one becomes auxiliary.
    pub fn set_axis_x(&mut self, id: AxisId) -> ChartResult<()> {
        self.set_main_axis(id, AxisType::X)
    }

    pub fn set_axis_y(&mut self, id: AxisId) -> ChartResult<()> {
        self.set_main_axis(id, AxisType::Y)
    }

    fn set_main_axis(&mut self, id: AxisId, role: AxisType) -> ChartResult<()> {
        if !self.axes.contains_key(&id) {
            return Err(ChartError::UnknownAxis(id));
        }
        let (current, other) = match role {
            AxisType::X => (self.axis_x, self.axis_y),
            AxisType::Y => (self.axis_y, self.axis_x),
        };
        if id == current {
            return Ok(());
        }
        if id == other {
            return Err(ChartError::AxisInUse {
                axis: id,
                reason: "main axis of the other role",
            });
        }
        match role {
            AxisType::X => self.axis_x = id,
            AxisType::Y => self.axis_y = id,
        }
        self.assign_roles();
        self.invalidate();
        Ok(())
    }

    // --- series ---------------------------------------------------------------

    pub fn add_series(&mut self, series: impl SeriesSource + 'static) -> ChartResult<usize> {
        for axis in [series.axis_x(), series.axis_y()].into_iter().flatten() {
            if !self.axes.contains_key(&axis) {
                return Err(ChartError::UnknownAxis(axis));
            }
        }
        self.series.push(Box::new(series));
        self.invalidate();
        Ok(self.series.len() - 1)
    }

    pub fn remove_series(&mut self, index: usize) -> ChartResult<Box<dyn SeriesSource>> {
        if index >= self.series.len() {
            return Err(ChartError::UnknownSeries(index));
        }
        let removed = self.series.remove(index);
        self.invalidate();
        Ok(removed)
    }

    #[must_use]
    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    #[must_use]
    pub fn series(&self, index: usize) -> Option<&dyn SeriesSource> {
        self.series.get(index).map(|series| series.as_ref())
    }

    // --- chart options ----------------------------------------------------------

    #[must_use]
    pub fn is_rotated(&self) -> bool {
        self.rotated
    }

    /// Rotated charts run the X role vertically; the main axes swap edges.
    pub fn set_rotated(&mut self, rotated: bool) {
        if self.rotated == rotated {
            return;
        }
        self.rotated = rotated;
        let (main_x, main_y) = (self.axis_x, self.axis_y);
        for (id, axis) in &mut self.axes {
            axis.set_rotated(rotated);
            if *id == main_x || *id == main_y {
                axis.set_position(rotate_position(axis.position()));
            }
        }
        self.invalidate();
    }

    #[must_use]
    pub fn stacking(&self) -> Stacking {
        self.stacking
    }

    pub fn set_stacking(&mut self, stacking: Stacking) {
        if self.stacking != stacking {
            self.stacking = stacking;
            self.invalidate();
        }
    }

    #[must_use]
    pub fn plot_margin(&self) -> PlotMargin {
        self.plot_margin
    }

    pub fn set_plot_margin(&mut self, margin: PlotMargin) {
        if self.plot_margin != margin {
            self.plot_margin = margin;
            self.invalidate();
        }
    }

    pub fn set_header(&mut self, header: Option<String>) {
        if self.header != header {
            self.header = header;
            self.invalidate();
        }
    }

    pub fn set_footer(&mut self, footer: Option<String>) {
        if self.footer != footer {
            self.footer = footer;
            self.invalidate();
        }
    }

    #[must_use]
    pub fn legend(&self) -> &Legend {
        &self.legend
    }

    pub fn set_legend(&mut self, legend: Legend) {
        if self.legend != legend {
            self.legend = legend;
            self.invalidate();
        }
    }

    /// Category labels for the main X axis, optionally at explicit
    /// positions given by [`Chart::set_x_values`].
    pub fn set_x_labels(&mut self, labels: Option<Vec<String>>) {
        if self.x_labels != labels {
            self.x_labels = labels;
            self.invalidate();
        }
    }

    /// Shared x positions for series without their own X values.
    pub fn set_x_values(&mut self, values: Option<Vec<f64>>) {
        if self.x_values != values {
            self.x_values = values;
            self.invalidate();
        }
    }

    #[must_use]
    pub fn plot_areas(&self) -> &PlotAreaCollection {
        &self.plot_areas
    }

    /// Mutable plot areas; the chart is invalidated up front.
    pub fn plot_areas_mut(&mut self) -> &mut PlotAreaCollection {
        self.invalidate();
        &mut self.plot_areas
    }

    pub fn set_plotter(&mut self, plotter: Box<dyn SeriesPlotter>) {
        self.plotter = plotter;
        self.invalidate();
    }

    /// Layout of the last completed render pass.
    #[must_use]
    pub fn last_layout(&self) -> Option<&ChartLayout> {
        self.last_layout.as_ref()
    }

    // --- render pipeline -------------------------------------------------------

    /// Axes taking part in layout: the main pair plus auxiliary axes some
    /// series refers to.
    fn active_axes(&self) -> Vec<AxisId> {
        self.axes
            .keys()
            .copied()
            .filter(|id| {
                *id == self.axis_x
                    || *id == self.axis_y
                    || self
                        .series
                        .iter()
                        .any(|series| series.axis_x() == Some(*id) || series.axis_y() == Some(*id))
            })
            .collect()
    }

    /// Aggregates series data and resolves the actual range of every axis.
    pub fn update_axis_ranges(&mut self) {
        let log_x = self.axis_x().is_log();
        let log_y = self.axis_y().is_log();
        let on_main_y: Vec<&dyn SeriesSource> = self
            .series
            .iter()
            .filter(|series| series.axis_y().is_none())
            .map(|series| series.as_ref())
            .collect();
        let summary = analyse(
            &on_main_y,
            self.rotated,
            self.stacking,
            self.x_values.as_deref(),
            log_x,
            log_y,
        );
        let x_only: Vec<&dyn SeriesSource> = self
            .series
            .iter()
            .filter(|series| series.axis_y().is_some() && series.axis_x().is_none())
            .map(|series| series.as_ref())
            .collect();
        let (extra_min, extra_max) = value_range(&x_only, ValueRole::X, log_x);

        let mut auxiliary = Vec::new();
        for (&id, axis) in &self.axes {
            if id == self.axis_x || id == self.axis_y {
                continue;
            }
            let as_x: Vec<&dyn SeriesSource> = self
                .series
                .iter()
                .filter(|series| series.axis_x() == Some(id))
                .map(|series| series.as_ref())
                .collect();
            let as_y: Vec<&dyn SeriesSource> = self
                .series
                .iter()
                .filter(|series| series.axis_y() == Some(id))
                .map(|series| series.as_ref())
                .collect();
            if as_x.is_empty() && as_y.is_empty() {
                continue;
            }
            let (x_min, x_max) = value_range(&as_x, ValueRole::X, axis.is_log());
            let (y_min, y_max) = value_range(&as_y, ValueRole::Y, axis.is_log());
            let data_type = as_x
                .first()
                .map(|series| series.data_type(ValueRole::X))
                .or_else(|| as_y.first().map(|series| series.data_type(ValueRole::Y)))
                .unwrap_or(DataType::Number);
            auxiliary.push((id, data_type, x_min.min(y_min), x_max.max(y_max)));
        }

        let (main_x, main_y) = (self.axis_x, self.axis_y);
        let labels = self.x_labels.as_deref();
        let values = labels.and(self.x_values.as_deref());
        if let Some(axis) = self.axes.get_mut(&main_x) {
            axis.update_actual_limits(
                summary.data_type_x,
                summary.min_x.min(extra_min),
                summary.max_x.max(extra_max),
                labels,
                values,
            );
        }
        if let Some(axis) = self.axes.get_mut(&main_y) {
            axis.update_actual_limits(summary.data_type_y, summary.min_y, summary.max_y, None, None);
        }
        for (id, data_type, min, max) in auxiliary {
            if let Some(axis) = self.axes.get_mut(&id) {
                axis.update_actual_limits(data_type, min, max, None, None);
            }
        }
    }

    fn legend_entries(&self) -> Vec<LegendEntry> {
        self.series
            .iter()
            .enumerate()
            .filter(|(_, series)| series.visibility().shows_in_legend())
            .map(|(index, series)| LegendEntry {
                name: series.name().to_owned(),
                color: series_color(index),
            })
            .collect()
    }

    /// Runs one complete pass: ranges, layout and drawing into `engine`.
    ///
    /// Zero or NaN host dimensions fall back to [`DEFAULT_HOST_SIZE`].
    /// Range-changed listeners fired during the pass never re-enter it.
    pub fn render<E: RenderEngine>(&mut self, engine: &mut E, host: Size) -> ChartResult<ChartLayout> {
        let size = normalize_host_size(host);
        debug!(
            width = size.width,
            height = size.height,
            series = self.series.len(),
            "chart render pass started"
        );
        self.update_axis_ranges();

        let chart_rect = Rect::from_size(size);
        let mut target = chart_rect.inflate(-CHART_PADDING);
        target.width = target.width.max(1.0);
        target.height = target.height.max(1.0);

        let header_style = TextStyle::for_class(TextClass::Header);
        let footer_style = TextStyle::for_class(TextClass::Footer);
        let header = self
            .header
            .as_deref()
            .filter(|text| !text.is_empty())
            .map(|text| {
                let height = engine.measure_string(text, &header_style).height;
                (text, take_strip(&mut target, height + TITLE_GAP, true))
            });
        let footer = self
            .footer
            .as_deref()
            .filter(|text| !text.is_empty())
            .map(|text| {
                let height = engine.measure_string(text, &footer_style).height;
                (text, take_strip(&mut target, height + TITLE_GAP, false))
            });

        let entries = self.legend_entries();
        let legend_size = self.legend.measure(&*engine, &entries);
        let (target, legend_rect) = self.legend.reserve(target, legend_size);

        let active = self.active_axes();
        let ctx = LayoutContext {
            chart_rect,
            target,
            margin: &self.plot_margin,
            plot_areas: &self.plot_areas,
            main_x: self.axis_x,
            main_y: self.axis_y,
        };
        let resolved = layout(&ctx, &*engine, &mut self.axes, &active);

        engine.begin_render(size);
        for id in &active {
            if let Some(axis) = self.axes.get(id) {
                axis.render_grid(engine);
            }
        }
        for (index, series) in self.series.iter().enumerate() {
            if !series.visibility().contributes_to_range() {
                continue;
            }
            let x_id = series.axis_x().unwrap_or(self.axis_x);
            let y_id = series.axis_y().unwrap_or(self.axis_y);
            if let (Some(axis_x), Some(axis_y)) = (self.axes.get(&x_id), self.axes.get(&y_id)) {
                self.plotter
                    .plot(index, series.as_ref(), axis_x, axis_y, &mut *engine);
            }
        }
        for id in &active {
            if let Some(axis) = self.axes.get(id) {
                axis.render(engine);
            }
        }
        for ((text, strip), style) in header
            .iter()
            .map(|entry| (entry, &header_style))
            .chain(footer.iter().map(|entry| (entry, &footer_style)))
        {
            let measured = engine.measure_string(text, style);
            let origin = Point::new(
                strip.center().x - 0.5 * measured.width,
                if style.class == TextClass::Header {
                    strip.top
                } else {
                    strip.bottom() - measured.height
                },
            );
            engine.draw_string(text, origin, style);
        }
        self.legend.render(engine, legend_rect, &entries);
        engine.end_render()?;

        self.invalidated.set(false);
        self.last_layout = Some(resolved.clone());
        debug!(
            plot_width = resolved.plot_rect.width,
            plot_height = resolved.plot_rect.height,
            axes = resolved.axis_rects.len(),
            "chart render pass finished"
        );
        Ok(resolved)
    }
}
