//! Axis: scale state, range resolution, tick generation, conversion between
//! data and pixel space, self-measurement and rendering.
//!
//! An axis is owned by a [`crate::chart::Chart`] and keeps only a weak link
//! to the chart's invalidation flag. Property setters are no-ops on equal
//! values and otherwise mark the chart dirty; they never lay out or render.

mod limits;
mod measure;
mod options;
mod render;
mod ticks;

use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};

use crate::core::primitives::millis_to_datetime;
use crate::core::types::{DataType, Point, Rect, Size};
use crate::error::ChartResult;
use crate::render::{TextClass, TextStyle};

pub use measure::{LABEL_OVERLAP_GAP, TICK_LENGTH};
pub use options::{
    AxisBound, AxisOptions, AxisType, LabelAlign, OverlappingLabels, Position, TickMark,
};
pub use render::LABEL_COLLISION_PADDING;
pub use ticks::{MAX_MAJOR_TICKS, MAX_MINOR_TICKS, Tick, TickKind, TickSet, label_slots};

use options::{
    validate_angle, validate_binding, validate_log_base, validate_padding, validate_unit,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AxisId(u32);

impl AxisId {
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Label handed to an item formatter. Returning `None` suppresses the label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelItem {
    pub value: f64,
    pub text: String,
    pub position: Point,
    pub class: TextClass,
}

pub type ItemFormatter = Rc<dyn Fn(LabelItem) -> Option<LabelItem>>;

type ConversionFn = Rc<dyn Fn(f64, f64, f64) -> f64>;

/// Custom scale installed as a forward/inverse pair.
///
/// `forward(value, min, max)` returns the normalized position in `[0, 1]`;
/// `inverse(normalized, min, max)` must undo it.
#[derive(Clone)]
pub struct CustomConversion {
    forward: ConversionFn,
    inverse: ConversionFn,
}

impl CustomConversion {
    pub fn new(
        forward: impl Fn(f64, f64, f64) -> f64 + 'static,
        inverse: impl Fn(f64, f64, f64) -> f64 + 'static,
    ) -> Self {
        Self {
            forward: Rc::new(forward),
            inverse: Rc::new(inverse),
        }
    }
}

impl fmt::Debug for CustomConversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomConversion")
    }
}

/// Payload of a range-changed notification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeChange {
    pub old_min: f64,
    pub old_max: f64,
    pub new_min: f64,
    pub new_max: f64,
}

type RangeListener = Box<dyn FnMut(&RangeChange)>;

pub struct Axis {
    options: AxisOptions,
    role: Option<AxisType>,
    rotated: bool,
    actual_min: f64,
    actual_max: f64,
    data_type: DataType,
    labels: Option<Vec<String>>,
    values: Option<Vec<f64>>,
    items_source: Option<Vec<serde_json::Value>>,
    item_formatter: Option<ItemFormatter>,
    conversion: Option<CustomConversion>,
    axis_rect: Rect,
    plot_rect: Rect,
    effective_label_angle: Option<f64>,
    desired_size: Size,
    label_style: TextStyle,
    title_style: TextStyle,
    host: Option<Weak<Cell<bool>>>,
    range_listeners: Vec<RangeListener>,
}

impl fmt::Debug for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Axis")
            .field("options", &self.options)
            .field("role", &self.role)
            .field("actual_min", &self.actual_min)
            .field("actual_max", &self.actual_max)
            .field("data_type", &self.data_type)
            .field("axis_rect", &self.axis_rect)
            .field("plot_rect", &self.plot_rect)
            .field("attached", &self.is_attached())
            .finish_non_exhaustive()
    }
}

impl Axis {
    #[must_use]
    pub fn new(position: Position) -> Self {
        Self::with_options(AxisOptions::new(position))
    }

    /// Builds an axis from validated options.
    pub fn from_options(options: AxisOptions) -> ChartResult<Self> {
        options.validate()?;
        Ok(Self::with_options(options))
    }

    fn with_options(options: AxisOptions) -> Self {
        Self {
            options,
            role: None,
            rotated: false,
            actual_min: f64::NAN,
            actual_max: f64::NAN,
            data_type: DataType::Number,
            labels: None,
            values: None,
            items_source: None,
            item_formatter: None,
            conversion: None,
            axis_rect: Rect::default(),
            plot_rect: Rect::default(),
            effective_label_angle: None,
            desired_size: Size::default(),
            label_style: TextStyle::for_class(TextClass::AxisLabel),
            title_style: TextStyle::for_class(TextClass::AxisTitle),
            host: None,
            range_listeners: Vec::new(),
        }
    }

    #[must_use]
    pub fn options(&self) -> &AxisOptions {
        &self.options
    }

    // --- host link -------------------------------------------------------

    pub(crate) fn attach(&mut self, flag: &Rc<Cell<bool>>) {
        self.host = Some(Rc::downgrade(flag));
    }

    pub(crate) fn detach(&mut self) {
        self.host = None;
        self.role = None;
        self.rotated = false;
    }

    /// Whether the axis is linked to a live chart.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.host.as_ref().and_then(Weak::upgrade).is_some()
    }

    fn invalidate(&self) {
        if let Some(flag) = self.host.as_ref().and_then(Weak::upgrade) {
            flag.set(true);
        }
    }

    pub(crate) fn set_role(&mut self, role: Option<AxisType>) {
        self.role = role;
    }

    pub(crate) fn set_rotated(&mut self, rotated: bool) {
        self.rotated = rotated;
    }

    /// Registers a listener fired whenever `actual_min`/`actual_max` change.
    pub fn on_range_changed(&mut self, listener: impl FnMut(&RangeChange) + 'static) {
        self.range_listeners.push(Box::new(listener));
    }

    // --- resolved properties ----------------------------------------------

    /// Chart role when attached as a main axis, otherwise derived from the
    /// position.
    #[must_use]
    pub fn axis_type(&self) -> AxisType {
        self.role
            .unwrap_or_else(|| self.options.position.default_axis_type())
    }

    #[must_use]
    pub fn position(&self) -> Position {
        self.options.position
    }

    #[must_use]
    pub fn is_horizontal(&self) -> bool {
        match self.options.position {
            Position::Top | Position::Bottom => true,
            Position::Left | Position::Right => false,
            Position::None | Position::Auto => (self.axis_type() == AxisType::X) != self.rotated,
        }
    }

    /// Plot edge the axis is laid out against; `None` for hidden axes.
    #[must_use]
    pub fn edge(&self) -> Option<Position> {
        match self.options.position {
            Position::None => None,
            Position::Auto if self.is_horizontal() => Some(Position::Bottom),
            Position::Auto => Some(Position::Left),
            other => Some(other),
        }
    }

    #[must_use]
    pub fn actual_min(&self) -> f64 {
        self.actual_min
    }

    #[must_use]
    pub fn actual_max(&self) -> f64 {
        self.actual_max
    }

    /// `actual_min`, boxed as a date on time axes.
    #[must_use]
    pub fn actual_min_bound(&self) -> AxisBound {
        self.rebox(self.actual_min)
    }

    #[must_use]
    pub fn actual_max_bound(&self) -> AxisBound {
        self.rebox(self.actual_max)
    }

    fn rebox(&self, value: f64) -> AxisBound {
        if self.is_time_axis() {
            if let Some(time) = millis_to_datetime(value) {
                return AxisBound::Date(time);
            }
        }
        AxisBound::Number(value)
    }

    #[must_use]
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    #[must_use]
    pub fn is_time_axis(&self) -> bool {
        self.labels.is_none()
            && (self.data_type == DataType::Date
                || self.options.min.is_some_and(AxisBound::is_date)
                || self.options.max.is_some_and(AxisBound::is_date))
    }

    #[must_use]
    pub fn is_log(&self) -> bool {
        self.options.log_base.is_some()
    }

    #[must_use]
    pub fn labels(&self) -> Option<&[String]> {
        self.labels.as_deref()
    }

    #[must_use]
    pub fn values(&self) -> Option<&[f64]> {
        self.values.as_deref()
    }

    #[must_use]
    pub fn major_grid(&self) -> bool {
        self.options
            .major_grid
            .unwrap_or(self.axis_type() == AxisType::Y)
    }

    #[must_use]
    pub fn axis_line(&self) -> bool {
        self.options
            .axis_line
            .unwrap_or(self.axis_type() == AxisType::X)
    }

    /// Label angle used by the last measure pass (explicit or overlap-driven).
    #[must_use]
    pub fn effective_label_angle(&self) -> Option<f64> {
        self.effective_label_angle
    }

    #[must_use]
    pub fn desired_size(&self) -> Size {
        self.desired_size
    }

    #[must_use]
    pub fn axis_rect(&self) -> Rect {
        self.axis_rect
    }

    #[must_use]
    pub fn plot_rect(&self) -> Rect {
        self.plot_rect
    }

    #[must_use]
    pub fn label_style(&self) -> &TextStyle {
        &self.label_style
    }

    pub fn set_label_style(&mut self, style: TextStyle) {
        if self.label_style != style {
            self.label_style = style;
            self.invalidate();
        }
    }

    // --- setters ------------------------------------------------------------

    fn update<T: PartialEq>(&mut self, value: T, field: fn(&mut AxisOptions) -> &mut T) {
        let slot = field(&mut self.options);
        if *slot != value {
            *slot = value;
            self.invalidate();
        }
    }

    pub fn set_position(&mut self, position: Position) {
        self.update(position, |o| &mut o.position);
    }

    pub fn set_name(&mut self, name: Option<String>) {
        self.update(name, |o| &mut o.name);
    }

    pub fn set_title(&mut self, title: Option<String>) {
        self.update(title, |o| &mut o.title);
    }

    pub fn set_min(&mut self, min: Option<AxisBound>) {
        self.update(min, |o| &mut o.min);
    }

    pub fn set_max(&mut self, max: Option<AxisBound>) {
        self.update(max, |o| &mut o.max);
    }

    pub fn set_major_unit(&mut self, unit: Option<f64>) -> ChartResult<()> {
        if let Some(unit) = unit {
            validate_unit("major unit", unit)?;
        }
        self.update(unit, |o| &mut o.major_unit);
        Ok(())
    }

    pub fn set_minor_unit(&mut self, unit: Option<f64>) -> ChartResult<()> {
        if let Some(unit) = unit {
            validate_unit("minor unit", unit)?;
        }
        self.update(unit, |o| &mut o.minor_unit);
        Ok(())
    }

    pub fn set_log_base(&mut self, base: Option<f64>) -> ChartResult<()> {
        if let Some(base) = base {
            validate_log_base(base)?;
        }
        self.update(base, |o| &mut o.log_base);
        Ok(())
    }

    pub fn set_reversed(&mut self, reversed: bool) {
        self.update(reversed, |o| &mut o.reversed);
    }

    pub fn set_major_tick_marks(&mut self, marks: TickMark) {
        self.update(marks, |o| &mut o.major_tick_marks);
    }

    pub fn set_minor_tick_marks(&mut self, marks: TickMark) {
        self.update(marks, |o| &mut o.minor_tick_marks);
    }

    pub fn set_major_grid(&mut self, visible: bool) {
        self.update(Some(visible), |o| &mut o.major_grid);
    }

    pub fn set_minor_grid(&mut self, visible: bool) {
        self.update(visible, |o| &mut o.minor_grid);
    }

    pub fn set_axis_line(&mut self, visible: bool) {
        self.update(Some(visible), |o| &mut o.axis_line);
    }

    pub fn set_labels(&mut self, visible: bool) {
        self.update(visible, |o| &mut o.labels);
    }

    pub fn set_label_angle(&mut self, angle: Option<f64>) -> ChartResult<()> {
        if let Some(angle) = angle {
            validate_angle(angle)?;
        }
        self.update(angle, |o| &mut o.label_angle);
        Ok(())
    }

    pub fn set_label_align(&mut self, align: Option<LabelAlign>) {
        self.update(align, |o| &mut o.label_align);
    }

    pub fn set_label_padding(&mut self, padding: f64) -> ChartResult<()> {
        validate_padding(padding)?;
        self.update(padding, |o| &mut o.label_padding);
        Ok(())
    }

    pub fn set_format(&mut self, format: Option<String>) {
        self.update(format, |o| &mut o.format);
    }

    pub fn set_origin(&mut self, origin: Option<f64>) {
        self.update(origin, |o| &mut o.origin);
    }

    pub fn set_overlapping_labels(&mut self, policy: OverlappingLabels) {
        self.update(policy, |o| &mut o.overlapping_labels);
    }

    pub fn set_binding(&mut self, binding: impl Into<String>) -> ChartResult<()> {
        let binding = binding.into();
        validate_binding(&binding)?;
        self.update(binding, |o| &mut o.binding);
        Ok(())
    }

    pub fn set_plot_area(&mut self, plot_area: Option<crate::chart::PlotAreaId>) {
        self.update(plot_area, |o| &mut o.plot_area);
    }

    /// Binds category labels to a collection of JSON objects, read through
    /// [`AxisOptions::binding`] on the next range update.
    pub fn set_items_source(&mut self, items: Option<Vec<serde_json::Value>>) {
        if self.items_source != items {
            self.items_source = items;
            self.invalidate();
        }
    }

    pub fn set_item_formatter(
        &mut self,
        formatter: impl Fn(LabelItem) -> Option<LabelItem> + 'static,
    ) {
        self.item_formatter = Some(Rc::new(formatter));
        self.invalidate();
    }

    pub fn clear_item_formatter(&mut self) {
        if self.item_formatter.take().is_some() {
            self.invalidate();
        }
    }

    pub fn set_custom_conversion(&mut self, conversion: Option<CustomConversion>) {
        self.conversion = conversion;
        self.invalidate();
    }

    // --- conversion ---------------------------------------------------------

    /// Position of `value` in `[0, 1]` from the min end, before reversal.
    fn normalize(&self, value: f64, min: f64, max: f64) -> f64 {
        if let Some(conversion) = &self.conversion {
            return (conversion.forward)(value, min, max);
        }
        if self.options.log_base.is_some() {
            if value <= 0.0 || min <= 0.0 || max <= 0.0 {
                return f64::NAN;
            }
            return (value / min).ln() / (max / min).ln();
        }
        (value - min) / (max - min)
    }

    fn denormalize(&self, fraction: f64, min: f64, max: f64) -> f64 {
        if let Some(conversion) = &self.conversion {
            return (conversion.inverse)(fraction, min, max);
        }
        if self.options.log_base.is_some() {
            if min <= 0.0 || max <= 0.0 {
                return f64::NAN;
            }
            return min * (max / min).powf(fraction);
        }
        min + fraction * (max - min)
    }

    /// Position of `value` in `[0, 1]` along the axis direction, reversal
    /// applied. NaN when the value cannot be placed.
    #[must_use]
    pub fn fraction(&self, value: f64) -> f64 {
        let fraction = self.normalize(value, self.actual_min, self.actual_max);
        if self.options.reversed {
            1.0 - fraction
        } else {
            fraction
        }
    }

    /// Maps a data value to a pixel coordinate inside the arranged plot
    /// rectangle. The overrides replace the actual range for this call.
    #[must_use]
    pub fn convert(&self, value: f64, max_override: Option<f64>, min_override: Option<f64>) -> f64 {
        let max = max_override.unwrap_or(self.actual_max);
        let min = min_override.unwrap_or(self.actual_min);
        if max == min {
            return f64::NAN;
        }
        let mut fraction = self.normalize(value, min, max);
        if self.options.reversed {
            fraction = 1.0 - fraction;
        }
        let rect = self.plot_rect;
        if self.is_horizontal() {
            rect.left + fraction * rect.width
        } else {
            rect.bottom() - fraction * rect.height
        }
    }

    /// Inverse of [`Axis::convert`] for the actual range.
    #[must_use]
    pub fn convert_back(&self, pixel: f64) -> f64 {
        let rect = self.plot_rect;
        let mut fraction = if self.is_horizontal() {
            (pixel - rect.left) / rect.width
        } else {
            (rect.bottom() - pixel) / rect.height
        };
        if self.options.reversed {
            fraction = 1.0 - fraction;
        }
        self.denormalize(fraction, self.actual_min, self.actual_max)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::{Axis, AxisType, CustomConversion, Position};
    use crate::core::types::{DataType, Rect};

    #[test]
    fn type_follows_position_until_role_assigned() {
        let mut axis = Axis::new(Position::Left);
        assert_eq!(axis.axis_type(), AxisType::Y);
        axis.set_role(Some(AxisType::X));
        assert_eq!(axis.axis_type(), AxisType::X);
        assert!(!axis.is_horizontal());
    }

    #[test]
    fn setters_invalidate_only_on_change() {
        let flag = Rc::new(Cell::new(false));
        let mut axis = Axis::new(Position::Bottom);
        axis.attach(&flag);

        axis.set_reversed(false);
        assert!(!flag.get());
        axis.set_reversed(true);
        assert!(flag.get());

        flag.set(false);
        assert!(axis.set_log_base(Some(-2.0)).is_err());
        assert!(!flag.get());
    }

    #[test]
    fn dropped_chart_leaves_axis_unattached() {
        let flag = Rc::new(Cell::new(false));
        let mut axis = Axis::new(Position::Bottom);
        axis.attach(&flag);
        assert!(axis.is_attached());
        drop(flag);
        assert!(!axis.is_attached());
        axis.set_title(Some("t".to_owned()));
    }

    #[test]
    fn custom_conversion_replaces_linear_mapping() {
        let mut axis = Axis::new(Position::Bottom);
        axis.set_custom_conversion(Some(CustomConversion::new(
            |v, min, max| ((v - min) / (max - min)).sqrt(),
            |n, min, max| min + n * n * (max - min),
        )));
        axis.update_actual_limits(DataType::Number, 0.0, 100.0, None, None);
        axis.arrange(Rect::new(0.0, 0.0, 100.0, 10.0), Rect::new(0.0, 0.0, 100.0, 100.0));
        assert!((axis.convert(25.0, None, None) - 50.0).abs() <= 1e-9);
        assert!((axis.convert_back(50.0) - 25.0).abs() <= 1e-9);
    }
}
