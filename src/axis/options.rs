//! Serializable axis options and the option enums.
//!
//! Every default is resolved here through `#[serde(default = ...)]`
//! functions, so render code never interprets a missing value itself.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chart::PlotAreaId;
use crate::core::primitives::datetime_to_millis;
use crate::error::{ChartError, ChartResult};

/// Role of an axis: X carries categories/arguments, Y carries values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxisType {
    X,
    Y,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    None,
    Left,
    Top,
    Right,
    Bottom,
    Auto,
}

impl Position {
    /// Type an axis gets from its position before a chart assigns a role.
    #[must_use]
    pub fn default_axis_type(self) -> AxisType {
        match self {
            Self::Bottom | Self::Top => AxisType::X,
            Self::Left | Self::Right | Self::None | Self::Auto => AxisType::Y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TickMark {
    None,
    Outside,
    Inside,
    Cross,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OverlappingLabels {
    /// Labels colliding with an already placed label are skipped.
    #[default]
    Auto,
    Show,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LabelAlign {
    Start,
    Center,
    End,
}

macro_rules! impl_from_str {
    ($ty:ident, $what:literal, { $($text:literal => $variant:ident),+ $(,)? }) => {
        impl FromStr for $ty {
            type Err = ChartError;

            fn from_str(value: &str) -> ChartResult<Self> {
                match value.to_ascii_lowercase().as_str() {
                    $($text => Ok(Self::$variant),)+
                    other => Err(ChartError::InvalidConfig(format!(
                        concat!("unknown ", $what, " `{}`"),
                        other
                    ))),
                }
            }
        }
    };
}

impl_from_str!(AxisType, "axis type", { "x" => X, "y" => Y });
impl_from_str!(Position, "axis position", {
    "none" => None,
    "left" => Left,
    "top" => Top,
    "right" => Right,
    "bottom" => Bottom,
    "auto" => Auto,
});
impl_from_str!(TickMark, "tick mark mode", {
    "none" => None,
    "outside" => Outside,
    "inside" => Inside,
    "cross" => Cross,
});
impl_from_str!(OverlappingLabels, "overlapping labels policy", {
    "auto" => Auto,
    "show" => Show,
});
impl_from_str!(LabelAlign, "label alignment", {
    "start" => Start,
    "left" => Start,
    "top" => Start,
    "center" => Center,
    "end" => End,
    "right" => End,
    "bottom" => End,
});

/// Explicit axis bound, numeric or date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxisBound {
    Number(f64),
    Date(DateTime<Utc>),
}

impl AxisBound {
    /// Numeric value; dates become milliseconds since the Unix epoch.
    #[must_use]
    pub fn value(self) -> f64 {
        match self {
            Self::Number(value) => value,
            Self::Date(time) => datetime_to_millis(time),
        }
    }

    #[must_use]
    pub fn is_date(self) -> bool {
        matches!(self, Self::Date(_))
    }
}

impl From<f64> for AxisBound {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<DateTime<Utc>> for AxisBound {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Date(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisOptions {
    #[serde(default = "default_position")]
    pub position: Position,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub min: Option<AxisBound>,
    #[serde(default)]
    pub max: Option<AxisBound>,
    #[serde(default)]
    pub major_unit: Option<f64>,
    #[serde(default)]
    pub minor_unit: Option<f64>,
    #[serde(default)]
    pub log_base: Option<f64>,
    #[serde(default)]
    pub reversed: bool,
    #[serde(default = "default_major_tick_marks")]
    pub major_tick_marks: TickMark,
    #[serde(default = "default_minor_tick_marks")]
    pub minor_tick_marks: TickMark,
    /// `None` resolves from the axis type: Y axes show major gridlines.
    #[serde(default)]
    pub major_grid: Option<bool>,
    #[serde(default)]
    pub minor_grid: bool,
    /// `None` resolves from the axis type: X axes draw their line.
    #[serde(default)]
    pub axis_line: Option<bool>,
    #[serde(default = "default_labels")]
    pub labels: bool,
    #[serde(default)]
    pub label_angle: Option<f64>,
    #[serde(default)]
    pub label_align: Option<LabelAlign>,
    #[serde(default = "default_label_padding")]
    pub label_padding: f64,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub origin: Option<f64>,
    #[serde(default)]
    pub overlapping_labels: OverlappingLabels,
    #[serde(default = "default_binding")]
    pub binding: String,
    #[serde(default)]
    pub plot_area: Option<PlotAreaId>,
}

impl Default for AxisOptions {
    fn default() -> Self {
        Self::new(default_position())
    }
}

impl AxisOptions {
    #[must_use]
    pub fn new(position: Position) -> Self {
        Self {
            position,
            name: None,
            title: None,
            min: None,
            max: None,
            major_unit: None,
            minor_unit: None,
            log_base: None,
            reversed: false,
            major_tick_marks: default_major_tick_marks(),
            minor_tick_marks: default_minor_tick_marks(),
            major_grid: None,
            minor_grid: false,
            axis_line: None,
            labels: default_labels(),
            label_angle: None,
            label_align: None,
            label_padding: default_label_padding(),
            format: None,
            origin: None,
            overlapping_labels: OverlappingLabels::default(),
            binding: default_binding(),
            plot_area: None,
        }
    }

    pub fn validate(&self) -> ChartResult<()> {
        if let Some(base) = self.log_base {
            validate_log_base(base)?;
        }
        if let Some(unit) = self.major_unit {
            validate_unit("major unit", unit)?;
        }
        if let Some(unit) = self.minor_unit {
            validate_unit("minor unit", unit)?;
        }
        if let Some(angle) = self.label_angle {
            validate_angle(angle)?;
        }
        validate_padding(self.label_padding)?;
        validate_binding(&self.binding)?;
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min.value() > max.value() {
                return Err(ChartError::InvalidConfig(format!(
                    "axis min {} is greater than max {}",
                    min.value(),
                    max.value()
                )));
            }
        }
        Ok(())
    }
}

pub(crate) fn validate_log_base(base: f64) -> ChartResult<()> {
    if !base.is_finite() || base <= 1.0 {
        return Err(ChartError::InvalidConfig(format!(
            "log base must be finite and > 1, got {base}"
        )));
    }
    Ok(())
}

pub(crate) fn validate_unit(what: &str, unit: f64) -> ChartResult<()> {
    if !unit.is_finite() || unit <= 0.0 {
        return Err(ChartError::InvalidConfig(format!(
            "{what} must be finite and > 0, got {unit}"
        )));
    }
    Ok(())
}

pub(crate) fn validate_angle(angle: f64) -> ChartResult<()> {
    if !angle.is_finite() || !(-90.0..=90.0).contains(&angle) {
        return Err(ChartError::InvalidConfig(format!(
            "label angle must be within [-90, 90], got {angle}"
        )));
    }
    Ok(())
}

pub(crate) fn validate_padding(padding: f64) -> ChartResult<()> {
    if !padding.is_finite() || padding < 0.0 {
        return Err(ChartError::InvalidConfig(format!(
            "label padding must be finite and >= 0, got {padding}"
        )));
    }
    Ok(())
}

pub(crate) fn validate_binding(binding: &str) -> ChartResult<()> {
    let mut parts = binding.split(',').map(str::trim);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(value), text, None) if !value.is_empty() && text.is_none_or(|t| !t.is_empty()) => {
            Ok(())
        }
        _ => Err(ChartError::InvalidConfig(format!(
            "binding must be `value` or `value,text`, got `{binding}`"
        ))),
    }
}

fn default_position() -> Position {
    Position::Bottom
}

fn default_major_tick_marks() -> TickMark {
    TickMark::Outside
}

fn default_minor_tick_marks() -> TickMark {
    TickMark::None
}

fn default_labels() -> bool {
    true
}

fn default_label_padding() -> f64 {
    5.0
}

pub(crate) fn default_binding() -> String {
    "value,text".to_owned()
}
