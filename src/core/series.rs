use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::axis::AxisId;
use crate::core::types::DataType;
use crate::error::{ChartError, ChartResult};

/// Which value stream of a series is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueRole {
    Y,
    X,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SeriesVisibility {
    #[default]
    Visible,
    /// Drawn in the plot area only.
    Plot,
    /// Listed in the legend only.
    Legend,
    Hidden,
}

impl SeriesVisibility {
    #[must_use]
    pub fn contributes_to_range(self) -> bool {
        matches!(self, Self::Visible | Self::Plot)
    }

    #[must_use]
    pub fn shows_in_legend(self) -> bool {
        matches!(self, Self::Visible | Self::Legend)
    }
}

impl FromStr for SeriesVisibility {
    type Err = ChartError;

    fn from_str(value: &str) -> ChartResult<Self> {
        match value.to_ascii_lowercase().as_str() {
            "visible" => Ok(Self::Visible),
            "plot" => Ok(Self::Plot),
            "legend" => Ok(Self::Legend),
            "hidden" => Ok(Self::Hidden),
            other => Err(ChartError::InvalidConfig(format!(
                "unknown series visibility `{other}`"
            ))),
        }
    }
}

/// Pre-aggregated bounds a series may report instead of raw values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataRect {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

/// Data contract the aggregator and plotters consume.
pub trait SeriesSource {
    fn name(&self) -> &str;

    fn visibility(&self) -> SeriesVisibility {
        SeriesVisibility::Visible
    }

    /// Values for `role`; `None` entries are gaps. `None` for the X role
    /// means the series is indexed by position.
    fn values(&self, role: ValueRole) -> Option<&[Option<f64>]>;

    fn data_type(&self, role: ValueRole) -> DataType;

    /// Shortcut bounds for series types that aggregate their own data.
    fn data_rect(&self) -> Option<DataRect> {
        None
    }

    /// Auxiliary X axis, `None` for the chart's main X axis.
    fn axis_x(&self) -> Option<AxisId> {
        None
    }

    /// Auxiliary Y axis, `None` for the chart's main Y axis.
    fn axis_y(&self) -> Option<AxisId> {
        None
    }

    /// Series drawn with their own chart type never stack.
    fn is_custom_chart_type(&self) -> bool {
        false
    }
}

/// Vec-backed series used by hosts without their own data layer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataSeries {
    pub name: String,
    pub visibility: SeriesVisibility,
    pub y: Vec<Option<f64>>,
    pub x: Option<Vec<Option<f64>>>,
    pub x_type: DataType,
    pub y_type: DataType,
    pub axis_x: Option<AxisId>,
    pub axis_y: Option<AxisId>,
    pub custom_chart_type: bool,
}

impl DataSeries {
    #[must_use]
    pub fn new(name: impl Into<String>, y: impl IntoIterator<Item = f64>) -> Self {
        Self {
            name: name.into(),
            y: y.into_iter().map(Some).collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_x(mut self, x: impl IntoIterator<Item = f64>) -> Self {
        self.x = Some(x.into_iter().map(Some).collect());
        self
    }

    /// X values given as dates (milliseconds since the Unix epoch).
    #[must_use]
    pub fn with_date_x(mut self, x: impl IntoIterator<Item = f64>) -> Self {
        self.x = Some(x.into_iter().map(Some).collect());
        self.x_type = DataType::Date;
        self
    }

    #[must_use]
    pub fn with_visibility(mut self, visibility: SeriesVisibility) -> Self {
        self.visibility = visibility;
        self
    }

    #[must_use]
    pub fn with_axis_x(mut self, axis: AxisId) -> Self {
        self.axis_x = Some(axis);
        self
    }

    #[must_use]
    pub fn with_axis_y(mut self, axis: AxisId) -> Self {
        self.axis_y = Some(axis);
        self
    }

    #[must_use]
    pub fn with_custom_chart_type(mut self, custom: bool) -> Self {
        self.custom_chart_type = custom;
        self
    }
}

impl SeriesSource for DataSeries {
    fn name(&self) -> &str {
        &self.name
    }

    fn visibility(&self) -> SeriesVisibility {
        self.visibility
    }

    fn values(&self, role: ValueRole) -> Option<&[Option<f64>]> {
        match role {
            ValueRole::Y => Some(&self.y),
            ValueRole::X => self.x.as_deref(),
        }
    }

    fn data_type(&self, role: ValueRole) -> DataType {
        match role {
            ValueRole::Y => self.y_type,
            ValueRole::X => self.x_type,
        }
    }

    fn axis_x(&self) -> Option<AxisId> {
        self.axis_x
    }

    fn axis_y(&self) -> Option<AxisId> {
        self.axis_y
    }

    fn is_custom_chart_type(&self) -> bool {
        self.custom_chart_type
    }
}
