use serde::{Deserialize, Serialize};

use crate::axis::{Axis, AxisOptions, Position};
use crate::chart::{Chart, Legend, PlotArea, PlotAreaCollection, PlotMargin};
use crate::core::data_info::Stacking;
use crate::error::{ChartError, ChartResult};

/// Serializable chart description.
///
/// Axis positions are taken as written; `rotated` does not swap them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(default)]
    pub header: Option<String>,
    #[serde(default)]
    pub footer: Option<String>,
    #[serde(default = "default_axis_x")]
    pub axis_x: AxisOptions,
    #[serde(default = "default_axis_y")]
    pub axis_y: AxisOptions,
    /// Auxiliary axes, attached in order after the main pair.
    #[serde(default)]
    pub axes: Vec<AxisOptions>,
    #[serde(default)]
    pub rotated: bool,
    #[serde(default)]
    pub stacking: Stacking,
    #[serde(default)]
    pub plot_margin: PlotMargin,
    #[serde(default)]
    pub legend: Legend,
    #[serde(default)]
    pub plot_areas: Vec<PlotArea>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            header: None,
            footer: None,
            axis_x: default_axis_x(),
            axis_y: default_axis_y(),
            axes: Vec::new(),
            rotated: false,
            stacking: Stacking::None,
            plot_margin: PlotMargin::default(),
            legend: Legend::default(),
            plot_areas: Vec::new(),
        }
    }
}

fn default_axis_x() -> AxisOptions {
    AxisOptions::new(Position::Bottom)
}

fn default_axis_y() -> AxisOptions {
    AxisOptions::new(Position::Left)
}

impl ChartConfig {
    fn plot_area_collection(&self) -> ChartResult<PlotAreaCollection> {
        let mut collection = PlotAreaCollection::default();
        for area in &self.plot_areas {
            collection.insert(area.clone())?;
        }
        Ok(collection)
    }

    pub fn validate(&self) -> ChartResult<()> {
        let areas = self.plot_area_collection()?;
        for options in [&self.axis_x, &self.axis_y].into_iter().chain(&self.axes) {
            options.validate()?;
            if let Some(area) = options.plot_area {
                if !areas.contains(area) {
                    return Err(ChartError::UnknownPlotArea(area));
                }
            }
        }
        Ok(())
    }

    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ChartError::InvalidData(format!("failed to serialize config: {e}")))
    }

    /// Parses and validates a JSON chart description.
    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        let config: Self = serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidConfig(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}

impl Chart {
    /// Builds a chart with the configured axes, plot areas and decorations.
    pub fn from_config(config: &ChartConfig) -> ChartResult<Self> {
        config.validate()?;
        let mut chart = Self::new();
        chart.plot_areas = config.plot_area_collection()?;
        chart.rotated = config.rotated;
        chart.axes.clear();
        chart.next_axis_id = 0;
        chart.axis_x = chart.insert_axis(Axis::from_options(config.axis_x.clone())?);
        chart.axis_y = chart.insert_axis(Axis::from_options(config.axis_y.clone())?);
        chart.assign_roles();
        for options in &config.axes {
            chart.add_axis(Axis::from_options(options.clone())?)?;
        }
        chart.stacking = config.stacking;
        chart.plot_margin = config.plot_margin;
        chart.header = config.header.clone();
        chart.footer = config.footer.clone();
        chart.legend = config.legend;
        chart.invalidate();
        Ok(chart)
    }
}
