//! Data aggregation feeding axis auto-ranging.
//!
//! One forward pass over the visible series collects X/Y extents, the
//! positive-only minimums used by log axes, per-x stacking sums and the
//! smallest gap between consecutive x values.

use std::str::FromStr;

use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::series::{SeriesSource, ValueRole};
use crate::core::types::DataType;
use crate::error::{ChartError, ChartResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Stacking {
    #[default]
    None,
    Stacked,
    Stacked100pc,
}

impl FromStr for Stacking {
    type Err = ChartError;

    fn from_str(value: &str) -> ChartResult<Self> {
        match value.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "stacked" => Ok(Self::Stacked),
            "stacked100pc" => Ok(Self::Stacked100pc),
            other => Err(ChartError::InvalidConfig(format!(
                "unknown stacking mode `{other}`"
            ))),
        }
    }
}

/// Accumulated values for one x key.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StackSums {
    pub positive: f64,
    pub negative: f64,
    pub absolute: f64,
}

/// Result of [`analyse`]. Extents are NaN when nothing contributed.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSummary {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    pub min_x_positive: f64,
    pub min_y_positive: f64,
    pub data_type_x: DataType,
    pub data_type_y: DataType,
    /// Smallest non-zero gap between consecutive x values (0 if none).
    pub delta_x: f64,
    pub stacks: IndexMap<OrderedFloat<f64>, StackSums>,
    pub is_rotated: bool,
}

impl Default for DataSummary {
    fn default() -> Self {
        Self {
            min_x: f64::NAN,
            max_x: f64::NAN,
            min_y: f64::NAN,
            max_y: f64::NAN,
            min_x_positive: f64::NAN,
            min_y_positive: f64::NAN,
            data_type_x: DataType::Number,
            data_type_y: DataType::Number,
            delta_x: 0.0,
            stacks: IndexMap::new(),
            is_rotated: false,
        }
    }
}

impl DataSummary {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min_y.is_nan() && self.min_x.is_nan()
    }

    /// Stack sums recorded for `key`.
    #[must_use]
    pub fn stack_sums(&self, key: f64) -> Option<StackSums> {
        self.stacks.get(&OrderedFloat(key)).copied()
    }

    /// Extent shown along the horizontal direction (Y when rotated).
    #[must_use]
    pub fn horizontal_range(&self) -> (f64, f64) {
        if self.is_rotated {
            (self.min_y, self.max_y)
        } else {
            (self.min_x, self.max_x)
        }
    }

    #[must_use]
    pub fn vertical_range(&self) -> (f64, f64) {
        if self.is_rotated {
            (self.min_x, self.max_x)
        } else {
            (self.min_y, self.max_y)
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Extent {
    min: f64,
    max: f64,
    min_positive: f64,
}

impl Extent {
    const EMPTY: Self = Self {
        min: f64::NAN,
        max: f64::NAN,
        min_positive: f64::NAN,
    };

    fn track(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }
        if self.min.is_nan() || value < self.min {
            self.min = value;
        }
        if self.max.is_nan() || value > self.max {
            self.max = value;
        }
        if value > 0.0 && (self.min_positive.is_nan() || value < self.min_positive) {
            self.min_positive = value;
        }
    }
}

fn track_delta(delta: &mut f64, previous: &mut Option<f64>, value: f64) {
    if let Some(prev) = *previous {
        let gap = (value - prev).abs();
        if gap > 0.0 && (*delta == 0.0 || gap < *delta) {
            *delta = gap;
        }
    }
    *previous = Some(value);
}

/// Aggregates extents and stacking sums over `series`.
///
/// Hidden and legend-only series are skipped. Series bound to an auxiliary X
/// axis contribute Y values only. `explicit_x` supplies x positions for
/// series without their own X values.
#[must_use]
pub fn analyse(
    series: &[&dyn SeriesSource],
    is_rotated: bool,
    stacking: Stacking,
    explicit_x: Option<&[f64]>,
    log_x: bool,
    log_y: bool,
) -> DataSummary {
    let mut x_extent = Extent::EMPTY;
    let mut y_extent = Extent::EMPTY;
    let mut delta_x = 0.0;
    let mut stacks: IndexMap<OrderedFloat<f64>, StackSums> = IndexMap::new();
    let mut data_type_x: Option<DataType> = None;
    let mut data_type_y: Option<DataType> = None;

    if let Some(xs) = explicit_x {
        let mut previous = None;
        for &x in xs {
            if x.is_finite() {
                x_extent.track(x);
                track_delta(&mut delta_x, &mut previous, x);
            }
        }
    }

    for source in series {
        if !source.visibility().contributes_to_range() {
            continue;
        }

        if let Some(rect) = source.data_rect() {
            x_extent.track(rect.left);
            x_extent.track(rect.right);
            y_extent.track(rect.top);
            y_extent.track(rect.bottom);
            continue;
        }

        let Some(ys) = source.values(ValueRole::Y) else {
            continue;
        };
        let own_x = source.values(ValueRole::X);
        let custom_x = source.axis_x().is_some();
        let stacks_values = stacking != Stacking::None && !source.is_custom_chart_type();

        if data_type_y.is_none() {
            data_type_y = Some(source.data_type(ValueRole::Y));
        }
        if data_type_x.is_none() && !custom_x && own_x.is_some() {
            data_type_x = Some(source.data_type(ValueRole::X));
        }

        let mut previous_x = None;
        for (index, y) in ys.iter().enumerate() {
            let x = match own_x {
                Some(xs) => xs.get(index).copied().flatten(),
                None => Some(
                    explicit_x
                        .and_then(|xs| xs.get(index).copied())
                        .unwrap_or(index as f64),
                ),
            };

            let x = x.filter(|x| x.is_finite());
            if let (false, Some(x)) = (custom_x, x) {
                x_extent.track(x);
                track_delta(&mut delta_x, &mut previous_x, x);
            }

            let Some(y) = y.filter(|y| y.is_finite()) else {
                continue;
            };
            y_extent.track(y);

            if let (true, Some(x)) = (stacks_values, x) {
                let sums = stacks.entry(OrderedFloat(x)).or_default();
                if y >= 0.0 {
                    sums.positive += y;
                } else {
                    sums.negative += y;
                }
                sums.absolute += y.abs();
            }
        }
    }

    let mut summary = DataSummary {
        min_x: x_extent.min,
        max_x: x_extent.max,
        min_y: y_extent.min,
        max_y: y_extent.max,
        min_x_positive: x_extent.min_positive,
        min_y_positive: y_extent.min_positive,
        data_type_x: data_type_x.unwrap_or(DataType::Number),
        data_type_y: data_type_y.unwrap_or(DataType::Number),
        delta_x,
        stacks,
        is_rotated,
    };

    match stacking {
        Stacking::None => {}
        Stacking::Stacked => {
            if !summary.stacks.is_empty() {
                summary.max_y = summary
                    .stacks
                    .values()
                    .map(|sums| sums.positive)
                    .fold(f64::NEG_INFINITY, f64::max);
                summary.min_y = summary
                    .stacks
                    .values()
                    .map(|sums| sums.negative)
                    .fold(f64::INFINITY, f64::min);
            }
        }
        Stacking::Stacked100pc => {
            summary.min_y = 0.0;
            summary.max_y = 1.0;
        }
    }

    if log_x {
        summary.min_x = positive_or_one(summary.min_x_positive);
    }
    if log_y {
        summary.min_y = positive_or_one(summary.min_y_positive);
    }

    trace!(
        min_x = summary.min_x,
        max_x = summary.max_x,
        min_y = summary.min_y,
        max_y = summary.max_y,
        delta_x = summary.delta_x,
        "analysed series data"
    );
    summary
}

fn positive_or_one(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        1.0
    }
}

/// Extent of one value role across `series`, used for auxiliary axes.
/// Returns `(min, max)`, NaN when nothing contributed.
#[must_use]
pub fn value_range(series: &[&dyn SeriesSource], role: ValueRole, log: bool) -> (f64, f64) {
    let mut extent = Extent::EMPTY;
    for source in series {
        if !source.visibility().contributes_to_range() {
            continue;
        }
        if let Some(rect) = source.data_rect() {
            let (a, b) = match role {
                ValueRole::X => (rect.left, rect.right),
                ValueRole::Y => (rect.top, rect.bottom),
            };
            extent.track(a);
            extent.track(b);
            continue;
        }
        match source.values(role) {
            Some(values) => {
                for value in values.iter().flatten() {
                    extent.track(*value);
                }
            }
            None if role == ValueRole::X => {
                let len = source.values(ValueRole::Y).map_or(0, <[Option<f64>]>::len);
                if len > 0 {
                    extent.track(0.0);
                    extent.track((len - 1) as f64);
                }
            }
            None => {}
        }
    }
    let min = if log {
        positive_or_one(extent.min_positive)
    } else {
        extent.min
    };
    (min, extent.max)
}

#[cfg(test)]
mod tests {
    use super::{Stacking, analyse, value_range};
    use crate::core::series::{DataSeries, SeriesSource, SeriesVisibility, ValueRole};

    fn refs(series: &[DataSeries]) -> Vec<&dyn SeriesSource> {
        series.iter().map(|s| s as &dyn SeriesSource).collect()
    }

    #[test]
    fn hidden_series_do_not_contribute() {
        let series = vec![
            DataSeries::new("a", [1.0, 2.0]),
            DataSeries::new("b", [100.0]).with_visibility(SeriesVisibility::Hidden),
            DataSeries::new("c", [-50.0]).with_visibility(SeriesVisibility::Legend),
        ];
        let summary = analyse(&refs(&series), false, Stacking::None, None, false, false);
        assert_eq!(summary.min_y, 1.0);
        assert_eq!(summary.max_y, 2.0);
        assert_eq!(summary.min_x, 0.0);
        assert_eq!(summary.max_x, 1.0);
    }

    #[test]
    fn delta_prefers_first_non_zero_gap() {
        let series = vec![DataSeries::new("a", [1.0, 1.0, 1.0, 1.0]).with_x([0.0, 0.0, 5.0, 7.0])];
        let summary = analyse(&refs(&series), false, Stacking::None, None, false, false);
        assert_eq!(summary.delta_x, 2.0);
    }

    #[test]
    fn custom_chart_type_is_excluded_from_stacks() {
        let series = vec![
            DataSeries::new("a", [2.0]),
            DataSeries::new("b", [5.0]).with_custom_chart_type(true),
        ];
        let summary = analyse(&refs(&series), false, Stacking::Stacked, None, false, false);
        assert_eq!(summary.max_y, 2.0);
        assert_eq!(summary.min_y, 0.0);
    }

    #[test]
    fn empty_input_yields_nan_extents() {
        let summary = analyse(&[], false, Stacking::None, None, true, false);
        assert!(summary.min_y.is_nan());
        assert_eq!(summary.min_x, 1.0);
        let (min, max) = value_range(&[], ValueRole::Y, false);
        assert!(min.is_nan() && max.is_nan());
    }
}
