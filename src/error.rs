use thiserror::Error;

use crate::axis::AxisId;
use crate::chart::PlotAreaId;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unknown axis: {0:?}")]
    UnknownAxis(AxisId),

    #[error("unknown plot area: {0:?}")]
    UnknownPlotArea(PlotAreaId),

    #[error("unknown series index: {0}")]
    UnknownSeries(usize),

    #[error("axis {axis:?} is still in use: {reason}")]
    AxisInUse { axis: AxisId, reason: &'static str },
}
