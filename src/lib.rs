//! chart-axes: axis scale/tick engine and chart layout core.
//!
//! The crate resolves axis ranges from series data, generates "nice" ticks
//! for numeric, logarithmic, time and category axes, converts between data
//! and pixel space, and lays out one or more plot areas around their axes.
//! Drawing goes through the backend-agnostic [`render::RenderEngine`] trait.

pub mod axis;
pub mod chart;
pub mod core;
pub mod error;
pub mod render;
pub mod telemetry;

pub use axis::{Axis, AxisId, AxisOptions, AxisType, Position};
pub use chart::{Chart, ChartConfig, ChartLayout};
pub use error::{ChartError, ChartResult};
