pub mod data_info;
pub mod format;
pub mod nice;
pub mod pie;
pub mod primitives;
pub mod series;
pub mod time_unit;
pub mod types;

pub use data_info::{DataSummary, StackSums, Stacking, analyse, value_range};
pub use pie::{PieSegment, hit_test, pie_segments};
pub use series::{DataRect, DataSeries, SeriesSource, SeriesVisibility, ValueRole};
pub use time_unit::{TimeIncrement, TimeLevel, TimeSpan, default_format, nice_time_span, round_time};
pub use types::{DataType, Point, Rect, Size};
