mod frame;
mod primitives;
mod recorder;
mod text;

pub use frame::RenderFrame;
pub use primitives::{
    Color, LinePrimitive, LineStrokeStyle, LineStyle, RectPrimitive, SERIES_PALETTE,
    TextPrimitive, series_color,
};
pub use recorder::FrameRecorder;
pub use text::{HeuristicTextMeasurer, TextClass, TextMeasurer, TextStyle};

use crate::core::types::{Point, Rect, Size};
use crate::error::ChartResult;

/// Contract implemented by any drawing backend.
///
/// Every draw call carries its own style; backends keep no pen state
/// between calls. A pass is bracketed by `begin_render`/`end_render`.
pub trait RenderEngine: TextMeasurer {
    fn begin_render(&mut self, size: Size);

    fn end_render(&mut self) -> ChartResult<()>;

    fn draw_line(&mut self, from: Point, to: Point, style: &LineStyle);

    fn draw_rect(&mut self, rect: Rect, fill: Option<Color>, stroke: Option<&LineStyle>);

    /// Draws `text` with its box's top-left corner at `origin`.
    fn draw_string(&mut self, text: &str, origin: Point, style: &TextStyle);

    /// Like [`RenderEngine::draw_string`], rotated by `angle_deg` around `pivot`.
    fn draw_string_rotated(
        &mut self,
        text: &str,
        origin: Point,
        pivot: Point,
        angle_deg: f64,
        style: &TextStyle,
    );
}
