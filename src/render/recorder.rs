use tracing::trace;

use crate::core::types::{Point, Rect, Size};
use crate::error::{ChartError, ChartResult};
use crate::render::text::heuristic_size;
use crate::render::{
    Color, LinePrimitive, LineStyle, RectPrimitive, RenderEngine, RenderFrame, TextMeasurer,
    TextPrimitive, TextStyle,
};

/// Headless backend that records draw calls into a [`RenderFrame`].
///
/// Used by tests and by hosts that rasterize frames themselves. The frame is
/// validated on `end_render` so invalid geometry surfaces before a real
/// backend sees it.
#[derive(Debug, Default)]
pub struct FrameRecorder {
    current: Option<RenderFrame>,
    last_frame: Option<RenderFrame>,
    pub frames_completed: usize,
}

impl FrameRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Frame produced by the last completed render pass.
    #[must_use]
    pub fn last_frame(&self) -> Option<&RenderFrame> {
        self.last_frame.as_ref()
    }

    fn frame_mut(&mut self) -> Option<&mut RenderFrame> {
        self.current.as_mut()
    }
}

impl TextMeasurer for FrameRecorder {
    fn measure_string(&self, text: &str, style: &TextStyle) -> Size {
        heuristic_size(text, style)
    }
}

impl RenderEngine for FrameRecorder {
    fn begin_render(&mut self, size: Size) {
        self.current = Some(RenderFrame::new(size));
    }

    fn end_render(&mut self) -> ChartResult<()> {
        let Some(frame) = self.current.take() else {
            return Err(ChartError::InvalidData(
                "end_render called without begin_render".to_owned(),
            ));
        };
        frame.validate()?;
        trace!(
            lines = frame.lines.len(),
            rects = frame.rects.len(),
            texts = frame.texts.len(),
            "recorded frame"
        );
        self.last_frame = Some(frame);
        self.frames_completed += 1;
        Ok(())
    }

    fn draw_line(&mut self, from: Point, to: Point, style: &LineStyle) {
        if let Some(frame) = self.frame_mut() {
            frame
                .lines
                .push(LinePrimitive::new(from.x, from.y, to.x, to.y, *style));
        }
    }

    fn draw_rect(&mut self, rect: Rect, fill: Option<Color>, stroke: Option<&LineStyle>) {
        if let Some(frame) = self.frame_mut() {
            frame
                .rects
                .push(RectPrimitive::new(rect, fill, stroke.copied()));
        }
    }

    fn draw_string(&mut self, text: &str, origin: Point, style: &TextStyle) {
        if let Some(frame) = self.frame_mut() {
            frame
                .texts
                .push(TextPrimitive::new(text, origin.x, origin.y, *style));
        }
    }

    fn draw_string_rotated(
        &mut self,
        text: &str,
        origin: Point,
        pivot: Point,
        angle_deg: f64,
        style: &TextStyle,
    ) {
        if let Some(frame) = self.frame_mut() {
            frame.texts.push(
                TextPrimitive::new(text, origin.x, origin.y, *style).rotated(pivot, angle_deg),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FrameRecorder;
    use crate::core::types::{Point, Size};
    use crate::render::{LineStyle, RenderEngine, TextStyle};

    #[test]
    fn records_and_validates_frame() {
        let mut recorder = FrameRecorder::new();
        recorder.begin_render(Size::new(100.0, 50.0));
        recorder.draw_line(
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            &LineStyle::axis_line(),
        );
        recorder.draw_string("a", Point::new(1.0, 1.0), &TextStyle::default());
        recorder.end_render().expect("valid frame");

        let frame = recorder.last_frame().expect("frame");
        assert_eq!(frame.lines.len(), 1);
        assert_eq!(frame.texts.len(), 1);
        assert_eq!(recorder.frames_completed, 1);
    }

    #[test]
    fn rejects_non_finite_geometry() {
        let mut recorder = FrameRecorder::new();
        recorder.begin_render(Size::new(100.0, 50.0));
        recorder.draw_line(
            Point::new(f64::NAN, 0.0),
            Point::new(10.0, 10.0),
            &LineStyle::axis_line(),
        );
        assert!(recorder.end_render().is_err());
        assert!(recorder.end_render().is_err());
    }
}
