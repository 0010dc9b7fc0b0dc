use crate::core::types::Size;
use crate::error::{ChartError, ChartResult};
use crate::render::{LinePrimitive, RectPrimitive, TextPrimitive};

/// Backend-agnostic scene recorded for one chart draw pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub size: Size,
    pub lines: Vec<LinePrimitive>,
    pub rects: Vec<RectPrimitive>,
    pub texts: Vec<TextPrimitive>,
}

impl RenderFrame {
    #[must_use]
    pub fn new(size: Size) -> Self {
        Self {
            size,
            lines: Vec::new(),
            rects: Vec::new(),
            texts: Vec::new(),
        }
    }

    pub fn validate(&self) -> ChartResult<()> {
        if !self.size.is_valid() {
            return Err(ChartError::InvalidData(format!(
                "frame size must be finite and > 0, got {}x{}",
                self.size.width, self.size.height
            )));
        }

        for line in &self.lines {
            line.validate()?;
        }
        for rect in &self.rects {
            rect.validate()?;
        }
        for text in &self.texts {
            text.validate()?;
        }

        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.rects.is_empty() && self.texts.is_empty()
    }

    /// Texts whose content equals `text`.
    pub fn texts_matching<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a TextPrimitive> {
        self.texts.iter().filter(move |primitive| primitive.text == text)
    }
}
