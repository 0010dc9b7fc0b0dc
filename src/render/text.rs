//! Text styling and measurement.
//!
//! Axes, titles and legends size themselves before the plot rectangle is
//! known, so layout only depends on this small measurement contract. Shaping
//! and glyph rendering stay in the backend.

use serde::{Deserialize, Serialize};

use crate::core::types::Size;
use crate::render::Color;

/// Role of a piece of text, used by backends to pick fonts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TextClass {
    #[default]
    AxisLabel,
    AxisTitle,
    Header,
    Footer,
    Legend,
    DataLabel,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub class: TextClass,
    pub font_size: f64,
    pub color: Color,
}

impl TextStyle {
    #[must_use]
    pub fn for_class(class: TextClass) -> Self {
        let font_size = match class {
            TextClass::AxisLabel | TextClass::Legend | TextClass::DataLabel => 12.0,
            TextClass::AxisTitle | TextClass::Footer => 14.0,
            TextClass::Header => 18.0,
        };
        Self {
            class,
            font_size,
            color: Color::rgb(0.2, 0.2, 0.2),
        }
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::for_class(TextClass::AxisLabel)
    }
}

/// Single-line text metrics provider.
pub trait TextMeasurer {
    fn measure_string(&self, text: &str, style: &TextStyle) -> Size;
}

/// Assumes an average glyph advance of 0.6em and a line height of 1.2em.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicTextMeasurer;

impl TextMeasurer for HeuristicTextMeasurer {
    fn measure_string(&self, text: &str, style: &TextStyle) -> Size {
        heuristic_size(text, style)
    }
}

pub(crate) fn heuristic_size(text: &str, style: &TextStyle) -> Size {
    if text.is_empty() {
        return Size::new(0.0, 0.0);
    }
    Size::new(
        0.6 * style.font_size * text.chars().count() as f64,
        1.2 * style.font_size,
    )
}

#[cfg(test)]
mod tests {
    use super::{HeuristicTextMeasurer, TextClass, TextMeasurer, TextStyle};

    #[test]
    fn heuristic_width_scales_with_length_and_font() {
        let measurer = HeuristicTextMeasurer;
        let style = TextStyle::for_class(TextClass::AxisLabel);
        let size = measurer.measure_string("100", &style);
        assert!((size.width - 21.6).abs() <= 1e-9);
        assert!((size.height - 14.4).abs() <= 1e-9);
        assert_eq!(measurer.measure_string("", &style).width, 0.0);
    }
}
