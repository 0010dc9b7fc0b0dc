use serde::{Deserialize, Serialize};

use crate::core::types::{Point, Rect, Size};
use crate::render::{Color, LineStyle, RenderEngine, TextClass, TextMeasurer, TextStyle};

const SWATCH_SIZE: f64 = 10.0;
const SWATCH_GAP: f64 = 4.0;
const ITEM_GAP: f64 = 8.0;
const LEGEND_PADDING: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LegendPosition {
    None,
    Left,
    Top,
    #[default]
    Right,
    Bottom,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub name: String,
    pub color: Color,
}

/// Series legend. Reserves a strip on one side of the chart and lists
/// entries with a color swatch, stacked vertically on the left/right and
/// in one row on the top/bottom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Legend {
    #[serde(default)]
    pub position: LegendPosition,
    #[serde(default = "default_legend_style")]
    pub style: TextStyle,
}

impl Default for Legend {
    fn default() -> Self {
        Self {
            position: LegendPosition::default(),
            style: default_legend_style(),
        }
    }
}

fn default_legend_style() -> TextStyle {
    TextStyle::for_class(TextClass::Legend)
}

impl Legend {
    fn vertical(&self) -> bool {
        matches!(self.position, LegendPosition::Left | LegendPosition::Right)
    }

    fn item_sizes<M: TextMeasurer + ?Sized>(&self, measurer: &M, entries: &[LegendEntry]) -> Vec<Size> {
        entries
            .iter()
            .map(|entry| {
                let text = measurer.measure_string(&entry.name, &self.style);
                Size::new(
                    SWATCH_SIZE + SWATCH_GAP + text.width,
                    text.height.max(SWATCH_SIZE),
                )
            })
            .collect()
    }

    /// Size the legend needs; zero when hidden or empty.
    pub fn measure<M: TextMeasurer + ?Sized>(&self, measurer: &M, entries: &[LegendEntry]) -> Size {
        if self.position == LegendPosition::None || entries.is_empty() {
            return Size::default();
        }
        let items = self.item_sizes(measurer, entries);
        let gaps = ITEM_GAP * items.len().saturating_sub(1) as f64;
        let (width, height) = if self.vertical() {
            (
                items.iter().map(|s| s.width).fold(0.0, f64::max),
                items.iter().map(|s| s.height).sum::<f64>() + gaps,
            )
        } else {
            (
                items.iter().map(|s| s.width).sum::<f64>() + gaps,
                items.iter().map(|s| s.height).fold(0.0, f64::max),
            )
        };
        Size::new(width + 2.0 * LEGEND_PADDING, height + 2.0 * LEGEND_PADDING)
    }

    /// Splits `area` into the space left for the chart and the legend box.
    #[must_use]
    pub fn reserve(&self, area: Rect, size: Size) -> (Rect, Rect) {
        let width = size.width.min(area.width);
        let height = size.height.min(area.height);
        match self.position {
            LegendPosition::None => (area, Rect::new(area.left, area.top, 0.0, 0.0)),
            LegendPosition::Right => (
                Rect::new(area.left, area.top, area.width - width, area.height),
                Rect::new(
                    area.right() - width,
                    area.top + 0.5 * (area.height - height),
                    width,
                    height,
                ),
            ),
            LegendPosition::Left => (
                Rect::new(area.left + width, area.top, area.width - width, area.height),
                Rect::new(area.left, area.top + 0.5 * (area.height - height), width, height),
            ),
            LegendPosition::Top => (
                Rect::new(area.left, area.top + height, area.width, area.height - height),
                Rect::new(area.left + 0.5 * (area.width - width), area.top, width, height),
            ),
            LegendPosition::Bottom => (
                Rect::new(area.left, area.top, area.width, area.height - height),
                Rect::new(
                    area.left + 0.5 * (area.width - width),
                    area.bottom() - height,
                    width,
                    height,
                ),
            ),
        }
    }

    pub fn render<E: RenderEngine + ?Sized>(&self, engine: &mut E, rect: Rect, entries: &[LegendEntry]) {
        if self.position == LegendPosition::None || entries.is_empty() {
            return;
        }
        let items = self.item_sizes(&*engine, entries);
        let outline = LineStyle::solid(Color::rgb(0.6, 0.6, 0.6), 1.0);
        let mut cursor = Point::new(rect.left + LEGEND_PADDING, rect.top + LEGEND_PADDING);
        for (entry, item) in entries.iter().zip(&items) {
            let swatch = Rect::new(
                cursor.x,
                cursor.y + 0.5 * (item.height - SWATCH_SIZE),
                SWATCH_SIZE,
                SWATCH_SIZE,
            );
            engine.draw_rect(swatch, Some(entry.color), Some(&outline));
            let text = engine.measure_string(&entry.name, &self.style);
            engine.draw_string(
                &entry.name,
                Point::new(
                    cursor.x + SWATCH_SIZE + SWATCH_GAP,
                    cursor.y + 0.5 * (item.height - text.height),
                ),
                &self.style,
            );
            if self.vertical() {
                cursor.y += item.height + ITEM_GAP;
            } else {
                cursor.x += item.width + ITEM_GAP;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Legend, LegendEntry, LegendPosition};
    use crate::core::types::{Rect, Size};
    use crate::render::{FrameRecorder, HeuristicTextMeasurer, RenderEngine, series_color};

    fn entries() -> Vec<LegendEntry> {
        ["north", "south"]
            .iter()
            .enumerate()
            .map(|(index, name)| LegendEntry {
                name: (*name).to_owned(),
                color: series_color(index),
            })
            .collect()
    }

    #[test]
    fn right_legend_takes_a_vertical_strip() {
        let legend = Legend::default();
        let size = legend.measure(&HeuristicTextMeasurer, &entries());
        // swatch + gap + five 7.2px glyphs, padded on both sides
        assert!((size.width - (10.0 + 4.0 + 36.0 + 10.0)).abs() <= 1e-9);
        let area = Rect::new(0.0, 0.0, 400.0, 300.0);
        let (rest, rect) = legend.reserve(area, size);
        assert!((rest.width + rect.width - 400.0).abs() <= 1e-9);
        assert_eq!(rect.right(), 400.0);
    }

    #[test]
    fn hidden_legend_reserves_nothing() {
        let legend = Legend {
            position: LegendPosition::None,
            ..Legend::default()
        };
        assert_eq!(legend.measure(&HeuristicTextMeasurer, &entries()), Size::default());
    }

    #[test]
    fn renders_swatch_and_name_per_entry() {
        let legend = Legend {
            position: LegendPosition::Bottom,
            ..Legend::default()
        };
        let mut recorder = FrameRecorder::new();
        recorder.begin_render(Size::new(400.0, 300.0));
        legend.render(&mut recorder, Rect::new(100.0, 270.0, 200.0, 30.0), &entries());
        recorder.end_render().expect("valid frame");
        let frame = recorder.last_frame().expect("frame");
        assert_eq!(frame.rects.len(), 2);
        assert_eq!(frame.texts.len(), 2);
        assert!(frame.texts[1].x > frame.texts[0].x);
    }
}
