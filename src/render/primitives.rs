use serde::{Deserialize, Serialize};

use crate::core::types::{Point, Rect};
use crate::error::{ChartError, ChartResult};
use crate::render::TextStyle;

/// RGBA color in normalized 0..=1 channel values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);

    #[must_use]
    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    #[must_use]
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    /// Builds a color from 8-bit channels.
    #[must_use]
    pub fn from_rgb8(red: u8, green: u8, blue: u8) -> Self {
        Self::rgb(
            f64::from(red) / 255.0,
            f64::from(green) / 255.0,
            f64::from(blue) / 255.0,
        )
    }

    pub fn validate(self) -> ChartResult<()> {
        for (channel, value) in [
            ("red", self.red),
            ("green", self.green),
            ("blue", self.blue),
            ("alpha", self.alpha),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ChartError::InvalidData(format!(
                    "color channel `{channel}` must be finite and in [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

/// Default series palette, cycled by series index.
pub const SERIES_PALETTE: [Color; 6] = [
    Color::rgb(0.533, 0.741, 0.902),
    Color::rgb(0.984, 0.698, 0.345),
    Color::rgb(0.565, 0.804, 0.592),
    Color::rgb(0.965, 0.667, 0.788),
    Color::rgb(0.749, 0.647, 0.329),
    Color::rgb(0.737, 0.600, 0.780),
];

#[must_use]
pub fn series_color(index: usize) -> Color {
    SERIES_PALETTE[index % SERIES_PALETTE.len()]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LineStrokeStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

/// Explicit pen passed with every line and outline draw call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub color: Color,
    pub width: f64,
    pub stroke: LineStrokeStyle,
}

impl LineStyle {
    #[must_use]
    pub const fn solid(color: Color, width: f64) -> Self {
        Self {
            color,
            width,
            stroke: LineStrokeStyle::Solid,
        }
    }

    #[must_use]
    pub const fn axis_line() -> Self {
        Self::solid(Color::rgb(0.4, 0.4, 0.4), 1.0)
    }

    #[must_use]
    pub const fn major_grid() -> Self {
        Self::solid(Color::rgba(0.0, 0.0, 0.0, 0.15), 1.0)
    }

    #[must_use]
    pub const fn minor_grid() -> Self {
        Self {
            color: Color::rgba(0.0, 0.0, 0.0, 0.08),
            width: 1.0,
            stroke: LineStrokeStyle::Dotted,
        }
    }

    pub fn validate(self) -> ChartResult<()> {
        if !self.width.is_finite() || self.width <= 0.0 {
            return Err(ChartError::InvalidData(
                "line stroke width must be finite and > 0".to_owned(),
            ));
        }
        self.color.validate()
    }
}

/// Draw command for one line segment in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinePrimitive {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub style: LineStyle,
}

impl LinePrimitive {
    #[must_use]
    pub const fn new(x1: f64, y1: f64, x2: f64, y2: f64, style: LineStyle) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            style,
        }
    }

    pub fn validate(self) -> ChartResult<()> {
        if !self.x1.is_finite()
            || !self.y1.is_finite()
            || !self.x2.is_finite()
            || !self.y2.is_finite()
        {
            return Err(ChartError::InvalidData(
                "line coordinates must be finite".to_owned(),
            ));
        }
        self.style.validate()
    }
}

/// Filled and/or outlined rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectPrimitive {
    pub rect: Rect,
    pub fill: Option<Color>,
    pub stroke: Option<LineStyle>,
}

impl RectPrimitive {
    #[must_use]
    pub const fn new(rect: Rect, fill: Option<Color>, stroke: Option<LineStyle>) -> Self {
        Self { rect, fill, stroke }
    }

    pub fn validate(self) -> ChartResult<()> {
        let rect = self.rect;
        if !rect.left.is_finite()
            || !rect.top.is_finite()
            || !rect.width.is_finite()
            || !rect.height.is_finite()
            || rect.width < 0.0
            || rect.height < 0.0
        {
            return Err(ChartError::InvalidData(
                "rect must be finite with non-negative size".to_owned(),
            ));
        }
        if let Some(fill) = self.fill {
            fill.validate()?;
        }
        if let Some(stroke) = self.stroke {
            stroke.validate()?;
        }
        Ok(())
    }
}

/// Draw command for one label. `x`/`y` is the top-left corner of the
/// unrotated text box; rotation happens around `pivot`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextPrimitive {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub rotation_deg: f64,
    pub pivot: Point,
    pub style: TextStyle,
}

impl TextPrimitive {
    #[must_use]
    pub fn new(text: impl Into<String>, x: f64, y: f64, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            rotation_deg: 0.0,
            pivot: Point::new(x, y),
            style,
        }
    }

    #[must_use]
    pub fn rotated(mut self, pivot: Point, rotation_deg: f64) -> Self {
        self.pivot = pivot;
        self.rotation_deg = rotation_deg;
        self
    }

    pub fn validate(&self) -> ChartResult<()> {
        if self.text.is_empty() {
            return Err(ChartError::InvalidData(
                "text primitive must not be empty".to_owned(),
            ));
        }
        if !self.x.is_finite()
            || !self.y.is_finite()
            || !self.rotation_deg.is_finite()
            || !self.pivot.x.is_finite()
            || !self.pivot.y.is_finite()
        {
            return Err(ChartError::InvalidData(
                "text coordinates must be finite".to_owned(),
            ));
        }
        if !self.style.font_size.is_finite() || self.style.font_size <= 0.0 {
            return Err(ChartError::InvalidData(
                "font size must be finite and > 0".to_owned(),
            ));
        }
        self.style.color.validate()
    }
}
