use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Explicit plot margins; `None` sides are computed from the axes.
///
/// Parses CSS-like shorthand with one to four values, each a pixel length
/// or `auto`: `"20"`, `"10 auto"`, `"10 20 30"`, `"10 20 30 40"`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlotMargin {
    pub top: Option<f64>,
    pub right: Option<f64>,
    pub bottom: Option<f64>,
    pub left: Option<f64>,
}

impl PlotMargin {
    #[must_use]
    pub const fn uniform(value: f64) -> Self {
        Self {
            top: Some(value),
            right: Some(value),
            bottom: Some(value),
            left: Some(value),
        }
    }

    #[must_use]
    pub fn is_auto(&self) -> bool {
        self.top.is_none() && self.right.is_none() && self.bottom.is_none() && self.left.is_none()
    }
}

fn parse_side(token: &str) -> ChartResult<Option<f64>> {
    if token.eq_ignore_ascii_case("auto") {
        return Ok(None);
    }
    let number = token.strip_suffix("px").unwrap_or(token);
    let value: f64 = number
        .parse()
        .map_err(|_| ChartError::InvalidConfig(format!("invalid margin value `{token}`")))?;
    if !value.is_finite() || value < 0.0 {
        return Err(ChartError::InvalidConfig(format!(
            "margin must be finite and >= 0, got `{token}`"
        )));
    }
    Ok(Some(value))
}

impl FromStr for PlotMargin {
    type Err = ChartError;

    fn from_str(value: &str) -> ChartResult<Self> {
        let sides = value
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|token| !token.is_empty())
            .map(parse_side)
            .collect::<ChartResult<Vec<_>>>()?;
        let (top, right, bottom, left) = match sides.as_slice() {
            [all] => (*all, *all, *all, *all),
            [vertical, horizontal] => (*vertical, *horizontal, *vertical, *horizontal),
            [top, horizontal, bottom] => (*top, *horizontal, *bottom, *horizontal),
            [top, right, bottom, left] => (*top, *right, *bottom, *left),
            _ => {
                return Err(ChartError::InvalidConfig(format!(
                    "margin needs 1 to 4 values, got `{value}`"
                )));
            }
        };
        Ok(Self {
            top,
            right,
            bottom,
            left,
        })
    }
}

impl TryFrom<String> for PlotMargin {
    type Error = ChartError;

    fn try_from(value: String) -> ChartResult<Self> {
        value.parse()
    }
}

impl From<PlotMargin> for String {
    fn from(value: PlotMargin) -> Self {
        value.to_string()
    }
}

impl fmt::Display for PlotMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sides = [self.top, self.right, self.bottom, self.left];
        for (index, side) in sides.iter().enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            match side {
                Some(value) => write!(f, "{value}")?,
                None => f.write_str("auto")?,
            }
        }
        Ok(())
    }
}
