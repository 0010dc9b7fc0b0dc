use serde::{Deserialize, Serialize};

use crate::core::types::Rect;
use crate::error::{ChartError, ChartResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlotAreaId(u32);

impl PlotAreaId {
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// One cell of a multi-area chart grid.
///
/// `width`/`height` are relative weights of the cell's column and row; a
/// column's weight is the largest `width` among its cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotArea {
    pub id: PlotAreaId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub row: usize,
    #[serde(default)]
    pub column: usize,
    #[serde(default = "default_weight")]
    pub width: f64,
    #[serde(default = "default_weight")]
    pub height: f64,
}

/// Start and length of one row or column along the distributed dimension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: f64,
    pub length: f64,
}

impl Span {
    #[must_use]
    pub fn end(self) -> f64 {
        self.start + self.length
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlotAreaCollection {
    areas: Vec<PlotArea>,
    next_id: u32,
}

impl PlotAreaCollection {
    #[must_use]
    pub fn areas(&self) -> &[PlotArea] {
        &self.areas
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.areas.len()
    }

    #[must_use]
    pub fn get(&self, id: PlotAreaId) -> Option<&PlotArea> {
        self.areas.iter().find(|area| area.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: PlotAreaId) -> bool {
        self.get(id).is_some()
    }

    pub fn add(&mut self, row: usize, column: usize) -> PlotAreaId {
        let id = PlotAreaId::new(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.areas.push(PlotArea {
            id,
            name: None,
            row,
            column,
            width: default_weight(),
            height: default_weight(),
        });
        id
    }

    /// Inserts a fully described area, e.g. one read from configuration.
    pub fn insert(&mut self, area: PlotArea) -> ChartResult<()> {
        validate_weight(area.width)?;
        validate_weight(area.height)?;
        if self.contains(area.id) {
            return Err(ChartError::InvalidConfig(format!(
                "duplicate plot area id {}",
                area.id.raw()
            )));
        }
        self.next_id = self.next_id.max(area.id.raw().saturating_add(1));
        self.areas.push(area);
        Ok(())
    }

    pub fn remove(&mut self, id: PlotAreaId) -> bool {
        let Some(index) = self.areas.iter().position(|area| area.id == id) else {
            return false;
        };
        self.areas.remove(index);
        true
    }

    pub fn set_weights(&mut self, id: PlotAreaId, width: f64, height: f64) -> ChartResult<()> {
        validate_weight(width)?;
        validate_weight(height)?;
        let area = self
            .areas
            .iter_mut()
            .find(|area| area.id == id)
            .ok_or(ChartError::UnknownPlotArea(id))?;
        area.width = width;
        area.height = height;
        Ok(())
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.areas.iter().map(|area| area.row + 1).max().unwrap_or(0)
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.areas.iter().map(|area| area.column + 1).max().unwrap_or(0)
    }

    fn weights(&self, count: usize, index_of: impl Fn(&PlotArea) -> (usize, f64)) -> Vec<f64> {
        let mut weights = vec![0.0_f64; count];
        for area in &self.areas {
            let (index, weight) = index_of(area);
            if let Some(slot) = weights.get_mut(index) {
                *slot = slot.max(weight);
            }
        }
        // rows/columns without any cell still get an equal share
        for weight in &mut weights {
            if !(weight.is_finite() && *weight > 0.0) {
                *weight = default_weight();
            }
        }
        weights
    }

    /// Splits `[start, start + length]` into rows, top to bottom.
    #[must_use]
    pub fn row_spans(&self, start: f64, length: f64) -> Vec<Span> {
        let weights = self.weights(self.row_count(), |area| (area.row, area.height));
        distribute(start, length, &weights)
    }

    /// Splits `[start, start + length]` into columns, left to right.
    #[must_use]
    pub fn column_spans(&self, start: f64, length: f64) -> Vec<Span> {
        let weights = self.weights(self.column_count(), |area| (area.column, area.width));
        distribute(start, length, &weights)
    }

    /// Cell rectangle of every area inside `plot`.
    #[must_use]
    pub fn cell_rects(&self, plot: Rect) -> Vec<(PlotAreaId, Rect)> {
        let rows = self.row_spans(plot.top, plot.height);
        let columns = self.column_spans(plot.left, plot.width);
        self.areas
            .iter()
            .filter_map(|area| {
                let row = rows.get(area.row)?;
                let column = columns.get(area.column)?;
                Some((
                    area.id,
                    Rect::new(column.start, row.start, column.length, row.length),
                ))
            })
            .collect()
    }
}

/// Distributes `length` by relative `weights`; the last span always ends
/// exactly at `start + length`.
#[must_use]
pub fn distribute(start: f64, length: f64, weights: &[f64]) -> Vec<Span> {
    if weights.is_empty() {
        return Vec::new();
    }
    let length = if length.is_finite() { length.max(0.0) } else { 0.0 };
    let end = start + length;
    let sum: f64 = weights
        .iter()
        .filter(|w| w.is_finite() && **w > 0.0)
        .sum();

    let mut spans = Vec::with_capacity(weights.len());
    let mut cursor = start;
    let last_index = weights.len() - 1;
    for (index, weight) in weights.iter().enumerate() {
        let share = if sum > 0.0 && weight.is_finite() && *weight > 0.0 {
            weight / sum
        } else if sum > 0.0 {
            0.0
        } else {
            1.0 / weights.len() as f64
        };
        let next = if index == last_index {
            end
        } else {
            (cursor + length * share).clamp(cursor, end)
        };
        spans.push(Span {
            start: cursor,
            length: next - cursor,
        });
        cursor = next;
    }
    spans
}

fn default_weight() -> f64 {
    1.0
}

fn validate_weight(weight: f64) -> ChartResult<()> {
    if !weight.is_finite() || weight <= 0.0 {
        return Err(ChartError::InvalidConfig(format!(
            "plot area weight must be finite and > 0, got {weight}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{PlotAreaCollection, distribute};
    use crate::core::types::Rect;

    #[test]
    fn distribute_clamps_last_span_to_end() {
        let spans = distribute(0.0, 300.0, &[1.0, 1.0, 2.0]);
        assert_eq!(spans.len(), 3);
        assert!((spans[0].length - 75.0).abs() <= 1e-9);
        assert!((spans[1].length - 75.0).abs() <= 1e-9);
        assert!((spans[2].end() - 300.0).abs() <= 1e-9);
    }

    #[test]
    fn grid_cells_follow_row_and_column_weights() {
        let mut areas = PlotAreaCollection::default();
        let top = areas.add(0, 0);
        let bottom = areas.add(1, 0);
        areas.set_weights(top, 1.0, 3.0).expect("weights");
        assert_eq!(areas.row_count(), 2);
        assert_eq!(areas.column_count(), 1);

        let cells = areas.cell_rects(Rect::new(10.0, 0.0, 200.0, 400.0));
        assert_eq!(cells[0], (top, Rect::new(10.0, 0.0, 200.0, 300.0)));
        assert_eq!(cells[1], (bottom, Rect::new(10.0, 300.0, 200.0, 100.0)));
    }

    #[test]
    fn invalid_weights_and_unknown_areas_are_rejected() {
        let mut areas = PlotAreaCollection::default();
        let id = areas.add(0, 0);
        assert!(areas.set_weights(id, 0.0, 1.0).is_err());
        assert!(areas.remove(id));
        assert!(areas.set_weights(id, 1.0, 1.0).is_err());
        assert!(areas.is_empty());
    }
}
