//! Tick generation for category, time, logarithmic and linear axes.
//!
//! Ticks are rebuilt on every measure and render pass. Positions produced
//! here are offsets in pixels from the axis start for a given length; the
//! render pass re-projects them through [`Axis::convert`].

use crate::axis::limits::{log_ceil, log_floor};
use crate::axis::{Axis, LabelItem};
use crate::core::format::{format_date, format_number};
use crate::core::nice::nice_major_step;
use crate::core::primitives::{decimal_places, snap_to_step};
use crate::core::time_unit::{
    TimeIncrement, TimeSpan, add_calendar_months, default_format, nice_time_span, round_time,
};
use crate::core::types::Point;
use crate::render::TextMeasurer;

pub const MAX_MAJOR_TICKS: usize = 1000;
pub const MAX_MINOR_TICKS: usize = 2000;

/// Upper bound on minor steps walked from the anchor in each direction.
const MINOR_WALK_LIMIT: usize = 2 * MAX_MINOR_TICKS;

/// Pixels kept free between labels when estimating how many fit.
const LABEL_SLOT_GAP: f64 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickKind {
    Category,
    Time,
    Log,
    Linear,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub value: f64,
    /// Empty when the label was suppressed by the item formatter.
    pub label: String,
    pub position: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickSet {
    pub kind: TickKind,
    pub major: Vec<Tick>,
    pub minor: Vec<f64>,
    /// Major step in data units; milliseconds on time axes, 0 on log axes.
    pub step: f64,
}

impl TickSet {
    fn empty(kind: TickKind) -> Self {
        Self {
            kind,
            major: Vec::new(),
            minor: Vec::new(),
            step: 0.0,
        }
    }

    /// Values of the major ticks.
    pub fn major_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.major.iter().map(|tick| tick.value)
    }
}

/// Number of labels of `label_size` pixels that fit along `length` pixels.
#[must_use]
pub fn label_slots(length: f64, label_size: f64) -> usize {
    if !length.is_finite() || length <= 0.0 {
        return 1;
    }
    let per_label = label_size.max(0.0) + LABEL_SLOT_GAP;
    ((length / per_label).floor() as usize).max(1)
}

fn near(lhs: f64, rhs: f64, scale: f64) -> bool {
    (lhs - rhs).abs() <= scale.abs().max(f64::MIN_POSITIVE) * 1e-9
}

impl Axis {
    #[must_use]
    pub fn tick_kind(&self) -> TickKind {
        if self.labels.is_some() {
            TickKind::Category
        } else if self.is_time_axis() {
            TickKind::Time
        } else if self.options.log_base.is_some() {
            TickKind::Log
        } else {
            TickKind::Linear
        }
    }

    /// Generates major and minor ticks for an axis `length` pixels long.
    pub fn generate_ticks<M: TextMeasurer + ?Sized>(&self, measurer: &M, length: f64) -> TickSet {
        let kind = self.tick_kind();
        let (min, max) = (self.actual_min, self.actual_max);
        if !min.is_finite() || !max.is_finite() || max < min {
            return TickSet::empty(kind);
        }

        let (values, step) = match kind {
            TickKind::Category => (self.category_values(min, max), self.category_step()),
            TickKind::Time => {
                let slots = label_slots(length, self.sample_label_size(measurer, kind));
                self.time_values(min, max, slots)
            }
            TickKind::Log => {
                let slots = label_slots(length, self.sample_label_size(measurer, kind));
                (self.log_values(min, max, slots), 0.0)
            }
            TickKind::Linear => {
                let slots = label_slots(length, self.sample_label_size(measurer, kind));
                self.linear_values(min, max, slots)
            }
        };

        let major = values
            .iter()
            .map(|&value| Tick {
                value,
                label: self.format_label(value, kind, step),
                position: self.fraction(value) * length,
            })
            .collect::<Vec<_>>();
        let minor = self.minor_values(kind, &values, step, min, max);

        TickSet {
            kind,
            major,
            minor,
            step,
        }
    }

    /// Runs the item formatter over every label. `project` maps a tick to the
    /// anchor point handed to the formatter.
    pub(crate) fn apply_item_formatter(&self, ticks: &mut TickSet, project: impl Fn(&Tick) -> Point) {
        let Some(formatter) = self.item_formatter.as_ref() else {
            return;
        };
        for tick in &mut ticks.major {
            if tick.label.is_empty() {
                continue;
            }
            let item = LabelItem {
                value: tick.value,
                text: tick.label.clone(),
                position: project(tick),
                class: self.label_style.class,
            };
            tick.label = formatter(item).map(|item| item.text).unwrap_or_default();
        }
    }

    /// Size of a representative label along the axis direction, used to
    /// estimate how many labels fit.
    fn sample_label_size<M: TextMeasurer + ?Sized>(&self, measurer: &M, kind: TickKind) -> f64 {
        if !self.is_horizontal() {
            return measurer.measure_string("0", &self.label_style).height;
        }
        let (min, max) = (self.actual_min, self.actual_max);
        let samples = match kind {
            TickKind::Time => {
                let format = self
                    .options
                    .format
                    .as_deref()
                    .unwrap_or_else(|| default_format(max, min));
                [format_date(min, format), format_date(max, format)]
            }
            _ => {
                let step = nice_major_step(max - min, 10);
                [
                    self.format_label(min, kind, step),
                    self.format_label(max, kind, step),
                ]
            }
        };
        samples
            .iter()
            .map(|text| measurer.measure_string(text, &self.label_style).width)
            .fold(0.0, f64::max)
    }

    fn format_label(&self, value: f64, kind: TickKind, step: f64) -> String {
        match (kind, self.options.format.as_deref()) {
            (TickKind::Category, _) => self.category_label(value),
            (TickKind::Time, Some(format)) => format_date(value, format),
            (TickKind::Log | TickKind::Linear, Some(format)) => format_number(value, format),
            (TickKind::Time, None) => {
                format_date(value, default_format(self.actual_max, self.actual_min))
            }
            (TickKind::Log, None) => format_number(value, &format!("n{}", decimal_places(value))),
            (TickKind::Linear, None) => {
                format_number(value, &format!("n{}", decimal_places(step)))
            }
        }
    }

    fn category_label(&self, value: f64) -> String {
        let Some(labels) = self.labels.as_deref() else {
            return String::new();
        };
        if let Some(values) = self.values.as_deref() {
            return values
                .iter()
                .position(|&v| v == value)
                .and_then(|index| labels.get(index))
                .cloned()
                .unwrap_or_default();
        }
        if value.fract() != 0.0 || value < 0.0 {
            return String::new();
        }
        labels.get(value as usize).cloned().unwrap_or_default()
    }

    fn category_step(&self) -> f64 {
        self.options.major_unit.unwrap_or(1.0)
    }

    fn category_values(&self, min: f64, max: f64) -> Vec<f64> {
        let in_range = |v: f64| v >= min - 1e-9 && v <= max + 1e-9;
        if let Some(values) = self.values.as_deref() {
            return values
                .iter()
                .copied()
                .filter(|&v| in_range(v))
                .take(MAX_MAJOR_TICKS)
                .collect();
        }
        let count = self.labels.as_ref().map_or(0, Vec::len);
        if count == 0 {
            return Vec::new();
        }
        let step = self.category_step();
        let last = (count - 1) as f64;
        (0..MAX_MAJOR_TICKS)
            .map(|k| k as f64 * step)
            .take_while(|&v| v <= last)
            .filter(|&v| in_range(v))
            .collect()
    }

    fn time_values(&self, min: f64, max: f64, slots: usize) -> (Vec<f64>, f64) {
        let increment = match self.options.major_unit {
            Some(days) => TimeIncrement::from_days(days),
            None => nice_time_span(
                TimeSpan::from_millis((max - min) / slots as f64),
                self.options.format.as_deref(),
            ),
        };
        let step = increment.millis();
        let first = round_time(min, increment.days(), true);
        let mut values = Vec::new();
        if !first.is_finite() || step <= 0.0 {
            return (values, step);
        }

        match increment.calendar_months() {
            Some(months) if months > 0 => {
                let mut previous = f64::NEG_INFINITY;
                for k in 0..MAX_MAJOR_TICKS {
                    let Some(offset) = i32::try_from(k).ok().and_then(|k| months.checked_mul(k))
                    else {
                        break;
                    };
                    let value = add_calendar_months(first, offset);
                    // Past the representable calendar the date stops moving.
                    if value > max || value <= previous {
                        break;
                    }
                    if value >= min {
                        values.push(value);
                    }
                    previous = value;
                }
            }
            _ => {
                for k in 0..MAX_MAJOR_TICKS {
                    let value = first + k as f64 * step;
                    if value > max + step * 1e-9 {
                        break;
                    }
                    if value >= min - step * 1e-9 {
                        values.push(value);
                    }
                }
            }
        }
        (values, step)
    }

    /// Log sub-division count: the largest divisor of `base - 1` that keeps
    /// every bucket within its share of the label slots.
    fn log_subdivisions(base: f64, slots_per_bucket: usize) -> usize {
        if base.fract() != 0.0 || base < 2.0 {
            return 1;
        }
        let span = (base - 1.0) as usize;
        (1..=span)
            .rev()
            .find(|d| span % d == 0 && *d <= slots_per_bucket.max(1))
            .unwrap_or(1)
    }

    fn log_values(&self, min: f64, max: f64, slots: usize) -> Vec<f64> {
        let Some(base) = self.options.log_base else {
            return Vec::new();
        };
        if min <= 0.0 {
            return Vec::new();
        }
        let low = log_floor(min, base) as i32;
        let high = log_ceil(max, base) as i32;
        let in_range = |v: f64| v >= min * (1.0 - 1e-9) && v <= max * (1.0 + 1e-9);
        let mut values = Vec::new();

        if let Some(unit) = self.options.major_unit {
            let stride = (unit.round() as i32).max(1);
            let mut exponent = low;
            while exponent <= high && values.len() < MAX_MAJOR_TICKS {
                let value = base.powi(exponent);
                if in_range(value) {
                    values.push(value);
                }
                exponent += stride;
            }
            return values;
        }

        let buckets = (high - low).max(1) as usize;
        let subdivisions = Self::log_subdivisions(base, slots / buckets);
        for exponent in low..=high {
            let start = base.powi(exponent);
            let end = base.powi(exponent + 1);
            let parts = if exponent == high { 1 } else { subdivisions };
            for k in 0..parts {
                let value = start + k as f64 * (end - start) / parts as f64;
                if in_range(value) && values.len() < MAX_MAJOR_TICKS {
                    values.push(value);
                }
            }
        }
        values
    }

    fn linear_values(&self, min: f64, max: f64, slots: usize) -> (Vec<f64>, f64) {
        let step = self
            .options
            .major_unit
            .unwrap_or_else(|| nice_major_step(max - min, slots));
        let first = snap_to_step(((min / step) - 1e-9).ceil() * step, step);
        let mut values = Vec::new();
        for k in 0..MAX_MAJOR_TICKS {
            let value = snap_to_step(first + k as f64 * step, step);
            if value > max + step * 1e-9 {
                break;
            }
            values.push(value);
        }
        (values, step)
    }

    fn minor_values(&self, kind: TickKind, major: &[f64], step: f64, min: f64, max: f64) -> Vec<f64> {
        match kind {
            TickKind::Time => match self.options.minor_unit {
                Some(days) => time_minor_values(major, TimeIncrement::from_days(days), min, max),
                None => major
                    .windows(2)
                    .map(|pair| 0.5 * (pair[0] + pair[1]))
                    .take(MAX_MINOR_TICKS)
                    .collect(),
            },
            TickKind::Log => self.log_minor_values(major, min, max),
            TickKind::Category | TickKind::Linear => {
                let minor_step = self.options.minor_unit.unwrap_or(step / 2.0);
                let Some(&anchor) = major.first() else {
                    return Vec::new();
                };
                if !minor_step.is_finite() || minor_step <= 0.0 || step <= 0.0 {
                    return Vec::new();
                }
                let misaligned = kind == TickKind::Category
                    && self.options.major_unit.is_some_and(|unit| unit.fract() != 0.0);
                let coincides = |value: f64| {
                    let ratio = (value - anchor) / step;
                    (ratio - ratio.round()).abs() <= 1e-6
                };
                let snap_step = if decimal_places(minor_step) >= decimal_places(step) {
                    minor_step
                } else {
                    step
                };

                let mut values = Vec::new();
                for k in 1..=MINOR_WALK_LIMIT {
                    if values.len() >= MAX_MINOR_TICKS {
                        break;
                    }
                    let value = snap_to_step(anchor - k as f64 * minor_step, snap_step);
                    if value < min - minor_step * 1e-9 {
                        break;
                    }
                    if misaligned || !coincides(value) {
                        values.push(value);
                    }
                }
                values.reverse();
                for k in 1..=MINOR_WALK_LIMIT {
                    if values.len() >= MAX_MINOR_TICKS {
                        break;
                    }
                    let value = snap_to_step(anchor + k as f64 * minor_step, snap_step);
                    if value > max + minor_step * 1e-9 {
                        break;
                    }
                    if misaligned || !coincides(value) {
                        values.push(value);
                    }
                }
                values
            }
        }
    }

    fn log_minor_values(&self, major: &[f64], min: f64, max: f64) -> Vec<f64> {
        let Some(base) = self.options.log_base else {
            return Vec::new();
        };
        if base.fract() != 0.0 || base < 3.0 || min <= 0.0 {
            return Vec::new();
        }
        let low = log_floor(min, base) as i32;
        let high = log_ceil(max, base) as i32;
        let mut values = Vec::new();
        'outer: for exponent in low..=high {
            let power = base.powi(exponent);
            for k in 2..(base as i32) {
                let value = f64::from(k) * power;
                if value < min * (1.0 - 1e-9) || value > max * (1.0 + 1e-9) {
                    continue;
                }
                if major.iter().any(|&m| near(m, value, value)) {
                    continue;
                }
                values.push(value);
                if values.len() >= MAX_MINOR_TICKS {
                    break 'outer;
                }
            }
        }
        values
    }
}

/// Minor ticks on a time axis with an explicit minor unit, walked outward
/// from the first major tick. Calendar increments follow real month lengths.
fn time_minor_values(major: &[f64], increment: TimeIncrement, min: f64, max: f64) -> Vec<f64> {
    let Some(&anchor) = major.first() else {
        return Vec::new();
    };
    let step = increment.millis();
    if !step.is_finite() || step <= 0.0 {
        return Vec::new();
    }
    let months = increment.calendar_months().filter(|&months| months > 0);
    let offset = |k: usize, sign: i32| -> Option<f64> {
        match months {
            Some(months) => {
                let count = i32::try_from(k).ok()?.checked_mul(months)?.checked_mul(sign)?;
                Some(add_calendar_months(anchor, count))
            }
            None => Some(anchor + f64::from(sign) * k as f64 * step),
        }
    };
    let on_major = |value: f64| major.iter().any(|&m| near(m, value, step));

    let mut values = Vec::new();
    let mut previous = anchor;
    for k in 1..=MINOR_WALK_LIMIT {
        let Some(value) = offset(k, -1) else {
            break;
        };
        if value < min - step * 1e-9 || value >= previous || values.len() >= MAX_MINOR_TICKS {
            break;
        }
        if !on_major(value) {
            values.push(value);
        }
        previous = value;
    }
    values.reverse();
    let mut previous = anchor;
    for k in 1..=MINOR_WALK_LIMIT {
        let Some(value) = offset(k, 1) else {
            break;
        };
        if value > max + step * 1e-9 || value <= previous || values.len() >= MAX_MINOR_TICKS {
            break;
        }
        if !on_major(value) {
            values.push(value);
        }
        previous = value;
    }
    values
}
