use serde_json::Value;
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::axis::{Axis, AxisBound, RangeChange};
use crate::core::format::format_number;
use crate::core::types::DataType;

/// `floor(log_base(value))`, snapping to the nearest integer when the
/// logarithm lands within rounding noise of one.
pub(crate) fn log_floor(value: f64, base: f64) -> f64 {
    let exponent = value.ln() / base.ln();
    let rounded = exponent.round();
    if (exponent - rounded).abs() <= 1e-10 {
        rounded
    } else {
        exponent.floor()
    }
}

pub(crate) fn log_ceil(value: f64, base: f64) -> f64 {
    let exponent = value.ln() / base.ln();
    let rounded = exponent.round();
    if (exponent - rounded).abs() <= 1e-10 {
        rounded
    } else {
        exponent.ceil()
    }
}

fn same_value(lhs: f64, rhs: f64) -> bool {
    lhs == rhs || (lhs.is_nan() && rhs.is_nan())
}

impl Axis {
    /// Resolves `actual_min`/`actual_max` from explicit bounds and the
    /// aggregated data range, then rebuilds bound category labels.
    ///
    /// Listeners registered with [`Axis::on_range_changed`] fire only when the
    /// resolved range differs from the previous one.
    pub fn update_actual_limits(
        &mut self,
        data_type: DataType,
        data_min: f64,
        data_max: f64,
        labels: Option<&[String]>,
        values: Option<&[f64]>,
    ) {
        let (old_min, old_max) = (self.actual_min, self.actual_max);
        self.data_type = data_type;
        self.labels = labels.map(<[String]>::to_vec);
        self.values = values.map(<[f64]>::to_vec);

        let explicit_min = self
            .options
            .min
            .map(AxisBound::value)
            .filter(|v| v.is_finite());
        let explicit_max = self
            .options
            .max
            .map(AxisBound::value)
            .filter(|v| v.is_finite());
        let mut min = explicit_min.unwrap_or(data_min);
        let mut max = explicit_max.unwrap_or(data_max);

        match (min.is_finite(), max.is_finite()) {
            (true, true) => {}
            (false, true) => min = max,
            (true, false) => max = min,
            (false, false) => {
                trace!("no data for axis range, using [0, 1]");
                min = 0.0;
                max = 1.0;
            }
        }
        if min > max {
            std::mem::swap(&mut min, &mut max);
        }
        if min == max {
            trace!(value = min, "collapsed axis range widened by 0.5");
            min -= 0.5;
            max += 0.5;
        }

        if let Some(base) = self.options.log_base {
            if explicit_max.is_none() && max > 0.0 {
                max = base.powf(log_ceil(max, base));
            }
            if explicit_min.is_none() && min > 0.0 {
                min = base.powf(log_floor(min, base));
            }
            if min.is_nan() || min <= 0.0 {
                trace!(min, "non-positive log axis minimum clamped to 1");
                min = 1.0;
            }
            if max <= min {
                max = min + 1.0;
            }
        }

        if self.items_source.is_some() {
            self.rebuild_bound_labels();
        }

        self.actual_min = min;
        self.actual_max = max;

        if !same_value(old_min, min) || !same_value(old_max, max) {
            debug!(old_min, old_max, min, max, "axis range changed");
            let change = RangeChange {
                old_min,
                old_max,
                new_min: min,
                new_max: max,
            };
            for listener in &mut self.range_listeners {
                listener(&change);
            }
        }
    }

    fn rebuild_bound_labels(&mut self) {
        let Some(items) = self.items_source.as_ref() else {
            return;
        };
        let keys: SmallVec<[&str; 2]> = self.options.binding.split(',').map(str::trim).collect();
        let value_key = keys.first().copied().unwrap_or("value");
        let text_key = keys.get(1).copied();

        let mut labels = Vec::with_capacity(items.len());
        let mut values = Vec::with_capacity(items.len());
        let mut dropped = 0usize;
        for item in items {
            let Some(value) = item.get(value_key).and_then(Value::as_f64) else {
                dropped += 1;
                continue;
            };
            let text = match text_key.and_then(|key| item.get(key)) {
                Some(Value::String(text)) => text.clone(),
                Some(Value::Null) | None => format_number(value, ""),
                Some(other) => other.to_string(),
            };
            values.push(value);
            labels.push(text);
        }
        if dropped > 0 {
            warn!(
                dropped,
                binding = %self.options.binding,
                "items without a numeric value were ignored"
            );
        }
        self.labels = Some(labels);
        self.values = Some(values);
    }
}
