//! Calendar-aware time increments for date axes.
//!
//! Spans are measured in 100-ns ticks. Axis values themselves are
//! milliseconds since the Unix epoch (UTC).

use chrono::{Datelike, NaiveDate, Timelike};
use serde::{Deserialize, Serialize};

use crate::core::primitives::millis_to_datetime;

pub const TICKS_PER_MILLISECOND: f64 = 10_000.0;
pub const TICKS_PER_SECOND: f64 = 1_000.0 * TICKS_PER_MILLISECOND;
pub const TICKS_PER_MINUTE: f64 = 60.0 * TICKS_PER_SECOND;
pub const TICKS_PER_HOUR: f64 = 60.0 * TICKS_PER_MINUTE;
pub const TICKS_PER_DAY: f64 = 24.0 * TICKS_PER_HOUR;

/// Nominal month/year lengths used to compare spans; iteration over real
/// calendars goes through [`add_calendar_months`].
pub const DAYS_PER_MONTH: f64 = 30.0;
pub const DAYS_PER_YEAR: f64 = 365.0;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// A duration in 100-ns ticks.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct TimeSpan {
    ticks: f64,
}

impl TimeSpan {
    #[must_use]
    pub const fn from_ticks(ticks: f64) -> Self {
        Self { ticks }
    }

    #[must_use]
    pub fn from_millis(millis: f64) -> Self {
        Self::from_ticks(millis * TICKS_PER_MILLISECOND)
    }

    #[must_use]
    pub fn from_seconds(seconds: f64) -> Self {
        Self::from_ticks(seconds * TICKS_PER_SECOND)
    }

    #[must_use]
    pub fn from_days(days: f64) -> Self {
        Self::from_ticks(days * TICKS_PER_DAY)
    }

    #[must_use]
    pub const fn ticks(self) -> f64 {
        self.ticks
    }

    #[must_use]
    pub fn total_millis(self) -> f64 {
        self.ticks / TICKS_PER_MILLISECOND
    }

    #[must_use]
    pub fn total_seconds(self) -> f64 {
        self.ticks / TICKS_PER_SECOND
    }

    #[must_use]
    pub fn total_days(self) -> f64 {
        self.ticks / TICKS_PER_DAY
    }
}

/// Granularity of a time increment, finest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TimeLevel {
    SubSecond,
    Second,
    Minute,
    Hour,
    Day,
    Month,
    Year,
}

impl TimeLevel {
    /// Length of one unit of this level in ticks (nominal for months/years).
    #[must_use]
    pub fn unit_ticks(self) -> f64 {
        match self {
            Self::SubSecond | Self::Second => TICKS_PER_SECOND,
            Self::Minute => TICKS_PER_MINUTE,
            Self::Hour => TICKS_PER_HOUR,
            Self::Day => TICKS_PER_DAY,
            Self::Month => DAYS_PER_MONTH * TICKS_PER_DAY,
            Self::Year => DAYS_PER_YEAR * TICKS_PER_DAY,
        }
    }

    fn ladder(self) -> &'static [f64] {
        match self {
            Self::SubSecond => &[],
            Self::Second | Self::Minute => &[1.0, 2.0, 5.0, 10.0, 15.0, 30.0],
            Self::Hour => &[1.0, 3.0, 6.0, 12.0],
            Self::Day => &[1.0, 2.0, 7.0, 14.0],
            Self::Month => &[1.0, 2.0, 3.0, 4.0, 6.0],
            Self::Year => &[1.0, 2.0, 5.0, 10.0, 20.0, 50.0],
        }
    }

    const LADDER_ORDER: [Self; 6] = [
        Self::Second,
        Self::Minute,
        Self::Hour,
        Self::Day,
        Self::Month,
        Self::Year,
    ];
}

/// A nice increment: `count` units of `level`.
///
/// For [`TimeLevel::SubSecond`] the count is a fraction of one second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeIncrement {
    pub level: TimeLevel,
    pub count: f64,
}

impl TimeIncrement {
    #[must_use]
    pub const fn new(level: TimeLevel, count: f64) -> Self {
        Self { level, count }
    }

    /// Classifies an explicit span given in days (e.g. an axis `major_unit`).
    #[must_use]
    pub fn from_days(days: f64) -> Self {
        if !days.is_finite() || days <= 0.0 {
            return fallback_increment();
        }
        let seconds = days * 86_400.0;
        if seconds < 1.0 {
            Self::new(TimeLevel::SubSecond, seconds)
        } else if seconds < 60.0 {
            Self::new(TimeLevel::Second, seconds.round().max(1.0))
        } else if seconds < 3_600.0 {
            Self::new(TimeLevel::Minute, (seconds / 60.0).round().max(1.0))
        } else if days < 1.0 {
            Self::new(TimeLevel::Hour, (seconds / 3_600.0).round().max(1.0))
        } else if days < 28.0 {
            Self::new(TimeLevel::Day, days.round().max(1.0))
        } else if days < DAYS_PER_YEAR {
            Self::new(TimeLevel::Month, (days / DAYS_PER_MONTH).round().max(1.0))
        } else {
            Self::new(TimeLevel::Year, (days / DAYS_PER_YEAR).round().max(1.0))
        }
    }

    #[must_use]
    pub fn span(self) -> TimeSpan {
        TimeSpan::from_ticks(self.count * self.level.unit_ticks())
    }

    #[must_use]
    pub fn ticks(self) -> f64 {
        self.span().ticks()
    }

    #[must_use]
    pub fn millis(self) -> f64 {
        self.span().total_millis()
    }

    #[must_use]
    pub fn days(self) -> f64 {
        self.span().total_days()
    }

    /// Months per step when the increment must follow the real calendar.
    #[must_use]
    pub fn calendar_months(self) -> Option<i32> {
        match self.level {
            TimeLevel::Month => Some(self.count as i32),
            TimeLevel::Year => Some((self.count * 12.0) as i32),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_calendar(self) -> bool {
        self.calendar_months().is_some()
    }
}

fn fallback_increment() -> TimeIncrement {
    TimeIncrement::new(TimeLevel::Second, 1.0)
}

/// Chooses the smallest nice increment that is at least `range`.
///
/// `format_hint` constrains the finest usable level: a date-only format such
/// as `"MMM dd"` never yields increments below one day.
#[must_use]
pub fn nice_time_span(range: TimeSpan, format_hint: Option<&str>) -> TimeIncrement {
    let ticks = range.ticks();
    if !ticks.is_finite() || ticks <= 0.0 {
        return fallback_increment();
    }

    let floor = format_hint
        .and_then(finest_format_level)
        .unwrap_or(TimeLevel::SubSecond);

    if floor <= TimeLevel::Second && ticks < 10.0 * TICKS_PER_SECOND {
        let seconds = decimal_step(ticks / TICKS_PER_SECOND);
        if seconds < 1.0 && floor == TimeLevel::SubSecond {
            return TimeIncrement::new(TimeLevel::SubSecond, seconds.max(0.001));
        }
        return TimeIncrement::new(TimeLevel::Second, seconds.max(1.0));
    }

    for level in TimeLevel::LADDER_ORDER {
        if level < floor {
            continue;
        }
        let unit = level.unit_ticks();
        for &count in level.ladder() {
            if count * unit >= ticks {
                return TimeIncrement::new(level, count);
            }
        }
    }

    let years = ticks / TimeLevel::Year.unit_ticks();
    TimeIncrement::new(TimeLevel::Year, decimal_step(years).max(100.0))
}

/// 1/2/5/10 × 10^k ceiling used for sub-second and multi-century spans.
fn decimal_step(value: f64) -> f64 {
    let exp = value.log10().floor() as i32;
    let scale = 10_f64.powi(exp);
    let mut step = scale;
    for factor in [1.0, 2.0, 5.0, 10.0] {
        step = factor * scale;
        if step >= value * (1.0 - 1e-12) {
            break;
        }
    }
    step
}

/// Finest time level referenced by a date format string, ignoring quoted
/// literals. Returns `None` for formats without time tokens.
#[must_use]
pub fn finest_format_level(format: &str) -> Option<TimeLevel> {
    let mut finest: Option<TimeLevel> = None;
    let mut quote: Option<char> = None;
    for ch in format.chars() {
        if let Some(open) = quote {
            if ch == open {
                quote = None;
            }
            continue;
        }
        let level = match ch {
            '\'' | '"' => {
                quote = Some(ch);
                continue;
            }
            'f' | 'F' => TimeLevel::SubSecond,
            's' => TimeLevel::Second,
            'm' => TimeLevel::Minute,
            'h' | 'H' => TimeLevel::Hour,
            'd' => TimeLevel::Day,
            'M' => TimeLevel::Month,
            'y' => TimeLevel::Year,
            _ => continue,
        };
        finest = Some(finest.map_or(level, |current| current.min(level)));
    }
    finest
}

/// Picks a display format from the magnitude of `max - min` (milliseconds).
#[must_use]
pub fn default_format(max_ms: f64, min_ms: f64) -> &'static str {
    let range = (max_ms - min_ms).abs();
    if !range.is_finite() {
        return "yyyy";
    }
    let days = range / MILLIS_PER_DAY;
    if days >= DAYS_PER_YEAR {
        "yyyy"
    } else if days >= 28.0 {
        "MMM yyyy"
    } else if days >= 1.0 {
        "MMM dd"
    } else if range >= 3_600_000.0 {
        "ddd HH:mm"
    } else if range >= 1_000.0 {
        "HH:mm:ss"
    } else {
        "ss.fff"
    }
}

/// Broken-down UTC calendar value with free-range fields.
///
/// Fields may temporarily leave their natural range (day 32, month 0);
/// [`CalendarFields::normalize`] carries or borrows into the next coarser
/// field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarFields {
    pub year: i32,
    pub month: i32,
    pub day: i32,
    pub hour: i32,
    pub minute: i32,
    pub second: i32,
    pub millisecond: i32,
}

impl CalendarFields {
    #[must_use]
    pub fn from_millis(value: f64) -> Option<Self> {
        let time = millis_to_datetime(value)?;
        Some(Self {
            year: time.year(),
            month: time.month() as i32,
            day: time.day() as i32,
            hour: time.hour() as i32,
            minute: time.minute() as i32,
            second: time.second() as i32,
            millisecond: (time.timestamp_subsec_millis()) as i32,
        })
    }

    pub fn normalize(&mut self) {
        carry(&mut self.millisecond, &mut self.second, 1_000);
        carry(&mut self.second, &mut self.minute, 60);
        carry(&mut self.minute, &mut self.hour, 60);
        carry(&mut self.hour, &mut self.day, 24);
        self.normalize_month();

        while self.day > days_in_month(self.year, self.month) {
            self.day -= days_in_month(self.year, self.month);
            self.month += 1;
            self.normalize_month();
        }
        while self.day < 1 {
            self.month -= 1;
            self.normalize_month();
            self.day += days_in_month(self.year, self.month);
        }
    }

    fn normalize_month(&mut self) {
        let zero_based = self.month - 1;
        self.year += zero_based.div_euclid(12);
        self.month = zero_based.rem_euclid(12) + 1;
    }

    #[must_use]
    pub fn to_millis(mut self) -> Option<f64> {
        self.normalize();
        let date = NaiveDate::from_ymd_opt(self.year, self.month as u32, self.day as u32)?;
        let time = date.and_hms_milli_opt(
            self.hour as u32,
            self.minute as u32,
            self.second as u32,
            self.millisecond as u32,
        )?;
        Some(time.and_utc().timestamp_millis() as f64)
    }
}

fn carry(value: &mut i32, next: &mut i32, radix: i32) {
    *next += value.div_euclid(radix);
    *value = value.rem_euclid(radix);
}

#[must_use]
pub fn days_in_month(year: i32, month: i32) -> i32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ => {
            let leap = (year % 4 == 0 && year % 100 != 0) || year % 400 == 0;
            if leap { 29 } else { 28 }
        }
    }
}

fn snap(value: i32, unit: i32) -> i32 {
    value.div_euclid(unit) * unit
}

/// Snaps `value_ms` down (or up) to a boundary of a unit `unit_days` long.
///
/// Non-finite inputs are returned unchanged.
#[must_use]
pub fn round_time(value_ms: f64, unit_days: f64, round_up: bool) -> f64 {
    if !value_ms.is_finite() || !unit_days.is_finite() || unit_days <= 0.0 {
        return value_ms;
    }

    let increment = TimeIncrement::from_days(unit_days);
    if increment.level == TimeLevel::SubSecond {
        let unit_ms = increment.millis().max(f64::MIN_POSITIVE);
        let snapped = (value_ms / unit_ms).floor() * unit_ms;
        return if round_up && snapped < value_ms {
            snapped + unit_ms
        } else {
            snapped
        };
    }

    let Some(fields) = CalendarFields::from_millis(value_ms) else {
        return value_ms;
    };
    let unit = increment.count as i32;
    let mut rounded = fields;
    match increment.level {
        TimeLevel::SubSecond | TimeLevel::Second => {
            rounded.millisecond = 0;
            rounded.second = snap(rounded.second, unit);
        }
        TimeLevel::Minute => {
            rounded.millisecond = 0;
            rounded.second = 0;
            rounded.minute = snap(rounded.minute, unit);
        }
        TimeLevel::Hour => {
            rounded.millisecond = 0;
            rounded.second = 0;
            rounded.minute = 0;
            rounded.hour = snap(rounded.hour, unit);
        }
        TimeLevel::Day => {
            rounded.millisecond = 0;
            rounded.second = 0;
            rounded.minute = 0;
            rounded.hour = 0;
            rounded.day = snap(rounded.day - 1, unit) + 1;
        }
        TimeLevel::Month => {
            rounded.millisecond = 0;
            rounded.second = 0;
            rounded.minute = 0;
            rounded.hour = 0;
            rounded.day = 1;
            rounded.month = snap(rounded.month - 1, unit) + 1;
        }
        TimeLevel::Year => {
            rounded.millisecond = 0;
            rounded.second = 0;
            rounded.minute = 0;
            rounded.hour = 0;
            rounded.day = 1;
            rounded.month = 1;
            rounded.year = snap(rounded.year, unit);
        }
    }

    let Some(down) = rounded.to_millis() else {
        return value_ms;
    };
    if !round_up || down >= value_ms {
        return down;
    }

    match increment.level {
        TimeLevel::SubSecond | TimeLevel::Second => rounded.second += unit,
        TimeLevel::Minute => rounded.minute += unit,
        TimeLevel::Hour => rounded.hour += unit,
        TimeLevel::Day => rounded.day += unit,
        TimeLevel::Month => rounded.month += unit,
        TimeLevel::Year => rounded.year += unit,
    }
    rounded.to_millis().unwrap_or(down)
}

/// Adds whole calendar months, clamping the day to the target month's length.
#[must_use]
pub fn add_calendar_months(value_ms: f64, months: i32) -> f64 {
    let Some(mut fields) = CalendarFields::from_millis(value_ms) else {
        return value_ms;
    };
    let day = fields.day;
    fields.day = 1;
    fields.month += months;
    fields.normalize();
    fields.day = day.min(days_in_month(fields.year, fields.month));
    fields.to_millis().unwrap_or(value_ms)
}

#[cfg(test)]
mod tests {
    use super::{
        CalendarFields, TimeLevel, TimeSpan, add_calendar_months, default_format,
        finest_format_level, nice_time_span, round_time,
    };
    use crate::core::primitives::datetime_to_millis;
    use chrono::{TimeZone, Utc};

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> f64 {
        datetime_to_millis(Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap())
    }

    #[test]
    fn ladder_picks_smallest_candidate_covering_span() {
        let inc = nice_time_span(TimeSpan::from_seconds(40.0), None);
        assert_eq!(inc.level, TimeLevel::Minute);
        assert_eq!(inc.count, 1.0);

        let inc = nice_time_span(TimeSpan::from_days(3.0), None);
        assert_eq!(inc.level, TimeLevel::Day);
        assert_eq!(inc.count, 7.0);

        let inc = nice_time_span(TimeSpan::from_days(400.0), None);
        assert_eq!(inc.level, TimeLevel::Year);
    }

    #[test]
    fn short_spans_use_decimal_scaling() {
        let inc = nice_time_span(TimeSpan::from_millis(130.0), None);
        assert_eq!(inc.level, TimeLevel::SubSecond);
        assert!((inc.count - 0.2).abs() < 1e-12);

        let inc = nice_time_span(TimeSpan::from_seconds(3.0), None);
        assert_eq!(inc.level, TimeLevel::Second);
        assert_eq!(inc.count, 5.0);
    }

    #[test]
    fn date_only_format_forbids_sub_day_steps() {
        let inc = nice_time_span(TimeSpan::from_seconds(90.0), Some("MMM dd"));
        assert_eq!(inc.level, TimeLevel::Day);
        assert_eq!(finest_format_level("'at' yyyy"), Some(TimeLevel::Year));
        assert_eq!(finest_format_level("plain"), None);
    }

    #[test]
    fn degenerate_spans_fall_back_to_one_second() {
        let inc = nice_time_span(TimeSpan::from_ticks(f64::NAN), None);
        assert_eq!(inc.level, TimeLevel::Second);
        let inc = nice_time_span(TimeSpan::from_ticks(0.0), None);
        assert_eq!(inc.count, 1.0);
    }

    #[test]
    fn default_format_follows_range_magnitude() {
        let day = 86_400_000.0;
        assert_eq!(default_format(400.0 * day, 0.0), "yyyy");
        assert_eq!(default_format(60.0 * day, 0.0), "MMM yyyy");
        assert_eq!(default_format(3.0 * day, 0.0), "MMM dd");
        assert_eq!(default_format(5.0 * 3_600_000.0, 0.0), "ddd HH:mm");
        assert_eq!(default_format(30_000.0, 0.0), "HH:mm:ss");
        assert_eq!(default_format(200.0, 0.0), "ss.fff");
    }

    #[test]
    fn round_time_snaps_down_and_up() {
        let value = utc(2024, 3, 17, 10, 42, 13);
        assert_eq!(round_time(value, 1.0, false), utc(2024, 3, 17, 0, 0, 0));
        assert_eq!(round_time(value, 1.0, true), utc(2024, 3, 18, 0, 0, 0));
        assert_eq!(
            round_time(value, 15.0 / 1_440.0, false),
            utc(2024, 3, 17, 10, 30, 0)
        );
        assert_eq!(round_time(value, 90.0, true), utc(2024, 4, 1, 0, 0, 0));
        assert_eq!(round_time(value, 365.0, false), utc(2024, 1, 1, 0, 0, 0));
    }

    #[test]
    fn round_up_on_boundary_is_identity() {
        let value = utc(2024, 1, 1, 0, 0, 0);
        assert_eq!(round_time(value, 30.0, true), value);
    }

    #[test]
    fn day_overflow_borrows_into_next_month() {
        let mut fields = CalendarFields {
            year: 2024,
            month: 1,
            day: 32,
            hour: 0,
            minute: 0,
            second: 0,
            millisecond: 0,
        };
        fields.normalize();
        assert_eq!((fields.year, fields.month, fields.day), (2024, 2, 1));

        fields.month = 13;
        fields.day = 0;
        fields.normalize();
        assert_eq!((fields.year, fields.month, fields.day), (2024, 12, 31));
    }

    #[test]
    fn calendar_months_follow_real_month_lengths() {
        let jan31 = utc(2023, 1, 31, 0, 0, 0);
        assert_eq!(add_calendar_months(jan31, 1), utc(2023, 2, 28, 0, 0, 0));
        assert_eq!(add_calendar_months(jan31, 12), utc(2024, 1, 31, 0, 0, 0));
    }
}
