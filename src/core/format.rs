//! Label formatting for numeric and date axis values.
//!
//! Numeric formats follow the short .NET-style specifiers used by chart
//! configuration files: `n2` (grouped, two decimals), `f1` (fixed), `p0`
//! (percent), `d3` (zero padded integer), `e2` (exponential), `c2`
//! (currency), `g` (general). Date formats use the `yyyy-MM-dd HH:mm:ss.fff`
//! token family with quoted literals.

use chrono::{DateTime, Datelike, Timelike, Utc};

use crate::core::primitives::millis_to_datetime;

/// Formats `value` with a numeric specifier. Unknown specifiers fall back to
/// the shortest round-trip representation.
#[must_use]
pub fn format_number(value: f64, format: &str) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let mut chars = format.chars();
    let Some(kind) = chars.next() else {
        return general(value);
    };
    let digits_text: String = chars.collect();
    let digits = if digits_text.is_empty() {
        None
    } else {
        match digits_text.parse::<usize>() {
            Ok(digits) => Some(digits.min(20)),
            Err(_) => return general(value),
        }
    };

    match kind.to_ascii_lowercase() {
        'n' => group_thousands(&fixed(value, digits.unwrap_or(2))),
        'f' => fixed(value, digits.unwrap_or(2)),
        'p' => format!("{}%", group_thousands(&fixed(value * 100.0, digits.unwrap_or(2)))),
        'c' => {
            let body = group_thousands(&fixed(value.abs(), digits.unwrap_or(2)));
            if value < 0.0 {
                format!("-${body}")
            } else {
                format!("${body}")
            }
        }
        'd' => {
            let rounded = value.round();
            let magnitude = format!("{:0width$}", rounded.abs() as i64, width = digits.unwrap_or(0));
            if rounded < 0.0 {
                format!("-{magnitude}")
            } else {
                magnitude
            }
        }
        'e' => {
            let text = format!("{:.*e}", digits.unwrap_or(6), value);
            if kind.is_ascii_uppercase() {
                text.to_uppercase()
            } else {
                text
            }
        }
        'g' => match digits {
            Some(digits) if digits > 0 => general(significant(value, digits)),
            _ => general(value),
        },
        _ => general(value),
    }
}

fn fixed(value: f64, digits: usize) -> String {
    let text = format!("{value:.digits$}");
    // "-0.00" reads as noise on an axis.
    if text.starts_with('-') && text[1..].chars().all(|ch| ch == '0' || ch == '.') {
        text[1..].to_owned()
    } else {
        text
    }
}

fn general(value: f64) -> String {
    if value == 0.0 {
        return "0".to_owned();
    }
    value.to_string()
}

fn significant(value: f64, digits: usize) -> f64 {
    if value == 0.0 {
        return 0.0;
    }
    let magnitude = value.abs().log10().floor() as i32;
    let scale = 10_f64.powi(digits as i32 - 1 - magnitude);
    (value * scale).round() / scale
}

fn group_thousands(text: &str) -> String {
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (index, ch) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match fraction {
        Some(fraction) => format!("{sign}{grouped}.{fraction}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Formats a date given as milliseconds since the Unix epoch.
#[must_use]
pub fn format_date(millis: f64, format: &str) -> String {
    let Some(time) = millis_to_datetime(millis) else {
        return String::new();
    };
    format_datetime(time, format)
}

#[must_use]
pub fn format_datetime(time: DateTime<Utc>, format: &str) -> String {
    let chars: Vec<char> = format.chars().collect();
    let mut out = String::with_capacity(format.len() + 8);
    let mut index = 0;
    while index < chars.len() {
        let ch = chars[index];
        if ch == '\'' || ch == '"' {
            index += 1;
            while index < chars.len() && chars[index] != ch {
                out.push(chars[index]);
                index += 1;
            }
            index += 1;
            continue;
        }
        if ch == '\\' && index + 1 < chars.len() {
            out.push(chars[index + 1]);
            index += 2;
            continue;
        }

        let mut run = 1;
        while index + run < chars.len() && chars[index + run] == ch {
            run += 1;
        }
        match token(time, ch, run) {
            Some(text) => out.push_str(&text),
            None => out.extend(std::iter::repeat_n(ch, run)),
        }
        index += run;
    }
    out
}

fn token(time: DateTime<Utc>, ch: char, run: usize) -> Option<String> {
    let text = match (ch, run) {
        ('y', 1) => (time.year() % 100).to_string(),
        ('y', 2) => format!("{:02}", time.year().rem_euclid(100)),
        ('y', _) => format!("{:0run$}", time.year()),
        ('M', 1) => time.month().to_string(),
        ('M', 2) => format!("{:02}", time.month()),
        ('M', 3) => time.format("%b").to_string(),
        ('M', _) => time.format("%B").to_string(),
        ('d', 1) => time.day().to_string(),
        ('d', 2) => format!("{:02}", time.day()),
        ('d', 3) => time.format("%a").to_string(),
        ('d', _) => time.format("%A").to_string(),
        ('H', 1) => time.hour().to_string(),
        ('H', _) => format!("{:02}", time.hour()),
        ('h', 1) => time.hour12().1.to_string(),
        ('h', _) => format!("{:02}", time.hour12().1),
        ('m', 1) => time.minute().to_string(),
        ('m', _) => format!("{:02}", time.minute()),
        ('s', 1) => time.second().to_string(),
        ('s', _) => format!("{:02}", time.second()),
        ('f', run) => {
            let millis = format!("{:03}", time.timestamp_subsec_millis());
            millis[..run.min(3)].to_owned()
        }
        ('t', 1) => time.format("%p").to_string()[..1].to_owned(),
        ('t', _) => time.format("%p").to_string(),
        _ => return None,
    };
    Some(text)
}
