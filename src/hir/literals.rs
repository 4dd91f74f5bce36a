//! Parsers for CSDL constant literals.
//!
//! Every parser returns `None` for malformed text; the caller turns that into
//! a malformed-value error on the constant.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};

/// `Edm.Duration` (day-time duration).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Duration {
    pub negative: bool,
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub nanoseconds: u32,
}

pub fn parse_bool(text: &str) -> Option<bool> {
    match text.trim() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

pub fn parse_int(text: &str) -> Option<i64> {
    text.trim().parse().ok()
}

/// Decimal literal: optional sign, digits, optional fraction. Kept as text.
pub fn parse_decimal(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    let unsigned = trimmed
        .strip_prefix('-')
        .or_else(|| trimmed.strip_prefix('+'))
        .unwrap_or(trimmed);
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (unsigned, None),
    };
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    (digits(whole) && fraction.is_none_or(digits)).then_some(trimmed)
}

/// Double literal, including `INF`, `-INF` and `NaN`.
pub fn parse_float(text: &str) -> Option<f64> {
    match text.trim() {
        "INF" => Some(f64::INFINITY),
        "-INF" => Some(f64::NEG_INFINITY),
        "NaN" => Some(f64::NAN),
        other if other.eq_ignore_ascii_case("inf")
            || other.eq_ignore_ascii_case("-inf")
            || other.eq_ignore_ascii_case("infinity")
            || other.eq_ignore_ascii_case("nan") =>
        {
            None
        }
        other => other.parse().ok(),
    }
}

/// `8-4-4-4-12` hexadecimal GUID.
pub fn parse_guid(text: &str) -> Option<uuid::Uuid> {
    let trimmed = text.trim();
    if trimmed.len() != 36 {
        return None;
    }
    uuid::Uuid::try_parse(trimmed).ok()
}

/// Base64 (either alphabet), padding optional.
pub fn parse_binary(text: &str) -> Option<Vec<u8>> {
    let trimmed = text.trim().trim_end_matches('=');
    let mut bytes = Vec::with_capacity(trimmed.len() * 3 / 4);
    let mut buffer = 0u32;
    let mut bits = 0u32;
    for c in trimmed.bytes() {
        let value = match c {
            b'A'..=b'Z' => c - b'A',
            b'a'..=b'z' => c - b'a' + 26,
            b'0'..=b'9' => c - b'0' + 52,
            b'+' | b'-' => 62,
            b'/' | b'_' => 63,
            _ => return None,
        };
        buffer = (buffer << 6) | u32::from(value);
        bits += 6;
        if bits >= 8 {
            bits -= 8;
            bytes.push((buffer >> bits) as u8);
            buffer &= (1 << bits) - 1;
        }
    }
    // A single leftover sextet cannot encode a byte.
    if bits >= 6 {
        return None;
    }
    Some(bytes)
}

/// `Edm.Date`: `YYYY-MM-DD`, year with at least four digits and an optional
/// sign.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let mut parts = rest.splitn(3, '-');
    let year_text = parts.next()?;
    let month_text = parts.next()?;
    let day_text = parts.next()?;
    if year_text.len() < 4 || month_text.len() != 2 || day_text.len() != 2 {
        return None;
    }
    let year: i32 = digits_value(year_text)?.try_into().ok()?;
    let year = if negative { -year } else { year };
    let month = u32::try_from(digits_value(month_text)?).ok()?;
    let day = u32::try_from(digits_value(day_text)?).ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// `Edm.TimeOfDay`: `hh:mm[:ss[.fraction]]`
pub fn parse_time_of_day(text: &str) -> Option<NaiveTime> {
    let trimmed = text.trim();
    let mut parts = trimmed.split(':');
    let hour_text = parts.next()?;
    let minute_text = parts.next()?;
    let second_text = parts.next();
    if parts.next().is_some() || hour_text.len() != 2 || minute_text.len() != 2 {
        return None;
    }
    let hour = u32::try_from(digits_value(hour_text)?).ok()?;
    let minute = u32::try_from(digits_value(minute_text)?).ok()?;
    let (second, nanosecond) = match second_text {
        None => (0, 0),
        Some(text) => {
            let (whole, fraction) = match text.split_once('.') {
                Some((whole, fraction)) => (whole, Some(fraction)),
                None => (text, None),
            };
            if whole.len() != 2 {
                return None;
            }
            let second = u32::try_from(digits_value(whole)?).ok()?;
            let nanosecond = match fraction {
                Some(fraction) => parse_fraction(fraction)?,
                None => 0,
            };
            (second, nanosecond)
        }
    };
    NaiveTime::from_hms_nano_opt(hour, minute, second, nanosecond)
}

/// `Edm.DateTimeOffset`: `date 'T' time (Z | ±hh:mm)`. Seconds are optional,
/// so RFC 3339 parsing alone is too strict.
pub fn parse_date_time_offset(text: &str) -> Option<DateTime<FixedOffset>> {
    let trimmed = text.trim();
    if let Ok(value) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(value);
    }
    let (date_text, rest) = trimmed.split_once('T')?;
    let date = parse_date(date_text)?;

    let (time_text, offset_seconds) = if let Some(time) = rest.strip_suffix('Z') {
        (time, 0)
    } else {
        let split = rest.rfind(['+', '-'])?;
        let (time, offset) = rest.split_at(split);
        let sign = if offset.starts_with('-') { -1 } else { 1 };
        let (hours, minutes) = offset[1..].split_once(':')?;
        if hours.len() != 2 || minutes.len() != 2 {
            return None;
        }
        let hours = i32::try_from(digits_value(hours)?).ok()?;
        let minutes = i32::try_from(digits_value(minutes)?).ok()?;
        if hours > 14 || minutes > 59 {
            return None;
        }
        (time, sign * (hours * 3600 + minutes * 60))
    };
    let time = parse_time_of_day(time_text)?;
    let offset = FixedOffset::east_opt(offset_seconds)?;
    date.and_time(time).and_local_timezone(offset).single()
}

/// `[-]P[nD][T[nH][nM][n[.n]S]]` with at least one component.
pub fn parse_duration(text: &str) -> Option<Duration> {
    let trimmed = text.trim();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let rest = rest.strip_prefix('P')?;
    let (day_part, time_part) = match rest.split_once('T') {
        Some((days, time)) => (days, Some(time)),
        None => (rest, None),
    };

    let mut duration = Duration {
        negative,
        ..Duration::default()
    };
    let mut components = 0;

    if !day_part.is_empty() {
        duration.days = digits_value(day_part.strip_suffix('D')?)?;
        components += 1;
    }

    if let Some(mut time) = time_part {
        if time.is_empty() {
            return None;
        }
        if let Some((hours, rest)) = time.split_once('H') {
            duration.hours = digits_value(hours)?;
            components += 1;
            time = rest;
        }
        if let Some((minutes, rest)) = time.split_once('M') {
            duration.minutes = digits_value(minutes)?;
            components += 1;
            time = rest;
        }
        if !time.is_empty() {
            let seconds = time.strip_suffix('S')?;
            let (whole, fraction) = match seconds.split_once('.') {
                Some((whole, fraction)) => (whole, Some(fraction)),
                None => (seconds, None),
            };
            duration.seconds = digits_value(whole)?;
            if let Some(fraction) = fraction {
                duration.nanoseconds = parse_fraction(fraction)?;
            }
            components += 1;
        }
    }

    (components > 0).then_some(duration)
}

fn digits_value(text: &str) -> Option<u64> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Up to nine fractional digits as nanoseconds.
fn parse_fraction(text: &str) -> Option<u32> {
    if text.is_empty() || text.len() > 9 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let padded = format!("{text:0<9}");
    padded.parse().ok()
}
