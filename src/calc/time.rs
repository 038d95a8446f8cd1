use crate::model::timecard::TimePunch;

const MINUTES_PER_DAY: u32 = 24 * 60;

fn all_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

/// Minutes since midnight of a 24-hour "HH:MM" wall-clock string.
pub fn to_minutes(value: &str) -> Option<u32> {
    let (h, m) = value.trim().split_once(':')?;
    if !all_digits(h) || !all_digits(m) || h.len() > 2 || m.len() != 2 {
        return None;
    }
    let h: u32 = h.parse().ok()?;
    let m: u32 = m.parse().ok()?;
    (h < 24 && m < 60).then_some(h * 60 + m)
}

pub fn is_wall_clock(value: &str) -> bool {
    to_minutes(value).is_some()
}

/// True for "HH:MM" durations (hours unbounded) or plain decimal hours.
pub fn is_duration(value: &str) -> bool {
    let value = value.trim();
    match value.split_once(':') {
        Some((h, m)) => {
            all_digits(h)
                && h.parse::<u32>().is_ok()
                && all_digits(m)
                && m.len() == 2
                && m.parse::<u32>().is_ok_and(|m| m < 60)
        }
        None => {
            value.bytes().all(|b| b.is_ascii_digit() || b == b'.')
                && value.parse::<f64>().is_ok_and(|v| v.is_finite() && v >= 0.0)
        }
    }
}

/// Decimal hours of an "HH:MM" string or a bare number of hours.
///
/// Empty and unparseable input count as zero hours.
pub fn to_hours(value: &str) -> f64 {
    let value = value.trim();
    if value.is_empty() {
        return 0.0;
    }

    match value.split_once(':') {
        Some((h, m)) => match (h.parse::<u32>(), m.parse::<u32>()) {
            (Ok(h), Ok(m)) => h as f64 + m as f64 / 60.0,
            _ => 0.0,
        },
        None => value
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .unwrap_or(0.0),
    }
}

/// Minutes from `start` to `end`, treating an earlier `end` as the next day.
pub fn span_minutes(start: u32, end: u32) -> u32 {
    if end < start {
        end + MINUTES_PER_DAY - start
    } else {
        end - start
    }
}

/// Lunch length in minutes; zero unless both lunch punches are present.
pub fn lunch_minutes(punch: &TimePunch) -> u32 {
    match (to_minutes(&punch.lunch_out), to_minutes(&punch.lunch_in)) {
        (Some(out), Some(back)) => span_minutes(out, back),
        _ => 0,
    }
}

/// Hours worked for one punch, after lunch, the fixed break and permission.
///
/// A missing login or logout yields zero. Never negative.
pub fn hours_worked(punch: &TimePunch, break_minutes: f64) -> f64 {
    let (Some(login), Some(logout)) = (to_minutes(&punch.log_in), to_minutes(&punch.log_out))
    else {
        return 0.0;
    };

    let minutes = span_minutes(login, logout) as f64
        - lunch_minutes(punch) as f64
        - break_minutes
        - to_hours(&punch.permission) * 60.0;

    minutes.max(0.0) / 60.0
}
