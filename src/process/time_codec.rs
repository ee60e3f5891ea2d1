use chrono::{NaiveTime, Timelike};

const SECS_PER_DAY: i64 = 24 * 60 * 60;

/// `h*60 + m + s/60`.
pub fn to_minutes(hours: u32, minutes: u32, seconds: u32) -> f64 {
    f64::from(hours) * 60.0 + f64::from(minutes) + f64::from(seconds) / 60.0
}

/// Minutes past midnight of `t`, counting whole seconds only.
pub fn time_to_minutes(t: NaiveTime) -> f64 {
    to_minutes(t.hour(), t.minute(), t.second())
}

/// Minutes past midnight of `t`, including the sub-second part.
pub fn exact_minutes(t: NaiveTime) -> f64 {
    f64::from(t.num_seconds_from_midnight()) / 60.0 + f64::from(t.nanosecond()) / 60e9
}

/// Clock time for `minutes` past midnight, rounded to the nearest second.
///
/// Rounding happens once, on the total second count, and the result is
/// split from there, so seconds and minutes always stay below 60.
/// Returns `None` when the value is negative, not finite, or rounds to a
/// full day or more.
pub fn from_minutes(minutes: f64) -> Option<NaiveTime> {
    if !minutes.is_finite() || minutes < 0.0 {
        return None;
    }
    let total = (minutes * 60.0).round();
    if total >= SECS_PER_DAY as f64 {
        return None;
    }
    NaiveTime::from_num_seconds_from_midnight_opt(total as u32, 0)
}
