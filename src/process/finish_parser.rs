use chrono::{NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

/// `H:MM`, `H:MM:SS` or `H:MM:SS.fff`, hours as one or two digits.
static CLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2}):(\d{2})(?::(\d{2})(?:\.(\d{1,9}))?)?$").expect("clock regex")
});

const TWELVE_HOUR_FORMATS: &[&str] = &["%I:%M:%S %p", "%I:%M %p"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

fn parse_clock(s: &str) -> Option<NaiveTime> {
    let caps = CLOCK.captures(s)?;
    let hour: u32 = caps[1].parse().ok()?;
    let min: u32 = caps[2].parse().ok()?;
    let sec: u32 = caps.get(3).map_or(Some(0), |m| m.as_str().parse().ok())?;
    let nanos: u32 = match caps.get(4) {
        // right-pad the fraction to nine digits
        Some(frac) => format!("{:0<9}", frac.as_str()).parse().ok()?,
        None => 0,
    };
    NaiveTime::from_hms_nano_opt(hour, min, sec, nanos)
}

/// Infer a clock time from a raw finish string.
///
/// Accepts bare clock times (24-hour, optionally with fractional seconds),
/// 12-hour times with AM/PM, and full date-times whose date part is dropped.
/// Returns `None` for anything else, including hours past 23.
pub fn parse_finish(raw: &str) -> Option<NaiveTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(t) = parse_clock(s) {
        return Some(t);
    }

    TWELVE_HOUR_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.time())
        })
}
