// hn-core/src/units.rs

use uom::si::f64::Time as UomTime;
use uom::si::time::{day, hour, minute, second};

use crate::numeric::{Real, parse_real};

pub type Time = UomTime;

#[inline]
pub fn s(v: f64) -> Time {
    Time::new::<second>(v)
}

#[inline]
pub fn minutes(v: f64) -> Time {
    Time::new::<minute>(v)
}

#[inline]
pub fn hours(v: f64) -> Time {
    Time::new::<hour>(v)
}

#[inline]
pub fn days(v: f64) -> Time {
    Time::new::<day>(v)
}

#[inline]
pub fn as_seconds(t: Time) -> Real {
    t.get::<second>()
}

/// Unit keyword that may follow a numeric time value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word.to_ascii_uppercase().as_str() {
            "SEC" | "SECS" | "SECOND" | "SECONDS" => Some(TimeUnit::Seconds),
            "MIN" | "MINS" | "MINUTE" | "MINUTES" => Some(TimeUnit::Minutes),
            "HR" | "HRS" | "HOUR" | "HOURS" => Some(TimeUnit::Hours),
            "DAY" | "DAYS" => Some(TimeUnit::Days),
            _ => None,
        }
    }

    pub fn quantity(self, v: Real) -> Time {
        match self {
            TimeUnit::Seconds => s(v),
            TimeUnit::Minutes => minutes(v),
            TimeUnit::Hours => hours(v),
            TimeUnit::Days => days(v),
        }
    }
}

/// Parse a duration written as `h`, `h:mm`, `h:mm:ss`, or a number followed
/// by an optional unit keyword (hours when absent).
pub fn parse_duration(value: &str, unit: Option<&str>) -> Option<Time> {
    if value.contains(':') {
        if unit.is_some() {
            return None;
        }
        let parts: Vec<&str> = value.split(':').collect();
        if parts.len() > 3 {
            return None;
        }
        let mut total = s(0.0);
        let scales = [hours(1.0), minutes(1.0), s(1.0)];
        for (part, scale) in parts.iter().zip(scales) {
            let v = parse_real(part)?;
            if v < 0.0 {
                return None;
            }
            total += scale * v;
        }
        return Some(total);
    }

    let v = parse_real(value)?;
    let unit = match unit {
        Some(word) => TimeUnit::from_keyword(word)?,
        None => TimeUnit::Hours,
    };
    Some(unit.quantity(v))
}
