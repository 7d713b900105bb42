//! Text durations such as `5m`, `1h30m` or `1.5s`.

use std::fmt;
use std::str::FromStr;
use std::time::Duration as StdDuration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::codes;
use crate::errors::RuleError;
use crate::rule::SingleRule;

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Non-negative duration rendered as `1h2m3.5s`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Duration(StdDuration);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid duration \"{0}\"")]
pub struct ParseDurationError(String);

impl Duration {
    pub const ZERO: Duration = Duration(StdDuration::ZERO);

    pub const fn from_secs(secs: u64) -> Self {
        Duration(StdDuration::from_secs(secs))
    }

    pub const fn from_mins(mins: u64) -> Self {
        Duration(StdDuration::from_secs(mins * 60))
    }

    pub const fn from_hours(hours: u64) -> Self {
        Duration(StdDuration::from_secs(hours * 3600))
    }

    pub const fn from_millis(millis: u64) -> Self {
        Duration(StdDuration::from_millis(millis))
    }

    pub fn as_std(&self) -> StdDuration {
        self.0
    }
}

impl From<StdDuration> for Duration {
    fn from(d: StdDuration) -> Self {
        Duration(d)
    }
}

impl FromStr for Duration {
    type Err = ParseDurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseDurationError(s.to_string());
        let mut rest = s.strip_prefix('+').unwrap_or(s);
        if rest == "0" {
            return Ok(Duration::ZERO);
        }
        if rest.is_empty() {
            return Err(err());
        }
        let mut total: u128 = 0;
        while !rest.is_empty() {
            let number_end = rest.find(|c: char| !(c.is_ascii_digit() || c == '.')).unwrap_or(rest.len());
            if number_end == 0 {
                return Err(err());
            }
            let number = &rest[..number_end];
            rest = &rest[number_end..];
            let unit_end = rest.find(|c: char| c.is_ascii_digit() || c == '.').unwrap_or(rest.len());
            let unit = &rest[..unit_end];
            rest = &rest[unit_end..];

            let scale: u128 = match unit {
                "ns" => 1,
                "us" | "µs" | "μs" => NANOS_PER_MICRO,
                "ms" => NANOS_PER_MILLI,
                "s" => NANOS_PER_SEC,
                "m" => 60 * NANOS_PER_SEC,
                "h" => 3600 * NANOS_PER_SEC,
                _ => return Err(err()),
            };
            let (whole, frac) = number.split_once('.').unwrap_or((number, ""));
            if whole.is_empty() && frac.is_empty() {
                return Err(err());
            }
            let whole: u128 = if whole.is_empty() { 0 } else { whole.parse().map_err(|_| err())? };
            let mut nanos = whole.checked_mul(scale).ok_or_else(err)?;
            if !frac.is_empty() {
                let frac = &frac[..frac.len().min(18)];
                let digits: u128 = frac.parse().map_err(|_| err())?;
                let frac_nanos = digits.checked_mul(scale).ok_or_else(err)? / 10u128.pow(frac.len() as u32);
                nanos = nanos.checked_add(frac_nanos).ok_or_else(err)?;
            }
            total = total.checked_add(nanos).ok_or_else(err)?;
        }
        let secs = u64::try_from(total / NANOS_PER_SEC).map_err(|_| err())?;
        Ok(Duration(StdDuration::new(secs, (total % NANOS_PER_SEC) as u32)))
    }
}

/// `value / unit` with the remainder as trimmed decimal digits.
fn write_fraction(b: &mut String, value: u128, unit: u128) {
    b.push_str(&(value / unit).to_string());
    let rem = value % unit;
    if rem != 0 {
        let width = unit.to_string().len() - 1;
        let digits = format!("{rem:0width$}");
        b.push('.');
        b.push_str(digits.trim_end_matches('0'));
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nanos = self.0.as_nanos();
        let mut b = String::new();
        if nanos == 0 {
            b.push_str("0s");
        } else if nanos < NANOS_PER_MICRO {
            b.push_str(&format!("{nanos}ns"));
        } else if nanos < NANOS_PER_MILLI {
            write_fraction(&mut b, nanos, NANOS_PER_MICRO);
            b.push_str("µs");
        } else if nanos < NANOS_PER_SEC {
            write_fraction(&mut b, nanos, NANOS_PER_MILLI);
            b.push_str("ms");
        } else {
            let secs = self.0.as_secs();
            let (hours, mins) = (secs / 3600, secs % 3600 / 60);
            if hours > 0 {
                b.push_str(&format!("{hours}h"));
            }
            if hours > 0 || mins > 0 {
                b.push_str(&format!("{mins}m"));
            }
            write_fraction(&mut b, nanos % (60 * NANOS_PER_SEC), NANOS_PER_SEC);
            b.push('s');
        }
        f.write_str(&b)
    }
}

impl Serialize for Duration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Duration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Duration must be a whole multiple of `precision`.
pub fn duration_precision(precision: Duration) -> SingleRule<Duration> {
    let message = format!("duration must be defined with {precision} precision");
    let description = message.clone();
    SingleRule::new(move |v: &Duration| {
        let unit = precision.0.as_nanos();
        if unit == 0 || v.0.as_nanos() % unit == 0 {
            Ok(())
        } else {
            Err(RuleError::new(message.clone()))
        }
    })
    .with_error_code(codes::DURATION_PRECISION)
    .with_description(description)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Rule;

    fn d(s: &str) -> Duration {
        s.parse().unwrap()
    }

    #[test]
    fn parse_units() {
        assert_eq!(d("5m"), Duration::from_mins(5));
        assert_eq!(d("1h30m"), Duration::from_mins(90));
        assert_eq!(d("1.5s"), Duration::from_millis(1500));
        assert_eq!(d("250ms"), Duration::from_millis(250));
        assert_eq!(d("0"), Duration::ZERO);
        assert_eq!(d("2us").as_std(), StdDuration::from_micros(2));
        for bad in ["", "5", "m", "5x", "-5m", "1..2s", "94522879700260684295381835.9h"] {
            assert!(bad.parse::<Duration>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn display() {
        assert_eq!(Duration::from_mins(5).to_string(), "5m0s");
        assert_eq!(Duration::from_hours(1).to_string(), "1h0m0s");
        assert_eq!(Duration::from_secs(90).to_string(), "1m30s");
        assert_eq!(Duration::from_millis(1500).to_string(), "1.5s");
        assert_eq!(Duration::from_millis(20).to_string(), "20ms");
        assert_eq!(Duration::ZERO.to_string(), "0s");
    }

    #[test]
    fn serde_as_text() {
        let json = serde_json::to_string(&Duration::from_mins(2)).unwrap();
        assert_eq!(json, r#""2m0s""#);
        let back: Duration = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Duration::from_mins(2));
    }

    #[test]
    fn precision() {
        let rule = duration_precision(Duration::from_mins(1));
        assert!(rule.validate(&Duration::from_mins(3)).is_ok());
        assert_eq!(
            rule.validate(&Duration::from_secs(61)).unwrap_err().to_string(),
            "duration must be defined with 1m0s precision"
        );
    }
}
