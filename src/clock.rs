//! Clock strings and target timestamps.
//!
//! The countdown shows its remaining time as `MM:SS`, or `H:MM:SS` once an
//! hour or more is left, and accepts new durations typed as `HH:MM:SS`.
//!
//! ```rust
//! use countdown_widget::clock::{format_clock, parse_clock};
//!
//! assert_eq!(format_clock(330), "05:30");
//! assert_eq!(format_clock(3723), "1:02:03");
//! assert_eq!(parse_clock("01:02:03").unwrap().total_seconds(), 3723);
//! ```

use crate::error::Error;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// A duration split into hours, minutes and seconds.
///
/// Minutes and seconds are not range checked: `00:90:00` is a valid clock
/// worth an hour and a half.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Clock {
    /// Whole hours.
    pub hours: u64,
    /// Minutes, usually below 60.
    pub minutes: u64,
    /// Seconds, usually below 60.
    pub seconds: u64,
}

impl Clock {
    /// Splits a number of seconds into its clock components.
    pub fn from_seconds(total: u64) -> Self {
        Self {
            hours: total / 3600,
            minutes: (total % 3600) / 60,
            seconds: total % 60,
        }
    }

    /// Total length in seconds, saturating on overflow.
    pub fn total_seconds(&self) -> u64 {
        self.hours
            .saturating_mul(3600)
            .saturating_add(self.minutes.saturating_mul(60))
            .saturating_add(self.seconds)
    }
}

impl std::fmt::Display for Clock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.hours > 0 {
            write!(f, "{}:", self.hours)?;
        }
        write!(f, "{:02}:{:02}", self.minutes, self.seconds)
    }
}

/// Formats a number of seconds for display.
///
/// The hours segment is left out while it is zero.
pub fn format_clock(seconds: u64) -> String {
    Clock::from_seconds(seconds).to_string()
}

/// Parses an `HH:MM:SS` string.
///
/// Exactly three colon separated components are required and each must be a
/// non-negative integer; whitespace around a component is ignored.
pub fn parse_clock(input: &str) -> Result<Clock, Error> {
    let invalid = || Error::InvalidClock {
        input: input.to_string(),
    };

    let mut parts = input.split(':').map(|p| p.trim().parse::<u64>());
    let (Some(Ok(hours)), Some(Ok(minutes)), Some(Ok(seconds)), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };

    Ok(Clock {
        hours,
        minutes,
        seconds,
    })
}

/// Parses a target end-timestamp.
///
/// Accepts RFC 3339, then `YYYY-MM-DDTHH:MM:SS[.f]` or `YYYY-MM-DD HH:MM:SS`
/// read as UTC, then a bare `YYYY-MM-DD` meaning midnight UTC. Blank input
/// means no target and returns `None`, as does anything unparseable.
pub fn parse_target(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(input) {
        return Some(parsed.with_timezone(&Utc));
    }

    let formats = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];
    for format in &formats {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Whole seconds from `now` until `target`, clamped at zero.
pub fn remaining_until(target: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let millis = target.signed_duration_since(now).num_milliseconds();
    if millis <= 0 {
        0
    } else {
        (millis / 1000) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(5), "00:05");
        assert_eq!(format_clock(330), "05:30");
        assert_eq!(format_clock(3599), "59:59");
        assert_eq!(format_clock(3600), "1:00:00");
        assert_eq!(format_clock(3723), "1:02:03");
        assert_eq!(format_clock(36_000), "10:00:00");
    }

    #[test]
    fn test_parse_clock() {
        assert_eq!(parse_clock("01:02:03").unwrap().total_seconds(), 3723);
        assert_eq!(parse_clock("00:00:00").unwrap().total_seconds(), 0);
        assert_eq!(parse_clock(" 0 : 90 : 0 ").unwrap().total_seconds(), 5400);
    }

    #[test]
    fn test_parse_clock_rejects_malformed() {
        for bad in ["ab:00:00", "00:00", "", "::", "1:2:3:4", "-1:00:00", "1.5:00:00"] {
            assert_eq!(
                parse_clock(bad),
                Err(Error::InvalidClock {
                    input: bad.to_string()
                }),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_round_trip_with_hours() {
        for s in [3600, 3723, 7199, 86_399, 360_000] {
            assert_eq!(parse_clock(&format_clock(s)).unwrap().total_seconds(), s);
        }
        // Without an hours segment there are only two components.
        assert!(parse_clock(&format_clock(59)).is_err());
    }

    #[test]
    fn test_parse_target_formats() {
        let expected = Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(parse_target("2030-01-02T03:04:05Z"), Some(expected));
        assert_eq!(parse_target("2030-01-02T05:04:05+02:00"), Some(expected));
        assert_eq!(parse_target("2030-01-02T03:04:05"), Some(expected));
        assert_eq!(parse_target("2030-01-02 03:04:05"), Some(expected));
        assert_eq!(
            parse_target("2030-01-02"),
            Some(Utc.with_ymd_and_hms(2030, 1, 2, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_target(""), None);
        assert_eq!(parse_target("   "), None);
        assert_eq!(parse_target("next tuesday"), None);
    }

    #[test]
    fn test_remaining_until() {
        let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(remaining_until(now + Duration::seconds(10), now), 10);
        assert_eq!(remaining_until(now + Duration::milliseconds(10_999), now), 10);
        assert_eq!(remaining_until(now + Duration::milliseconds(400), now), 0);
        assert_eq!(remaining_until(now - Duration::seconds(30), now), 0);
    }
}
