//! Clock and date formatting.
//!
//! All functions here are pure given an instant; the [`Clock`] trait is the
//! only place the current time comes from, so tests can pin it.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use std::fmt;
use std::time::Duration;

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A labelled time zone shown in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Zone {
    pub label: &'static str,
    pub tz: Tz,
}

/// India Standard Time.
pub const IST: Zone = Zone {
    label: "IST",
    tz: chrono_tz::Asia::Kolkata,
};

/// New York time. Labelled EST all year, DST included.
pub const EST: Zone = Zone {
    label: "EST",
    tz: chrono_tz::America::New_York,
};

/// Format `instant` in `tz` as a zero-padded 24-hour `HH:MM:SS`.
pub fn format_time(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format("%H:%M:%S").to_string()
}

/// Format a date in en-US long form, e.g. `Saturday, October 17, 2026`.
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

/// Time until the next local midnight after `now`.
///
/// When midnight does not exist locally (a DST gap at 00:00), the first
/// valid time after it is used instead.
pub fn duration_until_next_midnight<Z: TimeZone>(now: &DateTime<Z>) -> Duration {
    let Some(tomorrow) = now.date_naive().succ_opt() else {
        return Duration::ZERO;
    };

    let zone = now.timezone();
    let next = (0..=3)
        .filter_map(|hour| tomorrow.and_hms_opt(hour, 0, 0))
        .find_map(|naive| zone.from_local_datetime(&naive).earliest());

    match next {
        Some(next) => next
            .signed_duration_since(now.clone())
            .to_std()
            .unwrap_or_default(),
        None => Duration::ZERO,
    }
}

/// The two header clocks at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockReading {
    pub ist: String,
    pub est: String,
}

impl ClockReading {
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self {
            ist: format_time(instant, IST.tz),
            est: format_time(instant, EST.tz),
        }
    }

    pub fn ist_label(&self) -> String {
        format!("{}: {}", IST.label, self.ist)
    }

    pub fn est_label(&self) -> String {
        format!("{}: {}", EST.label, self.est)
    }
}

impl fmt::Display for ClockReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  {}", self.ist_label(), self.est_label())
    }
}

/// The zone whose calendar date the header shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocalZone {
    /// The machine's configured zone.
    #[default]
    System,
    Named(Tz),
}

impl LocalZone {
    /// Long-form local date at `instant`.
    pub fn long_date(&self, instant: DateTime<Utc>) -> String {
        match self {
            LocalZone::System => format_long_date(instant.with_timezone(&chrono::Local).date_naive()),
            LocalZone::Named(tz) => format_long_date(instant.with_timezone(tz).date_naive()),
        }
    }

    /// Time from `instant` until the next local midnight.
    pub fn until_next_midnight(&self, instant: DateTime<Utc>) -> Duration {
        match self {
            LocalZone::System => duration_until_next_midnight(&instant.with_timezone(&chrono::Local)),
            LocalZone::Named(tz) => duration_until_next_midnight(&instant.with_timezone(tz)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_format_time_two_zones() {
        // 06:30 UTC in January: IST is +5:30, New York is -5:00
        let reading = ClockReading::at(utc("2026-01-15T06:30:05Z"));
        assert_eq!(reading.ist, "12:00:05");
        assert_eq!(reading.est, "01:30:05");
        assert_eq!(reading.ist_label(), "IST: 12:00:05");
        assert_eq!(reading.est_label(), "EST: 01:30:05");
    }

    #[test]
    fn test_new_york_observes_dst() {
        // July: New York is -4:00
        let reading = ClockReading::at(utc("2026-07-04T16:00:00Z"));
        assert_eq!(reading.est, "12:00:00");
        assert_eq!(reading.ist, "21:30:00");
    }

    #[test]
    fn test_hours_are_24h_and_padded() {
        assert_eq!(format_time(utc("2026-03-01T23:04:09Z"), chrono_tz::UTC), "23:04:09");
        assert_eq!(format_time(utc("2026-03-01T00:00:00Z"), chrono_tz::UTC), "00:00:00");
    }

    #[test]
    fn test_long_date() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        assert_eq!(format_long_date(date), "Saturday, October 17, 2026");

        let date = NaiveDate::from_ymd_opt(2027, 1, 3).unwrap();
        assert_eq!(format_long_date(date), "Sunday, January 3, 2027");
    }

    #[test]
    fn test_named_zone_date_differs_from_utc() {
        let instant = utc("2026-10-17T20:00:00Z");
        assert_eq!(
            LocalZone::Named(chrono_tz::Asia::Kolkata).long_date(instant),
            "Sunday, October 18, 2026"
        );
        assert_eq!(
            LocalZone::Named(chrono_tz::UTC).long_date(instant),
            "Saturday, October 17, 2026"
        );
    }

    #[test]
    fn test_until_next_midnight() {
        let zone = LocalZone::Named(chrono_tz::UTC);
        assert_eq!(
            zone.until_next_midnight(utc("2026-10-17T23:59:58Z")),
            Duration::from_secs(2)
        );
        // Exactly at midnight the next one is a full day away
        assert_eq!(
            zone.until_next_midnight(utc("2026-10-18T00:00:00Z")),
            Duration::from_secs(86_400)
        );
    }

    #[test]
    fn test_until_next_midnight_across_dst_change() {
        // New York falls back on 2026-11-01, so that day is 25 hours long
        let zone = LocalZone::Named(chrono_tz::America::New_York);
        let local_midnight = utc("2026-11-01T04:00:00Z");
        assert_eq!(
            zone.until_next_midnight(local_midnight),
            Duration::from_secs(25 * 3600)
        );
    }

    #[test]
    fn test_midnight_gap_uses_first_valid_time() {
        // Santiago springs forward at local midnight; 2026-09-06 00:00 does not exist
        let zone = LocalZone::Named(chrono_tz::America::Santiago);
        let evening = utc("2026-09-06T03:00:00Z"); // 23:00 local on the 5th
        let wait = zone.until_next_midnight(evening);
        assert_eq!(wait, Duration::from_secs(3600));
    }
}
