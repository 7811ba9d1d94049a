//! Wall-clock text for the first line

use chrono::{Datelike, Local, NaiveDateTime, Timelike};

/// Sensor refresh period in seconds of wall-clock time
pub const LEAP_SECONDS: u32 = 20;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Source of the current local time
pub trait WallClock {
    /// Current local date and time
    fn now(&self) -> NaiveDateTime;
}

/// The system clock in the local time zone
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalClock;

impl WallClock for LocalClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Render `"<Mon> <dd>, <HH>:<MM>:<SS>"`, exactly 16 characters
///
/// Month names are fixed English abbreviations regardless of locale.
///
/// ```
/// use chrono::NaiveDate;
/// use lcdclock::clock::format_clock;
///
/// let time = NaiveDate::from_ymd_opt(2024, 3, 5)
///     .and_then(|date| date.and_hms_opt(7, 8, 9))
///     .unwrap();
/// assert_eq!(format_clock(&time), "Mar 05, 07:08:09");
/// ```
pub fn format_clock(time: &NaiveDateTime) -> String {
    format!(
        "{} {:02}, {:02}:{:02}:{:02}",
        MONTHS[time.month0() as usize],
        time.day(),
        time.hour(),
        time.minute(),
        time.second()
    )
}

/// Whether the sensor should be re-queried at this second
pub fn is_leap_second(second: u32) -> bool {
    second % LEAP_SECONDS == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(month: u32, day: u32, hour: u32, min: u32, sec: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2016, month, day)
            .and_then(|date| date.and_hms_opt(hour, min, sec))
            .unwrap()
    }

    #[test]
    fn test_format_clock_pads_fields() {
        assert_eq!(format_clock(&at(3, 5, 7, 8, 9)), "Mar 05, 07:08:09");
    }

    #[test]
    fn test_format_clock_month_names() {
        assert_eq!(format_clock(&at(1, 31, 23, 59, 59)), "Jan 31, 23:59:59");
        assert_eq!(format_clock(&at(12, 1, 0, 0, 0)), "Dec 01, 00:00:00");
        for month in 1..=12 {
            assert_eq!(format_clock(&at(month, 10, 12, 30, 45)).len(), 16);
        }
    }

    #[test]
    fn test_leap_second_every_twenty() {
        for second in 0..60 {
            assert_eq!(is_leap_second(second), matches!(second, 0 | 20 | 40));
        }
    }

    #[test]
    fn test_local_clock_is_callable() {
        let now = LocalClock.now();
        assert!(now.second() < 61);
    }
}
