use std::{fmt::Display, ops::Sub};

use chrono::NaiveDate;

/// Wall clock time of day, minute precision (`HH:MM`, 24 hour).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct ClockTime(u16);

impl Sub<ClockTime> for ClockTime {
    type Output = i32;

    /// Signed difference in minutes.
    fn sub(self, rhs: Self) -> Self::Output {
        self.0 as i32 - rhs.0 as i32
    }
}

impl Display for ClockTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hm_string())
    }
}

impl ClockTime {
    pub const MAX_MINUTES: u16 = 24 * 60;

    pub const fn from_minutes(minutes: u16) -> Option<Self> {
        if minutes < Self::MAX_MINUTES {
            Some(Self(minutes))
        } else {
            None
        }
    }

    pub const fn as_minutes(&self) -> u16 {
        self.0
    }

    pub fn to_hm_string(&self) -> String {
        let h = self.0 / 60;
        let m = self.0 % 60;
        format!("{:02}:{:02}", h, m)
    }

    /// Strict `HH:MM` parsing, the only format accepted from the editors.
    pub fn from_hm(time: &str) -> Option<Self> {
        let mut split = time.split(':');
        let hours = parse_two_digits(split.next()?)?;
        let minutes = parse_two_digits(split.next()?)?;
        if split.next().is_some() || hours > 23 || minutes > 59 {
            return None;
        }
        Some(Self(hours * 60 + minutes))
    }

    /// Accepts `HH:MM` or `HH:MM:SS`, as returned by the backend. Seconds are dropped.
    pub fn from_backend(time: &str) -> Option<Self> {
        match time.len() {
            5 => Self::from_hm(time),
            8 => {
                let (hm, seconds) = time.split_at_checked(5)?;
                let seconds = seconds.strip_prefix(':')?;
                parse_two_digits(seconds).filter(|s| *s < 60)?;
                Self::from_hm(hm)
            }
            _ => None,
        }
    }
}

fn parse_two_digits(value: &str) -> Option<u16> {
    if value.len() != 2 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

/// Normalises a backend time string to the `HH:MM` form used in the workspace.
/// Values that do not parse are kept as-is so the validator can report them.
pub fn normalize_time(time: &str) -> String {
    ClockTime::from_backend(time)
        .map(|t| t.to_hm_string())
        .unwrap_or_else(|| time.to_string())
}

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date, DATE_FORMAT).ok()
}

#[test]
fn parse_unparse_1() {
    let time = "00:00";
    let stime = ClockTime::from_hm(time).unwrap();
    assert_eq!(time, stime.to_hm_string())
}

#[test]
fn parse_unparse_2() {
    let time = "23:59";
    let stime = ClockTime::from_hm(time).unwrap();
    assert_eq!(time, stime.to_hm_string())
}

#[test]
fn parse_unparse_3() {
    let time = "07:05";
    let stime = ClockTime::from_hm(time).unwrap();
    assert_eq!(time, stime.to_hm_string())
}

#[test]
fn valid_time_test_1() {
    assert_eq!(ClockTime::from_hm("01:30").unwrap().as_minutes(), 90);
}

#[test]
fn valid_time_test_2() {
    assert_eq!(ClockTime::from_hm("12:00").unwrap().as_minutes(), 720);
}

#[test]
fn invalid_time_test_1() {
    assert!(ClockTime::from_hm("24:00").is_none())
}

#[test]
fn invalid_time_test_2() {
    assert!(ClockTime::from_hm("7:30").is_none())
}

#[test]
fn invalid_time_test_3() {
    assert!(ClockTime::from_hm("12:60").is_none())
}

#[test]
fn invalid_time_test_4() {
    assert!(ClockTime::from_hm("12:00:00").is_none())
}

#[test]
fn invalid_time_test_5() {
    assert!(ClockTime::from_hm("ab:cd").is_none())
}

#[test]
fn backend_time_test() {
    assert_eq!(normalize_time("08:15:00"), "08:15");
    assert_eq!(normalize_time("08:15"), "08:15");
    assert_eq!(normalize_time("8.15"), "8.15");
}

#[test]
fn difference_test() {
    let a = ClockTime::from_hm("10:00").unwrap();
    let b = ClockTime::from_hm("09:45").unwrap();
    assert_eq!(a - b, 15);
    assert_eq!(b - a, -15);
}

#[test]
fn from_minutes_rejects_end_of_day() {
    assert_eq!(
        ClockTime::from_minutes(90).map(|t| t.to_string()),
        Some("01:30".to_string())
    );
    assert_eq!(ClockTime::from_minutes(ClockTime::MAX_MINUTES), None);
}

#[test]
fn backend_time_with_multibyte_char_is_rejected() {
    assert!(ClockTime::from_backend("0000é:0").is_none());
    assert_eq!(normalize_time("0000é:0"), "0000é:0");
    assert_eq!(normalize_time("07:05:30"), "07:05");
}
