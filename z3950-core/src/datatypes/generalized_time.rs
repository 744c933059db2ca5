//! GeneralizedTime value type
//!
//! Accepted text form (ASCII):
//!
//! ```text
//! YYYYMMDDHH[MM[SS]][(.|,)fraction][Z|(+|-)hhmm]
//! ```
//!
//! No offset means local time, `Z` means UTC. A seconds value of `60` is
//! accepted for a positive leap second.

use crate::error::{CoreError, CoreResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

static GENERALIZED_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^([0-9]{4})([0-9]{2})([0-9]{2})([0-9]{2})(?:([0-9]{2})([0-9]{2})?)?(?:[.,]([0-9]+))?(Z|[+-][0-9]{4})?$",
    )
    .expect("static GeneralizedTime pattern")
});

/// Validated ASN.1 GeneralizedTime
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GeneralizedTime {
    text: String,
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: Option<u8>,
    second: Option<u8>,
}

impl GeneralizedTime {
    /// Parse and validate GeneralizedTime text
    ///
    /// # Errors
    /// Returns `CoreError::InvalidGeneralizedTime` if the text does not match
    /// the calendar format or a field is out of range.
    pub fn parse(text: &str) -> CoreResult<Self> {
        let invalid = |reason: &str| {
            CoreError::InvalidGeneralizedTime(format!("'{}': {}", text, reason))
        };

        let caps = GENERALIZED_TIME
            .captures(text)
            .ok_or_else(|| invalid("does not match YYYYMMDDHH[MM[SS]][.f][Z|+hhmm]"))?;

        // Regex groups are all ASCII digits of bounded width
        let number = |index: usize| caps.get(index).map(|m| m.as_str().parse::<u16>().unwrap_or(0));

        let year = number(1).unwrap_or(0);
        let month = number(2).unwrap_or(0) as u8;
        let day = number(3).unwrap_or(0) as u8;
        let hour = number(4).unwrap_or(0) as u8;
        let minute = number(5).map(|m| m as u8);
        let second = number(6).map(|s| s as u8);

        if !(1..=12).contains(&month) {
            return Err(invalid("month out of range"));
        }
        if day == 0 || day > days_in_month(year, month) {
            return Err(invalid("day out of range"));
        }
        if hour > 23 {
            return Err(invalid("hour out of range"));
        }
        if minute.is_some_and(|m| m > 59) {
            return Err(invalid("minute out of range"));
        }
        if second.is_some_and(|s| s > 60) {
            return Err(invalid("second out of range"));
        }
        if let Some(offset) = caps.get(8).map(|m| m.as_str()).filter(|o| *o != "Z") {
            let hh: u8 = offset[1..3].parse().unwrap_or(99);
            let mm: u8 = offset[3..5].parse().unwrap_or(99);
            if hh > 23 || mm > 59 {
                return Err(invalid("UTC offset out of range"));
            }
        }

        Ok(Self {
            text: text.to_string(),
            year,
            month,
            day,
            hour,
            minute,
            second,
        })
    }

    /// Build a UTC time with second precision (`YYYYMMDDHHMMSSZ`)
    pub fn utc(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> CoreResult<Self> {
        Self::parse(&format!(
            "{:04}{:02}{:02}{:02}{:02}{:02}Z",
            year, month, day, hour, minute, second
        ))
    }

    /// The textual form as carried on the wire
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> Option<u8> {
        self.minute
    }

    pub fn second(&self) -> Option<u8> {
        self.second
    }

    /// Whether the time carries the `Z` suffix
    pub fn is_utc(&self) -> bool {
        self.text.ends_with('Z')
    }
}

fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 => 29,
        2 => 28,
        _ => 31,
    }
}

impl FromStr for GeneralizedTime {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for GeneralizedTime {
    type Error = CoreError;

    fn try_from(text: String) -> CoreResult<Self> {
        Self::parse(&text)
    }
}

impl From<GeneralizedTime> for String {
    fn from(time: GeneralizedTime) -> Self {
        time.text
    }
}

impl fmt::Display for GeneralizedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_utc() {
        let time = GeneralizedTime::parse("19851106210627.3Z").unwrap();
        assert_eq!(time.year(), 1985);
        assert_eq!(time.month(), 11);
        assert_eq!(time.day(), 6);
        assert_eq!(time.hour(), 21);
        assert_eq!(time.minute(), Some(6));
        assert_eq!(time.second(), Some(27));
        assert!(time.is_utc());
    }

    #[test]
    fn test_parse_hour_only_with_offset() {
        let time = GeneralizedTime::parse("2024022912-0500").unwrap();
        assert_eq!(time.minute(), None);
        assert!(!time.is_utc());
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(GeneralizedTime::parse("20230229120000Z").is_err()); // not a leap year
        assert!(GeneralizedTime::parse("20231301000000Z").is_err());
        assert!(GeneralizedTime::parse("20230101240000Z").is_err());
        assert!(GeneralizedTime::parse("20230101126000Z").is_err());
        assert!(GeneralizedTime::parse("20230101120000+2500").is_err());
        assert!(GeneralizedTime::parse("2023-01-01").is_err());
        assert!(GeneralizedTime::parse("").is_err());
    }

    #[test]
    fn test_leap_second() {
        let time = GeneralizedTime::parse("20161231235960Z").unwrap();
        assert_eq!(time.second(), Some(60));
        assert!(GeneralizedTime::parse("20161231235961Z").is_err());
    }

    #[test]
    fn test_utc_constructor() {
        let time = GeneralizedTime::utc(2001, 2, 3, 4, 5, 6).unwrap();
        assert_eq!(time.as_str(), "20010203040506Z");
    }
}
