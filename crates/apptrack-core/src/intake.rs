//! Intake periods: the month and year an application targets.
//!
//! The canonical text form is `"<Mon> <YYYY>"`, e.g. `"Jan 2026"`. Parsing is
//! lenient about case and accepts full month names; [`Display`] always
//! produces the canonical form.

use std::{fmt, str::FromStr};

use chrono::Month;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Years outside this range are treated as typos.
pub const YEAR_RANGE: std::ops::RangeInclusive<u16> = 2000..=2100;

/// A comparable (year, month) intake key. Orders chronologically.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Intake {
  year:  u16,
  /// 1-based month number.
  month: u8,
}

impl Intake {
  pub fn new(year: u16, month: u8) -> Result<Self> {
    if !YEAR_RANGE.contains(&year) || !(1..=12).contains(&month) {
      return Err(Error::InvalidIntake(format!("{month}/{year}")));
    }
    Ok(Self { year, month })
  }

  pub const fn year(self) -> u16 { self.year }

  pub const fn month(self) -> u8 { self.month }

  fn month_abbrev(self) -> &'static str {
    match Month::try_from(self.month) {
      Ok(m) => m.name().get(..3).unwrap_or("???"),
      Err(_) => "???",
    }
  }
}

impl FromStr for Intake {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let invalid = || Error::InvalidIntake(s.to_owned());

    let mut parts = s.split_whitespace();
    let (Some(month_str), Some(year_str), None) =
      (parts.next(), parts.next(), parts.next())
    else {
      return Err(invalid());
    };

    let month = Month::from_str(month_str).map_err(|_| invalid())?;
    if year_str.len() != 4 || !year_str.bytes().all(|b| b.is_ascii_digit()) {
      return Err(invalid());
    }
    let year: u16 = year_str.parse().map_err(|_| invalid())?;

    // `number_from_month` is always 1..=12.
    let month = u8::try_from(month.number_from_month()).map_err(|_| invalid())?;
    Self::new(year, month).map_err(|_| invalid())
  }
}

impl fmt::Display for Intake {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {}", self.month_abbrev(), self.year)
  }
}

impl TryFrom<String> for Intake {
  type Error = Error;

  fn try_from(value: String) -> Result<Self> { value.parse() }
}

impl From<Intake> for String {
  fn from(value: Intake) -> Self { value.to_string() }
}

#[cfg(test)]
mod tests {
  use rstest::rstest;

  use super::*;

  #[rstest]
  #[case("Jan 2026", 2026, 1)]
  #[case("Feb 2026", 2026, 2)]
  #[case("Dec 2026", 2026, 12)]
  #[case("January 2026", 2026, 1)]
  #[case("september 2027", 2027, 9)]
  #[case("  SEP   2026 ", 2026, 9)]
  #[case("Jan 2000", 2000, 1)]
  #[case("Dec 2100", 2100, 12)]
  fn parses_valid_intakes(#[case] input: &str, #[case] year: u16, #[case] month: u8) {
    let intake: Intake = input.parse().unwrap();
    assert_eq!((intake.year(), intake.month()), (year, month));
  }

  #[rstest]
  #[case("")]
  #[case("Invalid")]
  #[case("Invalid 2026")]
  #[case("Jan")]
  #[case("Jan 26")]
  #[case("Jan 1999")]
  #[case("Jan 2101")]
  #[case("Jan 2026 extra")]
  #[case("2026 Jan")]
  fn rejects_malformed_intakes(#[case] input: &str) {
    assert!(matches!(input.parse::<Intake>(), Err(Error::InvalidIntake(_))));
  }

  #[test]
  fn display_is_canonical() {
    let intake: Intake = "september 2026".parse().unwrap();
    assert_eq!(intake.to_string(), "Sep 2026");
  }

  #[test]
  fn orders_by_year_then_month() {
    let dec_2025: Intake = "Dec 2025".parse().unwrap();
    let jan_2026: Intake = "Jan 2026".parse().unwrap();
    let feb_2026: Intake = "Feb 2026".parse().unwrap();
    assert!(dec_2025 < jan_2026);
    assert!(jan_2026 < feb_2026);
    assert_eq!(jan_2026, "January 2026".parse().unwrap());
  }

  #[test]
  fn serde_uses_canonical_string() {
    let intake: Intake = serde_json::from_str("\"March 2027\"").unwrap();
    assert_eq!(serde_json::to_string(&intake).unwrap(), "\"Mar 2027\"");
    assert!(serde_json::from_str::<Intake>("\"Smarch 2027\"").is_err());
  }
}
