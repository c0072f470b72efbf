//! The closed set of application statuses and their weight table.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{Error, Result};

/// Where an application currently stands.
///
/// Variants are declared in progression order. Serialised as their
/// human-readable labels, e.g. `"Offer Received"`.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
pub enum ApplicationStatus {
  #[serde(rename = "Building Application")]
  #[strum(serialize = "Building Application")]
  BuildingApplication,

  #[serde(rename = "Application Submitted to University")]
  #[strum(serialize = "Application Submitted to University")]
  Submitted,

  #[serde(rename = "Offer Received")]
  #[strum(serialize = "Offer Received")]
  OfferReceived,

  #[serde(rename = "Offer Accepted by Student")]
  #[strum(serialize = "Offer Accepted by Student")]
  OfferAccepted,

  #[serde(rename = "Visa Approved")]
  #[strum(serialize = "Visa Approved")]
  VisaApproved,

  /// Withdrawn; never counts towards a student's highest status.
  #[serde(rename = "Dropped")]
  #[strum(serialize = "Dropped")]
  Dropped,
}

impl ApplicationStatus {
  /// Rank used to pick a student's highest status. `None` for
  /// [`Dropped`](Self::Dropped), which is excluded from ranking.
  pub const fn weight(self) -> Option<u8> {
    match self {
      Self::BuildingApplication => Some(1),
      Self::Submitted => Some(2),
      Self::OfferReceived => Some(3),
      Self::OfferAccepted => Some(4),
      Self::VisaApproved => Some(5),
      Self::Dropped => None,
    }
  }

  pub const fn is_dropped(self) -> bool { matches!(self, Self::Dropped) }

  /// The label stored in the database and sent over the wire.
  pub fn as_str(self) -> &'static str { self.into() }

  /// Parse a label, mapping failures to [`Error::UnknownStatus`].
  pub fn parse(label: &str) -> Result<Self> {
    Self::from_str(label.trim()).map_err(|_| Error::UnknownStatus(label.to_owned()))
  }
}

#[cfg(test)]
mod tests {
  use rstest::rstest;
  use strum::IntoEnumIterator;

  use super::*;

  #[rstest]
  #[case(ApplicationStatus::BuildingApplication, Some(1))]
  #[case(ApplicationStatus::Submitted, Some(2))]
  #[case(ApplicationStatus::OfferReceived, Some(3))]
  #[case(ApplicationStatus::OfferAccepted, Some(4))]
  #[case(ApplicationStatus::VisaApproved, Some(5))]
  #[case(ApplicationStatus::Dropped, None)]
  fn weight_table(#[case] status: ApplicationStatus, #[case] weight: Option<u8>) {
    assert_eq!(status.weight(), weight);
  }

  #[test]
  fn declaration_order_follows_weight() {
    let weights: Vec<u8> =
      ApplicationStatus::iter().filter_map(ApplicationStatus::weight).collect();
    assert_eq!(weights, vec![1, 2, 3, 4, 5]);
  }

  #[test]
  fn labels_roundtrip_through_parse() {
    for status in ApplicationStatus::iter() {
      assert_eq!(ApplicationStatus::parse(status.as_str()).unwrap(), status);
    }
  }

  #[test]
  fn serde_uses_display_labels() {
    let json = serde_json::to_string(&ApplicationStatus::OfferAccepted).unwrap();
    assert_eq!(json, "\"Offer Accepted by Student\"");
    let back: ApplicationStatus =
      serde_json::from_str("\"Application Submitted to University\"").unwrap();
    assert_eq!(back, ApplicationStatus::Submitted);
  }

  #[test]
  fn unknown_label_is_rejected() {
    let err = ApplicationStatus::parse("Accepted").unwrap_err();
    assert!(matches!(err, Error::UnknownStatus(s) if s == "Accepted"));
  }
}
