//! The status resolver: derives a student's highest status and intake from
//! the full set of their applications.
//!
//! Pure and deterministic. Callers must pass every application the student
//! currently has; the store runs this inside the same transaction as the
//! write that changed the set.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result, application::Application, intake::Intake, status::ApplicationStatus,
};

/// The derived pair written back onto a student. Both halves always come from
/// the same application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighestStatus {
  pub status: ApplicationStatus,
  pub intake: Intake,
}

/// Pick the highest-weighted non-dropped application, preferring the earliest
/// intake and then the lowest application id among equals.
///
/// Returns `Ok(None)` when there are no applications or all are dropped.
/// Fails with [`Error::MalformedIntake`] if any ranked application carries an
/// intake that does not parse.
pub fn resolve(applications: &[Application]) -> Result<Option<HighestStatus>> {
  let mut best: Option<(u8, Intake, Uuid, ApplicationStatus)> = None;

  for app in applications {
    let Some(weight) = app.status.weight() else {
      continue;
    };
    let intake: Intake = app.intake.parse().map_err(|_| Error::MalformedIntake {
      application_id: app.id,
      intake:         app.intake.clone(),
    })?;

    let wins = match &best {
      None => true,
      Some((best_weight, best_intake, best_id, _)) => {
        // Higher weight wins; within a weight, the smaller (intake, id) wins.
        weight > *best_weight
          || (weight == *best_weight && (intake, app.id) < (*best_intake, *best_id))
      }
    };
    if wins {
      best = Some((weight, intake, app.id, app.status));
    }
  }

  Ok(best.map(|(_, intake, _, status)| HighestStatus { status, intake }))
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;
  use crate::status::ApplicationStatus::*;

  fn app(status: ApplicationStatus, intake: &str) -> Application {
    app_with_id(Uuid::new_v4(), status, intake)
  }

  fn app_with_id(id: Uuid, status: ApplicationStatus, intake: &str) -> Application {
    let now = Utc::now();
    Application {
      id,
      student_id: Uuid::nil(),
      university_name: "University".into(),
      program_name: "Program".into(),
      intake: intake.into(),
      status,
      created_at: now,
      updated_at: now,
    }
  }

  fn pair(highest: Option<HighestStatus>) -> Option<(ApplicationStatus, String)> {
    highest.map(|h| (h.status, h.intake.to_string()))
  }

  #[test]
  fn empty_input_resolves_to_none() {
    assert_eq!(resolve(&[]).unwrap(), None);
  }

  #[test]
  fn all_dropped_resolves_to_none() {
    let apps = [app(Dropped, "Jan 2026"), app(Dropped, "Feb 2026")];
    assert_eq!(resolve(&apps).unwrap(), None);
  }

  #[test]
  fn single_application() {
    let apps = [app(OfferReceived, "Jan 2026")];
    assert_eq!(
      pair(resolve(&apps).unwrap()),
      Some((OfferReceived, "Jan 2026".into()))
    );
  }

  #[test]
  fn picks_maximum_weight() {
    let apps = [
      app(BuildingApplication, "Jan 2026"),
      app(OfferReceived, "Feb 2026"),
      app(Submitted, "Mar 2026"),
    ];
    assert_eq!(
      pair(resolve(&apps).unwrap()),
      Some((OfferReceived, "Feb 2026".into()))
    );
  }

  #[test]
  fn maximum_weight_over_every_status_mix() {
    let weighted = [BuildingApplication, Submitted, OfferReceived, OfferAccepted, VisaApproved];
    // Every non-empty subset of the weighted statuses, plus a dropped entry.
    for mask in 1u32..(1 << weighted.len()) {
      let mut apps = vec![app(Dropped, "Jan 2020")];
      for (i, status) in weighted.iter().enumerate() {
        if mask & (1 << i) != 0 {
          apps.push(app(*status, "Jun 2026"));
        }
      }
      let expected = apps
        .iter()
        .filter_map(|a| a.status.weight().map(|w| (w, a.status)))
        .max()
        .map(|(_, s)| s);
      let got = resolve(&apps).unwrap().map(|h| h.status);
      assert_eq!(got, expected, "mask {mask:#b}");
    }
  }

  #[test]
  fn ties_break_on_earliest_intake() {
    let apps = [app(OfferReceived, "Mar 2026"), app(OfferReceived, "Jan 2026")];
    assert_eq!(
      pair(resolve(&apps).unwrap()),
      Some((OfferReceived, "Jan 2026".into()))
    );
  }

  #[test]
  fn earliest_intake_compares_across_years() {
    let apps = [app(Submitted, "Jan 2027"), app(Submitted, "Dec 2026")];
    assert_eq!(
      pair(resolve(&apps).unwrap()),
      Some((Submitted, "Dec 2026".into()))
    );
  }

  #[test]
  fn earlier_intake_of_lower_status_does_not_win() {
    let apps = [app(BuildingApplication, "Jan 2025"), app(VisaApproved, "Sep 2027")];
    assert_eq!(
      pair(resolve(&apps).unwrap()),
      Some((VisaApproved, "Sep 2027".into()))
    );
  }

  #[test]
  fn dropped_application_is_never_selected() {
    let apps = [app(OfferReceived, "Sep 2026"), app(Dropped, "Jan 2026")];
    assert_eq!(
      pair(resolve(&apps).unwrap()),
      Some((OfferReceived, "Sep 2026".into()))
    );
  }

  #[test]
  fn intake_belongs_to_an_application_with_the_returned_status() {
    let apps = [
      app(OfferReceived, "Sep 2026"),
      app(OfferAccepted, "Nov 2026"),
      app(OfferReceived, "Jan 2026"),
      app(OfferAccepted, "Feb 2027"),
    ];
    let h = resolve(&apps).unwrap().unwrap();
    assert!(
      apps
        .iter()
        .any(|a| a.status == h.status && a.intake == h.intake.to_string())
    );
    assert_eq!(pair(Some(h)), Some((OfferAccepted, "Nov 2026".into())));
  }

  #[test]
  fn identical_status_and_intake_pick_lowest_id_regardless_of_order() {
    let low = Uuid::from_u128(1);
    let high = Uuid::from_u128(2);
    let a = app_with_id(high, OfferReceived, "Jan 2026");
    let b = app_with_id(low, OfferReceived, "January 2026");

    let forward = resolve(&[a.clone(), b.clone()]).unwrap();
    let reverse = resolve(&[b, a]).unwrap();
    assert_eq!(forward, reverse);
    assert_eq!(pair(forward), Some((OfferReceived, "Jan 2026".into())));
  }

  #[test]
  fn resolution_is_idempotent() {
    let apps = [
      app(Submitted, "Sep 2026"),
      app(OfferReceived, "Jan 2027"),
      app(Dropped, "Jan 2026"),
    ];
    assert_eq!(resolve(&apps).unwrap(), resolve(&apps).unwrap());
  }

  #[test]
  fn malformed_intake_is_reported_with_application_id() {
    let bad = app(Submitted, "sometime soon");
    let bad_id = bad.id;
    let err = resolve(&[app(OfferReceived, "Jan 2026"), bad]).unwrap_err();
    assert!(matches!(
      err,
      Error::MalformedIntake { application_id, ref intake }
        if application_id == bad_id && intake == "sometime soon"
    ));
  }

  #[test]
  fn malformed_intake_on_dropped_application_is_ignored() {
    let apps = [app(Submitted, "Jan 2026"), app(Dropped, "n/a")];
    assert_eq!(
      pair(resolve(&apps).unwrap()),
      Some((Submitted, "Jan 2026".into()))
    );
  }
}
