//! Per-student application statistics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  application::Application, intake::Intake, status::ApplicationStatus, student::Student,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationStatistics {
  pub student_id:           Uuid,
  pub total_applications:   usize,
  pub active_applications:  usize,
  pub dropped_applications: usize,
  /// Count per status; statuses with no applications are omitted.
  pub status_breakdown:     BTreeMap<ApplicationStatus, usize>,
  pub earliest_intake:      Option<String>,
  pub latest_intake:        Option<String>,
  pub highest_status:       Option<ApplicationStatus>,
  pub highest_intake:       Option<String>,
}

impl ApplicationStatistics {
  /// Summarise `applications`, which must all belong to `student`.
  ///
  /// Intakes that fail to parse are left out of the earliest/latest range.
  pub fn from_applications(student: &Student, applications: &[Application]) -> Self {
    let mut status_breakdown = BTreeMap::new();
    for app in applications {
      *status_breakdown.entry(app.status).or_insert(0) += 1;
    }
    let dropped_applications =
      status_breakdown.get(&ApplicationStatus::Dropped).copied().unwrap_or(0);

    let intakes: Vec<Intake> =
      applications.iter().filter_map(|a| a.intake.parse().ok()).collect();

    Self {
      student_id: student.id,
      total_applications: applications.len(),
      active_applications: applications.len() - dropped_applications,
      dropped_applications,
      status_breakdown,
      earliest_intake: intakes.iter().min().map(ToString::to_string),
      latest_intake: intakes.iter().max().map(ToString::to_string),
      highest_status: student.highest_status,
      highest_intake: student.highest_intake.clone(),
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;
  use crate::status::ApplicationStatus::*;

  fn student() -> Student {
    let now = Utc::now();
    Student {
      id:             Uuid::new_v4(),
      name:           "Grace".into(),
      email:          "grace@example.com".into(),
      phone:          "5550100".into(),
      highest_status: Some(OfferReceived),
      highest_intake: Some("Sep 2026".into()),
      created_at:     now,
      updated_at:     now,
      deleted_at:     None,
    }
  }

  fn app(student_id: Uuid, status: ApplicationStatus, intake: &str) -> Application {
    let now = Utc::now();
    Application {
      id: Uuid::new_v4(),
      student_id,
      university_name: "U".into(),
      program_name: "P".into(),
      intake: intake.into(),
      status,
      created_at: now,
      updated_at: now,
    }
  }

  #[test]
  fn empty_student_has_zeroed_statistics() {
    let s = student();
    let stats = ApplicationStatistics::from_applications(&s, &[]);
    assert_eq!(stats.total_applications, 0);
    assert_eq!(stats.active_applications, 0);
    assert!(stats.status_breakdown.is_empty());
    assert_eq!(stats.earliest_intake, None);
    assert_eq!(stats.latest_intake, None);
  }

  #[test]
  fn counts_and_intake_range() {
    let s = student();
    let apps = [
      app(s.id, OfferReceived, "Sep 2026"),
      app(s.id, OfferReceived, "Jan 2027"),
      app(s.id, Dropped, "Mar 2026"),
      app(s.id, Submitted, "Feb 2028"),
    ];
    let stats = ApplicationStatistics::from_applications(&s, &apps);

    assert_eq!(stats.total_applications, 4);
    assert_eq!(stats.active_applications, 3);
    assert_eq!(stats.dropped_applications, 1);
    assert_eq!(stats.status_breakdown.get(&OfferReceived), Some(&2));
    assert_eq!(stats.status_breakdown.get(&VisaApproved), None);
    assert_eq!(stats.earliest_intake.as_deref(), Some("Mar 2026"));
    assert_eq!(stats.latest_intake.as_deref(), Some("Feb 2028"));
    assert_eq!(stats.highest_status, Some(OfferReceived));
  }

  #[test]
  fn breakdown_serialises_with_status_labels() {
    let s = student();
    let stats =
      ApplicationStatistics::from_applications(&s, &[app(s.id, VisaApproved, "Jan 2026")]);
    let json = serde_json::to_value(&stats).unwrap();
    assert_eq!(json["status_breakdown"]["Visa Approved"], 1);
  }
}
