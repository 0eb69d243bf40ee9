//! Test utilities and helpers for unit testing
//!
//! This module provides common test infrastructure including:
//! - Database setup/teardown
//! - Plan and week factories
//! - Seeded override store state

use crate::models::plan::RawLabel;
use crate::models::{Plan, PlanLayout, RawDayMap, RawSession, RawWeek, Week};
use crate::normalize::normalize_week;
use chrono::NaiveDate;
use sqlx::SqlitePool;

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases, which would cause intermittent test failures
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// Write a raw document straight into the store, bypassing validation
pub async fn seed_raw_document(pool: &SqlitePool, document: &str) {
  sqlx::query("INSERT OR REPLACE INTO plan_state (id, document) VALUES (1, ?1)")
    .bind(document)
    .execute(pool)
    .await
    .expect("Failed to seed plan state");
}

/// ---------------------------------------------------------------------------
/// Plan Factories
/// ---------------------------------------------------------------------------

pub fn raw_session(session_type: &str, duration: &str) -> RawSession {
  RawSession {
    session_type: Some(session_type.to_string()),
    duration: Some(RawLabel::Text(duration.to_string())),
    ..RawSession::default()
  }
}

fn with_priority(mut session: RawSession, priority: &str) -> RawSession {
  session.priority = Some(priority.to_string());
  session
}

fn with_slot(mut session: RawSession, slot: &str) -> RawSession {
  session.slot = Some(slot.to_string());
  session
}

fn optional(mut session: RawSession) -> RawSession {
  session.optional = Some(true);
  session
}

/// A fully authored week. Saturday AM is the only key session.
pub fn sample_raw_week(number: u32) -> RawWeek {
  let mut days = RawDayMap::new();
  days.insert("Mon".into(), vec![raw_session("swim", "45m")]);
  days.insert(
    "Tue".into(),
    vec![
      raw_session("bike", "30–45m"),
      with_slot(raw_session("run", "45m"), "PM"),
    ],
  );
  days.insert(
    "Wed".into(),
    vec![raw_session("swim", "1:00"), optional(raw_session("mobility", "20m"))],
  );
  days.insert(
    "Thu".into(),
    vec![
      with_priority(raw_session("run", "40m"), "moderate"),
      raw_session("bike", "1:15"),
    ],
  );
  days.insert("Fri".into(), vec![raw_session("off", "")]);
  days.insert(
    "Sat".into(),
    vec![
      with_priority(raw_session("bike", "2:30"), "high"),
      raw_session("run", "20m"),
    ],
  );
  days.insert("Sun".into(), vec![raw_session("run", "90–105m")]);

  RawWeek {
    week: number,
    phase: Some(if number == 1 { "Base" } else { "Build" }.to_string()),
    hours_target: Some(RawLabel::Text("8–10".to_string())),
    notes: Some(vec!["Keep easy days easy.".to_string()]),
    days: Some(days),
  }
}

/// Three-week plan starting Monday 2026-01-05
pub fn sample_plan() -> Plan {
  Plan {
    start_date: NaiveDate::from_ymd_opt(2026, 1, 5).expect("valid date"),
    race_date: NaiveDate::from_ymd_opt(2026, 6, 14).expect("valid date"),
    layout: PlanLayout::Slots,
    weeks: (1..=3).map(sample_raw_week).collect(),
  }
}

pub fn sample_plan_json() -> String {
  serde_json::to_string(&sample_plan()).expect("Failed to serialize sample plan")
}

/// Slot week where only Tuesday is authored: [Bike AM "30–45m", Run PM "45m"].
/// Every other day comes from the default pattern.
pub fn scenario_week() -> Week {
  let mut days = RawDayMap::new();
  days.insert(
    "Tue".into(),
    vec![raw_session("bike", "30–45m"), raw_session("run", "45m")],
  );
  let raw = RawWeek {
    week: 1,
    phase: Some("Base".to_string()),
    hours_target: None,
    notes: None,
    days: Some(days),
  };
  normalize_week(&raw, PlanLayout::Slots).expect("scenario week normalizes")
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::{SessionType, Weekday};

  #[tokio::test]
  async fn test_setup_db_creates_schema() {
    let pool = setup_test_db().await;

    let tables: Vec<(String,)> =
      sqlx::query_as("SELECT name FROM sqlite_master WHERE type='table' AND name = 'plan_state'")
        .fetch_all(&pool)
        .await
        .expect("Failed to query tables");

    assert_eq!(tables.len(), 1);

    teardown_test_db(pool).await;
  }

  #[test]
  fn test_scenario_week_shape() {
    let week = scenario_week();
    let tue = week.sessions(Weekday::Tue);
    assert_eq!(tue[0].session_type, SessionType::Bike);
    assert_eq!(tue[0].duration, "30–45m");
    assert_eq!(tue[1].session_type, SessionType::Run);
    assert_eq!(week.sessions(Weekday::Fri)[1].session_type, SessionType::Off);
  }

  #[test]
  fn test_sample_plan_round_trips_through_json() {
    let plan: Plan = serde_json::from_str(&sample_plan_json()).unwrap();
    assert_eq!(plan, sample_plan());
  }
}
