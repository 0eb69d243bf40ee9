pub mod adapt;
pub mod state;

use crate::db::AppState;
use crate::models::{CompletionMap, Week, Weekday};
use crate::progress::{compute_progress, toggle_completion, Progress};
use crate::schedule::{current_week_number, key_sessions, materialize_week, KeySession};
use crate::store::{load_state, save_state};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
/// Week View
// ---------------------------------------------------------------------------

/// Everything needed to render one week
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekView {
  pub week: Week,
  pub start_date: NaiveDate,
  pub race_date: NaiveDate,
  pub progress: Progress,
  pub completion_pct: u32,
  pub key_sessions: Vec<KeySession>,
  pub checks: BTreeMap<Weekday, BTreeMap<usize, bool>>,
}

/// Working copy of a week with its progress. `None` if the plan has no such week.
pub async fn get_week(state: &AppState, week_number: u32) -> Result<Option<WeekView>, String> {
  let persisted = load_state(&state.db)
    .await
    .map_err(|e| format!("Failed to load plan state: {}", e))?;

  let Some(week) = materialize_week(&state.plan, week_number, &persisted, state.layout)
    .map_err(|e| e.to_string())?
  else {
    return Ok(None);
  };

  Ok(Some(build_view(state, week, &persisted.session_checks)))
}

fn build_view(state: &AppState, week: Week, checks: &CompletionMap) -> WeekView {
  let progress = compute_progress(&week, week.week, checks);
  WeekView {
    start_date: state.plan.start_date,
    race_date: state.plan.race_date,
    completion_pct: progress.completion_pct(),
    key_sessions: key_sessions(&week),
    checks: checks.get(&week.week).cloned().unwrap_or_default(),
    progress,
    week,
  }
}

// ---------------------------------------------------------------------------
/// Completion
// ---------------------------------------------------------------------------

/// Mark one session done or not done and return the week's new progress
pub async fn toggle_session(
  state: &AppState,
  week_number: u32,
  day: Weekday,
  index: usize,
  done: bool,
) -> Result<Option<Progress>, String> {
  let _guard = state.write_lock.lock().await;

  let mut persisted = load_state(&state.db)
    .await
    .map_err(|e| format!("Failed to load plan state: {}", e))?;

  let Some(week) = materialize_week(&state.plan, week_number, &persisted, state.layout)
    .map_err(|e| e.to_string())?
  else {
    return Ok(None);
  };

  let checks = std::mem::take(&mut persisted.session_checks);
  persisted.session_checks = toggle_completion(checks, week_number, day, index, done);

  save_state(&state.db, &persisted)
    .await
    .map_err(|e| format!("Failed to save completion: {}", e))?;

  Ok(Some(compute_progress(&week, week_number, &persisted.session_checks)))
}

// ---------------------------------------------------------------------------
/// Week Selection
// ---------------------------------------------------------------------------

/// Stored selection, or week 1 when nothing (or a week the plan lacks) is stored
pub async fn get_selected_week(state: &AppState) -> Result<u32, String> {
  let persisted = load_state(&state.db)
    .await
    .map_err(|e| format!("Failed to load plan state: {}", e))?;
  Ok(
    persisted
      .selected_week
      .filter(|week| state.plan.week(*week).is_some())
      .unwrap_or(1),
  )
}

/// Remember the selected week. Unknown weeks are ignored and return `None`.
pub async fn select_week(state: &AppState, week_number: u32) -> Result<Option<u32>, String> {
  if state.plan.week(week_number).is_none() {
    return Ok(None);
  }
  let _guard = state.write_lock.lock().await;

  let mut persisted = load_state(&state.db)
    .await
    .map_err(|e| format!("Failed to load plan state: {}", e))?;
  persisted.selected_week = Some(week_number);
  save_state(&state.db, &persisted)
    .await
    .map_err(|e| format!("Failed to save selected week: {}", e))?;

  Ok(Some(week_number))
}

/// Select the week that contains `today`
pub async fn jump_to_current_week(state: &AppState, today: NaiveDate) -> Result<u32, String> {
  let week_number = current_week_number(&state.plan, today);
  select_week(state, week_number).await?;
  Ok(week_number)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::PlanLayout;
  use crate::test_utils::*;
  use serial_test::serial;

  async fn test_state() -> AppState {
    AppState::new(setup_test_db().await, sample_plan(), PlanLayout::Slots)
  }

  #[tokio::test]
  #[serial]
  async fn test_get_week_empty_store() {
    let state = test_state().await;

    let view = get_week(&state, 2).await.unwrap().unwrap();
    assert_eq!(view.week.week, 2);
    assert_eq!(view.progress.completed_sessions, 0);
    assert_eq!(view.progress.completed_minutes, 0);
    assert_eq!(view.completion_pct, 0);
    assert!(view.checks.is_empty());

    teardown_test_db(state.db).await;
  }

  #[tokio::test]
  #[serial]
  async fn test_get_unknown_week() {
    let state = test_state().await;
    assert!(get_week(&state, 42).await.unwrap().is_none());
    teardown_test_db(state.db).await;
  }

  #[tokio::test]
  #[serial]
  async fn test_get_week_with_empty_document() {
    let state = test_state().await;
    seed_raw_document(&state.db, "{}").await;

    let view = get_week(&state, 1).await.unwrap().unwrap();
    assert_eq!(view.progress.completed_sessions, 0);
    assert_eq!(view.progress.completed_minutes, 0);

    teardown_test_db(state.db).await;
  }

  #[tokio::test]
  #[serial]
  async fn test_toggle_session_updates_progress() {
    let state = test_state().await;

    // Sat AM bike, 2:30
    let progress = toggle_session(&state, 1, Weekday::Sat, 0, true)
      .await
      .unwrap()
      .unwrap();
    assert_eq!(progress.completed_sessions, 1);
    assert_eq!(progress.completed_minutes, 150);

    let view = get_week(&state, 1).await.unwrap().unwrap();
    assert_eq!(view.progress, progress);
    assert!(view.checks[&Weekday::Sat][&0]);

    let progress = toggle_session(&state, 1, Weekday::Sat, 0, false)
      .await
      .unwrap()
      .unwrap();
    assert_eq!(progress.completed_sessions, 0);

    teardown_test_db(state.db).await;
  }

  #[tokio::test]
  #[serial]
  async fn test_toggle_unknown_week_is_noop() {
    let state = test_state().await;
    let result = toggle_session(&state, 9, Weekday::Mon, 0, true).await.unwrap();
    assert!(result.is_none());
    assert_eq!(crate::store::export_state(&state.db).await.unwrap(), "{}");
    teardown_test_db(state.db).await;
  }

  #[tokio::test]
  #[serial]
  async fn test_select_and_jump() {
    let state = test_state().await;

    assert_eq!(get_selected_week(&state).await.unwrap(), 1);
    assert_eq!(select_week(&state, 3).await.unwrap(), Some(3));
    assert_eq!(get_selected_week(&state).await.unwrap(), 3);
    assert_eq!(select_week(&state, 12).await.unwrap(), None);
    assert_eq!(get_selected_week(&state).await.unwrap(), 3);

    let today = NaiveDate::from_ymd_opt(2026, 1, 14).unwrap();
    assert_eq!(jump_to_current_week(&state, today).await.unwrap(), 2);
    assert_eq!(get_selected_week(&state).await.unwrap(), 2);

    teardown_test_db(state.db).await;
  }

  #[tokio::test]
  #[serial]
  async fn test_imported_selection_outside_plan_falls_back() {
    let state = test_state().await;
    state::import_state(&state, r#"{"selectedWeek":9}"#.to_string())
      .await
      .unwrap();

    assert_eq!(get_selected_week(&state).await.unwrap(), 1);

    teardown_test_db(state.db).await;
  }
}
