use crate::adaptation::{apply_adaptation, Adaptation};
use crate::db::AppState;
use crate::models::plan::raw_days;
use crate::models::{MissedSession, UserStateSnapshot, WeekOverride};
use crate::normalize::normalize_week;
use crate::store::{load_state, save_state};

/// Adapt a week to how the athlete feels and store the result as its override.
///
/// Always starts from the base week, so adapting twice does not compound.
/// Completion checks for the week are left alone.
pub async fn adapt_week(
  state: &AppState,
  week_number: u32,
  snapshot: UserStateSnapshot,
  missed: Vec<MissedSession>,
) -> Result<Option<Adaptation>, String> {
  let Some(base) = state.plan.week(week_number) else {
    tracing::debug!(week_number, "Adaptation requested for unknown week");
    return Ok(None);
  };
  let base_week = normalize_week(base, state.layout).map_err(|e| e.to_string())?;

  let result = apply_adaptation(&base_week, &snapshot, &missed);

  let _guard = state.write_lock.lock().await;
  let mut persisted = load_state(&state.db)
    .await
    .map_err(|e| format!("Failed to load plan state: {}", e))?;
  persisted.set_override(
    week_number,
    WeekOverride {
      days: raw_days(&result.week.days),
      coach_note: result.coach_note.clone(),
    },
  );
  save_state(&state.db, &persisted)
    .await
    .map_err(|e| format!("Failed to save week override: {}", e))?;

  tracing::info!(
    week_number,
    missed = missed.len(),
    noted = !result.coach_note.is_empty(),
    "Week adapted"
  );

  Ok(Some(result))
}
