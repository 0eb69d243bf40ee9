//! Working copies of plan weeks
//!
//! The base plan is never modified. Each render builds a fresh week from the
//! base week plus its stored override (if any), normalized for the layout.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{PersistedState, Plan, PlanLayout, Priority, RawWeek, Session, Week, Weekday};
use crate::normalize::{normalize_week, NormalizeError};

/// Build the working week for `week_number`.
///
/// Returns `Ok(None)` when the plan has no such week.
pub fn materialize_week(
  plan: &Plan,
  week_number: u32,
  state: &PersistedState,
  layout: PlanLayout,
) -> Result<Option<Week>, NormalizeError> {
  let Some(base) = plan.week(week_number) else {
    tracing::debug!(week_number, "Week not in plan");
    return Ok(None);
  };
  if base.days.is_none() {
    return Err(NormalizeError::InvalidWeek(base.week));
  }

  let Some(stored) = state.override_for(week_number) else {
    return normalize_week(base, layout).map(Some);
  };

  let overridden = RawWeek {
    days: Some(stored.days.clone()),
    ..base.clone()
  };
  let mut week = normalize_week(&overridden, layout)?;
  week.coach_note = Some(stored.coach_note.clone()).filter(|n| !n.is_empty());
  Ok(Some(week))
}

/// Week containing `today`, clamped to the plan's range
pub fn current_week_number(plan: &Plan, today: NaiveDate) -> u32 {
  let week_count = plan.weeks.len().max(1) as i64;
  let days_in = (today - plan.start_date).num_days();
  (days_in.div_euclid(7) + 1).clamp(1, week_count) as u32
}

/// A session worth offering as "missed": required and high priority
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeySession {
  pub day: Weekday,
  pub index: usize,
  pub session: Session,
}

pub fn key_sessions(week: &Week) -> Vec<KeySession> {
  week
    .iter_sessions()
    .filter(|(_, _, s)| s.is_training() && s.priority == Priority::High && !s.optional)
    .map(|(day, index, session)| KeySession {
      day,
      index,
      session: session.clone(),
    })
    .collect()
}
