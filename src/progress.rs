//! Completion tracking and weekly progress
//!
//! Nothing here is stored: progress is recomputed from the week and its
//! completion flags on every call.

use serde::{Deserialize, Serialize};

use crate::duration::parse_duration;
use crate::models::{CompletionMap, Session, SessionType, Week, Weekday};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
  pub planned_sessions: u32,
  pub completed_sessions: u32,
  pub planned_minutes: u32,
  pub completed_minutes: u32,
}

impl Progress {
  /// Rounded completion percentage, 0 when nothing is planned
  pub fn completion_pct(&self) -> u32 {
    if self.planned_sessions == 0 {
      return 0;
    }
    (self.completed_sessions as f64 / self.planned_sessions as f64 * 100.0).round() as u32
  }
}

/// Rest never counts. Race day counts as a session but not toward minutes.
fn counts_as_session(session: &Session) -> bool {
  session.is_training()
}

fn counted_minutes(session: &Session) -> u32 {
  match session.session_type {
    SessionType::Off | SessionType::Race => 0,
    _ => parse_duration(&session.duration),
  }
}

pub fn is_completed(
  completion: &CompletionMap,
  week_number: u32,
  day: Weekday,
  index: usize,
) -> bool {
  completion
    .get(&week_number)
    .and_then(|days| days.get(&day))
    .and_then(|sessions| sessions.get(&index))
    .copied()
    .unwrap_or(false)
}

pub fn compute_progress(week: &Week, week_number: u32, completion: &CompletionMap) -> Progress {
  week
    .iter_sessions()
    .filter(|(_, _, session)| counts_as_session(session))
    .fold(Progress::default(), |mut acc, (day, index, session)| {
      let minutes = counted_minutes(session);
      acc.planned_sessions += 1;
      acc.planned_minutes = acc.planned_minutes.saturating_add(minutes);
      if is_completed(completion, week_number, day, index) {
        acc.completed_sessions += 1;
        acc.completed_minutes = acc.completed_minutes.saturating_add(minutes);
      }
      acc
    })
}

/// Set one completion flag, creating the week/day entries on first use
pub fn toggle_completion(
  mut completion: CompletionMap,
  week_number: u32,
  day: Weekday,
  index: usize,
  value: bool,
) -> CompletionMap {
  completion
    .entry(week_number)
    .or_default()
    .entry(day)
    .or_default()
    .insert(index, value);
  completion
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::scenario_week;

  #[test]
  fn test_empty_completion_map() {
    let week = scenario_week();
    let progress = compute_progress(&week, 1, &CompletionMap::new());
    assert_eq!(progress.completed_sessions, 0);
    assert_eq!(progress.completed_minutes, 0);
    assert_eq!(progress.completion_pct(), 0);
    // Fri PM and Sun PM are rest
    assert_eq!(progress.planned_sessions, 12);
  }

  #[test]
  fn test_planned_minutes() {
    let week = scenario_week();
    let progress = compute_progress(&week, 1, &CompletionMap::new());
    // Mon 45+20, Tue 38+45, Wed 45+30, Thu 60+40, Fri 45, Sat 60+40, Sun 40
    assert_eq!(progress.planned_minutes, 508);
  }

  #[test]
  fn test_toggle_is_monotonic_and_reversible() {
    let week = scenario_week();
    let before = compute_progress(&week, 1, &CompletionMap::new());

    let checked = toggle_completion(CompletionMap::new(), 1, Weekday::Tue, 1, true);
    let after = compute_progress(&week, 1, &checked);
    assert_eq!(after.completed_sessions, before.completed_sessions + 1);
    assert_eq!(after.completed_minutes, before.completed_minutes + 45);

    let unchecked = toggle_completion(checked, 1, Weekday::Tue, 1, false);
    assert_eq!(compute_progress(&week, 1, &unchecked), before);
  }

  #[test]
  fn test_completion_is_per_week() {
    let week = scenario_week();
    let checks = toggle_completion(CompletionMap::new(), 2, Weekday::Mon, 0, true);
    assert_eq!(compute_progress(&week, 1, &checks).completed_sessions, 0);
    assert_eq!(compute_progress(&week, 2, &checks).completed_sessions, 1);
  }

  #[test]
  fn test_race_counts_without_minutes() {
    let mut week = scenario_week();
    week.days.get_mut(&Weekday::Sun).unwrap()[0] = Session::with_defaults(SessionType::Race);
    let checks = toggle_completion(CompletionMap::new(), 1, Weekday::Sun, 0, true);
    let progress = compute_progress(&week, 1, &checks);
    assert_eq!(progress.planned_sessions, 12);
    assert_eq!(progress.planned_minutes, 468);
    assert_eq!(progress.completed_sessions, 1);
    assert_eq!(progress.completed_minutes, 0);
  }

  #[test]
  fn test_rest_and_stale_indices_ignored() {
    let week = scenario_week();
    let checks = toggle_completion(CompletionMap::new(), 1, Weekday::Fri, 1, true);
    let checks = toggle_completion(checks, 1, Weekday::Fri, 5, true);
    assert_eq!(compute_progress(&week, 1, &checks).completed_sessions, 0);
  }

  #[test]
  fn test_huge_durations_saturate() {
    let mut week = scenario_week();
    let mon = week.days.get_mut(&Weekday::Mon).unwrap();
    mon[0].duration = "4000000000".to_string();
    mon[1].duration = "4000000000".to_string();
    let checks = toggle_completion(CompletionMap::new(), 1, Weekday::Mon, 0, true);
    let checks = toggle_completion(checks, 1, Weekday::Mon, 1, true);

    let progress = compute_progress(&week, 1, &checks);
    assert_eq!(progress.planned_minutes, u32::MAX);
    assert_eq!(progress.completed_minutes, u32::MAX);
    assert_eq!(progress.completed_sessions, 2);
  }

  #[test]
  fn test_completion_pct_rounds() {
    let progress = Progress {
      planned_sessions: 3,
      completed_sessions: 2,
      ..Progress::default()
    };
    assert_eq!(progress.completion_pct(), 67);
  }
}
