//! Session normalization and role classification
//!
//! Turns authored (possibly partial) day lists into the canonical week shape:
//! - slot plans: exactly one AM and one PM session per day
//! - role plans: authored sessions kept in order, each tagged primary/support
//!
//! Gaps are filled from a fixed weekday/slot pattern so every day renders.
//! Normalizing a normalized week returns the same week, which matters because
//! completion flags are keyed by position.

use std::collections::BTreeMap;

use crate::models::plan::RawLabel;
use crate::models::{
  DayMap, PlanLayout, Priority, RawDayMap, RawSession, RawWeek, Role, Session, SessionType, Slot,
  Week, Weekday,
};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum NormalizeError {
  #[error("Invalid week {0}: no day map")]
  InvalidWeek(u32),
}

// ---------------------------------------------------------------------------
/// Default Pattern
// ---------------------------------------------------------------------------

/// Session type used when a (weekday, slot) has nothing authored
pub fn default_type(day: Weekday, slot: Slot) -> SessionType {
  use SessionType::*;
  match (day, slot) {
    (Weekday::Mon, Slot::AM) => Swim,
    (Weekday::Mon, Slot::PM) => Mobility,
    (Weekday::Tue, Slot::AM) => Bike,
    (Weekday::Tue, Slot::PM) => Run,
    (Weekday::Wed, Slot::AM) => Swim,
    (Weekday::Wed, Slot::PM) => Strength,
    (Weekday::Thu, Slot::AM) => Bike,
    (Weekday::Thu, Slot::PM) => Run,
    (Weekday::Fri, Slot::AM) => Swim,
    (Weekday::Fri, Slot::PM) => Off,
    (Weekday::Sat, Slot::AM) => Bike,
    (Weekday::Sat, Slot::PM) => Run,
    (Weekday::Sun, Slot::AM) => Run,
    (Weekday::Sun, Slot::PM) => Off,
  }
}

pub fn default_session(day: Weekday, slot: Slot) -> Session {
  Session::with_defaults(default_type(day, slot))
}

/// Fill every missing field of an authored record.
/// `fallback` is the type used when the record doesn't name one.
fn materialize(raw: &RawSession, fallback: SessionType) -> Session {
  let session_type = raw
    .session_type
    .as_ref()
    .filter(|t| !t.trim().is_empty())
    .map(|t| SessionType::from(t.clone()))
    .unwrap_or(fallback);

  let mut session = Session::with_defaults(session_type);

  if let Some(duration) = raw.duration.as_ref().map(RawLabel::as_duration) {
    if !duration.trim().is_empty() {
      session.duration = duration;
    }
  }
  if let Some(details) = raw.details.as_ref().filter(|d| !d.trim().is_empty()) {
    session.details = details.clone();
  }
  if let Some(priority) = raw.priority.as_deref() {
    match priority.parse::<Priority>() {
      Ok(p) => session.priority = p,
      Err(e) => tracing::debug!(error = %e, "Keeping default priority"),
    }
  }
  session.optional = raw.optional.unwrap_or(false);
  session.role = raw.role.as_deref().and_then(|r| r.parse().ok());
  session
}

// ---------------------------------------------------------------------------
/// Slot Layout
// ---------------------------------------------------------------------------

/// Exactly [AM, PM]. Explicit slot tags win; untagged records take the first
/// open slot in input order; anything left over is dropped with a warning.
pub fn normalize_slot_day(day: Weekday, raw: &[RawSession]) -> Vec<Session> {
  let mut slots: [Option<&RawSession>; 2] = [None, None];
  let mut untagged = Vec::new();

  for record in raw {
    match record.slot.as_deref().and_then(|s| s.parse::<Slot>().ok()) {
      Some(slot) if slots[slot as usize].is_none() => slots[slot as usize] = Some(record),
      _ => untagged.push(record),
    }
  }

  for record in untagged {
    match slots.iter_mut().find(|s| s.is_none()) {
      Some(open) => *open = Some(record),
      None => tracing::warn!(
        day = %day,
        session_type = record.session_type.as_deref().unwrap_or("?"),
        "More than two sessions for the day, dropping extra session"
      ),
    }
  }

  Slot::ALL
    .into_iter()
    .map(|slot| {
      let mut session = match slots[slot as usize] {
        Some(record) => materialize(record, default_type(day, slot)),
        None => default_session(day, slot),
      };
      session.slot = Some(slot);
      session.role = None;
      session
    })
    .collect()
}

// ---------------------------------------------------------------------------
/// Role Layout
// ---------------------------------------------------------------------------

/// Keep authored sessions in order and assign roles. An empty day gets the
/// day's two pattern sessions.
pub fn normalize_role_day(day: Weekday, raw: &[RawSession]) -> Vec<Session> {
  let sessions: Vec<Session> = if raw.is_empty() {
    Slot::ALL.into_iter().map(|slot| default_session(day, slot)).collect()
  } else {
    raw
      .iter()
      .enumerate()
      .map(|(i, record)| {
        let slot = if i == 0 { Slot::AM } else { Slot::PM };
        let mut session = materialize(record, default_type(day, slot));
        session.slot = None;
        session
      })
      .collect()
  };
  classify_roles(sessions)
}

/// Tag every untagged session primary or support.
///
/// Explicit roles are kept. Rest is always support. If the day has no
/// explicit primary, the first required high/medium session becomes primary,
/// falling back to the first training session.
pub fn classify_roles(mut sessions: Vec<Session>) -> Vec<Session> {
  let has_primary = sessions.iter().any(|s| s.role == Some(Role::Primary));

  let primary_idx = if has_primary {
    None
  } else {
    let candidate = |s: &Session| s.role.is_none() && s.is_training();
    sessions
      .iter()
      .position(|s| {
        candidate(s) && !s.optional && matches!(s.priority, Priority::High | Priority::Medium)
      })
      .or_else(|| sessions.iter().position(candidate))
  };

  for (i, session) in sessions.iter_mut().enumerate() {
    if session.role.is_none() {
      session.role = Some(if Some(i) == primary_idx {
        Role::Primary
      } else {
        Role::Support
      });
    }
  }
  sessions
}

// ---------------------------------------------------------------------------
/// Weeks
// ---------------------------------------------------------------------------

pub fn normalize_day(day: Weekday, raw: &[RawSession], layout: PlanLayout) -> Vec<Session> {
  match layout {
    PlanLayout::Slots => normalize_slot_day(day, raw),
    PlanLayout::Roles => normalize_role_day(day, raw),
  }
}

/// Normalize an authored day map into all seven weekdays
pub fn normalize_days(raw: &RawDayMap, layout: PlanLayout) -> DayMap {
  let mut by_day: BTreeMap<Weekday, &[RawSession]> = BTreeMap::new();
  for (key, sessions) in raw {
    match key.parse::<Weekday>() {
      Ok(day) if by_day.contains_key(&day) => {
        tracing::warn!(key = %key, "Duplicate day entry, ignoring");
      }
      Ok(day) => {
        by_day.insert(day, sessions.as_slice());
      }
      Err(_) => tracing::warn!(key = %key, "Unknown day key, ignoring its sessions"),
    }
  }

  Weekday::ALL
    .into_iter()
    .map(|day| {
      let sessions = by_day.get(&day).copied().unwrap_or(&[]);
      (day, normalize_day(day, sessions, layout))
    })
    .collect()
}

pub fn normalize_week(raw: &RawWeek, layout: PlanLayout) -> Result<Week, NormalizeError> {
  let days = raw.days.as_ref().ok_or(NormalizeError::InvalidWeek(raw.week))?;

  Ok(Week {
    week: raw.week,
    phase: raw.phase.clone().unwrap_or_default(),
    hours_target: raw.hours_target.as_ref().map(RawLabel::as_text).unwrap_or_default(),
    notes: raw.notes.clone().unwrap_or_default(),
    days: normalize_days(days, layout),
    coach_note: None,
  })
}
