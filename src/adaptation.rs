//! Adaptation rule engine
//!
//! Rewrites a normalized week for how the athlete feels. Rules run in a fixed
//! order, each a pure `Week -> Week` step fed the previous step's output:
//!
//! 1. Illness: shorten everything, make it optional, stop here
//! 2. Protect-run: injury or lower-body soreness swaps runs for low-impact work
//! 3. Fatigue / poor sleep: trim volume, cap effort
//! 4. Missed sessions / general soreness: flag missed sessions optional
//!
//! Reductions compound: each rule recomputes from the current duration.
//! Sessions are never removed or reordered (completion is positional).

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

use crate::duration::{format_reduced, parse_duration, reduce_label};
use crate::models::{
  FatigueLevel, MissedSession, Priority, Session, SessionType, SleepQuality, UserStateSnapshot,
  Week, Weekday,
};

// ---------------------------------------------------------------------------
/// Rule Constants
// ---------------------------------------------------------------------------

pub const ILLNESS_REDUCTION: f64 = 0.4;
pub const PROTECT_RUN_REDUCTION: f64 = 0.35;
pub const FATIGUE_REDUCTION: f64 = 0.25;

/// Baseline minutes for the run substitutes
const EASY_BIKE_BASELINE: u32 = 60;
const LOW_IMPACT_BASELINE: u32 = 30;

const LOWER_BODY_KEYWORDS: [&str; 11] = [
  "quad", "calf", "ham", "glute", "hip", "knee", "ankle", "leg", "foot", "shin", "achilles",
];

pub const ILLNESS_NOTE: &str =
  "Illness mode: everything is shortened and optional. Rest comes first until symptoms clear.";
pub const PROTECT_RUN_NOTE: &str =
  "Runs swapped for low-impact work to protect the lower body. Keep everything easy.";
pub const FATIGUE_NOTE: &str =
  "Fatigue or poor sleep: volume trimmed about 25% and effort capped at easy/steady.";
pub const MISSED_NOTE: &str =
  "Missed sessions are dropped, not stacked. Let soreness settle before adding load.";

pub const ILLNESS_DETAILS: &str =
  "Illness mode: very easy or skip it. Stop if symptoms get worse.";
pub const REST_DETAILS: &str = "Rest day: prioritize rest, sleep and easy walking.";
const EASY_BIKE_DETAILS: &str = "No running. Easy spin instead, seated and smooth; avoid intensity.";
const LOW_IMPACT_DETAILS: &str =
  "No running. Light mobility or elliptical instead; avoid intensity.";
const MISSED_DETAILS: &str = "Dropped to avoid stacking missed work. Optional if you feel fresh.";

// ---------------------------------------------------------------------------
/// Result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Adaptation {
  pub week: Week,
  pub coach_note: String,
}

struct AdaptationInput<'a> {
  state: &'a UserStateSnapshot,
  missed: &'a [MissedSession],
}

struct Rule {
  name: &'static str,
  applies: fn(&AdaptationInput) -> bool,
  transform: fn(Week, &AdaptationInput) -> Week,
  advisory: &'static str,
}

/// Rules after the illness short-circuit, in evaluation order
static RULES: [Rule; 3] = [
  Rule {
    name: "protect_run",
    applies: needs_run_protection,
    transform: protect_run,
    advisory: PROTECT_RUN_NOTE,
  },
  Rule {
    name: "fatigue",
    applies: is_fatigued,
    transform: ease_for_fatigue,
    advisory: FATIGUE_NOTE,
  },
  Rule {
    name: "missed",
    applies: has_missed_or_sore,
    transform: drop_missed,
    advisory: MISSED_NOTE,
  },
];

fn needs_run_protection(input: &AdaptationInput) -> bool {
  input.state.injury || has_lower_body_soreness(&input.state.soreness)
}

fn is_fatigued(input: &AdaptationInput) -> bool {
  input.state.fatigue == FatigueLevel::High || input.state.sleep == SleepQuality::Poor
}

fn has_missed_or_sore(input: &AdaptationInput) -> bool {
  !input.missed.is_empty() || has_general_soreness(&input.state.soreness)
}

// ---------------------------------------------------------------------------
/// Engine
// ---------------------------------------------------------------------------

/// Adapt `week` to `state`. Pure: the caller decides whether to persist.
pub fn apply_adaptation(
  week: &Week,
  state: &UserStateSnapshot,
  missed: &[MissedSession],
) -> Adaptation {
  let input = AdaptationInput { state, missed };

  if state.illness {
    tracing::info!(week = week.week, "Illness mode, skipping remaining rules");
    return finish(illness_mode(week.clone(), &input), vec![ILLNESS_NOTE]);
  }

  let fired: Vec<&Rule> = RULES.iter().filter(|rule| (rule.applies)(&input)).collect();

  let mut adapted = fired.iter().fold(week.clone(), |current, rule| {
    tracing::debug!(week = current.week, rule = rule.name, "Applying rule");
    (rule.transform)(current, &input)
  });
  if !fired.is_empty() {
    adapted = rest_details(adapted);
  }

  finish(adapted, fired.iter().map(|rule| rule.advisory).collect())
}

fn finish(mut week: Week, advisories: Vec<&str>) -> Adaptation {
  let coach_note = advisories.join(" ");
  week.coach_note = (!coach_note.is_empty()).then(|| coach_note.clone());
  Adaptation { week, coach_note }
}

pub fn has_lower_body_soreness(tokens: &[String]) -> bool {
  tokens.iter().any(|t| is_lower_body(t))
}

fn has_general_soreness(tokens: &[String]) -> bool {
  tokens.iter().any(|t| !is_lower_body(t))
}

fn is_lower_body(token: &str) -> bool {
  let token = token.to_lowercase();
  LOWER_BODY_KEYWORDS.iter().any(|k| token.contains(k))
}

// ---------------------------------------------------------------------------
/// Rules
// ---------------------------------------------------------------------------

fn illness_mode(week: Week, _input: &AdaptationInput) -> Week {
  week.map_sessions(|_, _, session| {
    if !session.is_training() {
      return session;
    }
    Session {
      duration: reduce_label(&session.duration, ILLNESS_REDUCTION),
      details: ILLNESS_DETAILS.to_string(),
      priority: Priority::Low,
      optional: true,
      ..session
    }
  })
}

fn protect_run(week: Week, _input: &AdaptationInput) -> Week {
  let rest_days: BTreeSet<Weekday> = week
    .days
    .iter()
    .filter(|(_, sessions)| sessions.iter().any(|s| s.session_type.is_off()))
    .map(|(day, _)| *day)
    .collect();

  let rest_adjacent = |day: Weekday| {
    [Some(day), day.prev(), day.next()]
      .into_iter()
      .flatten()
      .any(|d| rest_days.contains(&d))
  };

  week.map_sessions(|day, _, session| {
    if !session.session_type.is_running() {
      return session;
    }
    substitute_run(session, rest_adjacent(day))
  })
}

fn substitute_run(session: Session, rest_adjacent: bool) -> Session {
  let (session_type, substitute_baseline, details) = if rest_adjacent {
    (SessionType::Mobility, LOW_IMPACT_BASELINE, LOW_IMPACT_DETAILS)
  } else {
    (SessionType::Bike, EASY_BIKE_BASELINE, EASY_BIKE_DETAILS)
  };

  let baseline = match parse_duration(&session.duration) {
    0 => substitute_baseline,
    current => current.min(substitute_baseline),
  };

  Session {
    session_type,
    duration: format_reduced(baseline, PROTECT_RUN_REDUCTION),
    details: details.to_string(),
    ..session
  }
}

fn ease_for_fatigue(week: Week, _input: &AdaptationInput) -> Week {
  week.map_sessions(|_, _, session| {
    if !session.is_training() {
      return session;
    }
    let priority = match session.priority {
      Priority::High => Priority::Medium,
      other => other,
    };
    Session {
      duration: reduce_label(&session.duration, FATIGUE_REDUCTION),
      details: format!("Easy/steady only. {}", session.session_type.default_details()),
      priority,
      ..session
    }
  })
}

fn drop_missed(week: Week, input: &AdaptationInput) -> Week {
  let missed: HashSet<(Weekday, usize)> = input
    .missed
    .iter()
    .filter(|m| {
      let known = m.index < week.sessions(m.day).len();
      if !known {
        tracing::debug!(day = %m.day, index = m.index, "Missed session not in week, ignoring");
      }
      known
    })
    .map(|m| (m.day, m.index))
    .collect();

  week.map_sessions(|day, index, session| {
    if !missed.contains(&(day, index)) || !session.is_training() {
      return session;
    }
    Session {
      optional: true,
      details: MISSED_DETAILS.to_string(),
      ..session
    }
  })
}

fn rest_details(week: Week) -> Week {
  week.map_sessions(|_, _, session| {
    if session.is_training() {
      return session;
    }
    Session {
      details: REST_DETAILS.to_string(),
      ..session
    }
  })
}
