use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::duration::{format_minutes, NO_DURATION};

// ---------------------------------------------------------------------------
/// Weekdays
// ---------------------------------------------------------------------------

/// Calendar order is the ordering, so a `BTreeMap<Weekday, _>` iterates Mon..Sun.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
  #[serde(alias = "mon", alias = "Monday", alias = "monday")]
  Mon,
  #[serde(alias = "tue", alias = "Tuesday", alias = "tuesday")]
  Tue,
  #[serde(alias = "wed", alias = "Wednesday", alias = "wednesday")]
  Wed,
  #[serde(alias = "thu", alias = "Thursday", alias = "thursday")]
  Thu,
  #[serde(alias = "fri", alias = "Friday", alias = "friday")]
  Fri,
  #[serde(alias = "sat", alias = "Saturday", alias = "saturday")]
  Sat,
  #[serde(alias = "sun", alias = "Sunday", alias = "sunday")]
  Sun,
}

impl Weekday {
  pub const ALL: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Weekday::Mon => "Mon",
      Weekday::Tue => "Tue",
      Weekday::Wed => "Wed",
      Weekday::Thu => "Thu",
      Weekday::Fri => "Fri",
      Weekday::Sat => "Sat",
      Weekday::Sun => "Sun",
    }
  }

  fn index(&self) -> usize {
    *self as usize
  }

  /// Previous day within the same week (None for Monday)
  pub fn prev(&self) -> Option<Weekday> {
    self.index().checked_sub(1).map(|i| Self::ALL[i])
  }

  /// Next day within the same week (None for Sunday)
  pub fn next(&self) -> Option<Weekday> {
    Self::ALL.get(self.index() + 1).copied()
  }
}

impl fmt::Display for Weekday {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Weekday {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let lower = s.trim().to_ascii_lowercase();
    Self::ALL
      .into_iter()
      .find(|d| {
        let short = d.as_str().to_ascii_lowercase();
        lower.len() >= 3 && lower.starts_with(&short) && full_name(*d).starts_with(&lower)
      })
      .ok_or_else(|| format!("Unknown weekday: {}", s))
  }
}

fn full_name(day: Weekday) -> &'static str {
  match day {
    Weekday::Mon => "monday",
    Weekday::Tue => "tuesday",
    Weekday::Wed => "wednesday",
    Weekday::Thu => "thursday",
    Weekday::Fri => "friday",
    Weekday::Sat => "saturday",
    Weekday::Sun => "sunday",
  }
}

// ---------------------------------------------------------------------------
/// Session Classification
// ---------------------------------------------------------------------------

/// Session type. `Off` is the non-training marker; unknown types are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SessionType {
  Swim,
  Bike,
  Run,
  Mobility,
  Strength,
  Race,
  Off,
  Other(String),
}

impl SessionType {
  pub fn as_str(&self) -> &str {
    match self {
      SessionType::Swim => "swim",
      SessionType::Bike => "bike",
      SessionType::Run => "run",
      SessionType::Mobility => "mobility",
      SessionType::Strength => "strength",
      SessionType::Race => "race",
      SessionType::Off => "off",
      SessionType::Other(name) => name,
    }
  }

  pub fn is_off(&self) -> bool {
    matches!(self, SessionType::Off)
  }

  pub fn is_running(&self) -> bool {
    matches!(self, SessionType::Run)
  }

  /// Canonical duration for sessions that don't carry one
  pub fn default_duration(&self) -> String {
    match self {
      SessionType::Swim => "45m".to_string(),
      SessionType::Bike => "60m".to_string(),
      SessionType::Run => "40m".to_string(),
      SessionType::Mobility => "20m".to_string(),
      SessionType::Strength => "30m".to_string(),
      SessionType::Race => NO_DURATION.to_string(),
      SessionType::Off => NO_DURATION.to_string(),
      SessionType::Other(_) => format_minutes(30),
    }
  }

  pub fn default_details(&self) -> &'static str {
    match self {
      SessionType::Swim => "Technique swim: drills, then relaxed aerobic sets.",
      SessionType::Bike => "Aerobic ride at conversational effort, steady cadence.",
      SessionType::Run => "Aerobic run, relaxed form, finish feeling fresh.",
      SessionType::Mobility => "Mobility and core: hips, ankles, thoracic spine.",
      SessionType::Strength => "Strength circuit: single-leg work, core, posterior chain.",
      SessionType::Race => "Race day. Trust the taper and execute the plan.",
      SessionType::Off => "Rest.",
      SessionType::Other(_) => "Easy aerobic work.",
    }
  }

  pub fn default_priority(&self) -> Priority {
    match self {
      SessionType::Race => Priority::High,
      SessionType::Swim | SessionType::Bike | SessionType::Run => Priority::Medium,
      _ => Priority::Low,
    }
  }
}

impl From<String> for SessionType {
  fn from(raw: String) -> Self {
    match raw.trim().to_ascii_lowercase().as_str() {
      "swim" | "swimming" => SessionType::Swim,
      "bike" | "ride" | "cycling" | "cycle" => SessionType::Bike,
      "run" | "running" => SessionType::Run,
      "mobility" | "yoga" | "stretch" | "stretching" => SessionType::Mobility,
      "strength" | "gym" => SessionType::Strength,
      "race" => SessionType::Race,
      "off" | "rest" => SessionType::Off,
      _ => SessionType::Other(raw.trim().to_string()),
    }
  }
}

impl From<SessionType> for String {
  fn from(value: SessionType) -> Self {
    value.as_str().to_string()
  }
}

impl fmt::Display for SessionType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = self.as_str();
    let mut chars = name.chars();
    match chars.next() {
      Some(first) => write!(f, "{}{}", first.to_uppercase(), chars.as_str()),
      None => Ok(()),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
  High,
  #[serde(alias = "moderate")]
  Medium,
  Low,
}

impl FromStr for Priority {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "high" => Ok(Self::High),
      "medium" | "moderate" => Ok(Self::Medium),
      "low" => Ok(Self::Low),
      _ => Err(format!("Unknown priority: {}", s)),
    }
  }
}

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Slot {
  AM,
  PM,
}

impl Slot {
  pub const ALL: [Slot; 2] = [Slot::AM, Slot::PM];
}

impl FromStr for Slot {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_uppercase().as_str() {
      "AM" => Ok(Self::AM),
      "PM" => Ok(Self::PM),
      _ => Err(format!("Unknown slot: {}", s)),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
  Primary,
  Support,
}

impl FromStr for Role {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "primary" => Ok(Self::Primary),
      "support" => Ok(Self::Support),
      _ => Err(format!("Unknown role: {}", s)),
    }
  }
}

/// Which canonical day shape a plan uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanLayout {
  /// Exactly two sessions per day, tagged AM / PM
  #[default]
  Slots,
  /// Any number of sessions per day, tagged primary / support
  Roles,
}

impl FromStr for PlanLayout {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "slots" | "slot" => Ok(Self::Slots),
      "roles" | "role" => Ok(Self::Roles),
      _ => Err(format!("Unknown plan layout: {}", s)),
    }
  }
}

// ---------------------------------------------------------------------------
/// Normalized Week
// ---------------------------------------------------------------------------

/// A canonical session. Within a day, its position in the list is its identity
/// for completion tracking, so days are never reordered after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
  #[serde(rename = "type")]
  pub session_type: SessionType,
  pub duration: String,
  pub details: String,
  pub priority: Priority,
  pub optional: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub slot: Option<Slot>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub role: Option<Role>,
}

impl Session {
  /// Session of `session_type` with its canonical duration, details and priority
  pub fn with_defaults(session_type: SessionType) -> Self {
    Self {
      duration: session_type.default_duration(),
      details: session_type.default_details().to_string(),
      priority: session_type.default_priority(),
      optional: false,
      slot: None,
      role: None,
      session_type,
    }
  }

  pub fn is_training(&self) -> bool {
    !self.session_type.is_off()
  }
}

pub type DayMap = BTreeMap<Weekday, Vec<Session>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Week {
  pub week: u32,
  pub phase: String,
  pub hours_target: String,
  pub notes: Vec<String>,
  pub days: DayMap,
  /// Set by the most recent adaptation, never part of the base plan
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub coach_note: Option<String>,
}

impl Week {
  pub fn sessions(&self, day: Weekday) -> &[Session] {
    self.days.get(&day).map(Vec::as_slice).unwrap_or(&[])
  }

  /// Iterate (day, index, session) in calendar then positional order
  pub fn iter_sessions(&self) -> impl Iterator<Item = (Weekday, usize, &Session)> {
    self
      .days
      .iter()
      .flat_map(|(day, sessions)| sessions.iter().enumerate().map(move |(i, s)| (*day, i, s)))
  }

  /// Apply `f` to every session as (day, index, session), keeping count and order
  pub fn map_sessions(mut self, mut f: impl FnMut(Weekday, usize, Session) -> Session) -> Self {
    for (day, sessions) in self.days.iter_mut() {
      let taken = std::mem::take(sessions);
      *sessions = taken
        .into_iter()
        .enumerate()
        .map(|(i, s)| f(*day, i, s))
        .collect();
    }
    self
  }
}

// ---------------------------------------------------------------------------
/// Base Plan (wire shape, read-only)
// ---------------------------------------------------------------------------

/// Text or a bare number ("8-10" or 9)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawLabel {
  Text(String),
  Number(f64),
}

impl RawLabel {
  pub fn as_text(&self) -> String {
    match self {
      RawLabel::Text(s) => s.clone(),
      RawLabel::Number(n) if n.fract() == 0.0 => format!("{}", *n as i64),
      RawLabel::Number(n) => n.to_string(),
    }
  }

  /// Numbers are minutes
  pub fn as_duration(&self) -> String {
    match self {
      RawLabel::Text(s) => s.clone(),
      RawLabel::Number(n) => format_minutes(n.max(0.0).round() as u32),
    }
  }
}

/// A session as authored upstream; every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSession {
  #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
  pub session_type: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub duration: Option<RawLabel>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub details: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub priority: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub optional: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub slot: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub role: Option<String>,
}

impl From<&Session> for RawSession {
  fn from(s: &Session) -> Self {
    Self {
      session_type: Some(s.session_type.as_str().to_string()),
      duration: Some(RawLabel::Text(s.duration.clone())),
      details: Some(s.details.clone()),
      priority: Some(
        match s.priority {
          Priority::High => "high",
          Priority::Medium => "medium",
          Priority::Low => "low",
        }
        .to_string(),
      ),
      optional: Some(s.optional),
      slot: s.slot.map(|slot| format!("{:?}", slot)),
      role: s.role.map(|role| {
        match role {
          Role::Primary => "primary",
          Role::Support => "support",
        }
        .to_string()
      }),
    }
  }
}

/// Day map as authored: keys are unvalidated weekday names.
pub type RawDayMap = BTreeMap<String, Vec<RawSession>>;

pub fn raw_days(days: &DayMap) -> RawDayMap {
  days
    .iter()
    .map(|(day, sessions)| (day.to_string(), sessions.iter().map(RawSession::from).collect()))
    .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawWeek {
  pub week: u32,
  #[serde(default)]
  pub phase: Option<String>,
  #[serde(default)]
  pub hours_target: Option<RawLabel>,
  #[serde(default)]
  pub notes: Option<Vec<String>>,
  /// Absent day map is a contract violation, not data variance
  #[serde(default)]
  pub days: Option<RawDayMap>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
  pub start_date: NaiveDate,
  pub race_date: NaiveDate,
  #[serde(default)]
  pub layout: PlanLayout,
  pub weeks: Vec<RawWeek>,
}

impl Plan {
  pub fn week(&self, number: u32) -> Option<&RawWeek> {
    self.weeks.iter().find(|w| w.week == number)
  }
}
