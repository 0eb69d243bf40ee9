use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::plan::Weekday;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FatigueLevel {
  Low,
  #[default]
  Normal,
  High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SleepQuality {
  Good,
  #[default]
  #[serde(alias = "ok")]
  Fair,
  Poor,
}

/// How the athlete feels right now. Built per adaptation request and never
/// stored; only the adapted week it produces is persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserStateSnapshot {
  #[serde(default)]
  pub fatigue: FatigueLevel,
  #[serde(default)]
  pub sleep: SleepQuality,
  /// Lowercased body-area tokens
  #[serde(default)]
  pub soreness: Vec<String>,
  #[serde(default)]
  pub illness: bool,
  #[serde(default)]
  pub injury: bool,
}

impl UserStateSnapshot {
  pub fn new(
    fatigue: FatigueLevel,
    sleep: SleepQuality,
    soreness: &str,
    illness: bool,
    injury: bool,
  ) -> Self {
    Self {
      fatigue,
      sleep,
      soreness: parse_soreness(soreness),
      illness,
      injury,
    }
  }
}

/// "Calf, left KNEE,," -> ["calf", "left knee"]
pub fn parse_soreness(text: &str) -> Vec<String> {
  text
    .split(',')
    .map(|s| s.trim().to_lowercase())
    .filter(|s| !s.is_empty())
    .collect()
}

/// A session the athlete skipped, addressed by day and position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissedSession {
  pub day: Weekday,
  pub index: usize,
}

/// Parses the "Tue|1" form used by session pickers
impl FromStr for MissedSession {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let (day, index) = s
      .split_once('|')
      .ok_or_else(|| format!("Invalid missed session token: {}", s))?;
    Ok(Self {
      day: day.parse()?,
      index: index
        .trim()
        .parse()
        .map_err(|_| format!("Invalid session index in token: {}", s))?,
    })
  }
}
