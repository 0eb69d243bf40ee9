use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::plan::{RawDayMap, Weekday};

/// Per-week, per-day, per-position completion flags
pub type CompletionMap = BTreeMap<u32, BTreeMap<Weekday, BTreeMap<usize, bool>>>;

/// Persisted result of the last adaptation of one week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekOverride {
  pub days: RawDayMap,
  #[serde(default)]
  pub coach_note: String,
}

/// Everything the override store keeps, as one document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
  #[serde(default)]
  pub week_overrides: BTreeMap<u32, WeekOverride>,
  #[serde(default)]
  pub session_checks: CompletionMap,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub selected_week: Option<u32>,
}

impl PersistedState {
  /// Parse a stored document. Missing or corrupt documents mean "no state yet".
  pub fn from_document(document: Option<&str>) -> Self {
    let Some(document) = document.filter(|d| !d.trim().is_empty()) else {
      return Self::default();
    };
    match serde_json::from_str(document) {
      Ok(state) => state,
      Err(e) => {
        tracing::warn!(error = %e, "Stored plan state is unreadable, starting empty");
        Self::default()
      }
    }
  }

  pub fn to_document(&self) -> Result<String, serde_json::Error> {
    serde_json::to_string(self)
  }

  pub fn override_for(&self, week: u32) -> Option<&WeekOverride> {
    self.week_overrides.get(&week)
  }

  /// Replace the whole override for `week`
  pub fn set_override(&mut self, week: u32, value: WeekOverride) {
    self.week_overrides.insert(week, value);
  }

  pub fn clear_overrides(&mut self) {
    self.week_overrides.clear();
  }
}
