//! Base plan retrieval
//!
//! The plan document comes from an HTTP endpoint or a local JSON file. Any
//! failure is reported as a `PlanError`; there is no fallback plan.

use reqwest::Client;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration as StdDuration;
use url::Url;

use crate::models::Plan;
use crate::normalize::NormalizeError;

const REQUEST_TIMEOUT_SECS: u64 = 15;

// ---------------------------------------------------------------------------
/// Error Handling
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PlanError {
  #[error("HTTP request failed: {0}")]
  Request(#[from] reqwest::Error),

  #[error("Plan server returned status {0}")]
  Status(u16),

  #[error("Failed to parse plan: {0}")]
  Parse(#[from] serde_json::Error),

  #[error("Failed to read plan file: {0}")]
  Io(#[from] std::io::Error),

  #[error(transparent)]
  Invalid(#[from] NormalizeError),
}

impl Serialize for PlanError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

/// Where the base plan lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanLocation {
  Remote(Url),
  File(PathBuf),
}

// ---------------------------------------------------------------------------
/// Retrieval
// ---------------------------------------------------------------------------

pub async fn load_plan(location: &PlanLocation) -> Result<Plan, PlanError> {
  match location {
    PlanLocation::Remote(url) => fetch_plan(url).await,
    PlanLocation::File(path) => read_plan_file(path).await,
  }
}

pub async fn fetch_plan(url: &Url) -> Result<Plan, PlanError> {
  let client = Client::builder()
    .timeout(StdDuration::from_secs(REQUEST_TIMEOUT_SECS))
    .build()?;

  let response = client.get(url.clone()).send().await?;

  if !response.status().is_success() {
    let status = response.status().as_u16();
    tracing::warn!(%url, status, "Plan request failed");
    return Err(PlanError::Status(status));
  }

  let body = response.text().await?;
  let plan = parse_plan(&body)?;
  tracing::info!(%url, weeks = plan.weeks.len(), "Plan loaded");
  Ok(plan)
}

pub async fn read_plan_file(path: &Path) -> Result<Plan, PlanError> {
  let body = tokio::fs::read_to_string(path).await?;
  let plan = parse_plan(&body)?;
  tracing::info!(path = %path.display(), weeks = plan.weeks.len(), "Plan loaded");
  Ok(plan)
}

/// Parse a plan document. Every week must carry a day map.
pub fn parse_plan(body: &str) -> Result<Plan, PlanError> {
  let plan: Plan = serde_json::from_str(body)?;
  if let Some(week) = plan.weeks.iter().find(|w| w.days.is_none()) {
    return Err(NormalizeError::InvalidWeek(week.week).into());
  }
  Ok(plan)
}
