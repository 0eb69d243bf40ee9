use std::env;
use std::path::PathBuf;
use url::Url;

use crate::models::PlanLayout;
use crate::plan_source::PlanLocation;

// ---------------------------------------------------------------------------
/// Configuration Constants
// ---------------------------------------------------------------------------

const DEFAULT_PLAN_PATH: &str = "data/plan.json";
const DEFAULT_DB_PATH: &str = "tri-adapt.db";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
  #[error("Invalid value for {var}: {value}")]
  InvalidValue { var: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
  pub plan: PlanLocation,
  pub db_path: PathBuf,
  /// Overrides the layout declared by the plan document
  pub layout: Option<PlanLayout>,
}

impl AppConfig {
  /// Read from the environment. Call `dotenvy::dotenv()` first to pick up `.env`.
  ///
  /// - `TRI_PLAN_URL`: plan document URL (takes precedence)
  /// - `TRI_PLAN_PATH`: local plan file, default `data/plan.json`
  /// - `TRI_DB_PATH`: override store database, default `tri-adapt.db`
  /// - `TRI_PLAN_LAYOUT`: `slots` or `roles`
  pub fn from_env() -> Result<Self, ConfigError> {
    let plan = match env::var("TRI_PLAN_URL") {
      Ok(raw) => PlanLocation::Remote(Url::parse(&raw).map_err(|_| ConfigError::InvalidValue {
        var: "TRI_PLAN_URL".into(),
        value: raw.clone(),
      })?),
      Err(_) => PlanLocation::File(
        env::var("TRI_PLAN_PATH")
          .unwrap_or_else(|_| DEFAULT_PLAN_PATH.to_string())
          .into(),
      ),
    };

    let db_path = env::var("TRI_DB_PATH")
      .unwrap_or_else(|_| DEFAULT_DB_PATH.to_string())
      .into();

    let layout = env::var("TRI_PLAN_LAYOUT")
      .ok()
      .map(|raw| {
        raw.parse::<PlanLayout>().map_err(|_| ConfigError::InvalidValue {
          var: "TRI_PLAN_LAYOUT".into(),
          value: raw.clone(),
        })
      })
      .transpose()?;

    Ok(Self {
      plan,
      db_path,
      layout,
    })
  }
}
