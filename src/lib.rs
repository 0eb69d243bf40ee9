pub mod adaptation;
pub mod commands;
pub mod config;
pub mod db;
pub mod duration;
pub mod models;
pub mod normalize;
pub mod plan_source;
pub mod progress;
pub mod schedule;
pub mod store;

#[cfg(test)]
mod test_utils;

use config::AppConfig;
use db::AppState;
use plan_source::PlanError;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
  #[error(transparent)]
  Config(#[from] config::ConfigError),

  #[error("Failed to initialize database: {0}")]
  Database(#[from] sqlx::Error),

  #[error("Failed to load base plan: {0}")]
  Plan(#[from] PlanError),
}

impl Serialize for StartupError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

/// Install the global subscriber. `RUST_LOG` wins over the default `info`.
pub fn init_tracing() {
  let _ = tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tri_adapt=info".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .try_init();
}

/// Open the override store and load the base plan
pub async fn initialize(config: AppConfig) -> Result<AppState, StartupError> {
  let pool = db::initialize_db(&config.db_path).await?;
  let plan = plan_source::load_plan(&config.plan).await?;
  let layout = config.layout.unwrap_or(plan.layout);

  tracing::info!(weeks = plan.weeks.len(), ?layout, "Plan ready");

  Ok(AppState::new(pool, plan, layout))
}

/// Load `.env`, read configuration from the environment and initialize
pub async fn initialize_from_env() -> Result<AppState, StartupError> {
  dotenvy::dotenv().ok();
  initialize(AppConfig::from_env()?).await
}
