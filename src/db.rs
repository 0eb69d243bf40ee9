use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::path::Path;
use tokio::sync::Mutex;

use crate::models::{Plan, PlanLayout};

pub type DbPool = SqlitePool;

/// Application state passed to every command
pub struct AppState {
  pub db: DbPool,
  /// Base plan as retrieved; never modified
  pub plan: Plan,
  pub layout: PlanLayout,
  /// Held across each load-modify-save of the stored document
  pub write_lock: Mutex<()>,
}

impl AppState {
  pub fn new(db: DbPool, plan: Plan, layout: PlanLayout) -> Self {
    Self {
      db,
      plan,
      layout,
      write_lock: Mutex::new(()),
    }
  }
}

/// Initialize the database connection pool and run migrations
pub async fn initialize_db(db_path: &Path) -> Result<DbPool, sqlx::Error> {
  if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
    tokio::fs::create_dir_all(parent).await?;
  }
  let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

  tracing::info!(path = %db_path.display(), "Initializing database");

  let pool = SqlitePoolOptions::new()
    .max_connections(5)
    .connect(&db_url)
    .await?;

  sqlx::migrate!("./migrations").run(&pool).await?;

  tracing::info!("Database initialized successfully");

  Ok(pool)
}
