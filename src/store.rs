//! Override store
//!
//! Week overrides, completion checks and the selected week live in a single
//! JSON document (one row). Every write replaces the whole document.

use serde::Serialize;
use sqlx::SqlitePool;

use crate::models::PersistedState;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("Failed to serialize plan state: {0}")]
  Serialize(#[from] serde_json::Error),

  #[error("Invalid state document: {0}")]
  InvalidDocument(String),
}

impl Serialize for StoreError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

async fn read_document(pool: &SqlitePool) -> Result<Option<String>, StoreError> {
  let document: Option<String> =
    sqlx::query_scalar("SELECT document FROM plan_state WHERE id = 1")
      .fetch_optional(pool)
      .await?;
  Ok(document)
}

async fn write_document(pool: &SqlitePool, document: &str) -> Result<(), StoreError> {
  sqlx::query(
    r#"
    INSERT INTO plan_state (id, document, updated_at)
    VALUES (1, ?1, CURRENT_TIMESTAMP)
    ON CONFLICT(id) DO UPDATE SET
      document = excluded.document,
      updated_at = excluded.updated_at
    "#,
  )
  .bind(document)
  .execute(pool)
  .await?;
  Ok(())
}

/// Load the stored state. A missing or unreadable document is an empty state.
pub async fn load_state(pool: &SqlitePool) -> Result<PersistedState, StoreError> {
  let document = read_document(pool).await?;
  Ok(PersistedState::from_document(document.as_deref()))
}

/// Replace the stored document with `state`
pub async fn save_state(pool: &SqlitePool, state: &PersistedState) -> Result<(), StoreError> {
  write_document(pool, &state.to_document()?).await
}

/// The stored document as-is, `{}` if nothing was saved yet
pub async fn export_state(pool: &SqlitePool) -> Result<String, StoreError> {
  Ok(read_document(pool).await?.unwrap_or_else(|| "{}".to_string()))
}

/// Replace the stored document with `document` verbatim. Must be JSON.
pub async fn import_state(pool: &SqlitePool, document: &str) -> Result<(), StoreError> {
  serde_json::from_str::<serde_json::Value>(document)
    .map_err(|e| StoreError::InvalidDocument(e.to_string()))?;
  write_document(pool, document).await?;
  tracing::info!(bytes = document.len(), "Plan state imported");
  Ok(())
}

/// Drop every week override; completion checks and the selected week stay
pub async fn reset_overrides(pool: &SqlitePool) -> Result<(), StoreError> {
  let mut state = load_state(pool).await?;
  state.clear_overrides();
  save_state(pool, &state).await?;
  tracing::info!("Week overrides cleared");
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::{WeekOverride, Weekday};
  use crate::progress::toggle_completion;
  use crate::test_utils::*;
  use serial_test::serial;

  #[tokio::test]
  #[serial]
  async fn test_load_empty_store() {
    let pool = setup_test_db().await;

    let state = load_state(&pool).await.unwrap();
    assert_eq!(state, PersistedState::default());
    assert_eq!(export_state(&pool).await.unwrap(), "{}");

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  #[serial]
  async fn test_corrupt_document_loads_empty() {
    let pool = setup_test_db().await;
    seed_raw_document(&pool, "{\"weekOverrides\": [oops").await;

    let state = load_state(&pool).await.unwrap();
    assert_eq!(state, PersistedState::default());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  #[serial]
  async fn test_save_then_load() {
    let pool = setup_test_db().await;

    let mut state = PersistedState {
      session_checks: toggle_completion(Default::default(), 2, Weekday::Wed, 1, true),
      selected_week: Some(2),
      ..Default::default()
    };
    state.set_override(
      2,
      WeekOverride {
        days: Default::default(),
        coach_note: "Easy week.".to_string(),
      },
    );
    save_state(&pool, &state).await.unwrap();

    assert_eq!(load_state(&pool).await.unwrap(), state);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  #[serial]
  async fn test_import_export_verbatim() {
    let pool = setup_test_db().await;
    let document = r#"{"weekOverrides":{},"sessionChecks":{"1":{"Mon":{"0":true}}},"selectedWeek":1}"#;

    import_state(&pool, document).await.unwrap();
    assert_eq!(export_state(&pool).await.unwrap(), document);

    let state = load_state(&pool).await.unwrap();
    assert_eq!(state.selected_week, Some(1));

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  #[serial]
  async fn test_import_rejects_non_json() {
    let pool = setup_test_db().await;
    import_state(&pool, "{}").await.unwrap();

    let result = import_state(&pool, "definitely not json").await;
    assert!(matches!(result, Err(StoreError::InvalidDocument(_))));
    assert_eq!(export_state(&pool).await.unwrap(), "{}");

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  #[serial]
  async fn test_reset_clears_overrides_only() {
    let pool = setup_test_db().await;
    let mut state = PersistedState {
      session_checks: toggle_completion(Default::default(), 1, Weekday::Mon, 0, true),
      ..Default::default()
    };
    for week in [1, 2] {
      state.set_override(
        week,
        WeekOverride {
          days: Default::default(),
          coach_note: String::new(),
        },
      );
    }
    save_state(&pool, &state).await.unwrap();

    reset_overrides(&pool).await.unwrap();

    let after = load_state(&pool).await.unwrap();
    assert!(after.week_overrides.is_empty());
    assert_eq!(after.session_checks, state.session_checks);

    teardown_test_db(pool).await;
  }
}
