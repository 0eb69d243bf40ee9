use crate::db::AppState;
use crate::store;

/// Drop every week's adaptation; completion checks are kept
pub async fn reset_overrides(state: &AppState) -> Result<(), String> {
  let _guard = state.write_lock.lock().await;
  store::reset_overrides(&state.db)
    .await
    .map_err(|e| format!("Failed to reset overrides: {}", e))
}

/// The whole stored document as JSON text
pub async fn export_state(state: &AppState) -> Result<String, String> {
  store::export_state(&state.db)
    .await
    .map_err(|e| format!("Failed to export plan state: {}", e))
}

/// Replace the whole stored document. Nothing is merged.
pub async fn import_state(state: &AppState, document: String) -> Result<(), String> {
  let _guard = state.write_lock.lock().await;
  store::import_state(&state.db, &document)
    .await
    .map_err(|e| format!("Failed to import plan state: {}", e))
}
