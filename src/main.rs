use chrono::Local;
use tri_adapt::commands::{get_week, jump_to_current_week};

/// Print the current week's working copy as JSON
#[tokio::main]
async fn main() {
  tri_adapt::init_tracing();

  let state = match tri_adapt::initialize_from_env().await {
    Ok(state) => state,
    Err(e) => {
      tracing::error!(error = %e, "Startup failed");
      std::process::exit(1);
    }
  };

  let result = async {
    let week_number = jump_to_current_week(&state, Local::now().date_naive()).await?;
    get_week(&state, week_number).await
  }
  .await;

  match result {
    Ok(Some(view)) => match serde_json::to_string_pretty(&view) {
      Ok(json) => println!("{}", json),
      Err(e) => tracing::error!(error = %e, "Failed to render week"),
    },
    Ok(None) => tracing::warn!("Plan has no weeks"),
    Err(e) => tracing::error!(error = %e, "Failed to load week"),
  }

  state.db.close().await;
}
