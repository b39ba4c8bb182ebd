use axum::{extract::State, Json};

use crate::api::middleware::AppError;
use crate::api::routes::AppState;

/// Trigger a full metadata reconciliation against the executor.
pub async fn sync_all(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    state.sync.sync_all().await?;
    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Metadata sync completed successfully",
    })))
}
