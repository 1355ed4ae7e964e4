use axum::{
    Router,
    extract::{Path, State},
    response::Json,
    routing::{get, patch},
};

use crate::{
    error::Result,
    memo_models::{Memo, SaveSummaryRequest},
    server::AppState,
};

pub fn create_memo_routes() -> Router<AppState> {
    Router::new()
        .route("/memos/{capture}", get(get_memo))
        .route("/memos/{capture}/summary", patch(save_memo_summary))
}

async fn get_memo(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Memo>> {
    let memo = state.memo_service.find_by_id(&id).await?;
    Ok(Json(memo))
}

async fn save_memo_summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SaveSummaryRequest>,
) -> Result<Json<Memo>> {
    let memo = state.memo_service.save_summary(&id, req.summary).await?;
    tracing::info!(memo_id = %id, "memo summary saved");
    Ok(Json(memo))
}
