use axum::{Router, body::Bytes, extract::State, response::Json, routing::post};

use crate::{error::Result, memo_models::SummaryResponse, server::AppState};

pub fn create_sum_routes() -> Router<AppState> {
    Router::new().route("/summarize", post(summarize_memo))
}

// Json抽出子は使わない: APIキーの確認をボディ解析より先に行うため
async fn summarize_memo(State(state): State<AppState>, body: Bytes) -> Result<Json<SummaryResponse>> {
    let summary = state.summary_service.summarize_body(&body).await?;
    Ok(Json(summary))
}
