use axum::{Router, http::Method};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::repositories::{InMemoryMemoRepository, MemoRepository};
use crate::routes::create_api_routes;
use crate::services::{GeminiProvider, MemoService, SummaryService};

/// アプリケーション全体で共有される状態
#[derive(Clone)]
pub struct AppState {
    /// サービス層
    pub memo_service: Arc<MemoService>,
    pub summary_service: Arc<SummaryService>,
    /// アプリケーション設定
    pub config: Arc<Config>,
}

impl AppState {
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let memo_repo: Arc<dyn MemoRepository> = match &config.storage.seed_file {
            Some(path) => Arc::new(InMemoryMemoRepository::from_seed_file(path)?),
            None => Arc::new(InMemoryMemoRepository::new()),
        };

        let provider = Arc::new(GeminiProvider::from_config(&config.gemini));
        let summary_service = SummaryService::new(config.gemini.api_key.clone(), provider);
        if !summary_service.has_credential() {
            tracing::warn!("GEMINI_API_KEY is not set; /api/summarize will fail");
        }

        Ok(Self {
            memo_service: Arc::new(MemoService::new(memo_repo)),
            summary_service: Arc::new(summary_service),
            config: Arc::new(config),
        })
    }
}

/// CORSなしのルーター。テストからも使う
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", create_api_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn start_server(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    tracing::info!("Configuring CORS...");
    let allowed_origins = state.config.server.get_allowed_origins(&addr)?;

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(vec![Method::GET, Method::POST, Method::PATCH])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    let app = build_router(state).layer(cors);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Server is running on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
