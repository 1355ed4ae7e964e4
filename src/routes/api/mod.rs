use axum::Router;

use crate::server::AppState;

mod memos;
mod sum;

pub use memos::create_memo_routes;
pub use sum::create_sum_routes;

pub fn create_api_routes() -> Router<AppState> {
    Router::new()
        .merge(create_sum_routes())
        .merge(create_memo_routes())
}
