mod dto;
pub mod error;
pub mod handlers;
pub mod labels;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub fn router(upload_limit_bytes: usize) -> Router<AppState> {
    Router::new()
        .merge(handlers::read_routes())
        .merge(handlers::write_routes(upload_limit_bytes))
}
