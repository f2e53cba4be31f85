use axum::Router;

use crate::state::AppState;

mod dto;
pub mod handlers;
pub(crate) mod repo;
pub(crate) mod repo_types;
mod services;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::read_routes())
        .merge(handlers::write_routes())
}
