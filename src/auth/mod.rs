use axum::Router;

use crate::state::AppState;

mod claims;
mod dto;
pub(crate) mod extractors;
pub mod gate;
pub mod handlers;
pub(crate) mod jwt;
pub(crate) mod password;
mod repo;
pub(crate) mod repo_types;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
