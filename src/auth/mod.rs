use axum::Router;

use crate::state::AppState;

pub mod dto;
pub mod handlers;
pub mod password;
mod repo;
pub mod repo_types;
pub mod session;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
