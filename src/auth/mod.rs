mod dto;
mod handlers;
pub mod jwt;
mod password;
pub mod repo;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        .route("/auth/refresh", post(handlers::refresh))
        .route("/auth/demo-login", post(handlers::demo_login))
        .route("/me", get(handlers::get_me))
        .route("/goal", get(handlers::get_goal).put(handlers::set_goal))
}
