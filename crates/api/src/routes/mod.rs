pub mod health;
pub mod newsletter;
pub mod pages;

use axum::Router;

use crate::state::AppState;

pub fn v1_router(state: AppState) -> Router {
    newsletter::router(state)
}

pub fn health_router(state: AppState) -> Router {
    health::router(state)
}
