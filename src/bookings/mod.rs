pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;

use axum::{
    routing::{delete, get, put},
    Router,
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    let root = get(handlers::detail).post(handlers::create);
    Router::new()
        .route("/booking", root.clone())
        .route("/booking/", root)
        .route("/booking/list", get(handlers::list))
        .route("/booking/booking-update", put(handlers::assign_driver))
        .route("/booking/:id", delete(handlers::delete))
}
