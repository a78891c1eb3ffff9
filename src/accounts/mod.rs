pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;

use axum::{routing::get, Router};

use crate::state::AppState;
use repo::AccountRepo;
use repo_types::{Account, Admin, Driver, Rider};

/// Binds an account type to its repository in the shared state.
pub trait AccountKind: Account {
    fn repo(state: &AppState) -> &dyn AccountRepo<Self>;
}

impl AccountKind for Rider {
    fn repo(state: &AppState) -> &dyn AccountRepo<Self> {
        state.riders.as_ref()
    }
}

impl AccountKind for Driver {
    fn repo(state: &AppState) -> &dyn AccountRepo<Self> {
        state.drivers.as_ref()
    }
}

impl AccountKind for Admin {
    fn repo(state: &AppState) -> &dyn AccountRepo<Self> {
        state.admins.as_ref()
    }
}

/// A nested `/` only answers the bare prefix, so the trailing-slash form of
/// the detail routes is registered explicitly.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/user", handlers::rider_routes())
        .nest("/driver", handlers::driver_routes())
        .nest("/admin", handlers::admin_routes())
        .route("/user/", get(handlers::detail::<Rider>))
        .route("/driver/", get(handlers::detail::<Driver>))
}
