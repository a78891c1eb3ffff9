use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

mod accounts;
mod app;
mod auth;
mod bookings;
mod config;
mod error;
mod extract;
mod mail;
mod response;
mod state;
mod validation;

use crate::{config::AppConfig, mail::SmtpMailer, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "ridebook=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = Arc::new(AppConfig::from_env()?);

    let db = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .context("run migrations")?;

    let mailer = Arc::new(SmtpMailer::connect(&config.smtp)?);
    let state = AppState::from_pool(config, db, mailer);

    app::serve(app::build_app(state)).await
}
