mod admin;
mod app;
mod audit;
mod auth;
mod config;
mod error;
mod schema;
mod state;
mod stats;
mod users;

use anyhow::Context;

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "triplog=debug,axum=info,tower_http=info".to_string());
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

    let app_state = AppState::init().await?;

    // Schema setup is fatal when it fails: a half-migrated store must not
    // serve traffic.
    sqlx::migrate!("./migrations")
        .run(&app_state.db)
        .await
        .context("run baseline migrations")?;
    schema::ensure_admin_schema(&app_state.db)
        .await
        .context("ensure admin schema")?;

    let app = app::build_app(app_state);
    app::serve(app).await
}
