mod app;
mod articles;
mod auth;
mod config;
mod error;
mod state;
mod views;

use crate::auth::password::PasswordScheme;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "articles=debug,axum=info,tower_http=info".to_string());
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

    let app_state = state::AppState::init().await?;
    app_state.migrate().await?;

    if app_state.config.password_scheme == PasswordScheme::Sha256 {
        tracing::warn!(
            scheme = "sha256",
            "passwords are stored as unsalted digests; set PASSWORD_SCHEME=argon2"
        );
    }

    app::serve(app::build_app(app_state)).await
}
