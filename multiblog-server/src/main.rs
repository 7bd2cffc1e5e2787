use anyhow::{Context, Result};
use tracing::info;

mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;

use infrastructure::database::{create_pool, run_migrations};
use infrastructure::jwt::JwtService;
use infrastructure::logging::init_logging;
use infrastructure::settings::Settings;
use presentation::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;

    init_logging(&settings.log_level)?;

    let pool = create_pool(&settings.database_url, settings.database_max_connections)
        .await
        .context("failed to connect to PostgreSQL")?;
    run_migrations(&pool)
        .await
        .context("failed to run database migrations")?;

    let jwt = JwtService::new(&settings.jwt_secret, settings.jwt_ttl_seconds);
    info!(
        token_ttl_seconds = jwt.ttl_seconds(),
        tag_assignment = ?settings.tag_assignment,
        "services configured"
    );
    let state = AppState::new(pool, jwt, settings.tag_assignment);

    if let Some(admin) = &settings.admin {
        state
            .auth_service
            .bootstrap_admin(&admin.email, &admin.username, &admin.password)
            .await
            .context("failed to bootstrap admin account")?;
    }

    server::run_http(&settings, state).await
}
