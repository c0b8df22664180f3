use std::sync::Arc;

use dotenvy::dotenv;
use tracing::info;

use shaft::bootstrap::app_context::{AppContext, AppServices};
use shaft::bootstrap::config::Config;
use shaft::infrastructure::db;
use shaft::infrastructure::db::repositories::ledger_repository_sqlx::SqlxLedgerRepository;
use shaft::infrastructure::db::repositories::session_repository_sqlx::SqlxSessionRepository;
use shaft::infrastructure::db::repositories::user_repository_sqlx::SqlxUserRepository;
use shaft::infrastructure::github::ReqwestGithubClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "shaft=debug,tower_http=info".into()),
        )
        .init();

    let cfg = Config::from_env()?;
    info!(bind = %cfg.bind_addr, database = %cfg.database_url, "Starting shaft");

    // Database
    let pool = db::connect_pool(&cfg.database_url).await?;
    db::migrate(&pool).await?;

    let users = Arc::new(SqlxUserRepository::new(pool.clone()));
    let sessions = Arc::new(SqlxSessionRepository::new(pool.clone()));
    let ledger = Arc::new(SqlxLedgerRepository::new(pool.clone()));
    let github = Arc::new(ReqwestGithubClient::new(
        cfg.github_client_id.clone(),
        cfg.github_client_secret.clone(),
    ));

    let services = AppServices::new(users, sessions, ledger, github);
    let ctx = AppContext::new(cfg.clone(), services);

    let app = shaft::presentation::http::build_app(ctx, pool);

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    info!(addr = %cfg.bind_addr, "HTTP server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
