use solhem_archive::{AppConfig, GitHubContentStore, ServerState};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = AppConfig::from_env()?;
    log::info!(
        "Starting data-store service on {} (repo {}/{}, branch {})",
        config.bind_addr,
        config.github.owner,
        config.github.repo,
        config.github.branch
    );

    let state = ServerState {
        content: Arc::new(GitHubContentStore::new(config.github)),
    };
    let app = solhem_archive::router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
