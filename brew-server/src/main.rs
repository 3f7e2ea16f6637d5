use anyhow::Context;
use brew_server::{Server, ServerState, print_banner, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. dotenv, work dir, logger
    let config = setup_environment().context("Failed to prepare environment")?;

    print_banner();
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        "Brew server starting..."
    );

    // 2. database, cache, bus, directory
    let state = ServerState::initialize(&config)
        .await
        .context("Failed to initialize server state")?;

    // 3. HTTP server (starts the background tasks)
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    Ok(())
}
