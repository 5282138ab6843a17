//! Dragon Duel client binary.
//!
//! This binary is the composition root that assembles:
//! 1. Runtime (battle session, playback, push channel) via RuntimeBuilder
//! 2. Frontend (UI) - CLI, GUI, etc.
//!
//! # Features
//!
//! - `frontend-cli`: Terminal-based UI (default)
//!
//! # Examples
//!
//! ```bash
//! BATTLE_SERVER_URL=http://localhost:5000 cargo run -p dragon-client
//! ```

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    #[cfg(feature = "frontend-cli")]
    {
        run_cli().await?;
    }

    #[cfg(not(feature = "frontend-cli"))]
    {
        compile_error!("At least one frontend feature must be enabled (frontend-cli, ...)");
    }

    Ok(())
}

/// Run the CLI frontend.
#[cfg(feature = "frontend-cli")]
async fn run_cli() -> Result<()> {
    use client_bootstrap::{PreferencesStore, RuntimeBuilder, RuntimeConfig};
    use client_frontend_cli::{CliConfig, CliFrontend, FrontendConfig, logging};
    use dragon_client::Client;

    // 1. Load configuration from environment
    let runtime_config = RuntimeConfig::from_env();
    let frontend_config = FrontendConfig::from_env();
    let cli_config = CliConfig::from_env();

    // 2. Setup logging (guard flushes the file on exit)
    let _log_guard = logging::setup_logging(None)?;

    tracing::info!("Starting Dragon Duel client");
    tracing::info!("Server: {}", runtime_config.server_url);
    tracing::info!("Push channel: {}", runtime_config.push_url);

    // 3. Build Runtime (independent layer)
    let setup = RuntimeBuilder::new(runtime_config).build()?;
    tracing::info!("Runtime built successfully");

    // 4. Build Frontend (independent layer)
    let preferences = PreferencesStore::default_location();
    if preferences.is_none() {
        tracing::warn!("No config directory found; preferences will not be saved");
    }
    let frontend = CliFrontend::new(frontend_config, cli_config, preferences);

    // 5. Build and run
    let client = Client::builder()
        .runtime(setup.runtime)
        .frontend(frontend)
        .build()?;

    tracing::info!("Client assembled, starting...");
    client.run().await?;

    tracing::info!("Client shutdown complete");
    Ok(())
}
