//! Order analytics runner - one invocation recomputes the reporting tables.

use order_analytics::cli::Cli;
use order_analytics::config::{Config, ConnectionConfig};
use order_analytics::db;
use order_analytics::error::{EtlError, Result};
use order_analytics::etl::EtlRunner;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Load configuration file
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;

    // Build connection config with precedence:
    // 1. CLI arguments (highest)
    // 2. Named connection from config
    // 3. Default connection from config
    // 4. Environment variables
    // 5. Built-in defaults
    let connection = resolve_connection(&cli, &config)?;
    info!("Connection: {}", connection.display_string());

    let store = db::connect(&connection).await?;

    let result = EtlRunner::new(store.as_ref()).run().await;
    store.close().await?;
    result
}

/// Resolves the final connection configuration from CLI args, config file,
/// and environment. Unset fields fall through to the built-in defaults when
/// the connection string is assembled.
fn resolve_connection(cli: &Cli, config: &Config) -> Result<ConnectionConfig> {
    // Start from the named connection if requested, otherwise the default
    // connection from the config file (if either exists).
    let mut connection = if let Some(name) = cli.connection_name() {
        config
            .get_connection(Some(name))
            .cloned()
            .ok_or_else(|| {
                EtlError::config(format!("Connection '{}' not found in config file", name))
            })?
    } else {
        config.get_connection(None).cloned().unwrap_or_default()
    };

    // CLI arguments take precedence over anything from the file.
    if let Some(cli_connection) = cli.to_connection_config()? {
        connection.merge(&cli_connection);
    }

    // Environment variables fill whatever is still unset.
    connection.apply_env_defaults();

    Ok(connection)
}
