use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use libradesk::cli::{cmd_config_check, run_command, Cli, Commands, ConfigCommands};
use libradesk::config::Config;
use libradesk::AppContext;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Errors wait until after logging is up; `config check` reports them itself
    let config = Config::load(&cli.config);

    // Initialize logging; stdout is reserved for command output
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| config.as_ref().ok().map(|c| c.logging.level.clone()))
        .unwrap_or_else(|| "warn".to_string());

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Commands::Config(ConfigCommands::Check) = cli.command {
        return cmd_config_check(&cli.config);
    }

    let mut config = config?;
    if let Some(api_url) = &cli.api_url {
        config.api.base_url = api_url.trim_end_matches('/').to_string();
    }
    tracing::debug!(base_url = %config.api.base_url, "Using library backend");

    let ctx = AppContext::from_config(config)?;
    run_command(&ctx, &cli.command).await
}
