use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use stakeview_core::config::AppConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
use commands::{
    handle_account_command, handle_config_command, handle_staking_command, AccountCommands,
    ConfigCommands, Services, StakingCommands,
};

#[derive(Parser)]
#[command(name = "stakeview-cli")]
#[command(about = "Stakeview CLI - Cached staking farm reads and account views")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to STAKEVIEW_CONFIG or config/config.toml)
    #[arg(long, global = true)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Configuration Management
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Account views
    #[command(subcommand)]
    Account(AccountCommands),

    #[command(flatten)]
    Staking(StakingCommands),
}

/// Initializes logging to stderr so command output on stdout stays machine-readable.
///
/// `RUST_LOG` overrides the configured level.
fn init_logging(config: &AppConfig) {
    let level = &config.logging.level;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,stakeview_core={level},cli={level}")));

    let registry = tracing_subscriber::registry().with(filter);

    if config.logging.format == "json" {
        let fmt_layer = tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr);
        registry.with(fmt_layer).init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .pretty()
            .with_file(true)
            .with_line_number(true)
            .with_target(false)
            .with_writer(std::io::stderr);
        registry.with(fmt_layer).init();
    }
}

fn load_config(path: Option<&str>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {path}")),
        None => AppConfig::load().context("Failed to load configuration"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Config(config_command) = cli.command {
        handle_config_command(config_command)?;
        return Ok(());
    }

    let config = load_config(cli.config.as_deref())?;
    init_logging(&config);

    let services = Services::from_config(&config)?;
    let result = match cli.command {
        Commands::Account(command) => handle_account_command(command, &services).await,
        Commands::Staking(command) => handle_staking_command(command, &services).await,
        Commands::Config(_) => Ok(()),
    };
    services.shutdown();

    result?;
    Ok(())
}
