use clap::Subcommand;
use stakeview_core::config::AppConfig;
use std::path::Path;

use super::utils::{print_error, print_info, print_success, CliError, CliResult};

const SAMPLE_CONFIG: &str = r#"# Stakeview configuration
# Every value below is optional except gateway.router_address.
# Any field can be overridden with STAKEVIEW__SECTION__FIELD environment variables.

environment = "development"

[gateway]
proxy_url = "https://gateway.multiversx.com"
api_url = "https://api.multiversx.com"
router_address = "YOUR_ROUTER_ADDRESS"
timeout_seconds = 30
concurrent_limit = 64

[cache]
sweep_interval_seconds = 60
stale_inflight_seconds = 120
max_entries = 100000

[logging]
level = "info"
format = "pretty"
"#;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Validate the current configuration
    Validate {
        /// Path to config file (defaults to config/config.toml)
        #[arg(short, long, default_value = "config/config.toml")]
        file: String,
    },

    /// Show current configuration
    Show {
        /// Path to config file (defaults to config/config.toml)
        #[arg(short, long, default_value = "config/config.toml")]
        file: String,
    },

    /// Generate a sample configuration file
    Generate {
        /// Output path for the config file
        #[arg(short, long, default_value = "config/config.toml")]
        output: String,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn handle_config_command(command: ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Validate { file } => validate_config(&file),
        ConfigCommands::Show { file } => show_config(&file),
        ConfigCommands::Generate { output, force } => generate_config(&output, force),
    }
}

fn validate_config(file: &str) -> CliResult<()> {
    if !Path::new(file).exists() {
        print_error(&format!("Configuration file not found: {file}"));
        return Err(CliError::Config(format!("File not found: {file}")));
    }

    print_info(&format!("Loading configuration from {file}..."));

    let config = AppConfig::from_file(file).map_err(|e| CliError::Config(e.to_string()))?;

    print_info("Validating configuration...");
    config.validate().map_err(CliError::Config)?;

    print_success("Configuration is valid!");

    println!("Configuration Summary:");
    println!("  Gateway: {}", config.gateway.proxy_url);
    println!("  API: {}", config.gateway.api_url);
    println!("  Router: {}", config.gateway.router_address);

    Ok(())
}

fn show_config(file: &str) -> CliResult<()> {
    let config = AppConfig::from_file(file).map_err(|e| CliError::Config(e.to_string()))?;

    println!("Configuration from {file}:");
    println!("  Environment: {}", config.environment);

    println!("\n[Gateway]");
    println!("  Proxy URL: {}", config.gateway.proxy_url);
    println!("  API URL: {}", config.gateway.api_url);
    if config.gateway.router_address.is_empty() {
        println!("  Router Address: [not set]");
    } else {
        println!("  Router Address: {}", config.gateway.router_address);
    }
    println!("  Timeout: {}s", config.gateway.timeout_seconds);
    println!("  Concurrent Limit: {}", config.gateway.concurrent_limit);

    println!("\n[Cache]");
    println!("  Sweep Interval: {}s", config.cache.sweep_interval_seconds);
    println!("  Stale Inflight After: {}s", config.cache.stale_inflight_seconds);
    println!("  Max Entries: {}", config.cache.max_entries);

    println!("\n[Logging]");
    println!("  Level: {}", config.logging.level);
    println!("  Format: {}", config.logging.format);

    Ok(())
}

fn generate_config(output: &str, force: bool) -> CliResult<()> {
    if Path::new(output).exists() && !force {
        return Err(CliError::Config(format!(
            "File {output} already exists. Use --force to overwrite."
        )));
    }

    if let Some(parent) = Path::new(output).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(output, SAMPLE_CONFIG)?;

    print_success(&format!("Sample configuration generated: {output}"));
    print_info("Remember to replace YOUR_ROUTER_ADDRESS with the staking router contract");

    Ok(())
}
