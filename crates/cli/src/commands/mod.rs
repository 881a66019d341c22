pub mod account;
pub mod config;
pub mod staking;
pub mod utils;

pub use account::{handle_account_command, AccountCommands};
pub use config::{handle_config_command, ConfigCommands};
pub use staking::{handle_staking_command, StakingCommands};

use stakeview_core::{
    accounts::{AccountsService, ApiClient},
    cache::MemoryCacheStore,
    chain::GatewayClient,
    config::AppConfig,
    staking::{StakingAbi, StakingGetter},
};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info};
use utils::{CliError, CliResult};

/// Read services wired from configuration, sharing one cache.
pub struct Services {
    pub getter: Arc<StakingGetter>,
    pub accounts: AccountsService,
    pub cache: MemoryCacheStore,
    shutdown_tx: broadcast::Sender<()>,
}

impl Services {
    /// Builds the gateway and API clients, the cache store and its workers, and the
    /// getter and account layers on top.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn from_config(config: &AppConfig) -> CliResult<Self> {
        config.validate().map_err(CliError::Config)?;
        let router = config.gateway.router().map_err(CliError::Config)?;
        let http_config = config.gateway.http_client_config();

        let gateway = Arc::new(GatewayClient::new(&config.gateway.proxy_url, http_config.clone())?);
        let api = Arc::new(ApiClient::new(&config.gateway.api_url, http_config)?);

        let (shutdown_tx, _) = broadcast::channel(1);
        let cache = MemoryCacheStore::new(config.cache.clone());
        cache.start_background_tasks(&shutdown_tx);

        let abi = Arc::new(StakingAbi::new(gateway, router));
        let getter = Arc::new(StakingGetter::new(abi, Arc::new(cache.clone()), api.clone()));
        let accounts = AccountsService::new(getter.clone(), api);

        info!(
            proxy_url = %config.gateway.proxy_url,
            api_url = %config.gateway.api_url,
            router = %router,
            "services initialized"
        );

        Ok(Self { getter, accounts, cache, shutdown_tx })
    }

    /// Stops the cache workers.
    pub fn shutdown(&self) {
        debug!(stats = ?self.cache.stats(), "stopping cache workers");
        let _ = self.shutdown_tx.send(());
    }
}
