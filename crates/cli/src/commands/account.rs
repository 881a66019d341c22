use clap::Subcommand;
use stakeview_core::chain::Address;

use super::{
    utils::{print_json, CliResult},
    Services,
};

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Show the account address and EGLD balance
    Details {
        /// Account address (bech32)
        address: Address,
    },

    /// List held tokens that staking farms use as farming or reward token
    Tokens {
        /// Account address (bech32)
        address: Address,
    },

    /// List locked tokens grouped by collection, with unlock dates
    LockedTokens {
        /// Account address (bech32)
        address: Address,
    },

    /// List held farm token positions
    FarmTokens {
        /// Account address (bech32)
        address: Address,
    },
}

pub async fn handle_account_command(
    command: AccountCommands,
    services: &Services,
) -> CliResult<()> {
    let accounts = &services.accounts;
    match command {
        AccountCommands::Details { address } => {
            print_json(&accounts.account_details(&address).await?)
        }
        AccountCommands::Tokens { address } => print_json(&accounts.esdt_tokens(&address).await?),
        AccountCommands::LockedTokens { address } => {
            print_json(&accounts.locked_tokens(&address).await?)
        }
        AccountCommands::FarmTokens { address } => {
            print_json(&accounts.farm_tokens(&address).await?)
        }
    }
}
