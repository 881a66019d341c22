use clap::Subcommand;
use serde_json::json;
use stakeview_core::chain::Address;

use super::{
    utils::{print_error, print_json, CliResult},
    Services,
};

#[derive(Subcommand)]
pub enum StakingCommands {
    /// List staking groups with their child farm contracts
    Groups,

    /// Show the full state of one farm contract
    Farm {
        /// Farm contract address (bech32)
        address: Address,
    },

    /// Compute rewards a farm position would collect now
    Rewards {
        /// Farm contract address (bech32)
        farm: Address,

        /// Position amount as a decimal integer
        amount: String,

        /// Position attributes as base64
        attributes: String,
    },

    /// Show the group a farm owner belongs to
    GroupOf {
        /// Owner address (bech32)
        owner: Address,
    },

    /// Look up token or collection metadata
    Token {
        /// Token or collection identifier
        identifier: String,
    },

    /// Show network epoch and round statistics
    Stats,
}

pub async fn handle_staking_command(
    command: StakingCommands,
    services: &Services,
) -> CliResult<()> {
    let getter = &services.getter;
    match command {
        StakingCommands::Groups => print_json(&getter.farm_staking_groups().await?),
        StakingCommands::Farm { address } => print_json(&getter.farm_summary(address).await?),
        StakingCommands::Rewards { farm, amount, attributes } => {
            let rewards =
                getter.calculate_rewards_for_given_position(farm, &amount, &attributes).await?;
            print_json(&json!({ "farm": farm, "amount": amount, "rewards": rewards }))
        }
        StakingCommands::GroupOf { owner } => {
            let group_id = getter.group_by_owner(owner).await?;
            print_json(&json!({ "owner": owner, "groupId": group_id }))
        }
        StakingCommands::Token { identifier } => match getter.token(&identifier).await {
            Some(token) => print_json(&token),
            None => {
                print_error(&format!("No token or collection found for {identifier}"));
                print_json(&serde_json::Value::Null)
            }
        },
        StakingCommands::Stats => print_json(&getter.stats().await?),
    }
}
