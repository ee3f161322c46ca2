use std::{env, str::FromStr};

use near_sdk::AccountId;

use crate::{FarmError, FarmResult};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
}

impl FromStr for Network {
    type Err = FarmError;

    fn from_str(s: &str) -> FarmResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "testnet" => Ok(Self::Testnet),
            other => Err(FarmError::Configuration(format!("unknown network `{other}`"))),
        }
    }
}

/// Where the two game contracts live.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FarmConfig {
    pub network: Network,
    pub node_url: String,
    pub wallet_url: String,
    /// Berry Club: avocados, bananas, pixels and the reward schedule.
    pub banana_contract_id: AccountId,
    /// Berry Farm: cucumbers and NEAR rewards.
    pub farm_contract_id: AccountId,
}

impl FarmConfig {
    pub fn mainnet() -> Self {
        Self {
            network: Network::Mainnet,
            node_url: "https://rpc.mainnet.near.org".to_string(),
            wallet_url: "https://wallet.near.org".to_string(),
            banana_contract_id: preset_account("berryclub.ek.near"),
            farm_contract_id: preset_account("farm.berryclub.ek.near"),
        }
    }

    pub fn testnet() -> Self {
        Self {
            network: Network::Testnet,
            node_url: "https://rpc.testnet.near.org".to_string(),
            wallet_url: "https://wallet.testnet.near.org".to_string(),
            banana_contract_id: preset_account("berryclub.testnet"),
            farm_contract_id: preset_account("farm.berryclub.testnet"),
        }
    }

    pub fn for_network(network: Network) -> Self {
        match network {
            Network::Mainnet => Self::mainnet(),
            Network::Testnet => Self::testnet(),
        }
    }

    /// Preset for `FARM_NETWORK` (mainnet when unset), with
    /// `FARM_NODE_URL`, `FARM_BANANA_CONTRACT` and `FARM_CONTRACT` overrides.
    pub fn from_env() -> FarmResult<Self> {
        let network = match env::var("FARM_NETWORK") {
            Ok(network) => network.parse()?,
            Err(_) => Network::default(),
        };
        let mut config = Self::for_network(network);
        if let Ok(node_url) = env::var("FARM_NODE_URL") {
            config.node_url = node_url;
        }
        if let Some(account_id) = env_account("FARM_BANANA_CONTRACT")? {
            config.banana_contract_id = account_id;
        }
        if let Some(account_id) = env_account("FARM_CONTRACT")? {
            config.farm_contract_id = account_id;
        }
        Ok(config)
    }
}

fn preset_account(account_id: &'static str) -> AccountId {
    account_id.parse().expect("preset account id is valid")
}

fn env_account(key: &str) -> FarmResult<Option<AccountId>> {
    env::var(key)
        .ok()
        .map(|value| {
            value
                .parse()
                .map_err(|err| FarmError::Configuration(format!("{key}: {err}")))
        })
        .transpose()
}
