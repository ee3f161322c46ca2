//! [`ChainClient`] backed by `near-workspaces`.

mod events;
mod log;

pub use events::*;
pub use log::*;
#[doc(hidden)]
pub use owo_colors;

use anyhow::Context;
use async_trait::async_trait;
use farm_lib::{ChainClient, FarmConfig};
use near_sdk::{
    json_types::U128,
    serde_json::{self, json, Value},
    AccountId, Gas, NearToken,
};
use near_workspaces::{
    network::{Mainnet, Testnet},
    types::{Gas as WorkspacesGas, NearToken as WorkspacesToken, SecretKey},
    Account, Worker,
};
use owo_colors::OwoColorize;

/// Talks to an RPC node through a `near-workspaces` worker. Views work
/// without a signer, transactions are sent from `signer`.
pub struct WorkspacesClient<T> {
    worker: Worker<T>,
    signer: Option<Account>,
}

impl<T> WorkspacesClient<T>
where
    T: near_workspaces::Network + 'static,
{
    pub fn new(worker: Worker<T>) -> Self {
        Self {
            worker,
            signer: None,
        }
    }

    /// Signs transactions as `account_id`, like a wallet session key would.
    pub fn with_signer(
        mut self,
        account_id: &AccountId,
        secret_key: SecretKey,
    ) -> anyhow::Result<Self> {
        self.signer = Some(Account::from_secret_key(
            workspaces_id(account_id)?,
            secret_key,
            &self.worker,
        ));
        Ok(self)
    }

    pub fn signer_id(&self) -> Option<AccountId> {
        self.signer
            .as_ref()
            .and_then(|signer| signer.id().as_str().parse().ok())
    }

    pub fn worker(&self) -> &Worker<T> {
        &self.worker
    }
}

pub async fn mainnet(config: &FarmConfig) -> anyhow::Result<WorkspacesClient<Mainnet>> {
    let worker = near_workspaces::mainnet()
        .rpc_addr(&config.node_url)
        .await?;
    Ok(WorkspacesClient::new(worker))
}

pub async fn testnet(config: &FarmConfig) -> anyhow::Result<WorkspacesClient<Testnet>> {
    let worker = near_workspaces::testnet()
        .rpc_addr(&config.node_url)
        .await?;
    Ok(WorkspacesClient::new(worker))
}

fn workspaces_id(account_id: &AccountId) -> anyhow::Result<near_workspaces::AccountId> {
    account_id
        .as_str()
        .parse()
        .with_context(|| format!("invalid account id {account_id}"))
}

#[async_trait]
impl<T> ChainClient for WorkspacesClient<T>
where
    T: near_workspaces::Network + 'static,
{
    async fn view(
        &self,
        contract_id: &AccountId,
        method: &str,
        args: Value,
    ) -> anyhow::Result<Value> {
        let res = log_view_result(
            self.worker
                .view(&workspaces_id(contract_id)?, method)
                .args_json(args)
                .await?,
        )?;
        Ok(res.json()?)
    }

    async fn call(
        &self,
        contract_id: &AccountId,
        method: &str,
        args: Value,
        gas: Gas,
        deposit: NearToken,
    ) -> anyhow::Result<Value> {
        let signer = self
            .signer
            .as_ref()
            .context("no signer configured, cannot send transactions")?;
        let (res, events) = log_tx_result(
            &format!("{contract_id} {method}"),
            signer
                .call(&workspaces_id(contract_id)?, method)
                .args_json(args)
                .gas(WorkspacesGas::from_gas(gas.as_gas()))
                .deposit(WorkspacesToken::from_yoctonear(deposit.as_yoctonear()))
                .transact()
                .await?,
        )?;
        let transferred = net_transferred(&events, signer.id().as_str());
        if let Some(amount) = transferred {
            crate::print_log!(
                "{} {} {}",
                signer.id(),
                "transferred".bright_cyan(),
                amount.bright_blue()
            );
        }
        let bytes = res.raw_bytes()?;
        if bytes.is_empty() {
            // Fall back to what the token events say left the signer.
            return Ok(transferred.map_or(Value::Null, |amount| json!(U128(amount))));
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn account_balance(&self, account_id: &AccountId) -> anyhow::Result<NearToken> {
        let details = self
            .worker
            .view_account(&workspaces_id(account_id)?)
            .await?;
        Ok(NearToken::from_yoctonear(details.balance.as_yoctonear()))
    }
}
