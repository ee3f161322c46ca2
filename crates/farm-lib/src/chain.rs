use async_trait::async_trait;
use near_sdk::{serde_json::Value, AccountId, Gas, NearToken};

/// Access to the NEAR chain, as offered by a wallet or RPC client.
///
/// Arguments and results are plain JSON. Failures of any kind (network,
/// contract panics, missing signer) are reported as errors and never retried.
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn view(
        &self,
        contract_id: &AccountId,
        method: &str,
        args: Value,
    ) -> anyhow::Result<Value>;

    async fn call(
        &self,
        contract_id: &AccountId,
        method: &str,
        args: Value,
        gas: Gas,
        deposit: NearToken,
    ) -> anyhow::Result<Value>;

    /// Liquid NEAR of an account.
    async fn account_balance(&self, account_id: &AccountId) -> anyhow::Result<NearToken>;
}
