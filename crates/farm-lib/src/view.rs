use near_sdk::{
    json_types::{U128, U64},
    serde::de::DeserializeOwned,
    serde_json::{self, json, Value},
    AccountId,
};

use crate::{
    ChainClient, FarmConfig, FarmError, FarmResult, PixelCost, RawFarmAccount, RawRewardAccount,
    RawRewardSchedule, RawStats,
};

async fn view_json<C, T>(
    client: &C,
    contract_id: &AccountId,
    method: &str,
    args: Value,
) -> FarmResult<T>
where
    C: ChainClient + ?Sized,
    T: DeserializeOwned,
{
    let res = client
        .view(contract_id, method, args)
        .await
        .map_err(|err| FarmError::external(method, err))?;
    serde_json::from_value(res).map_err(|err| FarmError::external(method, err))
}

pub async fn get_pixel_cost<C: ChainClient + ?Sized>(
    client: &C,
    config: &FarmConfig,
) -> FarmResult<PixelCost> {
    let cost: U128 =
        view_json(client, &config.banana_contract_id, "get_pixel_cost", json!({})).await?;
    PixelCost::new(cost.0)
}

pub async fn get_farm_account<C: ChainClient + ?Sized>(
    client: &C,
    config: &FarmConfig,
    account_id: &AccountId,
) -> FarmResult<Option<RawFarmAccount>> {
    view_json(
        client,
        &config.banana_contract_id,
        "get_account",
        json!({ "account_id": account_id }),
    )
    .await
}

pub async fn get_reward_account<C: ChainClient + ?Sized>(
    client: &C,
    config: &FarmConfig,
    account_id: &AccountId,
) -> FarmResult<Option<RawRewardAccount>> {
    view_json(
        client,
        &config.farm_contract_id,
        "get_account",
        json!({ "account_id": account_id }),
    )
    .await
}

pub async fn get_stats<C: ChainClient + ?Sized>(
    client: &C,
    config: &FarmConfig,
) -> FarmResult<RawStats> {
    view_json(client, &config.farm_contract_id, "get_stats", json!({})).await
}

pub async fn get_reward_schedule<C: ChainClient + ?Sized>(
    client: &C,
    config: &FarmConfig,
) -> FarmResult<RawRewardSchedule> {
    let contract_id = &config.banana_contract_id;
    let (next_reward_timestamp, last_reward_timestamp, expected_reward) = tokio::try_join!(
        view_json::<_, U64>(client, contract_id, "get_next_reward_timestamp", json!({})),
        view_json::<_, U64>(client, contract_id, "get_last_reward_timestamp", json!({})),
        view_json::<_, U128>(client, contract_id, "get_expected_reward", json!({})),
    )?;
    Ok(RawRewardSchedule {
        next_reward_timestamp,
        last_reward_timestamp,
        expected_reward,
    })
}

pub async fn get_account_balance<C: ChainClient + ?Sized>(
    client: &C,
    account_id: &AccountId,
) -> FarmResult<u128> {
    client
        .account_balance(account_id)
        .await
        .map(|balance| balance.as_yoctonear())
        .map_err(|err| FarmError::external("view_account", err))
}
