use near_sdk::{
    json_types::U128,
    serde_json::{self, json},
    Gas, NearToken,
};

use crate::{ChainClient, FarmConfig, FarmError, FarmResult};

pub const GAS_FOR_STAKE: Gas = Gas::from_tgas(50);
pub const GAS_FOR_CLAIM: Gas = Gas::from_tgas(30);

/// Payload understood by the farm's `ft_on_transfer`.
pub const STAKE_MSG: &str = "\"DepositAndStake\"";

/// Sends `amount` raw bananas to the farm, which mints as many cucumbers.
/// Returns the amount the farm kept, or `amount` when the call reports none.
pub async fn stake_bananas<C: ChainClient + ?Sized>(
    client: &C,
    config: &FarmConfig,
    amount: u128,
) -> FarmResult<u128> {
    let res = client
        .call(
            &config.banana_contract_id,
            "ft_transfer_call",
            json!({
                "receiver_id": config.farm_contract_id,
                "amount": U128(amount),
                "memo": format!("Swapping {amount} 🍌 to get {amount} 🥒"),
                "msg": STAKE_MSG,
            }),
            GAS_FOR_STAKE,
            NearToken::from_yoctonear(1),
        )
        .await
        .map_err(|err| FarmError::external("ft_transfer_call", err))?;
    if res.is_null() {
        return Ok(amount);
    }
    let used: U128 =
        serde_json::from_value(res).map_err(|err| FarmError::external("ft_transfer_call", err))?;
    Ok(used.0)
}

/// Withdraws all accrued NEAR rewards. Returns the claimed yoctoNEAR.
pub async fn claim_near<C: ChainClient + ?Sized>(
    client: &C,
    config: &FarmConfig,
) -> FarmResult<u128> {
    let res = client
        .call(
            &config.farm_contract_id,
            "claim_near",
            json!({}),
            GAS_FOR_CLAIM,
            NearToken::from_yoctonear(0),
        )
        .await
        .map_err(|err| FarmError::external("claim_near", err))?;
    let claimed: U128 =
        serde_json::from_value(res).map_err(|err| FarmError::external("claim_near", err))?;
    Ok(claimed.0)
}
