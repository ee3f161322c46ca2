use near_sdk::{
    json_types::{U128, U64},
    serde::{Deserialize, Serialize},
    AccountId,
};

/// Which reward track a Berry Club account farms with its pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(crate = "near_sdk::serde")]
pub enum Berry {
    #[default]
    Avocado,
    Banana,
}

/// Account record of the banana contract (`get_account`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(crate = "near_sdk::serde")]
pub struct RawFarmAccount {
    pub account_id: AccountId,
    pub account_index: u32,
    pub avocado_balance: U128,
    pub banana_balance: U128,
    pub num_pixels: u32,
    pub farming_preference: Berry,
}

/// Account record of the farm contract (`get_account`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(crate = "near_sdk::serde")]
pub struct RawRewardAccount {
    pub near_balance: U128,
    pub cucumber_balance: U128,
    pub near_claimed: U128,
}

/// Global farm statistics (`get_stats`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(crate = "near_sdk::serde")]
pub struct RawStats {
    pub total_cucumber_balance: U128,
    pub total_near_claimed: U128,
    pub total_near_received: U128,
}

/// Reward distribution schedule reported by the banana contract.
/// Timestamps are in nanoseconds, the expected reward in yoctoNEAR.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawRewardSchedule {
    pub next_reward_timestamp: U64,
    pub last_reward_timestamp: U64,
    pub expected_reward: U128,
}
