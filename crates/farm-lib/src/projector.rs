//! Turns raw contract snapshots into display balances and projects them
//! forward in time between refreshes.

use std::sync::Arc;

use near_sdk::AccountId;
use primitive_types::U256;

use crate::{
    checked_ratio, yocto_to_near, Berry, FarmResult, PixelCost, RawFarmAccount,
    RawRewardAccount, StatsView, MS_PER_DAY,
};

/// Avocados granted to an account that has never drawn on Berry Club.
/// The banana contract credits them on first use, so the dashboard shows them
/// up front instead of an empty balance.
pub const NEW_ACCOUNT_AVOCADO_BONUS: f64 = 25.0;

#[derive(Clone, Debug, PartialEq)]
pub struct FarmView {
    pub account_id: AccountId,
    /// `None` until the banana contract knows the account.
    pub account_index: Option<u32>,
    pub avocado_balance: f64,
    pub banana_balance: f64,
    /// Exact banana balance, used when staking everything.
    pub banana_balance_raw: u128,
    pub num_pixels: u32,
    pub farming_preference: Berry,
    pub avocado_pixels: u32,
    pub banana_pixels: u32,
    pub avocado_reward_per_ms: f64,
    pub banana_reward_per_ms: f64,
    /// Wall clock in milliseconds when the snapshot was taken.
    pub start_time_ms: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RewardView {
    pub near_balance: f64,
    pub near_balance_raw: u128,
    pub cucumber_balance: f64,
    pub cucumber_balance_raw: u128,
    pub near_claimed: f64,
    /// Share of the total cucumber supply. `None` while the supply is zero.
    pub percent: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AccountView {
    pub farm: FarmView,
    pub reward: RewardView,
    /// NEAR held by the account itself, outside of the farm.
    pub wallet_balance: f64,
}

/// Balances projected from an [`AccountView`] snapshot.
///
/// Only the snapshot can be extrapolated again, so repeated ticks never
/// build on each other.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtrapolatedView {
    snapshot: Arc<AccountView>,
    avocado_balance: f64,
    banana_balance: f64,
    now_ms: u64,
}

pub fn normalize_farm_account(
    raw: Option<RawFarmAccount>,
    account_id: &AccountId,
    pixel_cost: PixelCost,
    start_time_ms: u64,
) -> FarmView {
    let (account_id, account_index, avocado_balance, banana_balance_raw, num_pixels, preference) =
        match raw {
            None => (account_id.clone(), None, NEW_ACCOUNT_AVOCADO_BONUS, 0, 0, Berry::Avocado),
            Some(raw) => (
                raw.account_id,
                Some(raw.account_index),
                pixel_cost.to_berries(raw.avocado_balance.0),
                raw.banana_balance.0,
                raw.num_pixels,
                raw.farming_preference,
            ),
        };

    // Every account farms one avocado pixel for free.
    let avocado_pixels = match preference {
        Berry::Avocado => num_pixels + 1,
        Berry::Banana => 0,
    };
    let banana_pixels = match preference {
        Berry::Avocado => 0,
        Berry::Banana => num_pixels,
    };

    FarmView {
        account_id,
        account_index,
        avocado_balance,
        banana_balance: pixel_cost.to_berries(banana_balance_raw),
        banana_balance_raw,
        num_pixels,
        farming_preference: preference,
        avocado_pixels,
        banana_pixels,
        avocado_reward_per_ms: avocado_pixels as f64 / MS_PER_DAY as f64,
        banana_reward_per_ms: banana_pixels as f64 / MS_PER_DAY as f64,
        start_time_ms,
    }
}

pub fn normalize_reward_account(
    raw: Option<RawRewardAccount>,
    pixel_cost: PixelCost,
    stats: &StatsView,
) -> RewardView {
    let (near_balance_raw, cucumber_balance_raw, near_claimed_raw) = raw
        .map(|raw| (raw.near_balance.0, raw.cucumber_balance.0, raw.near_claimed.0))
        .unwrap_or_default();

    RewardView {
        near_balance: yocto_to_near(near_balance_raw),
        near_balance_raw,
        cucumber_balance: pixel_cost.to_berries(cucumber_balance_raw),
        cucumber_balance_raw,
        near_claimed: yocto_to_near(near_claimed_raw),
        percent: share_percent(cucumber_balance_raw, stats.total_supply_raw).ok(),
    }
}

/// `cucumbers * 100 / total_supply`, computed on the raw integers so the
/// pixel cost cancels out.
pub fn share_percent(cucumber_balance_raw: u128, total_supply_raw: u128) -> FarmResult<f64> {
    checked_ratio(
        U256::from(cucumber_balance_raw) * U256::from(100u8),
        U256::from(total_supply_raw),
    )
}

impl AccountView {
    pub fn new(farm: FarmView, reward: RewardView, wallet_balance: f64) -> Self {
        Self {
            farm,
            reward,
            wallet_balance,
        }
    }

    /// Projects the snapshot to `now_ms`. Time before the snapshot counts as
    /// zero elapsed.
    pub fn extrapolate(self: &Arc<Self>, now_ms: u64) -> ExtrapolatedView {
        let elapsed = now_ms.saturating_sub(self.farm.start_time_ms) as f64;
        ExtrapolatedView {
            snapshot: Arc::clone(self),
            avocado_balance: self.farm.avocado_balance + elapsed * self.farm.avocado_reward_per_ms,
            banana_balance: self.farm.banana_balance + elapsed * self.farm.banana_reward_per_ms,
            now_ms,
        }
    }

    /// NEAR this account receives from the next distribution.
    pub fn next_reward(&self, stats: &StatsView) -> Option<f64> {
        self.reward
            .percent
            .map(|percent| stats.expected_reward * percent / 100.0)
    }

    pub fn total_earned(&self) -> f64 {
        self.reward.near_claimed + self.reward.near_balance
    }
}

pub fn extrapolate(view: &Arc<AccountView>, now_ms: u64) -> ExtrapolatedView {
    view.extrapolate(now_ms)
}

impl ExtrapolatedView {
    pub fn snapshot(&self) -> &Arc<AccountView> {
        &self.snapshot
    }

    pub fn avocado_balance(&self) -> f64 {
        self.avocado_balance
    }

    pub fn banana_balance(&self) -> f64 {
        self.banana_balance
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }
}
