use std::fmt::{self, Display, Formatter};

use crate::{yocto_to_near, PixelCost, RawRewardSchedule, RawStats};

const NANOS_PER_MS: u64 = 1_000_000;

#[derive(Clone, Debug, PartialEq)]
pub struct StatsView {
    /// Total cucumbers staked in the farm.
    pub total_supply: f64,
    pub total_supply_raw: u128,
    pub total_near_claimed: f64,
    pub total_near_rewarded: f64,
    /// NEAR paid out by the next distribution.
    pub expected_reward: f64,
    pub reward_timer: RewardTimer,
    pub fetched_at_ms: u64,
}

/// Countdown to the next reward distribution, or time elapsed since the last
/// one once the next is overdue. Distributions only happen when somebody draws
/// a pixel, so an overdue timer keeps counting up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RewardTimer {
    UntilNext { ms: u64 },
    SinceLast { ms: u64 },
}

pub fn normalize_stats(
    raw: RawStats,
    schedule: RawRewardSchedule,
    pixel_cost: PixelCost,
    now_ms: u64,
) -> StatsView {
    StatsView {
        total_supply: pixel_cost.to_berries(raw.total_cucumber_balance.0),
        total_supply_raw: raw.total_cucumber_balance.0,
        total_near_claimed: yocto_to_near(raw.total_near_claimed.0),
        total_near_rewarded: yocto_to_near(raw.total_near_received.0),
        expected_reward: yocto_to_near(schedule.expected_reward.0),
        reward_timer: RewardTimer::new(&schedule, now_ms),
        fetched_at_ms: now_ms,
    }
}

impl RewardTimer {
    pub fn new(schedule: &RawRewardSchedule, now_ms: u64) -> Self {
        let next_ms = schedule.next_reward_timestamp.0 / NANOS_PER_MS;
        let last_ms = schedule.last_reward_timestamp.0 / NANOS_PER_MS;
        if next_ms > now_ms {
            Self::UntilNext {
                ms: next_ms - now_ms,
            }
        } else {
            Self::SinceLast {
                ms: now_ms.saturating_sub(last_ms),
            }
        }
    }

    pub fn is_overdue(&self) -> bool {
        matches!(self, Self::SinceLast { .. })
    }

    /// Timer as seen `elapsed_ms` after it was read. Returns `None` when the
    /// countdown has run out and the schedule should be fetched again.
    pub fn advance(self, elapsed_ms: u64) -> Option<Self> {
        match self {
            Self::UntilNext { ms } if elapsed_ms >= ms => None,
            Self::UntilNext { ms } => Some(Self::UntilNext {
                ms: ms - elapsed_ms,
            }),
            Self::SinceLast { ms } => Some(Self::SinceLast {
                ms: ms + elapsed_ms,
            }),
        }
    }
}

impl StatsView {
    pub fn reward_timer_at(&self, now_ms: u64) -> Option<RewardTimer> {
        self.reward_timer
            .advance(now_ms.saturating_sub(self.fetched_at_ms))
    }
}

/// Formats as `h:mm:ss.mmm`.
impl Display for RewardTimer {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let (Self::UntilNext { ms } | Self::SinceLast { ms }) = *self;
        write!(
            f,
            "{}:{:02}:{:02}.{:03}",
            ms / 3_600_000,
            ms / 60_000 % 60,
            ms / 1_000 % 60,
            ms % 1_000
        )
    }
}
