use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use primitive_types::U256;

use crate::{FarmError, FarmResult, PixelCost};

/// User input is accepted with up to five decimals.
pub const STAKE_DECIMALS: usize = 5;
pub const STAKE_SCALE: u128 = 100_000;

/// How many bananas to swap for cucumbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StakeRequest {
    /// The whole banana balance, taken from the raw on-chain integer.
    All,
    /// Bananas in hundred-thousandths.
    Bananas(u128),
}

pub fn compute_stake_amount(
    request: StakeRequest,
    pixel_cost: PixelCost,
    banana_balance_raw: u128,
) -> FarmResult<u128> {
    let scaled = match request {
        StakeRequest::All => return Ok(banana_balance_raw),
        StakeRequest::Bananas(scaled) => scaled,
    };
    let amount = U256::from(scaled) * U256::from(pixel_cost.get()) / U256::from(STAKE_SCALE);
    if amount > U256::from(banana_balance_raw) {
        return Err(FarmError::InsufficientBalance {
            requested: if amount.bits() > 128 {
                u128::MAX
            } else {
                amount.as_u128()
            },
            balance: banana_balance_raw,
        });
    }
    Ok(amount.as_u128())
}

/// Parses a decimal banana amount without going through floating point.
/// An empty input, `all` or `max` selects the whole balance. Digits beyond the
/// fifth decimal are rounded half up.
impl FromStr for StakeRequest {
    type Err = FarmError;

    fn from_str(s: &str) -> FarmResult<Self> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") || s.eq_ignore_ascii_case("max") {
            return Ok(Self::All);
        }
        let invalid = || FarmError::InvalidAmount(s.to_string());

        let (whole, frac) = s.split_once('.').unwrap_or((s, ""));
        if (whole.is_empty() && frac.is_empty())
            || !whole.bytes().all(|b| b.is_ascii_digit())
            || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let mut digits = frac.bytes().map(|b| u128::from(b - b'0'));
        let mut scaled_frac = 0;
        for _ in 0..STAKE_DECIMALS {
            scaled_frac = scaled_frac * 10 + digits.next().unwrap_or(0);
        }
        if digits.next().is_some_and(|digit| digit >= 5) {
            scaled_frac += 1;
        }

        whole
            .checked_mul(STAKE_SCALE)
            .and_then(|scaled| scaled.checked_add(scaled_frac))
            .map(Self::Bananas)
            .ok_or_else(invalid)
    }
}

impl Display for StakeRequest {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::All => write!(f, "ALL"),
            Self::Bananas(scaled) => {
                let frac = format!("{:05}", scaled % STAKE_SCALE);
                let frac = frac.trim_end_matches('0');
                if frac.is_empty() {
                    write!(f, "{}", scaled / STAKE_SCALE)
                } else {
                    write!(f, "{}.{}", scaled / STAKE_SCALE, frac)
                }
            }
        }
    }
}
