use std::num::NonZeroU128;

use primitive_types::U256;

use crate::{FarmError, FarmResult};

/// yoctoNEAR per NEAR.
pub const ONE_NEAR: u128 = 1_000_000_000_000_000_000_000_000;
pub const MS_PER_DAY: u64 = 24 * 60 * 60 * 1000;

const FRACTION_SCALE: u128 = 1_000_000_000_000;
const LIMB: f64 = 18_446_744_073_709_551_616.0;

/// Number of on-chain token units per displayed berry.
///
/// Read once per session from the banana contract. A zero cost is rejected
/// here so that no conversion can ever divide by it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PixelCost(NonZeroU128);

impl PixelCost {
    pub fn new(raw: u128) -> FarmResult<Self> {
        NonZeroU128::new(raw)
            .map(Self)
            .ok_or_else(|| FarmError::Configuration("pixel cost must be positive".to_string()))
    }

    pub fn get(self) -> u128 {
        self.0.get()
    }

    pub fn to_berries(self, amount: u128) -> f64 {
        divide(U256::from(amount), U256::from(self.get()))
    }
}

pub fn yocto_to_near(amount: u128) -> f64 {
    divide(U256::from(amount), U256::from(ONE_NEAR))
}

/// Integer division carried out on big integers, converted to a decimal only
/// at the very end. Fails instead of producing NaN or infinity.
pub fn checked_ratio(numer: U256, denom: U256) -> FarmResult<f64> {
    if denom.is_zero() {
        return Err(FarmError::DivisionByZero);
    }
    Ok(divide(numer, denom))
}

// `denom` must be non-zero.
fn divide(numer: U256, denom: U256) -> f64 {
    let whole = numer / denom;
    let frac = (numer % denom) * U256::from(FRACTION_SCALE) / denom;
    to_f64(whole) + frac.as_u128() as f64 / FRACTION_SCALE as f64
}

fn to_f64(value: U256) -> f64 {
    value
        .0
        .iter()
        .rev()
        .fold(0.0, |acc, limb| acc * LIMB + *limb as f64)
}
