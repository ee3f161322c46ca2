use std::error::Error as StdError;

use thiserror::Error;

pub type BoxError = Box<dyn StdError + Send + Sync>;

#[derive(Error, Debug)]
pub enum FarmError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Total cucumber supply is zero")]
    DivisionByZero,

    #[error("Requested {requested} exceeds banana balance {balance}")]
    InsufficientBalance { requested: u128, balance: u128 },

    #[error("Invalid banana amount: {0}")]
    InvalidAmount(String),

    #[error("Chain call `{method}` failed: {source}")]
    ExternalCallFailure {
        method: String,
        #[source]
        source: BoxError,
    },

    #[error("Another refresh or transaction is already in flight")]
    RefreshInFlight,

    #[error("No account is signed in")]
    SignedOut,
}

impl FarmError {
    pub fn external(method: &str, source: impl Into<BoxError>) -> Self {
        Self::ExternalCallFailure {
            method: method.to_string(),
            source: source.into(),
        }
    }
}

pub type FarmResult<T> = Result<T, FarmError>;
