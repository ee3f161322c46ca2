//! Client side model of Berry Farm: converts raw contract state into display
//! balances, projects them over time and drives refreshes and transactions
//! through an abstract [`ChainClient`].

mod account;
pub mod call;
mod chain;
mod config;
mod error;
mod projector;
mod session;
mod stake;
mod stats;
mod units;
pub mod view;

pub use account::*;
pub use chain::*;
pub use config::*;
pub use error::*;
pub use projector::*;
pub use session::*;
pub use stake::*;
pub use stats::*;
pub use units::*;
