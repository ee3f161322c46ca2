use std::fmt::{self, Display, Formatter};

use near_sdk::{
    serde::{Deserialize, Serialize},
    serde_json::Value,
};
use owo_colors::OwoColorize;

/// A NEP-297 event as logged by token contracts, e.g. the banana
/// `ft_transfer` emitted while staking.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(crate = "near_sdk::serde")]
pub struct ContractEvent {
    pub standard: String,
    pub version: String,
    pub event: String,
    #[serde(default)]
    pub data: Vec<Value>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(crate = "near_sdk::serde")]
pub struct FtTransfer {
    pub old_owner_id: String,
    pub new_owner_id: String,
    pub amount: String,
    pub memo: Option<String>,
}

impl ContractEvent {
    /// Transfers carried by an `ft_transfer` event. Empty for other events.
    pub fn ft_transfers(&self) -> Vec<FtTransfer> {
        if self.event != "ft_transfer" {
            return vec![];
        }
        self.data
            .iter()
            .filter_map(|data| FtTransfer::deserialize(data).ok())
            .collect()
    }
}

/// Raw amount `owner` sent in `ft_transfer` events, minus what came back to
/// it (a receiver refunding the unused part). `None` without any transfer
/// from `owner`.
pub fn net_transferred(events: &[ContractEvent], owner: &str) -> Option<u128> {
    let mut sent: Option<u128> = None;
    let mut refunded = 0u128;
    for transfer in events.iter().flat_map(ContractEvent::ft_transfers) {
        let Ok(amount) = transfer.amount.parse::<u128>() else {
            continue;
        };
        if transfer.old_owner_id == owner {
            sent = Some(sent.unwrap_or_default().saturating_add(amount));
        } else if transfer.new_owner_id == owner {
            refunded = refunded.saturating_add(amount);
        }
    }
    sent.map(|sent| sent.saturating_sub(refunded))
}

impl Display for ContractEvent {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}: {}", "event".bright_cyan(), self.event)?;
        write!(formatter, "\n{}: {}", "standard".bright_cyan(), self.standard)?;
        write!(formatter, "\n{}: {}", "version".bright_cyan(), self.version)?;
        let transfers = self.ft_transfers();
        if transfers.is_empty() {
            for data in &self.data {
                write!(formatter, "\n{}: {}", "data".bright_cyan(), data)?;
            }
        } else {
            for transfer in transfers {
                write!(formatter, "\n{}: {}", "data".bright_cyan(), transfer)?;
            }
        }
        Ok(())
    }
}

impl Display for FtTransfer {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match &self.memo {
            Some(memo) => write!(
                formatter,
                "{} --> {} ({}) --> {}",
                self.old_owner_id.bright_blue(),
                self.amount.bright_blue(),
                memo,
                self.new_owner_id.bright_blue(),
            ),
            None => write!(
                formatter,
                "{} --> {} --> {}",
                self.old_owner_id.bright_blue(),
                self.amount.bright_blue(),
                self.new_owner_id.bright_blue(),
            ),
        }
    }
}
