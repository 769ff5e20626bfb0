use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::Address;

/// An address that contributed RUNE to the protocol reserve, and how much of
/// that contribution is still outstanding.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct ReserveContributor {
    pub address: Address,
    pub amount: u128,
}

impl ReserveContributor {
    pub fn new(address: Address, amount: u128) -> Self {
        Self { address, amount }
    }

    pub fn is_empty(&self) -> bool {
        self.address.is_empty() || self.amount == 0
    }
}

/// Singleton accounting for the reserve and bond rewards.
#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct VaultData {
    pub total_reserve: u128,
    /// RUNE set aside to reward bonded validators.
    pub bond_reward_rune: u128,
    /// Sum of active-block units across all validators; the denominator of
    /// reward payouts.
    pub total_bond_units: u128,
}

impl VaultData {
    /// The reward owed for a number of well-behaved blocks.
    pub fn node_reward(&self, earned_blocks: u64) -> u128 {
        if self.total_bond_units == 0 {
            return 0;
        }
        self.bond_reward_rune
            .saturating_mul(earned_blocks as u128)
            .checked_div(self.total_bond_units)
            .unwrap_or(0)
    }
}
