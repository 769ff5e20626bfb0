use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::{Asset, Coin, Coins, PubKey};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode, Serialize, Deserialize,
)]
pub enum VaultType {
    /// Collectively owned TSS vault held by the whole active set.
    Asgard,
    /// Per-node working vault for fast outbound signing.
    Yggdrasil,
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode, Serialize, Deserialize,
)]
pub enum VaultStatus {
    Active,
    Retiring,
    Inactive,
}

/// A threshold-signed vault on the external chains, tracked by the pubkey the
/// TSS ceremony produced.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct Vault {
    pub pub_key: PubKey,
    pub vault_type: VaultType,
    pub status: VaultStatus,
    /// Block at which the vault was created.
    pub block_height: u64,
    /// Secp256k1 keys of the member nodes. A yggdrasil vault has exactly one.
    pub membership: Vec<PubKey>,
    pub coins: Coins,
    pub inbound_tx_count: u64,
    /// Heights of yggdrasil funding outbounds that have not been observed
    /// arriving yet.
    pub pending_tx_block_heights: Vec<u64>,
}

impl Vault {
    pub fn new(
        pub_key: PubKey,
        vault_type: VaultType,
        status: VaultStatus,
        block_height: u64,
        membership: Vec<PubKey>,
    ) -> Self {
        Self {
            pub_key,
            vault_type,
            status,
            block_height,
            membership,
            coins: Coins::default(),
            inbound_tx_count: 0,
            pending_tx_block_heights: vec![],
        }
    }

    pub fn is_asgard(&self) -> bool {
        self.vault_type == VaultType::Asgard
    }

    pub fn is_yggdrasil(&self) -> bool {
        self.vault_type == VaultType::Yggdrasil
    }

    pub fn contains(&self, key: &PubKey) -> bool {
        self.membership.contains(key)
    }

    pub fn has_funds(&self) -> bool {
        self.coins.iter().any(|c| c.amount > 0)
    }

    pub fn balance_of(&self, asset: &Asset) -> u128 {
        self.coins.amount_of(asset)
    }

    pub fn add_funds(&mut self, coins: &Coins) {
        for coin in coins.iter() {
            match self.coins.iter_mut().find(|c| c.asset == coin.asset) {
                Some(held) => held.amount = held.amount.saturating_add(coin.amount),
                None => self.coins.push(coin.clone()),
            }
        }
        // Keep the coin list in a canonical order so encodings are stable.
        self.coins.sort();
    }

    /// Deduct funds, saturating at zero. Callers that care about sufficiency
    /// must check balances before deducting.
    pub fn sub_funds(&mut self, coins: &Coins) {
        for coin in coins.iter() {
            if let Some(held) = self.coins.iter_mut().find(|c| c.asset == coin.asset) {
                held.amount = held.amount.saturating_sub(coin.amount);
            }
        }
        self.coins.retain(|c| c.amount > 0);
    }

    pub fn sub_coin(&mut self, coin: &Coin) {
        self.sub_funds(&Coins::new(vec![coin.clone()]));
    }

    pub fn remove_pending_tx_block_height(&mut self, height: u64) {
        self.pending_tx_block_heights.retain(|h| *h != height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Chain;

    fn bnb(amount: u128) -> Coin {
        Coin::new(Asset::new(Chain::Bnb, "BNB", "BNB"), amount)
    }

    #[test]
    fn funds_accumulate_and_deduct() {
        let mut vault = Vault::new(
            PubKey::new(vec![1; 33]),
            VaultType::Asgard,
            VaultStatus::Active,
            1,
            vec![],
        );
        assert!(!vault.has_funds());

        vault.add_funds(&Coins::new(vec![bnb(100)]));
        vault.add_funds(&Coins::new(vec![bnb(50), Coin::new(Asset::rune(), 10)]));
        assert_eq!(vault.balance_of(&bnb(0).asset), 150);
        assert_eq!(vault.balance_of(&Asset::rune()), 10);

        vault.sub_funds(&Coins::new(vec![bnb(150)]));
        assert_eq!(vault.balance_of(&bnb(0).asset), 0);
        assert!(vault.has_funds());

        vault.sub_funds(&Coins::new(vec![Coin::new(Asset::rune(), 999)]));
        assert!(!vault.has_funds());
    }
}
