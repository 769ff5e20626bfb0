use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::{Address, Chain, Coin, PubKey, TxId};

/// An outbound transaction queued for the signers.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct TxOutItem {
    pub chain: Chain,
    pub to_address: Address,
    /// The vault expected to sign this item. Empty until the store assigns
    /// one.
    pub vault_pub_key: PubKey,
    pub coin: Coin,
    pub memo: String,
    /// Hash of the inbound that caused this outbound, or blank for
    /// internally generated items.
    pub in_hash: TxId,
    /// Hash of the signed outbound once it has been observed on chain.
    pub out_hash: TxId,
}

impl TxOutItem {
    pub fn new(chain: Chain, to_address: Address, coin: Coin, in_hash: TxId) -> Self {
        Self {
            chain,
            to_address,
            vault_pub_key: PubKey::default(),
            coin,
            memo: String::new(),
            in_hash,
            out_hash: TxId::default(),
        }
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = memo.into();
        self
    }

    pub fn with_vault(mut self, vault_pub_key: PubKey) -> Self {
        self.vault_pub_key = vault_pub_key;
        self
    }

    pub fn is_signed(&self) -> bool {
        !self.out_hash.is_empty()
    }
}

/// The list of outbound items scheduled in one block.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct TxOut {
    pub height: u64,
    pub tx_array: Vec<TxOutItem>,
}

impl TxOut {
    pub fn new(height: u64) -> Self {
        Self {
            height,
            tx_array: vec![],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tx_array.is_empty()
    }
}
