use std::fmt::{self, Display};

use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::{Address, Chain, Coins, Gas, PubKey};

/// A transaction hash on some chain.
#[derive(
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Encode,
    Decode,
    Serialize,
    Deserialize,
)]
pub struct TxId(pub String);

impl TxId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().to_ascii_uppercase())
    }

    /// The id used for internally generated outbounds that have no inbound
    /// counterpart (bond refunds, reserve refunds, ragnarok unwinding).
    pub fn blank() -> Self {
        Self("0000000000000000000000000000000000000000000000000000000000000000".to_string())
    }

    pub fn is_blank(&self) -> bool {
        self == &Self::blank()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A transaction record as seen on an external chain.
#[derive(
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Encode,
    Decode,
    Serialize,
    Deserialize,
)]
pub struct Tx {
    pub id: TxId,
    pub chain: Option<Chain>,
    pub from_address: Address,
    pub to_address: Address,
    pub coins: Coins,
    pub gas: Gas,
    pub memo: String,
}

impl Tx {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: TxId,
        chain: Chain,
        from_address: Address,
        to_address: Address,
        coins: Coins,
        gas: Gas,
        memo: impl Into<String>,
    ) -> Self {
        Self {
            id,
            chain: Some(chain),
            from_address,
            to_address,
            coins,
            gas,
            memo: memo.into(),
        }
    }

    pub fn valid(&self) -> Result<(), String> {
        if self.id.is_empty() {
            return Err("tx id cannot be empty".to_string());
        }
        if self.from_address.is_empty() {
            return Err("from address cannot be empty".to_string());
        }
        if self.to_address.is_empty() {
            return Err("to address cannot be empty".to_string());
        }
        if self.coins.is_empty() {
            return Err("coins cannot be empty".to_string());
        }
        self.coins.valid()?;
        // An empty memo is allowed through validation: the tx would otherwise
        // be unrefundable, and the memo parser rejects it later anyway.
        Ok(())
    }
}

/// A [`Tx`] wrapped with where and by whom it was observed.
#[derive(
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Encode,
    Decode,
    Serialize,
    Deserialize,
)]
pub struct ObservedTx {
    pub tx: Tx,
    /// Height of the external chain block the tx was included in.
    pub block_height: u64,
    /// Node addresses that submitted this exact observation.
    pub signers: Vec<Address>,
    /// The vault the funds were observed moving to or from.
    pub observed_pub_key: PubKey,
}

impl ObservedTx {
    pub fn new(tx: Tx, block_height: u64, observed_pub_key: PubKey) -> Self {
        Self {
            tx,
            block_height,
            signers: vec![],
            observed_pub_key,
        }
    }

    pub fn valid(&self) -> Result<(), String> {
        self.tx.valid()?;
        if self.block_height == 0 {
            return Err("block height cannot be zero".to_string());
        }
        if self.observed_pub_key.is_empty() {
            return Err("observed pub key cannot be empty".to_string());
        }
        Ok(())
    }

    /// Two observations are variants of the same event when everything except
    /// the signer set and external height matches.
    pub fn same_observation(&self, other: &ObservedTx) -> bool {
        self.tx.from_address == other.tx.from_address
            && self.tx.to_address == other.tx.to_address
            && self.tx.coins == other.tx.coins
            && self.tx.memo == other.tx.memo
            && self.observed_pub_key == other.observed_pub_key
    }

    /// Record a signer, once.
    pub fn sign(&mut self, signer: &Address) {
        if !self.signers.contains(signer) {
            self.signers.push(signer.clone());
        }
    }
}
