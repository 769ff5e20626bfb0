use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::{
    Address, Asset, Code, Coins, HandlerError, ObservedTx, PubKey, PubKeySet, ReserveContributor,
    Tx, TxId, MAX_WITHDRAW_BASIS_POINTS,
};

fn invalid(reason: &str) -> HandlerError {
    HandlerError::new(Code::InvalidMessage, reason)
}

/// Per-node observations of inbound transactions on external chains.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct MsgObservedTxIn {
    pub txs: Vec<ObservedTx>,
    pub signer: Address,
}

/// Per-node observations of outbound transactions the network signed.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct MsgObservedTxOut {
    pub txs: Vec<ObservedTx>,
    pub signer: Address,
}

/// Swap the sent coin for the target asset.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct MsgSwap {
    pub tx: Tx,
    pub target_asset: Asset,
    pub destination: Address,
    /// Minimum acceptable output; zero disables price protection.
    pub trade_target: u128,
    pub signer: Address,
}

/// Add liquidity to a pool.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct MsgStake {
    pub tx: Tx,
    pub asset: Asset,
    pub rune_amount: u128,
    pub asset_amount: u128,
    pub rune_address: Address,
    pub asset_address: Address,
    pub signer: Address,
}

/// Withdraw a basis-point share of staked units.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct MsgUnstake {
    pub tx: Tx,
    pub rune_address: Address,
    pub basis_points: u64,
    pub asset: Asset,
    pub signer: Address,
}

/// Donate to a pool without minting units.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct MsgAdd {
    pub tx: Tx,
    pub asset: Asset,
    pub rune_amount: u128,
    pub asset_amount: u128,
    pub signer: Address,
}

/// A node operator asking to leave the network and recover their bond.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct MsgLeave {
    /// The on-chain request; its sender must be the node's bond address.
    pub tx: Tx,
    pub signer: Address,
}

/// Record a contribution to the protocol reserve.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct MsgReserveContributor {
    pub tx: Tx,
    pub contributor: ReserveContributor,
    pub signer: Address,
}

/// Funds moving into or out of a node's yggdrasil vault.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct MsgYggdrasil {
    pub pub_key: PubKey,
    /// True when asgard funded the vault, false when the vault returned
    /// funds.
    pub add_funds: bool,
    pub coins: Coins,
    pub tx: Tx,
    pub signer: Address,
}

/// Announce the pubkey the next keygen ceremony should produce a vault for.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct MsgNextPoolAddress {
    pub tx: Tx,
    pub next_pool_pub_key: PubKey,
    pub signer: Address,
}

/// A node acknowledging that a keygen ceremony completed with the given
/// vault pubkey. Supermajority agreement promotes the vault.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct MsgAck {
    pub tx: Tx,
    pub pub_key: PubKey,
    pub signer: Address,
}

/// Whitelist a new node account backed by a bond.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct MsgBond {
    pub tx: Tx,
    pub node_address: Address,
    pub bond: u128,
    pub bond_address: Address,
    pub signer: Address,
}

/// A node reporting the software version it runs.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct MsgSetVersion {
    pub version: String,
    pub signer: Address,
}

/// A whitelisted node registering its observation and consensus keys.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct MsgSetTrustAccount {
    pub pub_key_set: PubKeySet,
    pub validator_cons_pub_key: String,
    pub signer: Address,
}

/// Suspend a pool and refund its stakers.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct MsgEndPool {
    pub asset: Asset,
    pub tx: Tx,
    pub signer: Address,
}

/// Set a per-signer admin configuration value.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct MsgSetAdminConfig {
    pub key: String,
    pub value: String,
    pub signer: Address,
}

/// An outbound transaction the signers report having broadcast.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct MsgOutboundTx {
    pub tx: ObservedTx,
    pub in_tx_id: TxId,
    pub signer: Address,
}

/// The closed message set. Adding a kind here forces every match in the
/// router to handle it.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub enum Msg {
    ObservedTxIn(MsgObservedTxIn),
    ObservedTxOut(MsgObservedTxOut),
    Swap(MsgSwap),
    Stake(MsgStake),
    Unstake(MsgUnstake),
    Add(MsgAdd),
    OutboundTx(MsgOutboundTx),
    Leave(MsgLeave),
    ReserveContributor(MsgReserveContributor),
    Yggdrasil(MsgYggdrasil),
    NextPoolAddress(MsgNextPoolAddress),
    Bond(MsgBond),
    SetVersion(MsgSetVersion),
    SetTrustAccount(MsgSetTrustAccount),
    EndPool(MsgEndPool),
    Ack(MsgAck),
    SetAdminConfig(MsgSetAdminConfig),
    Noop { signer: Address },
}

impl Msg {
    pub fn signer(&self) -> &Address {
        match self {
            Msg::ObservedTxIn(m) => &m.signer,
            Msg::ObservedTxOut(m) => &m.signer,
            Msg::Swap(m) => &m.signer,
            Msg::Stake(m) => &m.signer,
            Msg::Unstake(m) => &m.signer,
            Msg::Add(m) => &m.signer,
            Msg::OutboundTx(m) => &m.signer,
            Msg::Leave(m) => &m.signer,
            Msg::ReserveContributor(m) => &m.signer,
            Msg::Yggdrasil(m) => &m.signer,
            Msg::NextPoolAddress(m) => &m.signer,
            Msg::Bond(m) => &m.signer,
            Msg::SetVersion(m) => &m.signer,
            Msg::SetTrustAccount(m) => &m.signer,
            Msg::EndPool(m) => &m.signer,
            Msg::Ack(m) => &m.signer,
            Msg::SetAdminConfig(m) => &m.signer,
            Msg::Noop { signer } => signer,
        }
    }

    /// Stateless validation: reject malformed fields before any state is
    /// touched.
    pub fn validate_basic(&self) -> Result<(), HandlerError> {
        if self.signer().is_empty() {
            return Err(invalid("signer cannot be empty"));
        }
        match self {
            Msg::ObservedTxIn(m) => {
                if m.txs.is_empty() {
                    return Err(invalid("observed txs cannot be empty"));
                }
                for tx in &m.txs {
                    tx.valid().map_err(|e| invalid(&e))?;
                }
            }
            Msg::ObservedTxOut(m) => {
                if m.txs.is_empty() {
                    return Err(invalid("observed txs cannot be empty"));
                }
                for tx in &m.txs {
                    tx.valid().map_err(|e| invalid(&e))?;
                }
            }
            Msg::Swap(m) => {
                m.tx.valid().map_err(|e| invalid(&e))?;
                if m.target_asset.symbol.is_empty() {
                    return Err(invalid("swap target asset cannot be empty"));
                }
                if m.destination.is_empty() {
                    return Err(invalid("swap destination cannot be empty"));
                }
            }
            Msg::Stake(m) => {
                m.tx.valid().map_err(|e| invalid(&e))?;
                if m.asset.is_rune() {
                    return Err(invalid("cannot stake the rune side alone as a pool asset"));
                }
                if m.rune_amount == 0 && m.asset_amount == 0 {
                    return Err(invalid("stake amounts cannot both be zero"));
                }
                if m.rune_address.is_empty() {
                    return Err(invalid("stake rune address cannot be empty"));
                }
            }
            Msg::Unstake(m) => {
                if m.basis_points > MAX_WITHDRAW_BASIS_POINTS {
                    return Err(invalid("withdraw basis points out of range"));
                }
                if m.rune_address.is_empty() {
                    return Err(invalid("unstake rune address cannot be empty"));
                }
            }
            Msg::Add(m) => {
                m.tx.valid().map_err(|e| invalid(&e))?;
                if m.asset.is_rune() {
                    return Err(invalid("cannot add rune to itself"));
                }
            }
            Msg::OutboundTx(m) => {
                m.tx.valid().map_err(|e| invalid(&e))?;
                if m.in_tx_id.is_empty() {
                    return Err(invalid("outbound in-hash cannot be empty"));
                }
            }
            Msg::Leave(m) => {
                if m.tx.from_address.is_empty() {
                    return Err(invalid("leave sender cannot be empty"));
                }
                if m.tx.id.is_empty() {
                    return Err(invalid("leave tx id cannot be empty"));
                }
            }
            Msg::ReserveContributor(m) => {
                if m.contributor.is_empty() {
                    return Err(invalid("reserve contributor cannot be empty"));
                }
            }
            Msg::Yggdrasil(m) => {
                if m.pub_key.is_empty() {
                    return Err(invalid("yggdrasil pub key cannot be empty"));
                }
                if m.coins.is_empty() {
                    return Err(invalid("yggdrasil coins cannot be empty"));
                }
            }
            Msg::NextPoolAddress(m) => {
                if m.next_pool_pub_key.is_empty() {
                    return Err(invalid("next pool pub key cannot be empty"));
                }
            }
            Msg::Bond(m) => {
                if m.node_address.is_empty() {
                    return Err(invalid("bond node address cannot be empty"));
                }
                if m.bond_address.is_empty() {
                    return Err(invalid("bond address cannot be empty"));
                }
                if m.bond == 0 {
                    return Err(invalid("bond cannot be zero"));
                }
            }
            Msg::SetVersion(m) => {
                if semver::Version::parse(&m.version).is_err() {
                    return Err(invalid("version is not valid semver"));
                }
            }
            Msg::SetTrustAccount(m) => {
                if m.pub_key_set.secp256k1.is_empty() || m.pub_key_set.ed25519.is_empty() {
                    return Err(invalid("trust account keys cannot be empty"));
                }
                if m.validator_cons_pub_key.is_empty() {
                    return Err(invalid("validator consensus pub key cannot be empty"));
                }
            }
            Msg::Ack(m) => {
                if m.pub_key.is_empty() {
                    return Err(invalid("acknowledged pub key cannot be empty"));
                }
            }
            Msg::EndPool(m) => {
                if m.asset.is_rune() {
                    return Err(invalid("cannot end the rune pool"));
                }
            }
            Msg::SetAdminConfig(m) => {
                if m.key.is_empty() {
                    return Err(invalid("admin config key cannot be empty"));
                }
            }
            Msg::Noop { .. } => {}
        }
        Ok(())
    }
}
