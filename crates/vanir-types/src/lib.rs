//! Domain types for the vanir state machine: chains, assets, transactions,
//! vaults, pools, node accounts, the memo grammar, and the message set.
//!
//! Everything persisted by the state machine lives here and carries a
//! deterministic canonical encoding via [`DomainType`].

mod asset;
mod chain;
mod code;
mod codec;
mod coin;
mod event;
mod memo;
mod message;
mod node;
mod pool;
mod pubkey;
mod reserve;
mod tx;
mod txout;
mod vault;
mod voter;

pub use asset::Asset;
pub use chain::Chain;
pub use code::{Code, HandlerError};
pub use codec::DomainType;
pub use coin::{Coin, Coins, Gas};
pub use event::{
    Event, EventAdminConfig, EventErrata, EventPool, EventRefund, EventReserve, EventStake,
    EventStatus, EventSwap, EventType, EventUnstake,
};
pub use memo::Memo;
pub use message::{
    Msg, MsgAck, MsgAdd, MsgBond, MsgEndPool, MsgLeave, MsgNextPoolAddress, MsgObservedTxIn,
    MsgObservedTxOut, MsgOutboundTx, MsgReserveContributor, MsgSetAdminConfig, MsgSetTrustAccount,
    MsgSetVersion, MsgStake, MsgSwap, MsgUnstake, MsgYggdrasil,
};
pub use node::{NodeAccount, NodeStatus};
pub use pool::{Pool, PoolStaker, PoolStatus, StakerPool, StakerPoolItem, StakerUnit};
pub use pubkey::{Address, PubKey, PubKeySet};
pub use reserve::{ReserveContributor, VaultData};
pub use tx::{ObservedTx, Tx, TxId};
pub use txout::{TxOut, TxOutItem};
pub use vault::{Vault, VaultStatus, VaultType};
pub use voter::{has_super_majority, ObservedTxVoter};

/// Basis points denominator: withdrawals and slip measures are expressed in
/// units of 1/10000.
pub const MAX_WITHDRAW_BASIS_POINTS: u64 = 10_000;
