use std::collections::BTreeSet;
use std::str::FromStr;

use color_eyre::{
    eyre::{bail, eyre, OptionExt},
    Report,
};
use vanir_types::{
    has_super_majority, Address, Asset, Chain, Code, Coin, Coins, Event, EventAdminConfig,
    EventErrata, EventPool, EventRefund, EventReserve, EventStake, EventStatus, EventSwap, EventType,
    EventUnstake, HandlerError, Memo, Msg, MsgAck, MsgAdd, MsgBond, MsgEndPool, MsgLeave,
    MsgNextPoolAddress, MsgObservedTxIn, MsgObservedTxOut, MsgOutboundTx, MsgReserveContributor,
    MsgSetAdminConfig, MsgSetTrustAccount, MsgSetVersion, MsgStake, MsgSwap, MsgUnstake,
    MsgYggdrasil, NodeAccount, NodeStatus, ObservedTx, ObservedTxVoter, Pool, PoolStaker,
    PoolStatus, PubKey, ReserveContributor, StakerPool, Tx, TxId, TxOut, TxOutItem, Vault,
    VaultData, VaultStatus, VaultType, MAX_WITHDRAW_BASIS_POINTS,
};

use crate::store::{StateReadExt, StateWriteExt};

pub(crate) use constants::ConstantValues;
pub(crate) use util::pad_height;

mod abci;
mod action;
mod constants;
mod event;
mod height;
mod node;
mod pool;
mod ragnarok;
mod reserve;
mod slash;
mod txout;
mod util;
mod validator;
mod vault;
mod voter;

#[cfg(test)]
pub(crate) mod testing;

#[cfg(test)]
mod abci_tests;
#[cfg(test)]
mod pool_tests;
#[cfg(test)]
mod ragnarok_tests;
#[cfg(test)]
mod txout_tests;
#[cfg(test)]
mod validator_tests;

/// The replicated state machine, generic over its backing store.
///
/// Behavior is split across one extension impl per concern; everything goes
/// through the typed store so that replicas stay byte-identical.
pub struct State<S> {
    store: S,
}

impl<S> State<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// Run a closure against a checkpointed store: its writes only land if
    /// it succeeds. A failed handler must leave no state behind.
    pub(crate) fn transactional<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, Report>,
    ) -> Result<T, Report> {
        self.store.checkpoint();
        match f(self) {
            Ok(value) => {
                self.store.commit_checkpoint();
                Ok(value)
            }
            Err(e) => {
                self.store.rollback_checkpoint();
                Err(e)
            }
        }
    }
}
