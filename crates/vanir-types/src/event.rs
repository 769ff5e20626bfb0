use std::fmt::{self, Display};

use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::{Asset, PoolStatus, ReserveContributor, Tx, TxId};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode, Serialize, Deserialize,
)]
pub enum EventStatus {
    /// Waiting on related outbound transactions to be observed.
    Pending,
    Success,
    Refund,
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode, Serialize, Deserialize,
)]
pub enum EventType {
    Swap,
    Stake,
    Unstake,
    Refund,
    Pool,
    AdminConfig,
    Reserve,
    Errata,
}

impl Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventType::Swap => "swap",
            EventType::Stake => "stake",
            EventType::Unstake => "unstake",
            EventType::Refund => "refund",
            EventType::Pool => "pool",
            EventType::AdminConfig => "admin_config",
            EventType::Reserve => "reserve",
            EventType::Errata => "errata",
        };
        write!(f, "{s}")
    }
}

/// An append-only record of something the state machine did. Ids are dense
/// and monotonic; payloads are JSON-encoded per event type.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct Event {
    pub id: u64,
    pub height: u64,
    pub event_type: EventType,
    pub in_tx: Tx,
    pub payload: Vec<u8>,
    pub status: EventStatus,
}

impl Event {
    pub fn new(
        event_type: EventType,
        height: u64,
        in_tx: Tx,
        payload: Vec<u8>,
        status: EventStatus,
    ) -> Self {
        Self {
            id: 0,
            height,
            event_type,
            in_tx,
            payload,
            status,
        }
    }

    /// The terminal status this event settles to once its outbounds complete.
    pub fn terminal_status(&self) -> EventStatus {
        if self.event_type == EventType::Refund {
            EventStatus::Refund
        } else {
            EventStatus::Success
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventSwap {
    pub pool: Asset,
    pub price_target: u128,
    pub trade_slip: u128,
    pub liquidity_fee: u128,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventStake {
    pub pool: Asset,
    pub stake_units: u128,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventUnstake {
    pub pool: Asset,
    pub stake_units: u128,
    pub basis_points: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventRefund {
    pub code: u32,
    pub reason: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventPool {
    pub pool: Asset,
    pub status: PoolStatus,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventAdminConfig {
    pub key: String,
    pub value: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventReserve {
    pub contributor: ReserveContributor,
}

/// Emitted when an outbound is observed that no queued item accounts for.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventErrata {
    pub tx_id: TxId,
}
