use std::fmt::{self, Display};
use std::str::FromStr;

use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::{Address, Asset};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode, Serialize, Deserialize,
)]
pub enum PoolStatus {
    /// Open for swaps and staking.
    Enabled,
    /// Accepting stakes but not swaps.
    Bootstrap,
    /// Closed; only withdrawals are allowed.
    Suspended,
}

impl Display for PoolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PoolStatus::Enabled => "Enabled",
            PoolStatus::Bootstrap => "Bootstrap",
            PoolStatus::Suspended => "Suspended",
        };
        write!(f, "{s}")
    }
}

impl FromStr for PoolStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "enabled" => Ok(PoolStatus::Enabled),
            "bootstrap" => Ok(PoolStatus::Bootstrap),
            "suspended" => Ok(PoolStatus::Suspended),
            other => Err(format!("unknown pool status: {other}")),
        }
    }
}

/// A constant-product liquidity pool pairing RUNE against one asset.
///
/// `pool_units` is zero exactly when both balances are zero.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct Pool {
    pub asset: Asset,
    pub balance_rune: u128,
    pub balance_asset: u128,
    pub pool_units: u128,
    pub status: PoolStatus,
}

impl Pool {
    pub fn new(asset: Asset, status: PoolStatus) -> Self {
        Self {
            asset,
            balance_rune: 0,
            balance_asset: 0,
            pool_units: 0,
            status,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pool_units == 0
    }
}

/// One staker's share of a pool.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct StakerUnit {
    pub rune_address: Address,
    pub asset_address: Address,
    pub units: u128,
}

/// Pool-side index: which stakers hold units of this pool.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct PoolStaker {
    pub asset: Asset,
    pub total_units: u128,
    pub stakers: Vec<StakerUnit>,
}

impl PoolStaker {
    pub fn new(asset: Asset) -> Self {
        Self {
            asset,
            total_units: 0,
            stakers: vec![],
        }
    }

    pub fn staker(&self, rune_address: &Address) -> Option<&StakerUnit> {
        self.stakers.iter().find(|s| &s.rune_address == rune_address)
    }

    /// Add units for a staker, creating the entry on first stake.
    pub fn add_units(&mut self, rune_address: &Address, asset_address: &Address, units: u128) {
        match self
            .stakers
            .iter_mut()
            .find(|s| &s.rune_address == rune_address)
        {
            Some(staker) => staker.units = staker.units.saturating_add(units),
            None => self.stakers.push(StakerUnit {
                rune_address: rune_address.clone(),
                asset_address: asset_address.clone(),
                units,
            }),
        }
        self.total_units = self.total_units.saturating_add(units);
    }

    /// Remove units for a staker, dropping the entry when it reaches zero.
    pub fn sub_units(&mut self, rune_address: &Address, units: u128) {
        if let Some(staker) = self
            .stakers
            .iter_mut()
            .find(|s| &s.rune_address == rune_address)
        {
            staker.units = staker.units.saturating_sub(units);
        }
        self.stakers.retain(|s| s.units > 0);
        self.total_units = self.total_units.saturating_sub(units);
    }
}

/// Staker-side index entry: the staker's units in one pool.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct StakerPoolItem {
    pub asset: Asset,
    pub units: u128,
}

/// Staker-side index: which pools this address has staked into.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct StakerPool {
    pub rune_address: Address,
    pub pools: Vec<StakerPoolItem>,
}

impl StakerPool {
    pub fn new(rune_address: Address) -> Self {
        Self {
            rune_address,
            pools: vec![],
        }
    }

    pub fn add_units(&mut self, asset: &Asset, units: u128) {
        match self.pools.iter_mut().find(|p| &p.asset == asset) {
            Some(item) => item.units = item.units.saturating_add(units),
            None => self.pools.push(StakerPoolItem {
                asset: asset.clone(),
                units,
            }),
        }
    }

    pub fn sub_units(&mut self, asset: &Asset, units: u128) {
        if let Some(item) = self.pools.iter_mut().find(|p| &p.asset == asset) {
            item.units = item.units.saturating_sub(units);
        }
        self.pools.retain(|p| p.units > 0);
    }
}
