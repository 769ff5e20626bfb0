use std::fmt::{self, Display};
use std::ops::{Deref, DerefMut};

use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::Asset;

/// An amount of a single asset. Amounts are integers in the asset's smallest
/// denomination (1e8 fixed point for every supported chain).
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode, Serialize, Deserialize,
)]
pub struct Coin {
    pub asset: Asset,
    pub amount: u128,
}

impl Coin {
    pub fn new(asset: Asset, amount: u128) -> Self {
        Self { asset, amount }
    }

    pub fn is_empty(&self) -> bool {
        self.amount == 0
    }

    pub fn valid(&self) -> Result<(), String> {
        if self.asset.symbol.is_empty() {
            return Err("coin has an empty asset".to_string());
        }
        if self.amount == 0 {
            return Err(format!("coin {} has a zero amount", self.asset));
        }
        Ok(())
    }
}

impl Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.asset)
    }
}

/// An ordered list of coins, as carried by a transaction.
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
pub struct Coins(pub Vec<Coin>);

/// Gas is a list of coins attached to a transaction to pay its chain fees.
pub type Gas = Coins;

impl Coins {
    pub fn new(coins: Vec<Coin>) -> Self {
        Self(coins)
    }

    pub fn amount_of(&self, asset: &Asset) -> u128 {
        self.0
            .iter()
            .filter(|c| &c.asset == asset)
            .map(|c| c.amount)
            .sum()
    }

    pub fn amount_of_rune(&self) -> u128 {
        self.0
            .iter()
            .filter(|c| c.asset.is_rune())
            .map(|c| c.amount)
            .sum()
    }

    pub fn valid(&self) -> Result<(), String> {
        for coin in &self.0 {
            coin.valid()?;
        }
        Ok(())
    }
}

impl Deref for Coins {
    type Target = Vec<Coin>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Coins {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl FromIterator<Coin> for Coins {
    fn from_iter<T: IntoIterator<Item = Coin>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
