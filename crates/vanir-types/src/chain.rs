use std::fmt::{self, Display};
use std::str::FromStr;

use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::{Asset, Coin};

/// An external chain the network custodies funds on.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode, Serialize, Deserialize,
)]
pub enum Chain {
    Bnb,
    Btc,
    Eth,
    Thor,
}

impl Chain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Chain::Bnb => "BNB",
            Chain::Btc => "BTC",
            Chain::Eth => "ETH",
            Chain::Thor => "THOR",
        }
    }

    /// The asset outbound transactions on this chain pay their gas in.
    pub fn gas_asset(&self) -> Asset {
        match self {
            Chain::Bnb => Asset::new(Chain::Bnb, "BNB", "BNB"),
            Chain::Btc => Asset::new(Chain::Btc, "BTC", "BTC"),
            Chain::Eth => Asset::new(Chain::Eth, "ETH", "ETH"),
            Chain::Thor => Asset::rune(),
        }
    }

    /// Flat per-transaction gas estimate for outbounds on this chain.
    ///
    /// Real fee estimation happens in the chain clients; the state machine
    /// only needs a deterministic reservation amount.
    pub fn estimated_gas(&self) -> Coin {
        let units = match self {
            Chain::Bnb => 37_500,
            Chain::Btc => 10_000,
            Chain::Eth => 21_000,
            Chain::Thor => 2_000_000,
        };
        Coin::new(self.gas_asset(), units)
    }
}

impl Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Chain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BNB" => Ok(Chain::Bnb),
            "BTC" => Ok(Chain::Btc),
            "ETH" => Ok(Chain::Eth),
            "THOR" => Ok(Chain::Thor),
            other => Err(format!("unsupported chain: {other}")),
        }
    }
}
