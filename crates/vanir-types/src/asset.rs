use std::fmt::{self, Display};
use std::str::FromStr;

use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::Chain;

/// An asset is identified by the chain it lives on, its full symbol, and the
/// ticker portion of that symbol.
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode, Serialize, Deserialize,
)]
pub struct Asset {
    pub chain: Chain,
    pub symbol: String,
    pub ticker: String,
}

impl Asset {
    pub fn new(chain: Chain, symbol: impl Into<String>, ticker: impl Into<String>) -> Self {
        Self {
            chain,
            symbol: symbol.into(),
            ticker: ticker.into(),
        }
    }

    /// The protocol's native settlement asset. Every pool pairs RUNE against
    /// one external asset.
    pub fn rune() -> Self {
        Self::new(Chain::Bnb, "RUNE-B1A", "RUNE")
    }

    pub fn is_rune(&self) -> bool {
        self.ticker == "RUNE"
    }
}

impl Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.chain, self.symbol)
    }
}

impl FromStr for Asset {
    type Err = String;

    /// Parse a `CHAIN.SYMBOL` pair, e.g. `BNB.BNB` or `BNB.RUNE-B1A`. The
    /// ticker is the symbol up to the first dash.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (chain, symbol) = s
            .split_once('.')
            .ok_or_else(|| format!("invalid asset: {s}"))?;
        if symbol.is_empty() {
            return Err(format!("invalid asset: {s}"));
        }
        let chain = Chain::from_str(chain)?;
        let ticker = symbol.split('-').next().unwrap_or(symbol);
        Ok(Self::new(
            chain,
            symbol.to_ascii_uppercase(),
            ticker.to_ascii_uppercase(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips() {
        let asset = Asset::from_str("BNB.RUNE-B1A").unwrap();
        assert_eq!(asset.chain, Chain::Bnb);
        assert_eq!(asset.ticker, "RUNE");
        assert!(asset.is_rune());
        assert_eq!(asset.to_string(), "BNB.RUNE-B1A");

        let asset = Asset::from_str("BNB.BNB").unwrap();
        assert!(!asset.is_rune());
        assert_eq!(asset.ticker, "BNB");
    }

    #[test]
    fn rejects_missing_symbol() {
        assert!(Asset::from_str("BNB").is_err());
        assert!(Asset::from_str("BNB.").is_err());
        assert!(Asset::from_str("DOGE.DOGE").is_err());
    }
}
