use std::fmt::{self, Display};
use std::str::FromStr;

use crate::{Address, Asset, MAX_WITHDRAW_BASIS_POINTS};

/// The pipe-delimited memo grammar carried in external-chain OP_RETURN data
/// (or the chain's equivalent): an operation, then colon-separated arguments.
///
/// Most operations accept a one-character abbreviation so memos fit in the
/// tightest chains' limits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Memo {
    /// `create:ASSET`: open a new pool for the asset.
    Create { asset: Asset },
    /// `stake:ASSET`: add liquidity to the asset's pool.
    Stake { asset: Asset },
    /// `withdraw:ASSET:BASIS_POINTS`: withdraw a share of staked units.
    Withdraw { asset: Asset, basis_points: u64 },
    /// `swap:ASSET:DEST:SLIP_LIMIT`: swap the sent coin for the asset.
    Swap {
        asset: Asset,
        destination: Option<Address>,
        slip_limit: u128,
    },
    /// `outbound:IN_HASH`: an outbound the network itself signed.
    Outbound { in_hash: String },
    /// `add:ASSET`: donate to the pool without minting units.
    Add { asset: Asset },
    /// `gas`: top up a vault's gas reserves.
    Gas,
    /// `apply:NODE_ADDRESS`: bond onto the named node.
    Apply { node_address: Address },
    /// `nextpool`: announce the next pool address.
    NextPool,
    /// `yggdrasil+:HEIGHT`: asgard funding a node's yggdrasil vault.
    YggdrasilFund { block_height: u64 },
    /// `yggdrasil-:HEIGHT`: a yggdrasil vault returning funds to asgard.
    YggdrasilReturn { block_height: u64 },
    /// `migrate:HEIGHT`: a retiring vault moving funds to its successor.
    Migrate { block_height: u64 },
}

impl Memo {
    pub fn is_outbound(&self) -> bool {
        matches!(self, Memo::Outbound { .. })
    }

    pub fn is_yggdrasil_fund(&self) -> bool {
        matches!(self, Memo::YggdrasilFund { .. })
    }
}

fn parse_asset(parts: &[&str]) -> Result<Asset, String> {
    let raw = parts.get(1).ok_or("memo is missing an asset")?;
    Asset::from_str(raw)
}

fn parse_height(parts: &[&str]) -> Result<u64, String> {
    match parts.get(1) {
        None | Some(&"") => Ok(0),
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|_| format!("invalid block height: {raw}")),
    }
}

impl FromStr for Memo {
    type Err = String;

    fn from_str(memo: &str) -> Result<Self, Self::Err> {
        if memo.is_empty() {
            return Err("memo can't be empty".to_string());
        }
        let parts: Vec<&str> = memo.split(':').collect();
        let op = parts[0].to_ascii_lowercase();

        match op.as_str() {
            "create" | "c" | "#" => Ok(Memo::Create {
                asset: parse_asset(&parts)?,
            }),
            "stake" | "st" | "+" => Ok(Memo::Stake {
                asset: parse_asset(&parts)?,
            }),
            "withdraw" | "wd" | "-" => {
                let asset = parse_asset(&parts)?;
                // Basis points parse as an integer; a missing argument means
                // a full withdrawal.
                let basis_points = match parts.get(2) {
                    None | Some(&"") => MAX_WITHDRAW_BASIS_POINTS,
                    Some(raw) => raw
                        .parse::<u64>()
                        .map_err(|_| format!("withdraw basis points {raw} is invalid"))?,
                };
                if basis_points > MAX_WITHDRAW_BASIS_POINTS {
                    return Err(format!("withdraw basis points {basis_points} is invalid"));
                }
                Ok(Memo::Withdraw {
                    asset,
                    basis_points,
                })
            }
            "swap" | "s" | "=" => {
                let asset = parse_asset(&parts)?;
                // The destination can be empty, in which case the output goes
                // back to the sender.
                let destination = match parts.get(2) {
                    None | Some(&"") => None,
                    Some(raw) => Some(Address::new(*raw)),
                };
                // An empty slip limit means no price protection.
                let slip_limit = match parts.get(3) {
                    None | Some(&"") => 0,
                    Some(raw) => raw
                        .parse::<u128>()
                        .map_err(|_| format!("swap slip limit {raw} is invalid"))?,
                };
                Ok(Memo::Swap {
                    asset,
                    destination,
                    slip_limit,
                })
            }
            "outbound" => {
                let in_hash = parts.get(1).ok_or("outbound memo is missing a hash")?;
                Ok(Memo::Outbound {
                    in_hash: in_hash.to_ascii_uppercase(),
                })
            }
            "add" | "a" | "%" => Ok(Memo::Add {
                asset: parse_asset(&parts)?,
            }),
            "gas" | "g" | "$" => Ok(Memo::Gas),
            "apply" => {
                let addr = parts.get(1).ok_or("apply memo is missing a node address")?;
                if addr.is_empty() {
                    return Err("apply memo is missing a node address".to_string());
                }
                Ok(Memo::Apply {
                    node_address: Address::new(*addr),
                })
            }
            "nextpool" => Ok(Memo::NextPool),
            "yggdrasil+" => Ok(Memo::YggdrasilFund {
                block_height: parse_height(&parts)?,
            }),
            "yggdrasil-" => Ok(Memo::YggdrasilReturn {
                block_height: parse_height(&parts)?,
            }),
            "migrate" => Ok(Memo::Migrate {
                block_height: parse_height(&parts)?,
            }),
            other => Err(format!("invalid tx type: {other}")),
        }
    }
}

impl Display for Memo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Memo::Create { asset } => write!(f, "create:{asset}"),
            Memo::Stake { asset } => write!(f, "stake:{asset}"),
            Memo::Withdraw {
                asset,
                basis_points,
            } => write!(f, "withdraw:{asset}:{basis_points}"),
            Memo::Swap {
                asset,
                destination,
                slip_limit,
            } => {
                let destination = destination
                    .as_ref()
                    .map(|d| d.to_string())
                    .unwrap_or_default();
                write!(f, "swap:{asset}:{destination}:{slip_limit}")
            }
            Memo::Outbound { in_hash } => write!(f, "outbound:{in_hash}"),
            Memo::Add { asset } => write!(f, "add:{asset}"),
            Memo::Gas => write!(f, "gas"),
            Memo::Apply { node_address } => write!(f, "apply:{node_address}"),
            Memo::NextPool => write!(f, "nextpool"),
            Memo::YggdrasilFund { block_height } => write!(f, "yggdrasil+:{block_height}"),
            Memo::YggdrasilReturn { block_height } => write!(f, "yggdrasil-:{block_height}"),
            Memo::Migrate { block_height } => write!(f, "migrate:{block_height}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Chain;

    fn bnb() -> Asset {
        Asset::new(Chain::Bnb, "BNB", "BNB")
    }

    #[test]
    fn parses_core_operations() {
        assert_eq!(
            Memo::from_str("create:BNB.BNB").unwrap(),
            Memo::Create { asset: bnb() }
        );
        assert_eq!(
            Memo::from_str("STAKE:BNB.BNB").unwrap(),
            Memo::Stake { asset: bnb() }
        );
        assert_eq!(
            Memo::from_str("+:BNB.BNB").unwrap(),
            Memo::Stake { asset: bnb() }
        );
        assert_eq!(
            Memo::from_str("withdraw:BNB.BNB:5000").unwrap(),
            Memo::Withdraw {
                asset: bnb(),
                basis_points: 5000
            }
        );
        assert_eq!(
            Memo::from_str("swap:BNB.BNB:bnb1abcd:100000000").unwrap(),
            Memo::Swap {
                asset: bnb(),
                destination: Some(Address::new("bnb1abcd")),
                slip_limit: 100000000
            }
        );
        assert_eq!(
            Memo::from_str("=:BNB.BNB").unwrap(),
            Memo::Swap {
                asset: bnb(),
                destination: None,
                slip_limit: 0
            }
        );
    }

    #[test]
    fn withdraw_basis_points_are_integer_and_bounded() {
        assert!(Memo::from_str("withdraw:BNB.BNB:10001").is_err());
        assert!(Memo::from_str("withdraw:BNB.BNB:50.5").is_err());
        assert!(Memo::from_str("withdraw:BNB.BNB:-1").is_err());
        assert_eq!(
            Memo::from_str("withdraw:BNB.BNB").unwrap(),
            Memo::Withdraw {
                asset: bnb(),
                basis_points: 10000
            }
        );
    }

    #[test]
    fn yggdrasil_memos_round_trip() {
        let memo = Memo::from_str("yggdrasil+:42").unwrap();
        assert!(memo.is_yggdrasil_fund());
        assert_eq!(memo.to_string(), "yggdrasil+:42");
        assert_eq!(
            Memo::from_str("yggdrasil-").unwrap(),
            Memo::YggdrasilReturn { block_height: 0 }
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(Memo::from_str("").is_err());
        assert!(Memo::from_str("hello").is_err());
        assert!(Memo::from_str("create").is_err());
        assert!(Memo::from_str("swap:NOTANASSET").is_err());
    }
}
