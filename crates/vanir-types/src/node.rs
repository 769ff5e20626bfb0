use std::fmt::{self, Display};
use std::str::FromStr;

use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::{Address, PubKeySet};

/// Lifecycle status of a node account.
///
/// Transitions are totally ordered: WhiteListed nodes register their keys to
/// become Standby, Standby nodes get promoted to Ready when their software
/// version qualifies, Ready nodes churn into Active, and Active nodes leave
/// back to Standby (or Disabled, when they requested to leave).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode, Serialize, Deserialize,
)]
pub enum NodeStatus {
    Unknown,
    WhiteListed,
    Standby,
    Ready,
    Active,
    Disabled,
}

impl Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeStatus::Unknown => "Unknown",
            NodeStatus::WhiteListed => "WhiteListed",
            NodeStatus::Standby => "Standby",
            NodeStatus::Ready => "Ready",
            NodeStatus::Active => "Active",
            NodeStatus::Disabled => "Disabled",
        };
        write!(f, "{s}")
    }
}

impl FromStr for NodeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "whitelisted" => Ok(NodeStatus::WhiteListed),
            "standby" => Ok(NodeStatus::Standby),
            "ready" => Ok(NodeStatus::Ready),
            "active" => Ok(NodeStatus::Active),
            "disabled" => Ok(NodeStatus::Disabled),
            "unknown" => Ok(NodeStatus::Unknown),
            other => Err(format!("unknown node status: {other}")),
        }
    }
}

/// A validator's registration, bond, and behavior record.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct NodeAccount {
    pub node_address: Address,
    pub status: NodeStatus,
    pub pub_key_set: PubKeySet,
    /// Consensus-engine public key (hex ed25519), handed to the consensus
    /// layer as part of validator updates.
    pub validator_cons_pub_key: String,
    pub bond: u128,
    pub bond_address: Address,
    /// Block at which the node last changed status.
    pub status_since: u64,
    /// Block at which the node became active, zero when not active. Reward
    /// accrual measures from here.
    pub active_block_height: u64,
    pub slash_points: i64,
    pub requested_to_leave: bool,
    /// Block at which the node was marked to churn out, zero if unmarked.
    pub leave_height: u64,
    /// Semantic version of the node's software, as reported by the operator.
    pub version: String,
}

impl NodeAccount {
    pub fn new(
        node_address: Address,
        status: NodeStatus,
        pub_key_set: PubKeySet,
        validator_cons_pub_key: String,
        bond: u128,
        bond_address: Address,
        height: u64,
    ) -> Self {
        Self {
            node_address,
            status,
            pub_key_set,
            validator_cons_pub_key,
            bond,
            bond_address,
            status_since: height,
            active_block_height: if status == NodeStatus::Active {
                height
            } else {
                0
            },
            slash_points: 0,
            requested_to_leave: false,
            leave_height: 0,
            version: "0.1.0".to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.node_address.is_empty()
    }

    pub fn update_status(&mut self, status: NodeStatus, height: u64) {
        self.status = status;
        self.status_since = height;
        if status == NodeStatus::Active {
            self.active_block_height = height;
        }
    }

    /// The node's reported software version; unparseable strings count as
    /// version zero, which never qualifies for promotion.
    pub fn version(&self) -> semver::Version {
        semver::Version::parse(&self.version).unwrap_or_else(|_| semver::Version::new(0, 0, 0))
    }

    /// Blocks of well-behaved activity: blocks active, minus slash points.
    pub fn earned_blocks(&self, current_height: u64) -> u64 {
        if self.active_block_height == 0 {
            return 0;
        }
        let active_blocks = current_height.saturating_sub(self.active_block_height);
        active_blocks.saturating_sub(self.slash_points.max(0) as u64)
    }
}
