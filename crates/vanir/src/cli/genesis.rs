use clap::Parser;
use serde_json::json;
use vanir_types::{Address, NodeAccount, NodeStatus, PubKey, PubKeySet};

use super::Run;

/// Print a genesis app-state template with placeholder node accounts, ready
/// to paste into the consensus engine's genesis document.
#[derive(Parser)]
pub struct Genesis {
    /// How many placeholder node accounts to emit.
    #[clap(long, default_value = "4")]
    nodes: u8,
    /// Bond for each placeholder node, in 1e8 RUNE units.
    #[clap(long, default_value = "100000000000000")]
    bond: u128,
}

impl Run for Genesis {
    async fn run(self) -> color_eyre::Result<()> {
        let Self { nodes, bond } = self;

        let node_accounts: Vec<NodeAccount> = (0..nodes)
            .map(|n| {
                NodeAccount::new(
                    Address::new(format!("node-{n}")),
                    NodeStatus::Ready,
                    PubKeySet::new(
                        PubKey::new(vec![n.wrapping_add(1); 33]),
                        PubKey::new(vec![n.wrapping_add(101); 32]),
                    ),
                    hex::encode([n.wrapping_add(201); 32]),
                    bond,
                    Address::new(format!("bond-{n}")),
                    0,
                )
            })
            .collect();

        let app_state = json!({
            "node_accounts": node_accounts,
            "reserve_contributors": [],
        });
        println!("{}", serde_json::to_string_pretty(&app_state)?);
        Ok(())
    }
}
