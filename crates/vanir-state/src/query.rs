use std::str::FromStr;

use color_eyre::{
    eyre::{bail, eyre, OptionExt},
    Report,
};
use serde_json::json;
use vanir_types::{Address, Asset, Chain, PubKey, TxId};

use crate::store::{StateReadExt, StateWriteExt};
use crate::State;

/// Read-only projections over the state, keyed by query path.
///
/// Paths are slash separated: `pools`, `pool/BNB.BNB`, `stakers/BNB.BNB`,
/// `staker_pools/{address}`, `txin/{hash}`, `txout/{height}`, `heights`,
/// `observers`, `node_account/{address}`, `node_accounts`, `vaults`,
/// `pool_addresses`, `validators`, `events/{from_id}`, `events_incomplete`,
/// `admin/{key}`, `ragnarok`.
pub fn handle_query<S: StateReadExt + StateWriteExt + 'static>(
    state: &State<S>,
    path: &str,
) -> Result<Vec<u8>, Report> {
    let mut parts = path.trim_matches('/').splitn(2, '/');
    let head = parts.next().unwrap_or_default();
    let arg = parts.next().unwrap_or_default();

    let value = match head {
        "pools" => json!(state.pools()?),
        "pool" => {
            let asset = Asset::from_str(arg).map_err(|e| eyre!(e))?;
            json!(state.get_pool(&asset)?.ok_or_eyre("pool not found")?)
        }
        "stakers" => {
            let asset = Asset::from_str(arg).map_err(|e| eyre!(e))?;
            json!(state.get_pool_staker(&asset)?)
        }
        "staker_pools" => json!(state.get_staker_pool(&Address::new(arg))?),
        "txin" => json!(state.get_observed_tx_voter(&TxId::new(arg))?),
        "txout" => {
            let height: u64 = arg.parse().map_err(|_| eyre!("invalid height: {arg}"))?;
            json!(state.get_tx_out(height)?)
        }
        "heights" => {
            let mut heights = serde_json::Map::new();
            for chain in state.chains()? {
                heights.insert(chain.to_string(), json!(state.last_chain_height(chain)?));
            }
            json!({
                "block_height": state.block_height()?,
                "chains": heights,
                "last_signed_height": state.last_signed_height()?,
            })
        }
        "observers" => json!(state.observing_addresses()?),
        "node_account" => {
            json!(state
                .get_node_account(&Address::new(arg))?
                .ok_or_eyre("node account not found")?)
        }
        "node_accounts" => json!(state.node_accounts()?),
        "validators" => json!(state.list_active_node_accounts()?),
        "vaults" => json!(state.asgard_vaults()?),
        "vault" => {
            let pub_key = PubKey::from_hex(arg)?;
            json!(state.get_vault(&pub_key)?.ok_or_eyre("vault not found")?)
        }
        "pool_addresses" => {
            let current = state
                .current_signing_vault()?
                .ok_or_eyre("no active asgard vault")?;
            let mut addresses = serde_json::Map::new();
            for chain in [Chain::Bnb, Chain::Btc, Chain::Eth, Chain::Thor] {
                addresses.insert(chain.to_string(), json!(current.pub_key.address(chain)));
            }
            json!({
                "current": current.pub_key,
                "addresses": addresses,
            })
        }
        "events" => {
            let from_id: u64 = arg.parse().map_err(|_| eyre!("invalid event id: {arg}"))?;
            json!(state.events_from(from_id)?)
        }
        "events_incomplete" => json!(state.incomplete_events()?),
        "admin" => {
            let mut values = serde_json::Map::new();
            for na in state.list_active_node_accounts()? {
                if let Some(value) = state.admin_config(arg, &na.node_address)? {
                    values.insert(na.node_address.to_string(), json!(value));
                }
            }
            json!(values)
        }
        "ragnarok" => json!(state.ragnarok_block_height()?),
        other => bail!("unknown query path: {other}"),
    };

    Ok(serde_json::to_vec(&value)?)
}
