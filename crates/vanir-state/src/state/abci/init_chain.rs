use serde::Deserialize;

use super::*;

/// The genesis document's application state.
#[derive(Debug, Default, Deserialize)]
pub struct GenesisState {
    #[serde(default)]
    pub node_accounts: Vec<NodeAccount>,
    #[serde(default)]
    pub reserve_contributors: Vec<ReserveContributor>,
}

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// Initialize the chain state from the genesis document.
    pub fn init_chain(
        &mut self,
        request: request::InitChain,
    ) -> Result<response::InitChain, Report> {
        // Ensure that the initial height is 1:
        if request.initial_height.value() != 1 {
            bail!("initial height must be 1");
        }

        self.set_chain_id(request.chain_id.clone())?;
        self.set_block_height(0);

        if !request.app_state_bytes.is_empty() {
            let genesis: GenesisState = serde_json::from_slice(&request.app_state_bytes)
                .map_err(|e| eyre!("failed to parse genesis app state: {e}"))?;

            for na in &genesis.node_accounts {
                if self.get_node_account(&na.node_address)?.is_some() {
                    bail!("duplicate genesis node account {}", na.node_address);
                }
                self.set_node_account(na);
            }
            let mut data = self.vault_data()?;
            for contributor in &genesis.reserve_contributors {
                self.add_reserve_contributor(contributor)?;
                data.total_reserve = data.total_reserve.saturating_add(contributor.amount);
            }
            self.set_vault_data(&data);
        }

        // The initial app hash commits to the genesis document.
        let mut hasher = Sha256::new();
        hasher.update(request.chain_id.as_bytes());
        hasher.update(&request.app_state_bytes);
        let app_hash = AppHash::try_from(hasher.finalize().to_vec())?;

        Ok(response::InitChain {
            consensus_params: Some(request.consensus_params),
            validators: request.validators,
            app_hash,
        })
    }
}
