use tendermint::abci::types::Misbehavior;

use super::*;

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// Begin a block: record the height, mark byzantine validators, and run
    /// the validator manager's marking and rotation checks.
    pub fn begin_block(
        &mut self,
        request::BeginBlock {
            hash: _,
            header:
                Header {
                    chain_id,
                    height,
                    time: _,
                    version: _,
                    last_block_id: _,
                    last_commit_hash: _,
                    data_hash: _,
                    validators_hash: _,
                    next_validators_hash: _,
                    consensus_hash: _,
                    app_hash: _,
                    last_results_hash: _,
                    evidence_hash: _,
                    proposer_address: _,
                },
            last_commit_info: _,
            byzantine_validators,
        }: request::BeginBlock,
    ) -> Result<response::BeginBlock, Report> {
        // Ensure chain ID matches the current chain ID:
        let current_chain_id = self.chain_id()?;
        if chain_id.as_str() != current_chain_id {
            bail!(
                "begin-block chain ID {} does not match current chain ID {}",
                chain_id.as_str(),
                current_chain_id,
            );
        }

        self.set_block_height(height.value());

        // Byzantine validators get marked for the next churn.
        for Misbehavior { validator, .. } in byzantine_validators {
            self.mark_byzantine_validator(&validator.address)?;
        }

        self.validator_begin_block()?;

        Ok(response::BeginBlock { events: vec![] })
    }

    /// Find the node behind a consensus-engine validator address (the first
    /// 20 bytes of the SHA-256 of its consensus key) and mark it to leave.
    fn mark_byzantine_validator(&mut self, address: &[u8; 20]) -> Result<(), Report> {
        let height = self.block_height()?;
        for mut na in self.list_active_node_accounts()? {
            let Ok(bytes) = hex::decode(&na.validator_cons_pub_key) else {
                continue;
            };
            let digest = Sha256::digest(&bytes);
            if &digest[..20] == address {
                if na.leave_height == 0 {
                    warn!(node = %na.node_address, "marking byzantine validator to leave");
                    na.leave_height = height;
                    self.set_node_account(&na);
                }
                return Ok(());
            }
        }
        warn!(
            address = hex::encode(address),
            "byzantine validator not found; it may have already left"
        );
        Ok(())
    }
}
