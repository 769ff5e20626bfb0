use super::*;

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// End a block: settle slashing for the window, accrue rewards, move
    /// retiring-vault funds along, and hand the consensus engine its
    /// validator updates.
    pub fn end_block(
        &mut self,
        request::EndBlock { height }: request::EndBlock,
    ) -> Result<response::EndBlock, Report> {
        // Ensure the height matches the current height:
        let current_height = self.block_height()?;
        if u64::try_from(height)? != current_height {
            bail!("end-block height {height} does not match current height {current_height}");
        }

        let constants = self.constants()?;

        // Outbounds past their signing deadline reassign before new ones
        // queue up; the observation window then resets for the next block.
        self.slash_lack_signing(&constants)?;
        self.slash_lack_observing(&constants)?;

        self.accrue_block_rewards()?;
        self.migrate_retiring_funds()?;

        let validator_updates = self.validator_end_block()?;

        Ok(response::EndBlock {
            validator_updates,
            consensus_param_updates: None,
            events: vec![],
        })
    }
}
