use super::*;

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    pub fn vault_data(&self) -> Result<VaultData, Report> {
        Ok(self
            .store
            .get::<VaultData>("vault_data/")?
            .unwrap_or_default())
    }

    pub fn set_vault_data(&mut self, data: &VaultData) {
        self.store.put("vault_data/", data);
    }

    pub fn reserve_contributors(&self) -> Result<Vec<ReserveContributor>, Report> {
        Ok(self
            .store
            .get::<Vec<ReserveContributor>>("reserve/")?
            .unwrap_or_default())
    }

    pub fn set_reserve_contributors(&mut self, contributors: &Vec<ReserveContributor>) {
        self.store.put("reserve/", contributors);
    }

    /// Record a reserve contribution, merging repeat contributions from the
    /// same address.
    pub fn add_reserve_contributor(&mut self, contributor: &ReserveContributor) -> Result<(), Report> {
        let mut contributors = self.reserve_contributors()?;
        match contributors
            .iter_mut()
            .find(|c| c.address == contributor.address)
        {
            Some(existing) => {
                existing.amount = existing.amount.saturating_add(contributor.amount)
            }
            None => contributors.push(contributor.clone()),
        }
        self.set_reserve_contributors(&contributors);
        Ok(())
    }

    /// Per-block reward accrual: a slice of the reserve moves into the bond
    /// reward pot, and every active node accrues one bond unit.
    pub fn accrue_block_rewards(&mut self) -> Result<(), Report> {
        let constants = self.constants()?;
        let active_count = self.total_active_node_accounts()? as u128;
        let mut data = self.vault_data()?;

        let emission = data
            .total_reserve
            .checked_div(constants.emission_curve.saturating_mul(constants.blocks_per_year))
            .unwrap_or(0);
        data.total_reserve = data.total_reserve.saturating_sub(emission);
        data.bond_reward_rune = data.bond_reward_rune.saturating_add(emission);
        data.total_bond_units = data.total_bond_units.saturating_add(active_count);

        self.set_vault_data(&data);
        Ok(())
    }
}
