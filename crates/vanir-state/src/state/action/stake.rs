use super::*;

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// Add liquidity to a pool. Single-sided stakes are accepted; units are
    /// awarded by the symmetric formula either way. A stake into a pool that
    /// does not exist yet opens it, so stakers do not need a separate create
    /// step.
    pub(crate) fn handle_stake(
        &mut self,
        msg: &MsgStake,
        _constants: &ConstantValues,
    ) -> Result<(), Report> {
        self.ensure_active_signer(&msg.signer)?;

        if !self.pool_exists(&msg.asset) {
            if self.ragnarok_in_progress()? {
                return Err(
                    HandlerError::unknown_request("cannot create pools while unwinding").into(),
                );
            }
            let pool = Pool::new(msg.asset.clone(), self.default_pool_status()?);
            info!(pool = %msg.asset, status = %pool.status, "created pool for first stake");
            self.set_pool(&pool);
        }

        let units = self.stake(
            &msg.asset,
            msg.rune_amount,
            msg.asset_amount,
            &msg.rune_address,
            &msg.asset_address,
        )?;

        info!(
            pool = %msg.asset,
            staker = %msg.rune_address,
            units,
            "stake complete"
        );

        let payload = serde_json::to_vec(&EventStake {
            pool: msg.asset.clone(),
            stake_units: units,
        })?;
        let event = Event::new(
            EventType::Stake,
            self.block_height()?,
            msg.tx.clone(),
            payload,
            EventStatus::Success,
        );
        self.upsert_event(event)?;
        Ok(())
    }
}
