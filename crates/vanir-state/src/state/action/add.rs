use super::*;

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// Donate to a pool: balances grow, no units are minted, nobody gains a
    /// claim.
    pub(crate) fn handle_add(
        &mut self,
        msg: &MsgAdd,
        _constants: &ConstantValues,
    ) -> Result<(), Report> {
        self.ensure_active_signer(&msg.signer)?;

        let Some(mut pool) = self.get_pool(&msg.asset)? else {
            return Err(
                HandlerError::unknown_request(format!("pool {} does not exist", msg.asset)).into(),
            );
        };

        pool.balance_rune = pool.balance_rune.saturating_add(msg.rune_amount);
        pool.balance_asset = pool.balance_asset.saturating_add(msg.asset_amount);
        self.set_pool(&pool);

        info!(
            pool = %msg.asset,
            rune = msg.rune_amount,
            asset = msg.asset_amount,
            "added to pool"
        );

        let payload = serde_json::to_vec(&EventPool {
            pool: pool.asset.clone(),
            status: pool.status,
        })?;
        let event = Event::new(
            EventType::Pool,
            self.block_height()?,
            msg.tx.clone(),
            payload,
            EventStatus::Success,
        );
        self.upsert_event(event)?;
        Ok(())
    }
}
