use super::*;

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// Suspend a pool and send every staker their share back.
    pub(crate) fn handle_end_pool(
        &mut self,
        msg: &MsgEndPool,
        constants: &ConstantValues,
    ) -> Result<(), Report> {
        self.ensure_active_signer(&msg.signer)?;

        let Some(mut pool) = self.get_pool(&msg.asset)? else {
            return Err(
                HandlerError::unknown_request(format!("pool {} does not exist", msg.asset)).into(),
            );
        };

        // Refund every staker in full before closing the doors.
        let pool_staker = self.get_pool_staker(&msg.asset)?;
        for staker in &pool_staker.stakers {
            if staker.units == 0 {
                continue;
            }
            let unstake = MsgUnstake {
                tx: msg.tx.clone(),
                rune_address: staker.rune_address.clone(),
                basis_points: MAX_WITHDRAW_BASIS_POINTS,
                asset: msg.asset.clone(),
                signer: msg.signer.clone(),
            };
            self.withdraw_stake(&unstake, constants)?;
        }

        pool.status = PoolStatus::Suspended;
        self.set_pool(&pool);
        info!(pool = %msg.asset, "pool ended");

        let payload = serde_json::to_vec(&EventPool {
            pool: pool.asset.clone(),
            status: PoolStatus::Suspended,
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
