use super::*;

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    pub(crate) fn handle_unstake(
        &mut self,
        msg: &MsgUnstake,
        constants: &ConstantValues,
    ) -> Result<(), Report> {
        self.ensure_active_signer(&msg.signer)?;
        self.withdraw_stake(msg, constants)
    }

    /// Withdraw a basis-point share of a staker's units, paying out both
    /// sides pro rata. Ragnarok drives this directly, without a signed
    /// message, which is why it is split from the authorization above.
    pub(crate) fn withdraw_stake(
        &mut self,
        msg: &MsgUnstake,
        _constants: &ConstantValues,
    ) -> Result<(), Report> {
        let Some(pool) = self.get_pool(&msg.asset)? else {
            return Err(
                HandlerError::unknown_request(format!("pool {} does not exist", msg.asset)).into(),
            );
        };

        // Capture the payout address before the full-withdrawal case drops
        // the staker entry.
        let asset_address = self
            .get_pool_staker(&msg.asset)?
            .staker(&msg.rune_address)
            .map(|s| s.asset_address.clone())
            .unwrap_or_else(|| msg.rune_address.clone());

        let (rune_amount, asset_amount, units) =
            self.unstake(&msg.asset, &msg.rune_address, msg.basis_points)?;
        if units == 0 {
            // Nothing claimed, nothing owed.
            return Ok(());
        }

        info!(
            pool = %msg.asset,
            staker = %msg.rune_address,
            basis_points = msg.basis_points,
            rune_amount,
            asset_amount,
            "unstake complete"
        );

        let mut emitted = false;
        if rune_amount > 0 {
            let item = TxOutItem::new(
                Asset::rune().chain,
                msg.rune_address.clone(),
                Coin::new(Asset::rune(), rune_amount),
                msg.tx.id.clone(),
            )
            .with_memo(outbound_memo(&msg.tx.id));
            self.try_add_tx_out_item(item)?;
            emitted = true;
        }
        if asset_amount > 0 {
            let item = TxOutItem::new(
                pool.asset.chain,
                asset_address,
                Coin::new(pool.asset.clone(), asset_amount),
                msg.tx.id.clone(),
            )
            .with_memo(outbound_memo(&msg.tx.id));
            self.try_add_tx_out_item(item)?;
            emitted = true;
        }

        let payload = serde_json::to_vec(&EventUnstake {
            pool: msg.asset.clone(),
            stake_units: units,
            basis_points: msg.basis_points,
        })?;
        let status = if emitted && !msg.tx.id.is_blank() {
            EventStatus::Pending
        } else {
            EventStatus::Success
        };
        let event = Event::new(
            EventType::Unstake,
            self.block_height()?,
            msg.tx.clone(),
            payload,
            status,
        );
        self.upsert_event(event)?;
        Ok(())
    }
}

fn outbound_memo(in_hash: &TxId) -> String {
    Memo::Outbound {
        in_hash: in_hash.0.clone(),
    }
    .to_string()
}
