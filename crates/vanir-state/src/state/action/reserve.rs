use super::*;

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// Record a RUNE contribution to the protocol reserve.
    pub(crate) fn handle_reserve_contributor(
        &mut self,
        msg: &MsgReserveContributor,
        _constants: &ConstantValues,
    ) -> Result<(), Report> {
        self.ensure_active_signer(&msg.signer)?;

        self.add_reserve_contributor(&msg.contributor)?;

        let mut data = self.vault_data()?;
        data.total_reserve = data.total_reserve.saturating_add(msg.contributor.amount);
        self.set_vault_data(&data);

        info!(
            contributor = %msg.contributor.address,
            amount = msg.contributor.amount,
            total_reserve = data.total_reserve,
            "reserve contribution recorded"
        );

        let payload = serde_json::to_vec(&EventReserve {
            contributor: msg.contributor.clone(),
        })?;
        let event = Event::new(
            EventType::Reserve,
            self.block_height()?,
            msg.tx.clone(),
            payload,
            EventStatus::Success,
        );
        self.upsert_event(event)?;
        Ok(())
    }
}
