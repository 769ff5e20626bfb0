use super::*;

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// Set a per-signer admin configuration value. Values are scoped to the
    /// signer, so one admin cannot silently override another.
    pub(crate) fn handle_set_admin_config(
        &mut self,
        msg: &MsgSetAdminConfig,
        _constants: &ConstantValues,
    ) -> Result<(), Report> {
        self.ensure_active_signer(&msg.signer)?;

        info!(key = %msg.key, value = %msg.value, admin = %msg.signer, "admin config set");
        self.set_admin_config(&msg.key, &msg.signer, msg.value.clone());

        let payload = serde_json::to_vec(&EventAdminConfig {
            key: msg.key.clone(),
            value: msg.value.clone(),
        })?;
        let event = Event::new(
            EventType::AdminConfig,
            self.block_height()?,
            Tx::default(),
            payload,
            EventStatus::Success,
        );
        self.upsert_event(event)?;
        Ok(())
    }
}
