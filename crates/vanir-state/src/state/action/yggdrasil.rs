use super::*;

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// Funds moving into or out of a node's yggdrasil vault, as reported by
    /// the signers.
    pub(crate) fn handle_yggdrasil(
        &mut self,
        msg: &MsgYggdrasil,
        _constants: &ConstantValues,
    ) -> Result<(), Report> {
        self.ensure_active_signer(&msg.signer)?;

        let Some(mut vault) = self.get_vault(&msg.pub_key)? else {
            return Err(HandlerError::invalid_vault(format!(
                "yggdrasil vault {} does not exist",
                msg.pub_key
            ))
            .into());
        };
        if !vault.is_yggdrasil() {
            return Err(HandlerError::invalid_vault(format!(
                "vault {} is not a yggdrasil vault",
                msg.pub_key
            ))
            .into());
        }

        if msg.add_funds {
            vault.add_funds(&msg.coins);
            info!(vault = %msg.pub_key, "yggdrasil funded");
        } else {
            vault.sub_funds(&msg.coins);
            info!(vault = %msg.pub_key, "yggdrasil returned funds");
        }
        self.set_vault(&vault)?;
        Ok(())
    }
}
