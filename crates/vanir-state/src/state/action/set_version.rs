use super::*;

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// A node reporting the software version it runs; churn eligibility
    /// derives from this.
    pub(crate) fn handle_set_version(
        &mut self,
        msg: &MsgSetVersion,
        _constants: &ConstantValues,
    ) -> Result<(), Report> {
        let Some(mut na) = self.get_node_account(&msg.signer)? else {
            return Err(HandlerError::unauthorized(format!(
                "{} is not a registered node account",
                msg.signer
            ))
            .into());
        };

        info!(node = %msg.signer, version = %msg.version, "node version updated");
        na.version = msg.version.clone();
        self.set_node_account(&na);
        Ok(())
    }
}
