use super::*;

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// Record the pubkey the in-flight keygen ceremony is expected to
    /// produce. Acknowledgments against a different pubkey are rejected
    /// until the proposal changes.
    pub(crate) fn handle_next_pool_address(
        &mut self,
        msg: &MsgNextPoolAddress,
        _constants: &ConstantValues,
    ) -> Result<(), Report> {
        self.ensure_active_signer(&msg.signer)?;

        if self.pending_keygen()?.is_none() {
            return Err(
                HandlerError::unknown_request("no keygen ceremony is in progress").into(),
            );
        }

        info!(next = %msg.next_pool_pub_key, "next pool address proposed");
        self.store.put("next_pool/", &msg.next_pool_pub_key);
        Ok(())
    }

    pub(crate) fn next_pool_pub_key(&self) -> Result<Option<PubKey>, Report> {
        self.store.get("next_pool/")
    }
}
