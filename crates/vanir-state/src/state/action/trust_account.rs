use super::*;

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// A whitelisted node registering its observation keys and consensus
    /// key. Completing registration moves the node to standby, where churn
    /// can pick it up.
    pub(crate) fn handle_set_trust_account(
        &mut self,
        msg: &MsgSetTrustAccount,
        _constants: &ConstantValues,
    ) -> Result<(), Report> {
        let Some(mut na) = self.get_node_account(&msg.signer)? else {
            return Err(HandlerError::unauthorized(format!(
                "{} is not a registered node account",
                msg.signer
            ))
            .into());
        };
        if na.status != NodeStatus::WhiteListed && na.status != NodeStatus::Standby {
            return Err(HandlerError::unknown_request(format!(
                "node {} cannot register keys while {}",
                msg.signer, na.status
            ))
            .into());
        }

        // Reject keys already claimed by another node.
        for other in self.node_accounts()? {
            if other.node_address != na.node_address
                && (other.pub_key_set == msg.pub_key_set
                    || other.validator_cons_pub_key == msg.validator_cons_pub_key)
            {
                return Err(HandlerError::invalid_message(format!(
                    "keys already registered by {}",
                    other.node_address
                ))
                .into());
            }
        }

        let height = self.block_height()?;
        na.pub_key_set = msg.pub_key_set.clone();
        na.validator_cons_pub_key = msg.validator_cons_pub_key.clone();
        na.update_status(NodeStatus::Standby, height);
        self.set_node_account(&na);
        info!(node = %msg.signer, "trust account registered");
        Ok(())
    }
}
