use super::*;

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// Whitelist a new node account backed by a bond payment observed on
    /// chain. The node still has to register its keys before it can stand
    /// by.
    pub(crate) fn handle_bond(
        &mut self,
        msg: &MsgBond,
        constants: &ConstantValues,
    ) -> Result<(), Report> {
        self.ensure_active_signer(&msg.signer)?;

        if msg.bond < constants.minimum_bond_in_rune {
            return Err(HandlerError::new(
                Code::UnknownRequest,
                format!(
                    "bond {} is below the minimum of {}",
                    msg.bond, constants.minimum_bond_in_rune
                ),
            )
            .into());
        }

        if let Some(mut existing) = self.get_node_account(&msg.node_address)? {
            // Topping up an existing bond is always welcome.
            existing.bond = existing.bond.saturating_add(msg.bond);
            self.set_node_account(&existing);
            info!(node = %msg.node_address, bond = existing.bond, "bond topped up");
            return Ok(());
        }

        let height = self.block_height()?;
        let na = NodeAccount::new(
            msg.node_address.clone(),
            NodeStatus::WhiteListed,
            Default::default(),
            String::new(),
            msg.bond,
            msg.bond_address.clone(),
            height,
        );
        self.set_node_account(&na);
        info!(node = %msg.node_address, bond = msg.bond, "whitelisted new node account");
        Ok(())
    }
}
