use super::*;

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// A node operator asking to leave, authenticated by the bond address
    /// the request came from.
    ///
    /// Active nodes are only marked; the churn takes them out at the next
    /// rotation so the set never shrinks abruptly. Inactive nodes with an
    /// empty yggdrasil get their bond back immediately.
    pub(crate) fn handle_leave(
        &mut self,
        msg: &MsgLeave,
        _constants: &ConstantValues,
    ) -> Result<(), Report> {
        self.ensure_active_signer(&msg.signer)?;
        info!(sender = %msg.tx.from_address, tx_id = %msg.tx.id, "received leave request");

        let Some(mut na) = self.node_account_by_bond_address(&msg.tx.from_address)? else {
            return Err(HandlerError::unknown_request(format!(
                "no node account bonded from {}",
                msg.tx.from_address
            ))
            .into());
        };

        if na.status != NodeStatus::Active {
            let ygg_has_funds = self
                .get_vault(&na.pub_key_set.secp256k1)?
                .map(|v| v.is_yggdrasil() && v.has_funds())
                .unwrap_or(false);
            if !ygg_has_funds && na.bond > 0 {
                // Not active and nothing outstanding: bond goes back now.
                let amount = na.bond;
                na.bond = 0;
                let item = TxOutItem::new(
                    Chain::Bnb,
                    na.bond_address.clone(),
                    Coin::new(Asset::rune(), amount),
                    msg.tx.id.clone(),
                )
                .with_memo(
                    Memo::Outbound {
                        in_hash: msg.tx.id.0.clone(),
                    }
                    .to_string(),
                );
                self.try_add_tx_out_item(item)?;
            }
            self.request_ygg_return(&na)?;
        }

        na.requested_to_leave = true;
        self.set_node_account(&na);
        Ok(())
    }
}
