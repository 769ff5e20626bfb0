use super::*;

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// Handle per-node observations of outbound transactions the network's
    /// vaults signed.
    ///
    /// On supermajority agreement: debit the signing vault, match the
    /// outbound against its queued item, and settle the pending events of
    /// the inbound that caused it. An outbound no queued item accounts for
    /// is recorded as an errata.
    pub(crate) fn handle_observed_tx_out(
        &mut self,
        msg: &MsgObservedTxOut,
        constants: &ConstantValues,
    ) -> Result<(), Report> {
        self.ensure_active_signer(&msg.signer)?;
        let active = self.list_active_node_accounts()?;
        let height = self.block_height()?;

        for obs in &msg.txs {
            if !self.vault_exists(&obs.observed_pub_key) {
                info!(vault = %obs.observed_pub_key, "not a valid observed pub key");
                continue;
            }

            let mut voter = self.get_observed_tx_voter(&obs.tx.id)?;
            voter.add(obs.clone(), &msg.signer);
            let dispatch = voter.has_consensus(&active) && !voter.processed_out;
            if dispatch {
                if voter.height == 0 {
                    voter.height = height;
                }
                voter.processed_out = true;
            }
            self.set_observed_tx_voter(&voter);

            if !dispatch {
                if voter.processed_out {
                    self.add_observing_addresses(std::slice::from_ref(&msg.signer))?;
                }
                continue;
            }

            let tx = voter
                .consensus_tx(&active)
                .cloned()
                .ok_or_eyre("voter dispatched without a consensus observation")?;
            info!(tx_id = %tx.tx.id, memo = %tx.tx.memo, "handling observed outbound");

            self.dispatch_tx_out(&tx, constants)?;
        }
        Ok(())
    }

    /// A single reported outbound, as submitted by the signer that broadcast
    /// it. It feeds the same voter as bulk observations.
    pub(crate) fn handle_outbound_tx(
        &mut self,
        msg: &MsgOutboundTx,
        constants: &ConstantValues,
    ) -> Result<(), Report> {
        let wrapped = MsgObservedTxOut {
            txs: vec![msg.tx.clone()],
            signer: msg.signer.clone(),
        };
        self.handle_observed_tx_out(&wrapped, constants)
    }

    /// The exactly-once effect of an agreed outbound observation.
    fn dispatch_tx_out(&mut self, tx: &ObservedTx, _constants: &ConstantValues) -> Result<(), Report> {
        if let Some(chain) = tx.tx.chain {
            self.set_last_chain_height(chain, tx.block_height)?;
        }
        self.set_last_signed_height(tx.block_height)?;
        self.add_observing_addresses(&tx.signers)?;

        // Match the outbound back to the item that scheduled it.
        let in_hash = match Memo::from_str(&tx.tx.memo) {
            Ok(Memo::Outbound { in_hash }) => TxId::new(in_hash),
            Ok(Memo::YggdrasilReturn { .. }) | Ok(Memo::Migrate { .. }) => TxId::blank(),
            _ => TxId::blank(),
        };

        let mut matched = false;
        let mut reserved = false;
        for coin in tx.tx.coins.iter() {
            if let Some(item) = self.match_tx_out_item(&in_hash, &tx.tx.id, coin)? {
                matched = true;
                reserved = reserved || item.coin.amount > 0;
            }
        }

        // Items with a coin reserved their funds when they were queued;
        // instruction items (recalls) and unmatched spends debit here, when
        // the real movement is known.
        if !reserved {
            if let Some(mut vault) = self.get_vault(&tx.observed_pub_key)? {
                vault.sub_funds(&tx.tx.coins);
                vault.sub_funds(&tx.tx.gas);
                self.set_vault(&vault)?;
            }
        }

        if matched {
            if !in_hash.is_blank() {
                // Settle the inbound's pending events now that its outbound
                // hit the chain.
                self.complete_events(&in_hash)?;
                let mut voter = self.get_observed_tx_voter(&in_hash)?;
                if !voter.processed_out {
                    voter.processed_out = true;
                    self.set_observed_tx_voter(&voter);
                }
            }
        } else {
            // Nothing scheduled this outbound. Record it so operators can
            // reconcile the books.
            warn!(tx_id = %tx.tx.id, vault = %tx.observed_pub_key, "unmatched outbound observed");
            let payload = serde_json::to_vec(&EventErrata {
                tx_id: tx.tx.id.clone(),
            })?;
            let event = Event::new(
                EventType::Errata,
                self.block_height()?,
                tx.tx.clone(),
                payload,
                EventStatus::Success,
            );
            self.upsert_event(event)?;
        }
        Ok(())
    }
}
