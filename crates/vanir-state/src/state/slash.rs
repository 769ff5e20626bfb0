use super::*;

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// Penalize active nodes that contributed no observation since the last
    /// sweep, then reset the observing set for the next window.
    pub fn slash_lack_observing(&mut self, constants: &ConstantValues) -> Result<(), Report> {
        let observing = self.observing_addresses()?;
        if observing.is_empty() {
            // No observation window has data yet; slashing everyone for an
            // idle chain would just grind the set down.
            return Ok(());
        }
        for na in self.list_active_node_accounts()? {
            if !observing.contains(&na.node_address) {
                debug!(node = %na.node_address, "slashing for lack of observation");
                self.slash_node_account(
                    &na.node_address,
                    constants.lack_of_observation_penalty,
                )?;
            }
        }
        self.clear_observing_addresses();
        Ok(())
    }

    /// Penalize the designated signers of outbounds that blew their signing
    /// deadline, and reschedule each overdue item against the chain's
    /// current asgard so a different signer set picks it up.
    pub fn slash_lack_signing(&mut self, constants: &ConstantValues) -> Result<(), Report> {
        let height = self.block_height()?;

        for mut tx_out in self.all_tx_outs()? {
            let deadline = tx_out.height + constants.signing_transaction_period;
            if height <= deadline {
                continue;
            }
            let blocks_delayed = height - deadline;
            let mut changed = false;

            for item in tx_out.tx_array.iter_mut() {
                if item.is_signed() {
                    continue;
                }
                // Whoever holds the designated vault failed to sign in time.
                if let Some(vault) = self.get_vault(&item.vault_pub_key)? {
                    for member in &vault.membership {
                        if let Some(na) = self.node_account_by_pub_key(member)? {
                            self.slash_node_account(
                                &na.node_address,
                                2 * blocks_delayed as i64,
                            )?;
                        }
                    }
                }
                let current = self.select_asgard_by_min_asset(&item.coin.asset)?;
                if let Some(current) = current {
                    if current.pub_key != item.vault_pub_key {
                        info!(
                            in_hash = %item.in_hash,
                            from = %item.vault_pub_key,
                            to = %current.pub_key,
                            "reassigning overdue outbound to current asgard"
                        );
                        item.vault_pub_key = current.pub_key;
                    }
                }
                changed = true;
            }

            if changed {
                self.set_tx_out(&tx_out);
            }
        }
        Ok(())
    }
}

