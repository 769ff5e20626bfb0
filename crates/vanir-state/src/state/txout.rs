use super::*;

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    pub fn get_tx_out(&self, height: u64) -> Result<TxOut, Report> {
        Ok(self
            .store
            .get::<TxOut>(&format!("txout/{}", pad_height(height)))?
            .unwrap_or_else(|| TxOut::new(height)))
    }

    pub fn set_tx_out(&mut self, tx_out: &TxOut) {
        self.store
            .put(&format!("txout/{}", pad_height(tx_out.height)), tx_out);
    }

    /// Every scheduled outbound list, oldest first.
    pub fn all_tx_outs(&self) -> Result<Vec<TxOut>, Report> {
        Ok(self
            .store
            .prefix::<TxOut>("txout/")?
            .into_iter()
            .map(|(_, t)| t)
            .collect())
    }

    /// Queue an outbound for the signers.
    ///
    /// Selects a signing vault when the item does not name one, verifies the
    /// vault can cover the coin plus estimated gas, and reserves the funds
    /// immediately so later items in the same block see the reduced balance.
    pub fn try_add_tx_out_item(&mut self, item: TxOutItem) -> Result<(), Report> {
        let mut item = item;

        if item.vault_pub_key.is_empty() {
            let vault = self
                .select_asgard_by_min_asset(&item.coin.asset)?
                .ok_or_else(|| HandlerError::invalid_vault("no active asgard vault available"))?;
            item.vault_pub_key = vault.pub_key.clone();
        }

        // A zero coin is an instruction to the signer (a yggdrasil recall);
        // there is nothing to reserve.
        if item.coin.amount > 0 {
            let Some(mut vault) = self.get_vault(&item.vault_pub_key)? else {
                return Err(HandlerError::invalid_vault(format!(
                    "vault {} does not exist",
                    item.vault_pub_key
                ))
                .into());
            };

            let gas = item.chain.estimated_gas();
            let mut required = item.coin.amount;
            if gas.asset == item.coin.asset {
                required = required.saturating_add(gas.amount);
            } else if vault.balance_of(&gas.asset) < gas.amount {
                return Err(HandlerError::insufficient_funds(format!(
                    "vault {} cannot cover gas for {}",
                    item.vault_pub_key, item.chain
                ))
                .into());
            }
            if vault.balance_of(&item.coin.asset) < required {
                return Err(HandlerError::insufficient_funds(format!(
                    "vault {} holds {} of {}, needs {}",
                    item.vault_pub_key,
                    vault.balance_of(&item.coin.asset),
                    item.coin.asset,
                    required,
                ))
                .into());
            }

            vault.sub_coin(&Coin::new(item.coin.asset.clone(), required));
            if gas.asset != item.coin.asset {
                vault.sub_coin(&gas);
            }
            self.set_vault(&vault)?;
        }

        let height = self.block_height()?;
        let mut tx_out = self.get_tx_out(height)?;
        debug!(
            chain = %item.chain,
            to = %item.to_address,
            coin = %item.coin,
            memo = %item.memo,
            "queueing outbound item"
        );
        tx_out.tx_array.push(item);
        self.set_tx_out(&tx_out);
        Ok(())
    }

    /// Queue an outbound, tolerating rejection: an item the vaults cannot
    /// fund is logged and dropped rather than failing the whole end-block
    /// pass. Infrastructure errors still propagate.
    pub(crate) fn try_add_tx_out_item_lenient(&mut self, item: TxOutItem) -> Result<(), Report> {
        if let Err(e) = self.try_add_tx_out_item(item) {
            match e.downcast_ref::<HandlerError>() {
                Some(handler_error) => {
                    warn!(error = %handler_error, "dropping unschedulable outbound");
                }
                None => return Err(e),
            }
        }
        Ok(())
    }

    /// Match an observed outbound against its queued item by inbound hash
    /// and coin, recording the signed hash. Returns the item as it was
    /// queued, so the caller can tell whether funds were already reserved
    /// for it.
    pub fn match_tx_out_item(
        &mut self,
        in_hash: &TxId,
        out_hash: &TxId,
        coin: &Coin,
    ) -> Result<Option<TxOutItem>, Report> {
        for mut tx_out in self.all_tx_outs()? {
            let mut matched = None;
            for item in tx_out.tx_array.iter_mut() {
                if !item.is_signed()
                    && &item.in_hash == in_hash
                    && (item.coin.asset == coin.asset || item.coin.amount == 0)
                {
                    item.out_hash = out_hash.clone();
                    matched = Some(item.clone());
                    break;
                }
            }
            if let Some(item) = matched {
                self.set_tx_out(&tx_out);
                return Ok(Some(item));
            }
        }
        Ok(None)
    }
}

