use super::*;

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// Send an observed inbound back where it came from.
    ///
    /// Refunds are best effort: coins whose asset has a pool (or are RUNE)
    /// go back from the receiving vault; coins the network has never traded
    /// have no way to be priced or routed, so they stay where they landed
    /// with no pool side effects.
    pub(crate) fn refund_tx(
        &mut self,
        tx: &ObservedTx,
        code: Code,
        reason: &str,
        _constants: &ConstantValues,
    ) -> Result<(), Report> {
        let mut refunded_any = false;

        for coin in tx.tx.coins.iter() {
            if coin.amount == 0 {
                continue;
            }
            if !coin.asset.is_rune() && !self.pool_exists(&coin.asset) {
                warn!(
                    asset = %coin.asset,
                    tx_id = %tx.tx.id,
                    "refund dropped a coin with no pool"
                );
                continue;
            }
            let item = TxOutItem::new(
                coin.asset.chain,
                tx.tx.from_address.clone(),
                coin.clone(),
                tx.tx.id.clone(),
            )
            .with_vault(tx.observed_pub_key.clone())
            .with_memo(
                Memo::Outbound {
                    in_hash: tx.tx.id.0.clone(),
                }
                .to_string(),
            );
            match self.try_add_tx_out_item(item) {
                Ok(()) => refunded_any = true,
                Err(e) => match e.downcast_ref::<HandlerError>() {
                    Some(handler_error) => {
                        // A vault that cannot cover the refund is logged and
                        // skipped; the coins stay custodied.
                        warn!(
                            tx_id = %tx.tx.id,
                            error = %handler_error,
                            "could not schedule refund outbound"
                        );
                    }
                    None => return Err(e),
                },
            }
        }

        let payload = serde_json::to_vec(&EventRefund {
            code: code.value(),
            reason: reason.to_string(),
        })?;
        let status = if refunded_any {
            EventStatus::Pending
        } else {
            EventStatus::Refund
        };
        let event = Event::new(
            EventType::Refund,
            self.block_height()?,
            tx.tx.clone(),
            payload,
            status,
        );
        self.upsert_event(event)?;
        Ok(())
    }
}
