use super::*;

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// Swap the sent coin for the target asset through the constant-product
    /// pools. An asset-to-asset swap runs both legs through RUNE; the slip
    /// limit applies once, to the final output.
    pub(crate) fn handle_swap(
        &mut self,
        msg: &MsgSwap,
        _constants: &ConstantValues,
    ) -> Result<(), Report> {
        self.ensure_active_signer(&msg.signer)?;

        let source_coin = msg
            .tx
            .coins
            .first()
            .ok_or_else(|| HandlerError::invalid_message("swap requires a coin"))?
            .clone();
        let source = source_coin.asset.clone();
        let target = msg.target_asset.clone();
        if source == target {
            return Err(
                HandlerError::invalid_message("swap source and target are the same asset").into(),
            );
        }

        // The message-scoped checkpoint makes a failed slip check unwind the
        // pool mutations below.
        let (emit, liquidity_fee, trade_slip, pool_asset) =
            if !source.is_rune() && !target.is_rune() {
                let source_depth = self
                    .get_pool(&source)?
                    .map(|p| p.balance_asset)
                    .unwrap_or_default();
                let (rune_out, _) = self.swap_one(&source, source_coin.amount, false)?;
                let slip_one = pool::calc_trade_slip(source_coin.amount, source_depth)?;
                let target_depth = self
                    .get_pool(&target)?
                    .map(|p| p.balance_rune)
                    .unwrap_or_default();
                let (out, fee) = self.swap_one(&target, rune_out, true)?;
                let slip_two = pool::calc_trade_slip(rune_out, target_depth)?;
                (out, fee, slip_one.saturating_add(slip_two), target.clone())
            } else if source.is_rune() {
                let depth = self
                    .get_pool(&target)?
                    .map(|p| p.balance_rune)
                    .unwrap_or_default();
                let (out, fee) = self.swap_one(&target, source_coin.amount, true)?;
                let slip = pool::calc_trade_slip(source_coin.amount, depth)?;
                (out, fee, slip, target.clone())
            } else {
                let depth = self
                    .get_pool(&source)?
                    .map(|p| p.balance_asset)
                    .unwrap_or_default();
                let (out, fee) = self.swap_one(&source, source_coin.amount, false)?;
                let slip = pool::calc_trade_slip(source_coin.amount, depth)?;
                (out, fee, slip, source.clone())
            };

        if msg.trade_target > 0 && emit < msg.trade_target {
            return Err(HandlerError::new(
                Code::SwapFailSlip,
                format!(
                    "emit asset {emit} less than price limit {}",
                    msg.trade_target
                ),
            )
            .into());
        }

        let out_asset = if target.is_rune() {
            Asset::rune()
        } else {
            target.clone()
        };
        let item = TxOutItem::new(
            out_asset.chain,
            msg.destination.clone(),
            Coin::new(out_asset, emit),
            msg.tx.id.clone(),
        )
        .with_memo(
            Memo::Outbound {
                in_hash: msg.tx.id.0.clone(),
            }
            .to_string(),
        );
        self.try_add_tx_out_item(item)?;

        info!(
            tx_id = %msg.tx.id,
            source = %source,
            target = %target,
            emit,
            "swap complete"
        );

        let payload = serde_json::to_vec(&EventSwap {
            pool: pool_asset,
            price_target: msg.trade_target,
            trade_slip,
            liquidity_fee,
        })?;
        let event = Event::new(
            EventType::Swap,
            self.block_height()?,
            msg.tx.clone(),
            payload,
            EventStatus::Pending,
        );
        self.upsert_event(event)?;
        Ok(())
    }
}
