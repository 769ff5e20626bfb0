use super::*;

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// Handle per-node observations of inbound transactions.
    ///
    /// Each observation feeds its tx-id voter. The first time a variant
    /// reaches a strict supermajority of the active set, the replicated
    /// effect fires exactly once: the vault is credited and the memo is
    /// decoded and routed. Late signers keep accumulating but only feed the
    /// observing-address set the slasher reads.
    pub(crate) fn handle_observed_tx_in(
        &mut self,
        msg: &MsgObservedTxIn,
        constants: &ConstantValues,
    ) -> Result<(), Report> {
        self.ensure_active_signer(&msg.signer)?;
        let active = self.list_active_node_accounts()?;
        let height = self.block_height()?;

        for obs in &msg.txs {
            // Observations naming an unknown vault are dropped silently; a
            // scanner pointed at a stale vault is not a protocol error.
            if !self.vault_exists(&obs.observed_pub_key) {
                info!(vault = %obs.observed_pub_key, "not a valid observed pub key");
                continue;
            }

            let mut voter = self.get_observed_tx_voter(&obs.tx.id)?;
            voter.add(obs.clone(), &msg.signer);
            let dispatch = voter.has_consensus(&active) && !voter.processed_in;
            if dispatch {
                voter.height = height;
                voter.processed_in = true;
            }
            self.set_observed_tx_voter(&voter);

            if !dispatch {
                if voter.processed_in {
                    // Consensus already fired: this signer still counts as
                    // observing for the slasher.
                    self.add_observing_addresses(std::slice::from_ref(&msg.signer))?;
                }
                continue;
            }

            let tx = voter
                .consensus_tx(&active)
                .cloned()
                .ok_or_eyre("voter dispatched without a consensus observation")?;
            info!(tx_id = %tx.tx.id, memo = %tx.tx.memo, "handling observed inbound");

            self.dispatch_tx_in(&tx, &msg.signer, constants)?;
        }
        Ok(())
    }

    /// The exactly-once effect of an agreed inbound observation.
    fn dispatch_tx_in(
        &mut self,
        tx: &ObservedTx,
        signer: &Address,
        constants: &ConstantValues,
    ) -> Result<(), Report> {
        let memo = Memo::from_str(&tx.tx.memo);

        // Credit the observed vault regardless of what the memo says: the
        // funds are there either way.
        let mut vault = self
            .get_vault(&tx.observed_pub_key)?
            .ok_or_eyre("observed vault disappeared")?;
        vault.add_funds(&tx.tx.coins);
        vault.inbound_tx_count += 1;
        if vault.is_yggdrasil() {
            if let Ok(Memo::YggdrasilFund { block_height }) = &memo {
                vault.remove_pending_tx_block_height(*block_height);
            }
        }
        self.set_vault(&vault)?;

        // Only active asgard vaults route user messages; a yggdrasil or
        // inactive vault keeps the observation without further effect.
        if !vault.is_asgard() {
            info!(vault = %vault.pub_key, "vault is not asgard, transaction ignored");
            return Ok(());
        }
        if vault.status == VaultStatus::Inactive {
            info!(vault = %vault.pub_key, "vault is inactive, transaction ignored");
            return Ok(());
        }

        // Funds sent to a vault that is no longer current go straight back.
        let current = self.current_signing_vault()?.map(|v| v.pub_key);
        if current.as_ref() != Some(&vault.pub_key) {
            let reason = format!("vault {} is not the current vault", vault.pub_key);
            info!(reason, "refunding");
            return self.refund_tx(tx, Code::InvalidVault, &reason, constants);
        }

        let Some(chain) = tx.tx.chain else {
            return self.refund_tx(tx, Code::EmptyChain, "chain is empty", constants);
        };

        let memo = match memo {
            Ok(memo) => memo,
            Err(reason) => {
                info!(tx_id = %tx.tx.id, reason, "memo did not parse");
                return self.refund_tx(tx, Code::InvalidMessage, &reason, constants);
            }
        };

        // No one should send an outbound tx to a vault; the observed-out
        // path accounts for those.
        if memo.is_outbound() {
            return Ok(());
        }

        self.set_last_chain_height(chain, tx.block_height)?;
        self.add_chain(chain)?;
        self.add_observing_addresses(&tx.signers)?;

        let result = self.transactional(|state| state.process_tx_in(tx, &memo, signer, constants));
        if let Err(e) = result {
            match e.downcast_ref::<HandlerError>() {
                Some(handler_error) => {
                    let (code, reason) = (handler_error.code, handler_error.reason.clone());
                    warn!(tx_id = %tx.tx.id, %code, reason, "inbound handling failed");
                    self.refund_tx(tx, code, &reason, constants)?;
                }
                // Anything that is not a handler rejection is an
                // infrastructure failure and aborts the block.
                None => return Err(e),
            }
        }
        Ok(())
    }

    /// Decode the memo into the matching message and route it.
    fn process_tx_in(
        &mut self,
        tx: &ObservedTx,
        memo: &Memo,
        signer: &Address,
        constants: &ConstantValues,
    ) -> Result<(), Report> {
        let t = &tx.tx;
        match memo {
            Memo::Create { asset } => self.create_pool(asset, t),
            Memo::Stake { asset } => {
                let msg = MsgStake {
                    tx: t.clone(),
                    asset: asset.clone(),
                    rune_amount: t.coins.amount_of_rune(),
                    asset_amount: t.coins.amount_of(asset),
                    rune_address: t.from_address.clone(),
                    asset_address: t.from_address.clone(),
                    signer: signer.clone(),
                };
                Msg::Stake(msg.clone()).validate_basic()?;
                self.handle_stake(&msg, constants)
            }
            Memo::Withdraw {
                asset,
                basis_points,
            } => {
                let msg = MsgUnstake {
                    tx: t.clone(),
                    rune_address: t.from_address.clone(),
                    basis_points: *basis_points,
                    asset: asset.clone(),
                    signer: signer.clone(),
                };
                Msg::Unstake(msg.clone()).validate_basic()?;
                self.handle_unstake(&msg, constants)
            }
            Memo::Swap {
                asset,
                destination,
                slip_limit,
            } => {
                let msg = MsgSwap {
                    tx: t.clone(),
                    target_asset: asset.clone(),
                    destination: destination.clone().unwrap_or_else(|| t.from_address.clone()),
                    trade_target: *slip_limit,
                    signer: signer.clone(),
                };
                Msg::Swap(msg.clone()).validate_basic()?;
                self.handle_swap(&msg, constants)
            }
            Memo::Add { asset } => {
                let msg = MsgAdd {
                    tx: t.clone(),
                    asset: asset.clone(),
                    rune_amount: t.coins.amount_of_rune(),
                    asset_amount: t.coins.amount_of(asset),
                    signer: signer.clone(),
                };
                Msg::Add(msg.clone()).validate_basic()?;
                self.handle_add(&msg, constants)
            }
            Memo::Apply { node_address } => {
                let msg = MsgBond {
                    tx: t.clone(),
                    node_address: node_address.clone(),
                    bond: t.coins.amount_of_rune(),
                    bond_address: t.from_address.clone(),
                    signer: signer.clone(),
                };
                Msg::Bond(msg.clone()).validate_basic()?;
                self.handle_bond(&msg, constants)
            }
            // Gas top-ups and vault-to-vault movements already credited the
            // vault above; announcements route nothing.
            Memo::Gas
            | Memo::NextPool
            | Memo::YggdrasilFund { .. }
            | Memo::YggdrasilReturn { .. }
            | Memo::Migrate { .. } => Ok(()),
            Memo::Outbound { .. } => Ok(()),
        }
    }

    /// Open a pool for an asset. Creating an existing pool is a no-op, so
    /// replayed create memos stay harmless.
    fn create_pool(&mut self, asset: &Asset, tx: &Tx) -> Result<(), Report> {
        if asset.is_rune() {
            return Err(HandlerError::invalid_message("cannot create a pool for rune").into());
        }
        if self.pool_exists(asset) {
            info!(pool = %asset, "pool already exists");
            return Ok(());
        }
        if self.ragnarok_in_progress()? {
            return Err(
                HandlerError::unknown_request("cannot create pools while unwinding").into(),
            );
        }
        let pool = Pool::new(asset.clone(), self.default_pool_status()?);
        info!(pool = %asset, status = %pool.status, "created pool");
        self.set_pool(&pool);

        let payload = serde_json::to_vec(&EventPool {
            pool: asset.clone(),
            status: pool.status,
        })?;
        let event = Event::new(
            EventType::Pool,
            self.block_height()?,
            tx.clone(),
            payload,
            EventStatus::Success,
        );
        self.upsert_event(event)?;
        Ok(())
    }
}

