use super::*;

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// Drive the graceful shutdown. The first call pins the trigger height
    /// and runs stage one; every `fund_migration_interval` blocks after that
    /// runs one stage-two pass. Once triggered there is no going back: the
    /// network only unwinds from here.
    pub fn process_ragnarok(
        &mut self,
        active_nodes: &[NodeAccount],
        constants: &ConstantValues,
    ) -> Result<(), Report> {
        let height = self.block_height()?;
        let ragnarok_height = self.ragnarok_block_height()?;

        if ragnarok_height == 0 {
            warn!(height, "ragnarok triggered");
            self.set_ragnarok_block_height(height);
            self.ragnarok_stage_one(active_nodes)?;
            return Ok(());
        }

        let interval = constants.fund_migration_interval;
        if height > ragnarok_height && (height - ragnarok_height) % interval == 0 {
            let nth = (height - ragnarok_height) / interval;
            self.ragnarok_stage_two(nth, active_nodes, constants)?;
        }

        Ok(())
    }

    /// Stage one, run once at the trigger: recall every node's yggdrasil
    /// funds and settle outstanding bond rewards while the reward books are
    /// still intact.
    fn ragnarok_stage_one(&mut self, active_nodes: &[NodeAccount]) -> Result<(), Report> {
        for na in active_nodes {
            self.request_ygg_return(na)?;
        }
        for na in active_nodes {
            self.pay_node_account_bond_award(&na.node_address)?;
        }
        Ok(())
    }

    /// Stage two, one pass per interval: refund a tenth-slice of bonds, then
    /// unstake every staker by a growing share, then refund the reserve
    /// contributors pro rata.
    fn ragnarok_stage_two(
        &mut self,
        nth: u64,
        active_nodes: &[NodeAccount],
        constants: &ConstantValues,
    ) -> Result<(), Report> {
        self.ragnarok_bond(nth, active_nodes)?;
        self.ragnarok_pools(nth, constants)?;
        self.ragnarok_reserve(nth)?;
        Ok(())
    }

    /// Refund `min(nth, 10)/10` of each node's remaining bond, skipping
    /// nodes whose yggdrasil vault still holds funds: their bond is the
    /// collateral that makes them return it.
    ///
    /// Iterates the snapshot of actives taken when the block started, so a
    /// refund can never feed back into the set being walked.
    fn ragnarok_bond(&mut self, nth: u64, active_nodes: &[NodeAccount]) -> Result<(), Report> {
        let slice = nth.min(10);
        for na in active_nodes {
            let Some(mut na) = self.get_node_account(&na.node_address)? else {
                continue;
            };
            if let Some(ygg) = self.get_vault(&na.pub_key_set.secp256k1)? {
                if ygg.is_yggdrasil() && ygg.has_funds() {
                    info!(node = %na.node_address, "skipping bond refund, yggdrasil still has funds");
                    continue;
                }
            }
            let amount = util::mul_div(na.bond, slice as u128, 10)?;
            if amount == 0 {
                continue;
            }

            // Only debit the bond once its refund is actually scheduled.
            let item = TxOutItem::new(
                Chain::Bnb,
                na.bond_address.clone(),
                Coin::new(Asset::rune(), amount),
                TxId::blank(),
            );
            match self.try_add_tx_out_item(item) {
                Ok(()) => {
                    na.bond = na.bond.saturating_sub(amount);
                    self.set_node_account(&na);
                }
                Err(e) => match e.downcast_ref::<HandlerError>() {
                    Some(handler_error) => {
                        warn!(node = %na.node_address, error = %handler_error, "bond refund not schedulable");
                    }
                    None => return Err(e),
                },
            }
        }
        Ok(())
    }

    /// Unstake every staker of every pool by `min(nth, 10) * 1000` basis
    /// points of their remaining units, and park the pools in bootstrap.
    fn ragnarok_pools(&mut self, nth: u64, constants: &ConstantValues) -> Result<(), Report> {
        let basis_points = (nth.min(10) * (MAX_WITHDRAW_BASIS_POINTS / 10)).min(MAX_WITHDRAW_BASIS_POINTS);

        for pool in self.pools()? {
            let pool_staker = self.get_pool_staker(&pool.asset)?;
            for staker in &pool_staker.stakers {
                if staker.units == 0 {
                    continue;
                }
                let msg = MsgUnstake {
                    tx: ragnarok_tx(pool.asset.chain, &staker.rune_address),
                    rune_address: staker.rune_address.clone(),
                    basis_points,
                    asset: pool.asset.clone(),
                    signer: staker.rune_address.clone(),
                };
                if let Err(e) = self.transactional(|state| state.withdraw_stake(&msg, constants)) {
                    warn!(
                        staker = %staker.rune_address,
                        pool = %pool.asset,
                        error = %e,
                        "failed to unstake during ragnarok"
                    );
                }
            }
            let mut pool = self
                .get_pool(&pool.asset)?
                .ok_or_eyre("pool disappeared during ragnarok")?;
            pool.status = PoolStatus::Bootstrap;
            self.set_pool(&pool);
        }
        Ok(())
    }

    /// Refund `min(nth, 10)/10` of each contributor's share of what is left
    /// in the reserve.
    fn ragnarok_reserve(&mut self, nth: u64) -> Result<(), Report> {
        let slice = nth.min(10);
        let mut contributors = self.reserve_contributors()?;
        let mut data = self.vault_data()?;

        let total_contributions: u128 = contributors.iter().map(|c| c.amount).sum();
        if total_contributions == 0 {
            return Ok(());
        }

        // Reserves get spent over time through block rewards, so each
        // contributor gets a share of what remains, relative to what they
        // put in.
        for contrib in contributors.iter_mut() {
            let share = util::mul_div(contrib.amount, data.total_reserve, total_contributions)?;
            let amount = util::mul_div(share, slice as u128, 10)?;
            if amount == 0 {
                continue;
            }

            let item = TxOutItem::new(
                Chain::Bnb,
                contrib.address.clone(),
                Coin::new(Asset::rune(), amount),
                TxId::blank(),
            );
            match self.try_add_tx_out_item(item) {
                Ok(()) => {
                    data.total_reserve = data.total_reserve.saturating_sub(amount);
                    contrib.amount = contrib.amount.saturating_sub(amount);
                }
                Err(e) => match e.downcast_ref::<HandlerError>() {
                    Some(handler_error) => {
                        warn!(
                            contributor = %contrib.address,
                            error = %handler_error,
                            "reserve refund not schedulable"
                        );
                    }
                    None => return Err(e),
                },
            }
        }

        self.set_vault_data(&data);
        self.set_reserve_contributors(&contributors);
        Ok(())
    }
}

/// The synthetic inbound attached to ragnarok-driven withdrawals.
fn ragnarok_tx(chain: Chain, addr: &Address) -> Tx {
    Tx::new(
        TxId::blank(),
        chain,
        addr.clone(),
        addr.clone(),
        Coins::default(),
        Coins::default(),
        "ragnarok",
    )
}

