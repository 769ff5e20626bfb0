use super::*;

/// Constant-product swap output with proportional slip fee:
/// `emit = (x * X * Y) / (x + X)^2` for input `x` against balances `(X, Y)`.
pub fn calc_swap_output(x: u128, input_depth: u128, output_depth: u128) -> Result<u128, Report> {
    let denom = x
        .checked_add(input_depth)
        .ok_or_eyre("overflow in swap denominator")?;
    if denom == 0 {
        bail!("swap against an empty pool");
    }
    let numerator = util::mul_div(x, input_depth, denom)?;
    util::mul_div(numerator, output_depth, denom)
}

/// The part of the ideal price the slip fee keeps in the pool:
/// `fee = x^2 * Y / (x + X)^2`.
pub fn calc_liquidity_fee(x: u128, input_depth: u128, output_depth: u128) -> Result<u128, Report> {
    let denom = x
        .checked_add(input_depth)
        .ok_or_eyre("overflow in swap denominator")?;
    if denom == 0 {
        bail!("swap against an empty pool");
    }
    let numerator = util::mul_div(x, x, denom)?;
    util::mul_div(numerator, output_depth, denom)
}

/// Trade slip in basis points: how far the swap moved the pool price.
pub fn calc_trade_slip(x: u128, input_depth: u128) -> Result<u128, Report> {
    if input_depth == 0 {
        bail!("swap against an empty pool");
    }
    // slip = x * (2X + x) / X^2, in basis points.
    let numerator = x
        .checked_mul(
            input_depth
                .checked_mul(2)
                .and_then(|d| d.checked_add(x))
                .ok_or_eyre("overflow in slip arithmetic")?,
        )
        .ok_or_eyre("overflow in slip arithmetic")?;
    let squared = input_depth
        .checked_mul(input_depth)
        .ok_or_eyre("overflow in slip arithmetic")?;
    util::mul_div(numerator, 10_000, squared)
}

/// Units minted for a stake of `(r, a)` into a pool holding `(R, A)` with
/// `P` existing units: `P * (r*A + R*a) / (2*R*A)`. The first stake into an
/// empty pool mints the RUNE side as its unit count.
pub fn calc_pool_units(
    p: u128,
    r_balance: u128,
    a_balance: u128,
    r: u128,
    a: u128,
) -> Result<u128, Report> {
    if r_balance == 0 || a_balance == 0 || p == 0 {
        return Ok(if r > 0 { r } else { a });
    }
    let cross = r
        .checked_mul(a_balance)
        .zip(r_balance.checked_mul(a))
        .and_then(|(lhs, rhs)| lhs.checked_add(rhs))
        .ok_or_eyre("overflow in stake arithmetic")?;
    let denom = r_balance
        .checked_mul(2)
        .and_then(|d| d.checked_mul(a_balance))
        .ok_or_eyre("overflow in stake arithmetic")?;
    util::mul_div(p, cross, denom)
}

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    pub fn pool_exists(&self, asset: &Asset) -> bool {
        self.store.has(&format!("pool/{asset}"))
    }

    pub fn get_pool(&self, asset: &Asset) -> Result<Option<Pool>, Report> {
        self.store.get(&format!("pool/{asset}"))
    }

    pub fn set_pool(&mut self, pool: &Pool) {
        self.store.put(&format!("pool/{}", pool.asset), pool);
    }

    /// All pools, in asset order.
    pub fn pools(&self) -> Result<Vec<Pool>, Report> {
        Ok(self
            .store
            .prefix::<Pool>("pool/")?
            .into_iter()
            .map(|(_, pool)| pool)
            .collect())
    }

    pub fn get_pool_staker(&self, asset: &Asset) -> Result<PoolStaker, Report> {
        Ok(self
            .store
            .get::<PoolStaker>(&format!("poolstaker/{asset}"))?
            .unwrap_or_else(|| PoolStaker::new(asset.clone())))
    }

    pub fn set_pool_staker(&mut self, ps: &PoolStaker) {
        self.store.put(&format!("poolstaker/{}", ps.asset), ps);
    }

    pub fn get_staker_pool(&self, addr: &Address) -> Result<StakerPool, Report> {
        Ok(self
            .store
            .get::<StakerPool>(&format!("staker/{addr}"))?
            .unwrap_or_else(|| StakerPool::new(addr.clone())))
    }

    pub fn set_staker_pool(&mut self, sp: &StakerPool) {
        self.store.put(&format!("staker/{}", sp.rune_address), sp);
    }

    /// Add liquidity to a pool, minting units and updating both sides of the
    /// staker index. Returns the units minted.
    pub fn stake(
        &mut self,
        asset: &Asset,
        rune_amount: u128,
        asset_amount: u128,
        rune_address: &Address,
        asset_address: &Address,
    ) -> Result<u128, Report> {
        let Some(mut pool) = self.get_pool(asset)? else {
            return Err(HandlerError::unknown_request(format!("pool {asset} does not exist")).into());
        };
        if pool.status == PoolStatus::Suspended {
            return Err(HandlerError::new(
                Code::UnknownRequest,
                format!("pool {asset} is suspended"),
            )
            .into());
        }

        let units = calc_pool_units(
            pool.pool_units,
            pool.balance_rune,
            pool.balance_asset,
            rune_amount,
            asset_amount,
        )?;

        pool.balance_rune = pool.balance_rune.saturating_add(rune_amount);
        pool.balance_asset = pool.balance_asset.saturating_add(asset_amount);
        pool.pool_units = pool.pool_units.saturating_add(units);
        self.set_pool(&pool);

        let mut pool_staker = self.get_pool_staker(asset)?;
        pool_staker.add_units(rune_address, asset_address, units);
        self.set_pool_staker(&pool_staker);

        let mut staker_pool = self.get_staker_pool(rune_address)?;
        staker_pool.add_units(asset, units);
        self.set_staker_pool(&staker_pool);

        Ok(units)
    }

    /// Withdraw `basis_points/10000` of a staker's units pro rata from both
    /// sides of the pool. Returns the RUNE amount, asset amount, and units
    /// burned.
    pub fn unstake(
        &mut self,
        asset: &Asset,
        rune_address: &Address,
        basis_points: u64,
    ) -> Result<(u128, u128, u128), Report> {
        let Some(mut pool) = self.get_pool(asset)? else {
            return Err(HandlerError::unknown_request(format!("pool {asset} does not exist")).into());
        };
        let mut pool_staker = self.get_pool_staker(asset)?;
        let Some(staker) = pool_staker.staker(rune_address) else {
            return Err(HandlerError::unknown_request(format!(
                "staker {rune_address} has no units in pool {asset}"
            ))
            .into());
        };

        let claimed = util::mul_div(
            staker.units,
            basis_points as u128,
            MAX_WITHDRAW_BASIS_POINTS as u128,
        )?;
        if claimed == 0 {
            return Ok((0, 0, 0));
        }

        let rune_amount = util::mul_div(pool.balance_rune, claimed, pool.pool_units)?;
        let asset_amount = util::mul_div(pool.balance_asset, claimed, pool.pool_units)?;

        pool.balance_rune = pool.balance_rune.saturating_sub(rune_amount);
        pool.balance_asset = pool.balance_asset.saturating_sub(asset_amount);
        pool.pool_units = pool.pool_units.saturating_sub(claimed);
        self.set_pool(&pool);

        pool_staker.sub_units(rune_address, claimed);
        self.set_pool_staker(&pool_staker);

        let mut staker_pool = self.get_staker_pool(rune_address)?;
        staker_pool.sub_units(asset, claimed);
        self.set_staker_pool(&staker_pool);

        Ok((rune_amount, asset_amount, claimed))
    }

    /// One leg of a swap against a single pool. Returns the output amount
    /// and the liquidity fee kept by the pool.
    pub fn swap_one(
        &mut self,
        asset: &Asset,
        amount_in: u128,
        rune_to_asset: bool,
    ) -> Result<(u128, u128), Report> {
        let Some(mut pool) = self.get_pool(asset)? else {
            return Err(HandlerError::unknown_request(format!("pool {asset} does not exist")).into());
        };
        if pool.status != PoolStatus::Enabled {
            return Err(HandlerError::new(
                Code::UnknownRequest,
                format!("pool {asset} is {} and cannot swap", pool.status),
            )
            .into());
        }

        let (input_depth, output_depth) = if rune_to_asset {
            (pool.balance_rune, pool.balance_asset)
        } else {
            (pool.balance_asset, pool.balance_rune)
        };
        if input_depth == 0 || output_depth == 0 {
            return Err(HandlerError::unknown_request(format!("pool {asset} has no liquidity")).into());
        }

        let output = calc_swap_output(amount_in, input_depth, output_depth)?;
        let fee = calc_liquidity_fee(amount_in, input_depth, output_depth)?;

        if rune_to_asset {
            pool.balance_rune = pool.balance_rune.saturating_add(amount_in);
            pool.balance_asset = pool.balance_asset.saturating_sub(output);
        } else {
            pool.balance_asset = pool.balance_asset.saturating_add(amount_in);
            pool.balance_rune = pool.balance_rune.saturating_sub(output);
        }
        self.set_pool(&pool);

        Ok((output, fee))
    }
}

