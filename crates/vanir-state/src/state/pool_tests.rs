use proptest::prelude::*;

use super::pool::{calc_pool_units, calc_swap_output};
use super::testing::*;
use super::*;

const ONE: u128 = 100_000_000;

fn enabled_pool(state: &mut State<crate::MemStore>) {
    let pool = Pool::new(bnb_asset(), PoolStatus::Enabled);
    state.set_pool(&pool);
}

#[test]
fn first_stake_mints_rune_side_units() {
    let (mut state, _) = setup(1);
    enabled_pool(&mut state);

    let units = state
        .stake(
            &bnb_asset(),
            100 * ONE,
            100 * ONE,
            &Address::new("staker-1"),
            &Address::new("staker-1"),
        )
        .unwrap();

    assert_eq!(units, 100 * ONE);
    let pool = state.get_pool(&bnb_asset()).unwrap().unwrap();
    assert_eq!(pool.balance_rune, 100 * ONE);
    assert_eq!(pool.balance_asset, 100 * ONE);
    assert_eq!(pool.pool_units, 100 * ONE);
}

#[test]
fn staker_units_always_sum_to_pool_units() {
    let (mut state, _) = setup(1);
    enabled_pool(&mut state);

    for (staker, r, a) in [
        ("staker-1", 100 * ONE, 100 * ONE),
        ("staker-2", 50 * ONE, 30 * ONE),
        ("staker-3", 0, 10 * ONE),
        ("staker-1", 7 * ONE, 0),
    ] {
        state
            .stake(
                &bnb_asset(),
                r,
                a,
                &Address::new(staker),
                &Address::new(staker),
            )
            .unwrap();
    }
    state
        .unstake(&bnb_asset(), &Address::new("staker-2"), 5_000)
        .unwrap();

    let pool = state.get_pool(&bnb_asset()).unwrap().unwrap();
    let pool_staker = state.get_pool_staker(&bnb_asset()).unwrap();
    let sum: u128 = pool_staker.stakers.iter().map(|s| s.units).sum();
    assert_eq!(sum, pool.pool_units);
    assert_eq!(pool_staker.total_units, pool.pool_units);
}

#[test]
fn full_unstake_restores_pool_and_zeroes_units() {
    let (mut state, _) = setup(1);
    enabled_pool(&mut state);
    let staker = Address::new("staker-1");

    state
        .stake(&bnb_asset(), 100 * ONE, 100 * ONE, &staker, &staker)
        .unwrap();
    let (rune_out, asset_out, units) = state.unstake(&bnb_asset(), &staker, 10_000).unwrap();

    assert_eq!(rune_out, 100 * ONE);
    assert_eq!(asset_out, 100 * ONE);
    assert_eq!(units, 100 * ONE);

    let pool = state.get_pool(&bnb_asset()).unwrap().unwrap();
    assert_eq!(pool.balance_rune, 0);
    assert_eq!(pool.balance_asset, 0);
    assert_eq!(pool.pool_units, 0);
    assert!(state
        .get_pool_staker(&bnb_asset())
        .unwrap()
        .staker(&staker)
        .is_none());
}

#[test]
fn zero_basis_points_is_a_noop() {
    let (mut state, _) = setup(1);
    enabled_pool(&mut state);
    let staker = Address::new("staker-1");

    state
        .stake(&bnb_asset(), 100 * ONE, 100 * ONE, &staker, &staker)
        .unwrap();
    let (rune_out, asset_out, units) = state.unstake(&bnb_asset(), &staker, 0).unwrap();

    assert_eq!((rune_out, asset_out, units), (0, 0, 0));
    let pool = state.get_pool(&bnb_asset()).unwrap().unwrap();
    assert_eq!(pool.balance_rune, 100 * ONE);
    assert_eq!(pool.pool_units, 100 * ONE);
}

#[test]
fn swap_follows_constant_product_with_slip_fee() {
    let (mut state, _) = setup(1);
    enabled_pool(&mut state);
    state
        .stake(
            &bnb_asset(),
            100 * ONE,
            100 * ONE,
            &Address::new("staker-1"),
            &Address::new("staker-1"),
        )
        .unwrap();

    // emit = x*X*Y/(x+X)^2 with x = 10, X = Y = 100 (all in 1e8 units).
    let (out, fee) = state.swap_one(&bnb_asset(), 10 * ONE, true).unwrap();
    assert_eq!(out, 826_446_280);
    assert!(fee > 0);

    let pool = state.get_pool(&bnb_asset()).unwrap().unwrap();
    assert_eq!(pool.balance_rune, 110 * ONE);
    assert_eq!(pool.balance_asset, 100 * ONE - 826_446_280);
}

#[test]
fn swap_against_suspended_pool_is_rejected() {
    let (mut state, _) = setup(1);
    let mut pool = Pool::new(bnb_asset(), PoolStatus::Suspended);
    pool.balance_rune = 100 * ONE;
    pool.balance_asset = 100 * ONE;
    pool.pool_units = 100 * ONE;
    state.set_pool(&pool);

    let err = state.swap_one(&bnb_asset(), ONE, true).unwrap_err();
    let handler_error = err.downcast_ref::<HandlerError>().unwrap();
    assert_eq!(handler_error.code, Code::UnknownRequest);
}

#[test]
fn symmetric_unit_formula_matches_hand_computation() {
    // units = P * (r*A + R*a) / (2*R*A)
    let p = 100 * ONE;
    let r_balance = 100 * ONE;
    let a_balance = 200 * ONE;
    let r = 10 * ONE;
    let a = 20 * ONE;
    let units = calc_pool_units(p, r_balance, a_balance, r, a).unwrap();
    assert_eq!(units, 10 * ONE);
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 200, ..Default::default() })]

    /// The pool never pays out more than it holds, and never beats the
    /// ideal (fee-free) price.
    #[test]
    fn swap_output_is_bounded(
        x in 1u128..1_000_000_000_000,
        input_depth in 1u128..1_000_000_000_000,
        output_depth in 1u128..1_000_000_000_000,
    ) {
        let out = calc_swap_output(x, input_depth, output_depth).unwrap();
        prop_assert!(out < output_depth);
        let ideal = x * output_depth / (x + input_depth);
        prop_assert!(out <= ideal);
    }

    /// Stake then full unstake gives the pool balances back exactly.
    #[test]
    fn stake_unstake_round_trips(
        r in 1u128..1_000_000_000_000,
        a in 1u128..1_000_000_000_000,
    ) {
        let (mut state, _) = setup(1);
        let pool = Pool::new(bnb_asset(), PoolStatus::Enabled);
        state.set_pool(&pool);
        let staker = Address::new("staker-1");

        state.stake(&bnb_asset(), r, a, &staker, &staker).unwrap();
        let (rune_out, asset_out, _) = state.unstake(&bnb_asset(), &staker, 10_000).unwrap();

        prop_assert_eq!(rune_out, r);
        prop_assert_eq!(asset_out, a);
        let pool = state.get_pool(&bnb_asset()).unwrap().unwrap();
        prop_assert_eq!(pool.pool_units, 0);
        prop_assert_eq!(pool.balance_rune, 0);
        prop_assert_eq!(pool.balance_asset, 0);
    }
}
