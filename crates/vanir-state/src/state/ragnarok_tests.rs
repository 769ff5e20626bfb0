use super::testing::*;
use super::*;

const ONE: u128 = 100_000_000;

/// Active set of four at the BFT minimum, everyone holding a funded
/// yggdrasil vault, with a staked pool and a funded asgard to pay refunds
/// from.
fn ragnarok_setup() -> (State<crate::MemStore>, Vec<NodeAccount>) {
    let (mut state, nodes) = setup(4);
    for chain in [Chain::Btc, Chain::Eth, Chain::Thor] {
        state.add_chain(chain).unwrap();
    }
    fund_vault(
        &mut state,
        &asgard_pub_key(),
        vec![rune(1_000_000 * ONE), bnb(1_000_000 * ONE)],
    );

    for na in &nodes {
        state.ensure_yggdrasil(na).unwrap();
        fund_vault(&mut state, &na.pub_key_set.secp256k1, vec![bnb(5 * ONE)]);
    }

    let pool = Pool::new(bnb_asset(), PoolStatus::Enabled);
    state.set_pool(&pool);
    let staker = Address::new("staker-1");
    state
        .stake(&bnb_asset(), 100 * ONE, 100 * ONE, &staker, &staker)
        .unwrap();

    (state, nodes)
}

#[test]
fn trigger_pins_height_and_recalls_every_yggdrasil() {
    let (mut state, nodes) = ragnarok_setup();
    state.set_block_height(100);
    let constants = state.constants().unwrap();

    state.process_ragnarok(&nodes, &constants).unwrap();

    assert_eq!(state.ragnarok_block_height().unwrap(), 100);
    // One recall instruction per supported chain per funded yggdrasil.
    let recalls: Vec<_> = outbound_items(&state)
        .into_iter()
        .filter(|item| item.memo.starts_with("yggdrasil-"))
        .collect();
    assert_eq!(recalls.len(), 4 * 4);
    assert!(recalls.iter().all(|item| item.coin.amount == 0));
}

#[test]
fn stage_two_refunds_bonds_and_unstakes_in_tenths() {
    let (mut state, nodes) = ragnarok_setup();
    state.set_block_height(100);
    let constants = state.constants().unwrap();
    state.process_ragnarok(&nodes, &constants).unwrap();

    // The yggdrasil vaults returned their funds before the first pass.
    for na in &nodes {
        let mut ygg = state.get_vault(&na.pub_key_set.secp256k1).unwrap().unwrap();
        ygg.coins = Coins::default();
        state.set_vault(&ygg).unwrap();
    }

    state.set_block_height(100 + constants.fund_migration_interval);
    state.process_ragnarok(&nodes, &constants).unwrap();

    // Pass one: a tenth of each bond goes home.
    for na in &nodes {
        let after = state.get_node_account(&na.node_address).unwrap().unwrap();
        assert_eq!(after.bond, na.bond - na.bond / 10);
    }
    let bond_refunds: Vec<_> = outbound_items(&state)
        .into_iter()
        .filter(|item| item.to_address.0.starts_with("bond-"))
        .collect();
    assert_eq!(bond_refunds.len(), 4);
    assert!(bond_refunds
        .iter()
        .all(|item| item.coin.amount == nodes[0].bond / 10));

    // Pass one: every staker is pushed out by a tenth of their units.
    let pool = state.get_pool(&bnb_asset()).unwrap().unwrap();
    assert_eq!(pool.status, PoolStatus::Bootstrap);
    assert_eq!(pool.pool_units, 100 * ONE - 100 * ONE / 10);
}

#[test]
fn ragnarok_is_monotonic() {
    let (mut state, nodes) = ragnarok_setup();
    state.set_block_height(100);
    let constants = state.constants().unwrap();
    state.process_ragnarok(&nodes, &constants).unwrap();
    assert!(state.ragnarok_in_progress().unwrap());

    // No new pools can open once the unwind has begun.
    let msg = MsgStake {
        tx: Tx::new(
            TxId::new("dd44"),
            Chain::Bnb,
            Address::new("user-1"),
            Address::new("vault"),
            Coins::new(vec![rune(ONE)]),
            Coins::default(),
            "stake:BTC.BTC",
        ),
        asset: Asset::new(Chain::Btc, "BTC", "BTC"),
        rune_amount: ONE,
        asset_amount: 0,
        rune_address: Address::new("user-1"),
        asset_address: Address::new("user-1"),
        signer: nodes[0].node_address.clone(),
    };
    let err = state.handle_stake(&msg, &constants).unwrap_err();
    assert!(err.downcast_ref::<HandlerError>().is_some());

    // Marking and rotation are skipped while unwinding.
    state.validator_begin_block().unwrap();
    assert!(state.pending_keygen().unwrap().is_none());
}

#[test]
fn bond_refund_waits_for_yggdrasil_return() {
    let (mut state, nodes) = ragnarok_setup();
    state.set_block_height(100);
    let constants = state.constants().unwrap();
    state.process_ragnarok(&nodes, &constants).unwrap();

    // Yggdrasils still hold funds: nobody gets a bond refund yet.
    state.set_block_height(100 + constants.fund_migration_interval);
    state.process_ragnarok(&nodes, &constants).unwrap();

    for na in &nodes {
        let after = state.get_node_account(&na.node_address).unwrap().unwrap();
        assert_eq!(after.bond, na.bond);
    }
}
