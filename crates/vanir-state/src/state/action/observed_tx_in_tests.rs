use super::super::testing::*;
use super::*;

const ONE: u128 = 100_000_000;

#[test]
fn create_pool_from_a_single_node_network() {
    let (mut state, nodes) = setup(1);

    let obs = observed_inbound("aa01", vec![rune(ONE)], "create:BNB.BNB");
    observe_all(&mut state, &nodes, &obs);

    let pool = state.get_pool(&bnb_asset()).unwrap().unwrap();
    assert_eq!(pool.status, PoolStatus::Enabled);
    assert_eq!(pool.balance_rune, 0);
    assert_eq!(pool.balance_asset, 0);
    assert_eq!(pool.pool_units, 0);

    // The vault was credited with the inbound either way.
    let vault = state.get_vault(&asgard_pub_key()).unwrap().unwrap();
    assert_eq!(vault.balance_of(&Asset::rune()), ONE);
    assert_eq!(vault.inbound_tx_count, 1);
}

#[test]
fn symmetric_stake_fills_both_sides() {
    let (mut state, nodes) = setup(4);

    let obs = observed_inbound("aa01", vec![rune(ONE)], "create:BNB.BNB");
    observe_all(&mut state, &nodes, &obs);
    let obs = observed_inbound(
        "aa02",
        vec![rune(100 * ONE), bnb(100 * ONE)],
        "stake:BNB.BNB",
    );
    observe_all(&mut state, &nodes, &obs);

    let pool = state.get_pool(&bnb_asset()).unwrap().unwrap();
    assert_eq!(pool.balance_rune, 100 * ONE);
    assert_eq!(pool.balance_asset, 100 * ONE);
    assert!(pool.pool_units > 0);

    let pool_staker = state.get_pool_staker(&bnb_asset()).unwrap();
    assert_eq!(
        pool_staker.staker(&Address::new("user-1")).unwrap().units,
        pool.pool_units
    );
}

#[test]
fn swap_emits_the_constant_product_output() {
    let (mut state, nodes) = setup(4);
    observe_all(
        &mut state,
        &nodes,
        &observed_inbound("aa01", vec![rune(100 * ONE), bnb(100 * ONE)], "stake:BNB.BNB"),
    );

    // Slip limit of 0.5 BNB is comfortably under the expected output.
    let obs = observed_inbound("aa02", vec![rune(10 * ONE)], "swap:BNB.BNB::50000000");
    observe_all(&mut state, &nodes, &obs);

    let pool = state.get_pool(&bnb_asset()).unwrap().unwrap();
    assert_eq!(pool.balance_rune, 110 * ONE);
    assert_eq!(pool.balance_asset, 100 * ONE - 826_446_280);

    let items = outbound_items(&state);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].coin, bnb(826_446_280));
    assert_eq!(items[0].to_address, Address::new("user-1"));
    assert_eq!(items[0].in_hash, TxId::new("aa02"));
}

#[test]
fn swap_past_the_slip_limit_refunds_the_input() {
    let (mut state, nodes) = setup(4);
    observe_all(
        &mut state,
        &nodes,
        &observed_inbound("aa01", vec![rune(100 * ONE), bnb(100 * ONE)], "stake:BNB.BNB"),
    );

    // Asking for at least 9 BNB out of a 10 RUNE swap cannot clear.
    let obs = observed_inbound("aa02", vec![rune(10 * ONE)], "swap:BNB.BNB::900000000");
    observe_all(&mut state, &nodes, &obs);

    // The pool is untouched and the original input goes back.
    let pool = state.get_pool(&bnb_asset()).unwrap().unwrap();
    assert_eq!(pool.balance_rune, 100 * ONE);
    assert_eq!(pool.balance_asset, 100 * ONE);

    let items = outbound_items(&state);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].coin, rune(10 * ONE));
    assert_eq!(items[0].to_address, Address::new("user-1"));

    let events = state.events_from(1).unwrap();
    assert!(events
        .iter()
        .any(|e| e.event_type == EventType::Refund && e.in_tx.id == TxId::new("aa02")));
}

#[test]
fn inbound_to_a_stale_vault_is_refunded_without_pool_effects() {
    let (mut state, nodes) = setup(4);
    observe_all(
        &mut state,
        &nodes,
        &observed_inbound("aa01", vec![rune(100 * ONE), bnb(100 * ONE)], "stake:BNB.BNB"),
    );

    // An older asgard that is no longer the signing vault, with a little
    // gas float left in it.
    let stale = PubKey::new(vec![0xBB; 33]);
    state
        .set_vault(&Vault::new(
            stale.clone(),
            VaultType::Asgard,
            VaultStatus::Active,
            0,
            vec![],
        ))
        .unwrap();
    fund_vault(&mut state, &stale, vec![bnb(ONE)]);

    let mut obs = observed_inbound("aa02", vec![rune(10 * ONE)], "swap:BNB.BNB::0");
    obs.observed_pub_key = stale.clone();
    obs.tx.to_address = stale.address(Chain::Bnb);
    observe_all(&mut state, &nodes, &obs);

    // Full amount back out of the stale vault, no pool mutation.
    let items = outbound_items(&state);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].vault_pub_key, stale);
    assert_eq!(items[0].coin, rune(10 * ONE));

    let pool = state.get_pool(&bnb_asset()).unwrap().unwrap();
    assert_eq!(pool.balance_rune, 100 * ONE);
    assert_eq!(pool.balance_asset, 100 * ONE);
}

#[test]
fn consensus_requires_a_strict_supermajority() {
    let (mut state, nodes) = setup(4);
    let obs = observed_inbound("aa01", vec![rune(ONE)], "create:BNB.BNB");

    for na in &nodes[..2] {
        let msg = Msg::ObservedTxIn(MsgObservedTxIn {
            txs: vec![obs.clone()],
            signer: na.node_address.clone(),
        });
        state.deliver_msg(&msg).unwrap();
    }
    // Two of four is not enough.
    assert!(state.get_pool(&bnb_asset()).unwrap().is_none());

    let msg = Msg::ObservedTxIn(MsgObservedTxIn {
        txs: vec![obs.clone()],
        signer: nodes[2].node_address.clone(),
    });
    state.deliver_msg(&msg).unwrap();
    // Three of four crosses the threshold.
    assert!(state.get_pool(&bnb_asset()).unwrap().is_some());
}

#[test]
fn replayed_observations_are_idempotent() {
    let (mut state, nodes) = setup(4);
    let obs = observed_inbound("aa01", vec![rune(ONE)], "create:BNB.BNB");
    observe_all(&mut state, &nodes, &obs);

    let vault_before = state.get_vault(&asgard_pub_key()).unwrap().unwrap();

    // The same signer again: dropped by the voter, no new effect.
    let msg = Msg::ObservedTxIn(MsgObservedTxIn {
        txs: vec![obs.clone()],
        signer: nodes[0].node_address.clone(),
    });
    state.deliver_msg(&msg).unwrap();

    let voter = state.get_observed_tx_voter(&TxId::new("aa01")).unwrap();
    assert_eq!(voter.txs.len(), 1);
    assert_eq!(voter.txs[0].signers.len(), 4);
    assert!(voter.processed_in);

    let vault_after = state.get_vault(&asgard_pub_key()).unwrap().unwrap();
    assert_eq!(vault_before, vault_after);
}

#[test]
fn late_signers_feed_the_observing_set_without_redispatch() {
    let (mut state, nodes) = setup(4);
    let obs = observed_inbound("aa01", vec![rune(ONE)], "create:BNB.BNB");

    // Three nodes reach consensus; the fourth arrives late.
    for na in &nodes[..3] {
        let msg = Msg::ObservedTxIn(MsgObservedTxIn {
            txs: vec![obs.clone()],
            signer: na.node_address.clone(),
        });
        state.deliver_msg(&msg).unwrap();
    }
    state.clear_observing_addresses();

    let msg = Msg::ObservedTxIn(MsgObservedTxIn {
        txs: vec![obs.clone()],
        signer: nodes[3].node_address.clone(),
    });
    state.deliver_msg(&msg).unwrap();

    let voter = state.get_observed_tx_voter(&TxId::new("aa01")).unwrap();
    assert_eq!(voter.txs[0].signers.len(), 4);
    assert!(state
        .observing_addresses()
        .unwrap()
        .contains(&nodes[3].node_address));

    // Still exactly one event from the single dispatch.
    assert_eq!(state.events_from(1).unwrap().len(), 1);
}

#[test]
fn garbage_memos_are_refunded_with_a_reason() {
    let (mut state, nodes) = setup(4);
    observe_all(
        &mut state,
        &nodes,
        &observed_inbound("aa01", vec![rune(100 * ONE), bnb(100 * ONE)], "stake:BNB.BNB"),
    );

    let obs = observed_inbound("aa02", vec![rune(10 * ONE)], "hello world");
    observe_all(&mut state, &nodes, &obs);

    let items = outbound_items(&state);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].coin, rune(10 * ONE));

    let events = state.events_from(1).unwrap();
    let refund = events
        .iter()
        .find(|e| e.event_type == EventType::Refund)
        .unwrap();
    assert_eq!(refund.status, EventStatus::Pending);
}

#[test]
fn observations_from_outsiders_are_rejected() {
    let (mut state, _) = setup(4);
    let obs = observed_inbound("aa01", vec![rune(ONE)], "create:BNB.BNB");

    let msg = Msg::ObservedTxIn(MsgObservedTxIn {
        txs: vec![obs],
        signer: Address::new("stranger"),
    });
    let err = state.deliver_msg(&msg).unwrap_err();
    let handler_error = err.downcast_ref::<HandlerError>().unwrap();
    assert_eq!(handler_error.code, Code::Unauthorized);
}
