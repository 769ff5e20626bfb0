use super::testing::*;
use super::*;

const ONE: u128 = 100_000_000;

#[test]
fn unassigned_items_pick_the_vault_with_least_inventory() {
    let (mut state, _) = setup(4);
    fund_vault(&mut state, &asgard_pub_key(), vec![bnb(1_000 * ONE)]);

    // A second active asgard holding less BNB should win the assignment.
    let second = PubKey::new(vec![0xBB; 33]);
    let vault = Vault::new(
        second.clone(),
        VaultType::Asgard,
        VaultStatus::Active,
        2,
        vec![],
    );
    state.set_vault(&vault).unwrap();
    fund_vault(&mut state, &second, vec![bnb(10 * ONE)]);

    let item = TxOutItem::new(
        Chain::Bnb,
        Address::new("user-1"),
        bnb(ONE),
        TxId::new("aa11"),
    );
    state.try_add_tx_out_item(item).unwrap();

    let items = outbound_items(&state);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].vault_pub_key, second);
}

#[test]
fn items_reserve_coin_plus_gas_immediately() {
    let (mut state, _) = setup(4);
    fund_vault(&mut state, &asgard_pub_key(), vec![bnb(10 * ONE)]);

    let item = TxOutItem::new(
        Chain::Bnb,
        Address::new("user-1"),
        bnb(ONE),
        TxId::new("aa11"),
    );
    state.try_add_tx_out_item(item).unwrap();

    let vault = state.get_vault(&asgard_pub_key()).unwrap().unwrap();
    let gas = Chain::Bnb.estimated_gas().amount;
    assert_eq!(vault.balance_of(&bnb_asset()), 9 * ONE - gas);
}

#[test]
fn underfunded_vaults_cannot_emit() {
    let (mut state, _) = setup(4);
    fund_vault(&mut state, &asgard_pub_key(), vec![bnb(ONE / 2)]);

    let item = TxOutItem::new(
        Chain::Bnb,
        Address::new("user-1"),
        bnb(ONE),
        TxId::new("aa11"),
    );
    let err = state.try_add_tx_out_item(item).unwrap_err();
    let handler_error = err.downcast_ref::<HandlerError>().unwrap();
    assert_eq!(handler_error.code, Code::InsufficientFunds);
    assert!(outbound_items(&state).is_empty());
}

#[test]
fn zero_coin_instructions_reserve_nothing() {
    let (mut state, _) = setup(4);

    let item = TxOutItem::new(
        Chain::Bnb,
        Address::new("user-1"),
        Coin::new(bnb_asset(), 0),
        TxId::blank(),
    )
    .with_vault(asgard_pub_key())
    .with_memo("yggdrasil-:1");
    state.try_add_tx_out_item(item).unwrap();

    assert_eq!(outbound_items(&state).len(), 1);
    let vault = state.get_vault(&asgard_pub_key()).unwrap().unwrap();
    assert!(!vault.has_funds());
}

#[test]
fn observed_outbound_settles_events_and_debits_the_vault() {
    let (mut state, nodes) = setup(4);
    observe_all(
        &mut state,
        &nodes,
        &observed_inbound("aa01", vec![rune(100 * ONE), bnb(100 * ONE)], "stake:BNB.BNB"),
    );
    observe_all(
        &mut state,
        &nodes,
        &observed_inbound("aa02", vec![rune(10 * ONE)], "swap:BNB.BNB::0"),
    );
    let vault_before = state.get_vault(&asgard_pub_key()).unwrap().unwrap();

    // The signers broadcast the swap payout and everyone observes it.
    let out = ObservedTx::new(
        Tx::new(
            TxId::new("bb22"),
            Chain::Bnb,
            asgard_pub_key().address(Chain::Bnb),
            Address::new("user-1"),
            Coins::new(vec![bnb(826_446_280)]),
            Coins::new(vec![bnb(37_500)]),
            "outbound:AA02",
        ),
        11,
        asgard_pub_key(),
    );
    for na in &nodes {
        let msg = Msg::ObservedTxOut(MsgObservedTxOut {
            txs: vec![out.clone()],
            signer: na.node_address.clone(),
        });
        state.deliver_msg(&msg).unwrap();
    }

    // The queued item is signed, the swap event settled, and the inbound
    // voter is fully processed.
    let items = outbound_items(&state);
    assert!(items.iter().all(|item| item.is_signed()));

    // Funds were reserved when the item was queued, so settlement does not
    // debit the vault a second time.
    let vault_after = state.get_vault(&asgard_pub_key()).unwrap().unwrap();
    assert_eq!(
        vault_after.balance_of(&bnb_asset()),
        vault_before.balance_of(&bnb_asset()),
    );

    let events = state.events_from(1).unwrap();
    let swap_event = events
        .iter()
        .find(|e| e.event_type == EventType::Swap)
        .unwrap();
    assert_eq!(swap_event.status, EventStatus::Success);

    let voter = state.get_observed_tx_voter(&TxId::new("aa02")).unwrap();
    assert!(voter.processed_in);
    assert!(voter.processed_out);
    assert_eq!(state.last_signed_height().unwrap(), 11);
}

#[test]
fn observed_out_hash_settles_the_matching_item() {
    let (mut state, _) = setup(4);
    fund_vault(&mut state, &asgard_pub_key(), vec![bnb(10 * ONE)]);

    let in_hash = TxId::new("aa11");
    let item = TxOutItem::new(Chain::Bnb, Address::new("user-1"), bnb(ONE), in_hash.clone());
    state.try_add_tx_out_item(item).unwrap();

    let matched = state
        .match_tx_out_item(&in_hash, &TxId::new("bb22"), &bnb(ONE))
        .unwrap();
    assert!(matched.is_some());
    let items = outbound_items(&state);
    assert!(items[0].is_signed());
    assert_eq!(items[0].out_hash, TxId::new("bb22"));

    // A second match against the same inbound finds nothing left.
    let matched = state
        .match_tx_out_item(&in_hash, &TxId::new("cc33"), &bnb(ONE))
        .unwrap();
    assert!(matched.is_none());
}
