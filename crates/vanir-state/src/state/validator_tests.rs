use super::testing::*;
use super::*;

#[test]
fn bad_actor_maximizes_age_per_slash_point() {
    let (mut state, mut nodes) = setup(3);
    // node-1: never slashed, immune. node-2 and node-3 slashed equally, but
    // node-3 kept its status longer per point.
    nodes[1].status_since = 100;
    nodes[1].slash_points = 10;
    nodes[2].status_since = 500;
    nodes[2].slash_points = 10;
    for na in &nodes {
        state.set_node_account(na);
    }

    let bad = state.find_bad_actor().unwrap().unwrap();
    assert_eq!(bad.node_address, nodes[2].node_address);
}

#[test]
fn bad_actor_tie_breaks_on_higher_slash_points() {
    let (mut state, mut nodes) = setup(2);
    // Same age-per-point ratio; more points wins.
    nodes[0].status_since = 100;
    nodes[0].slash_points = 1;
    nodes[1].status_since = 1000;
    nodes[1].slash_points = 10;
    for na in &nodes {
        state.set_node_account(na);
    }

    let bad = state.find_bad_actor().unwrap().unwrap();
    assert_eq!(bad.node_address, nodes[1].node_address);
}

#[test]
fn old_actor_is_the_longest_standing() {
    let (mut state, mut nodes) = setup(3);
    nodes[0].status_since = 50;
    nodes[1].status_since = 5;
    nodes[2].status_since = 500;
    for na in &nodes {
        state.set_node_account(na);
    }

    let old = state.find_old_actor().unwrap().unwrap();
    assert_eq!(old.node_address, nodes[1].node_address);
}

#[test]
fn marking_pins_the_leave_height_once() {
    let (mut state, nodes) = setup(2);
    state.set_block_height(7);
    state.mark_actor(Some(nodes[0].clone())).unwrap();
    let marked = state.get_node_account(&nodes[0].node_address).unwrap().unwrap();
    assert_eq!(marked.leave_height, 7);

    state.set_block_height(9);
    state.mark_actor(Some(marked)).unwrap();
    let marked = state.get_node_account(&nodes[0].node_address).unwrap().unwrap();
    assert_eq!(marked.leave_height, 7);
}

#[test]
fn churn_excludes_the_leaver_and_adds_the_richest_ready_node() {
    let (mut state, mut nodes) = setup(7);
    // node-5 asked to leave.
    nodes[4].requested_to_leave = true;
    state.set_node_account(&nodes[4]);

    // Two ready candidates with different bonds.
    let mut rich = node_account(10, NodeStatus::Ready);
    rich.bond = 500_000_000_000_000;
    state.set_node_account(&rich);
    let mut poor = node_account(11, NodeStatus::Ready);
    poor.bond = 200_000_000_000_000;
    state.set_node_account(&poor);

    let constants = state.constants().unwrap();
    let (next, rotating) = state.next_vault_node_accounts(7, &constants).unwrap();

    assert!(rotating);
    assert_eq!(next.len(), 7);
    assert!(!next
        .iter()
        .any(|na| na.node_address == nodes[4].node_address));
    assert!(next.iter().any(|na| na.node_address == rich.node_address));
    assert!(!next.iter().any(|na| na.node_address == poor.node_address));
}

#[test]
fn bond_reward_follows_earned_blocks() {
    let (mut state, nodes) = setup(1);
    state.set_block_height(51);
    let mut na = state.get_node_account(&nodes[0].node_address).unwrap().unwrap();
    na.active_block_height = 1;
    na.slash_points = 10;
    na.bond = 1_000;
    state.set_node_account(&na);
    state.set_vault_data(&VaultData {
        total_reserve: 0,
        bond_reward_rune: 1_000,
        total_bond_units: 100,
    });

    state.pay_node_account_bond_award(&na.node_address).unwrap();

    // 50 blocks active, 10 slash points: 40 earned, reward 1000 * 40 / 100.
    let na = state.get_node_account(&na.node_address).unwrap().unwrap();
    assert_eq!(na.bond, 1_400);
    assert_eq!(na.active_block_height, 0);
    let data = state.vault_data().unwrap();
    assert_eq!(data.bond_reward_rune, 600);
    assert_eq!(data.total_bond_units, 50);
}

#[test]
fn end_block_promotes_and_demotes_by_vault_membership() {
    let (mut state, nodes) = setup(4);
    let mut ready = node_account(10, NodeStatus::Ready);
    ready.bond = 500_000_000_000_000;
    state.set_node_account(&ready);

    // A keygen completed for everyone except node-4, plus the ready node.
    let mut membership: Vec<PubKey> = nodes[..3]
        .iter()
        .map(|na| na.pub_key_set.secp256k1.clone())
        .collect();
    membership.push(ready.pub_key_set.secp256k1.clone());
    state.trigger_keygen(membership).unwrap();

    let new_vault = PubKey::new(vec![0xCC; 33]);
    for na in &nodes[..3] {
        let msg = Msg::Ack(MsgAck {
            tx: Tx::default(),
            pub_key: new_vault.clone(),
            signer: na.node_address.clone(),
        });
        let _ = state.route_msg(&msg);
    }
    assert!(state.get_vault(&new_vault).unwrap().is_some());

    let updates = state.validator_end_block().unwrap();
    assert_eq!(updates.len(), 2);

    let promoted = state.get_node_account(&ready.node_address).unwrap().unwrap();
    assert_eq!(promoted.status, NodeStatus::Active);
    let demoted = state.get_node_account(&nodes[3].node_address).unwrap().unwrap();
    assert_eq!(demoted.status, NodeStatus::Standby);
}
