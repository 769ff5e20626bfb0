use tendermint::abci::types::CommitInfo;
use tendermint::abci::{request, response};
use tendermint::block::header::Version;
use tendermint::block::{Header, Height, Round};
use tendermint::{account, AppHash, Hash, Time};

use super::testing::*;
use super::*;

const ONE: u128 = 100_000_000;

fn make_header(chain_id: &str, height: u64) -> Header {
    Header {
        version: Version { block: 11, app: 1 },
        chain_id: chain_id.parse().expect("valid chain id"),
        height: Height::try_from(height).expect("valid height"),
        time: Time::from_unix_timestamp(1_600_000_000 + height as i64, 0).expect("valid time"),
        last_block_id: None,
        last_commit_hash: None,
        data_hash: None,
        validators_hash: Hash::Sha256([0; 32]),
        next_validators_hash: Hash::Sha256([0; 32]),
        consensus_hash: Hash::Sha256([0; 32]),
        app_hash: AppHash::try_from(vec![0; 32]).expect("valid app hash"),
        last_results_hash: None,
        evidence_hash: None,
        proposer_address: account::Id::new([0; 20]),
    }
}

fn make_begin_block(chain_id: &str, height: u64) -> request::BeginBlock {
    request::BeginBlock {
        hash: Hash::Sha256([0; 32]),
        header: make_header(chain_id, height),
        last_commit_info: CommitInfo {
            round: Round::from(0u8),
            votes: vec![],
        },
        byzantine_validators: vec![],
    }
}

#[test]
fn begin_block_rejects_a_foreign_chain_id() {
    let (mut state, _) = setup(4);
    let err = state.begin_block(make_begin_block("other-chain", 2)).unwrap_err();
    assert!(err.to_string().contains("chain ID"));
}

#[test]
fn a_block_runs_begin_deliver_end() {
    let (mut state, nodes) = setup(4);

    let response::BeginBlock { .. } = state.begin_block(make_begin_block("vanir-test", 2)).unwrap();
    assert_eq!(state.block_height().unwrap(), 2);

    let obs = observed_inbound("aa01", vec![rune(ONE)], "create:BNB.BNB");
    for na in &nodes {
        let msg = Msg::ObservedTxIn(MsgObservedTxIn {
            txs: vec![obs.clone()],
            signer: na.node_address.clone(),
        });
        state.deliver_msg(&msg).unwrap();
    }
    assert!(state.get_pool(&bnb_asset()).unwrap().is_some());

    let end = state
        .end_block(request::EndBlock { height: 2 })
        .unwrap();
    // A stable active set produces no validator updates.
    assert!(end.validator_updates.is_empty());
}

#[test]
fn end_block_checks_the_height() {
    let (mut state, _) = setup(4);
    state.begin_block(make_begin_block("vanir-test", 2)).unwrap();
    assert!(state.end_block(request::EndBlock { height: 3 }).is_err());
}

#[test]
fn genesis_block_promotes_the_initial_set_and_triggers_keygen() {
    let mut state = State::new(crate::MemStore::new());
    state.set_chain_id("vanir-test".to_string()).unwrap();
    state.set_block_height(0);
    for n in 1..=4 {
        state.set_node_account(&node_account(n, NodeStatus::Ready));
    }

    state.begin_block(make_begin_block("vanir-test", 1)).unwrap();

    assert_eq!(state.total_active_node_accounts().unwrap(), 4);
    let pending = state.pending_keygen().unwrap().unwrap();
    assert_eq!(pending.membership.len(), 4);

    // Everyone acknowledges the ceremony result and the seed vault goes
    // live.
    let new_vault = PubKey::new(vec![0xCC; 33]);
    for n in 1..=3u8 {
        let msg = Msg::Ack(MsgAck {
            tx: Tx::default(),
            pub_key: new_vault.clone(),
            signer: Address::new(format!("node-{n}")),
        });
        state.deliver_msg(&msg).unwrap();
    }
    let vault = state.get_vault(&new_vault).unwrap().unwrap();
    assert!(vault.is_asgard());
    assert_eq!(vault.status, VaultStatus::Active);
    assert_eq!(vault.membership.len(), 4);
}

#[test]
fn block_rewards_accrue_each_block() {
    let (mut state, _) = setup(4);
    state.set_vault_data(&VaultData {
        total_reserve: 1_000_000_000 * ONE,
        bond_reward_rune: 0,
        total_bond_units: 0,
    });

    state.begin_block(make_begin_block("vanir-test", 2)).unwrap();
    state.end_block(request::EndBlock { height: 2 }).unwrap();

    let data = state.vault_data().unwrap();
    assert!(data.bond_reward_rune > 0);
    assert_eq!(data.total_bond_units, 4);
    assert!(data.total_reserve < 1_000_000_000 * ONE);
}
