use super::*;
use crate::store::MemStore;

pub(crate) fn bnb_asset() -> Asset {
    Asset::new(Chain::Bnb, "BNB", "BNB")
}

pub(crate) fn rune(amount: u128) -> Coin {
    Coin::new(Asset::rune(), amount)
}

pub(crate) fn bnb(amount: u128) -> Coin {
    Coin::new(bnb_asset(), amount)
}

pub(crate) fn asgard_pub_key() -> PubKey {
    PubKey::new(vec![0xAA; 33])
}

pub(crate) fn node_account(n: u8, status: NodeStatus) -> NodeAccount {
    NodeAccount::new(
        Address::new(format!("node-{n}")),
        status,
        vanir_types::PubKeySet::new(
            PubKey::new(vec![n; 33]),
            PubKey::new(vec![n.wrapping_add(100); 32]),
        ),
        hex::encode([n; 32]),
        100_000_000_000_000,
        Address::new(format!("bond-{n}")),
        1,
    )
}

/// A state with `n_active` active node accounts, one funded-by-nothing
/// active asgard vault holding them all, and the BNB chain registered.
pub(crate) fn setup(n_active: u8) -> (State<MemStore>, Vec<NodeAccount>) {
    let mut state = State::new(MemStore::new());
    state.set_chain_id("vanir-test".to_string()).unwrap();
    state.set_block_height(1);

    let mut nodes = vec![];
    for n in 1..=n_active {
        let na = node_account(n, NodeStatus::Active);
        state.set_node_account(&na);
        nodes.push(na);
    }

    let membership = nodes
        .iter()
        .map(|na| na.pub_key_set.secp256k1.clone())
        .collect();
    let vault = Vault::new(
        asgard_pub_key(),
        VaultType::Asgard,
        VaultStatus::Active,
        1,
        membership,
    );
    state.set_vault(&vault).unwrap();
    state.add_chain(Chain::Bnb).unwrap();

    (state, nodes)
}

pub(crate) fn fund_vault(state: &mut State<MemStore>, pub_key: &PubKey, coins: Vec<Coin>) {
    let mut vault = state.get_vault(pub_key).unwrap().unwrap();
    vault.add_funds(&Coins::new(coins));
    state.set_vault(&vault).unwrap();
}

/// An inbound to the main asgard vault, as one observer would report it.
pub(crate) fn observed_inbound(id: &str, coins: Vec<Coin>, memo: &str) -> ObservedTx {
    ObservedTx::new(
        Tx::new(
            TxId::new(id),
            Chain::Bnb,
            Address::new("user-1"),
            asgard_pub_key().address(Chain::Bnb),
            Coins::new(coins),
            Coins::default(),
            memo,
        ),
        10,
        asgard_pub_key(),
    )
}

/// Submit the same observation from every given node, driving the voter to
/// consensus.
pub(crate) fn observe_all(state: &mut State<MemStore>, nodes: &[NodeAccount], obs: &ObservedTx) {
    for na in nodes {
        let msg = Msg::ObservedTxIn(MsgObservedTxIn {
            txs: vec![obs.clone()],
            signer: na.node_address.clone(),
        });
        state.deliver_msg(&msg).unwrap();
    }
}

/// All queued outbound items across every block, oldest first.
pub(crate) fn outbound_items(state: &State<MemStore>) -> Vec<TxOutItem> {
    state
        .all_tx_outs()
        .unwrap()
        .into_iter()
        .flat_map(|t| t.tx_array)
        .collect()
}
