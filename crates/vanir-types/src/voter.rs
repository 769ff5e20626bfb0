use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::{Address, NodeAccount, ObservedTx, TxId};

/// Strict BFT supermajority: more than two thirds of `total`, compared with
/// cross multiplication to stay in integers.
pub fn has_super_majority(count: usize, total: usize) -> bool {
    total > 0 && 3 * count > 2 * total
}

/// Accumulates per-node observations of a single external transaction until a
/// supermajority of active nodes agrees on one variant.
///
/// The voter moves through three states: empty, collecting, dispatched. Once
/// `processed_in` (or `processed_out`) is set, the replicated effect for that
/// direction has fired and may never fire again, no matter how many late
/// signers arrive.
#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct ObservedTxVoter {
    pub tx_id: TxId,
    /// Candidate variants of the observation, each carrying its signer set.
    pub txs: Vec<ObservedTx>,
    /// Block at which consensus was first reached, zero before then.
    pub height: u64,
    pub processed_in: bool,
    pub processed_out: bool,
}

impl ObservedTxVoter {
    pub fn new(tx_id: TxId) -> Self {
        Self {
            tx_id,
            ..Default::default()
        }
    }

    /// Whether the given node has already signed any variant.
    pub fn has_signed(&self, signer: &Address) -> bool {
        self.txs.iter().any(|tx| tx.signers.contains(signer))
    }

    /// Merge one observation from one signer. A node's first vote is final:
    /// later submissions of a different variant by the same node are dropped.
    pub fn add(&mut self, observation: ObservedTx, signer: &Address) {
        if self.has_signed(signer) {
            return;
        }
        for tx in &mut self.txs {
            if tx.same_observation(&observation) {
                tx.sign(signer);
                return;
            }
        }
        let mut observation = observation;
        observation.sign(signer);
        self.txs.push(observation);
    }

    fn active_signer_count(tx: &ObservedTx, active: &[NodeAccount]) -> usize {
        tx.signers
            .iter()
            .filter(|signer| active.iter().any(|node| &&node.node_address == signer))
            .count()
    }

    /// Whether any variant has a strict supermajority of the active set.
    pub fn has_consensus(&self, active: &[NodeAccount]) -> bool {
        self.txs
            .iter()
            .any(|tx| has_super_majority(Self::active_signer_count(tx, active), active.len()))
    }

    /// The variant that reached consensus, if any.
    pub fn consensus_tx(&self, active: &[NodeAccount]) -> Option<&ObservedTx> {
        self.txs
            .iter()
            .find(|tx| has_super_majority(Self::active_signer_count(tx, active), active.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Asset, Chain, Coin, Coins, NodeStatus, PubKey, PubKeySet, Tx};

    fn node(n: u8) -> NodeAccount {
        NodeAccount::new(
            Address::new(format!("node{n}")),
            NodeStatus::Active,
            PubKeySet::default(),
            String::new(),
            0,
            Address::new(format!("bond{n}")),
            1,
        )
    }

    fn observation(memo: &str) -> ObservedTx {
        ObservedTx::new(
            Tx::new(
                TxId::new("ab12"),
                Chain::Bnb,
                Address::new("sender"),
                Address::new("vault"),
                Coins::new(vec![Coin::new(Asset::rune(), 100)]),
                Coins::default(),
                memo,
            ),
            12,
            PubKey::new(vec![9; 33]),
        )
    }

    #[test]
    fn supermajority_boundaries() {
        // With four active nodes consensus needs three; with six it needs five.
        assert!(!has_super_majority(2, 4));
        assert!(has_super_majority(3, 4));
        assert!(!has_super_majority(4, 6));
        assert!(has_super_majority(5, 6));
        assert!(!has_super_majority(0, 0));
    }

    #[test]
    fn first_vote_wins_per_node() {
        let active: Vec<_> = (0..4).map(node).collect();
        let mut voter = ObservedTxVoter::new(TxId::new("ab12"));

        voter.add(observation("swap:BNB.BNB"), &active[0].node_address);
        // The same node trying to switch to a different variant is ignored.
        voter.add(observation("stake:BNB.BNB"), &active[0].node_address);
        assert_eq!(voter.txs.len(), 1);
        assert_eq!(voter.txs[0].signers.len(), 1);

        voter.add(observation("swap:BNB.BNB"), &active[1].node_address);
        voter.add(observation("swap:BNB.BNB"), &active[2].node_address);
        assert!(voter.has_consensus(&active));
        assert_eq!(
            voter.consensus_tx(&active).unwrap().tx.memo,
            "swap:BNB.BNB".to_string()
        );
    }

    #[test]
    fn disagreeing_variants_do_not_reach_consensus() {
        let active: Vec<_> = (0..4).map(node).collect();
        let mut voter = ObservedTxVoter::new(TxId::new("ab12"));

        voter.add(observation("swap:BNB.BNB"), &active[0].node_address);
        voter.add(observation("swap:BNB.BNB"), &active[1].node_address);
        voter.add(observation("stake:BNB.BNB"), &active[2].node_address);
        voter.add(observation("stake:BNB.BNB"), &active[3].node_address);
        assert!(!voter.has_consensus(&active));
    }

    #[test]
    fn inactive_signers_do_not_count() {
        let active: Vec<_> = (0..4).map(node).collect();
        let mut voter = ObservedTxVoter::new(TxId::new("ab12"));

        voter.add(observation("swap:BNB.BNB"), &active[0].node_address);
        voter.add(observation("swap:BNB.BNB"), &active[1].node_address);
        voter.add(observation("swap:BNB.BNB"), &Address::new("stranger"));
        assert!(!voter.has_consensus(&active));
    }
}
