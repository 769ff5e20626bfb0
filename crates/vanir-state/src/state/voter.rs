use super::*;

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// Load the voter for a tx id, starting an empty one if this is the
    /// first observation.
    pub fn get_observed_tx_voter(&self, tx_id: &TxId) -> Result<ObservedTxVoter, Report> {
        Ok(self
            .store
            .get::<ObservedTxVoter>(&format!("txin/{tx_id}"))?
            .unwrap_or_else(|| ObservedTxVoter::new(tx_id.clone())))
    }

    pub fn set_observed_tx_voter(&mut self, voter: &ObservedTxVoter) {
        self.store.put(&format!("txin/{}", voter.tx_id), voter);
    }
}
