use super::*;

mod ack;
mod add;
mod admin;
mod bond;
mod end_pool;
mod leave;
mod next_pool;
mod observed_tx_in;
mod observed_tx_out;
mod refund;
mod reserve;
mod set_version;
mod stake;
mod swap;
mod trust_account;
mod unstake;
mod yggdrasil;

#[cfg(test)]
mod observed_tx_in_tests;

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// Dispatch a message to its handler. The match is exhaustive over the
    /// closed message set, so an unrouted kind cannot compile.
    pub fn route_msg(&mut self, msg: &Msg) -> Result<(), Report> {
        let constants = self.constants()?;
        match msg {
            Msg::ObservedTxIn(m) => self.handle_observed_tx_in(m, &constants),
            Msg::ObservedTxOut(m) => self.handle_observed_tx_out(m, &constants),
            Msg::Swap(m) => self.handle_swap(m, &constants),
            Msg::Stake(m) => self.handle_stake(m, &constants),
            Msg::Unstake(m) => self.handle_unstake(m, &constants),
            Msg::Add(m) => self.handle_add(m, &constants),
            Msg::OutboundTx(m) => self.handle_outbound_tx(m, &constants),
            Msg::Leave(m) => self.handle_leave(m, &constants),
            Msg::ReserveContributor(m) => self.handle_reserve_contributor(m, &constants),
            Msg::Yggdrasil(m) => self.handle_yggdrasil(m, &constants),
            Msg::NextPoolAddress(m) => self.handle_next_pool_address(m, &constants),
            Msg::Bond(m) => self.handle_bond(m, &constants),
            Msg::SetVersion(m) => self.handle_set_version(m, &constants),
            Msg::SetTrustAccount(m) => self.handle_set_trust_account(m, &constants),
            Msg::EndPool(m) => self.handle_end_pool(m, &constants),
            Msg::Ack(m) => self.handle_ack(m, &constants),
            Msg::SetAdminConfig(m) => self.handle_set_admin_config(m, &constants),
            Msg::Noop { .. } => Ok(()),
        }
    }

    /// Only active nodes may submit consensus messages.
    pub(crate) fn ensure_active_signer(&self, signer: &Address) -> Result<(), Report> {
        if !self.is_active_node_account(signer)? {
            return Err(HandlerError::unauthorized(format!(
                "{signer} is not an active node account"
            ))
            .into());
        }
        Ok(())
    }
}
