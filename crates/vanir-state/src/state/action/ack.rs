use parity_scale_codec::{Decode, Encode};

use super::*;

/// Accumulated acknowledgments of a completed keygen ceremony, keyed by the
/// vault pubkey the ceremony produced.
#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct AckVoter {
    pub signers: Vec<Address>,
    pub promoted: bool,
}

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// A node acknowledging that the TSS keygen runtime finished and
    /// produced the given vault pubkey. When a strict supermajority of the
    /// active set agrees on the same pubkey, the vault goes live and the
    /// previous asgard starts retiring.
    pub(crate) fn handle_ack(
        &mut self,
        msg: &MsgAck,
        _constants: &ConstantValues,
    ) -> Result<(), Report> {
        self.ensure_active_signer(&msg.signer)?;

        if self.pending_keygen()?.is_none() {
            return Err(
                HandlerError::unknown_request("no keygen ceremony is in progress").into(),
            );
        }
        if let Some(expected) = self.next_pool_pub_key()? {
            if expected != msg.pub_key {
                return Err(HandlerError::invalid_vault(format!(
                    "acknowledged pubkey {} does not match announced next pool {expected}",
                    msg.pub_key
                ))
                .into());
            }
        }

        let key = format!("keygen_ack/{}", msg.pub_key);
        let mut voter = self.store.get::<AckVoter>(&key)?.unwrap_or_default();
        if voter.promoted {
            return Ok(());
        }
        if !voter.signers.contains(&msg.signer) {
            voter.signers.push(msg.signer.clone());
        }

        let active = self.list_active_node_accounts()?;
        let count = voter
            .signers
            .iter()
            .filter(|signer| active.iter().any(|na| &&na.node_address == signer))
            .count();

        if has_super_majority(count, active.len()) {
            voter.promoted = true;
            self.store.put(&key, &voter);
            self.promote_keygen_vault(&msg.pub_key)?;
            self.store.delete("next_pool/");
        } else {
            self.store.put(&key, &voter);
        }
        Ok(())
    }
}
