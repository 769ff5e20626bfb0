use vanir_types::DomainType;

use super::*;

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// Deliver transaction bytes to the state.
    pub fn deliver_tx(&mut self, tx_bytes: &[u8]) -> Result<(), Report> {
        let msg = Msg::decode_all(tx_bytes)
            .map_err(|e| HandlerError::invalid_message(format!("undecodable message: {e}")))?;
        self.deliver_msg(&msg)
    }

    /// Validate and route one message.
    ///
    /// Runs under a message-scoped checkpoint: a rejected message leaves no
    /// writes behind, and its error is isolated from the rest of the block.
    pub fn deliver_msg(&mut self, msg: &Msg) -> Result<(), Report> {
        msg.validate_basic()?;

        let version = self.lowest_active_version()?;
        if version < semver::Version::new(0, 1, 0) {
            return Err(HandlerError::new(
                Code::BadVersion,
                format!("active version {version} is below the supported minimum"),
            )
            .into());
        }

        self.transactional(|state| state.route_msg(msg))
    }
}
