use super::*;

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// Get the current block height from the state.
    pub fn block_height(&self) -> Result<u64, Report> {
        self.store
            .get::<u64>("current/block_height")?
            .ok_or_eyre("block height not found in state; is the state initialized?")
    }

    pub(crate) fn set_block_height(&mut self, height: u64) {
        self.store.put("current/block_height", &height);
    }

    /// Get the current chain ID from the state.
    pub fn chain_id(&self) -> Result<String, Report> {
        self.store
            .get::<String>("parameters/chain_id")?
            .ok_or_eyre("chain ID not found in state; is the state initialized?")
    }

    /// Set the current chain ID. This should only happen once, at genesis.
    pub(crate) fn set_chain_id(&mut self, chain_id: String) -> Result<(), Report> {
        if self.chain_id().is_ok() {
            bail!("chain ID is already set; cannot set it again");
        }
        self.store.put("parameters/chain_id", &chain_id);
        Ok(())
    }

    /// The last observed block height of an external chain.
    pub fn last_chain_height(&self, chain: Chain) -> Result<u64, Report> {
        Ok(self
            .store
            .get::<u64>(&format!("last_chain_height/{chain}"))?
            .unwrap_or(0))
    }

    /// Record a newly observed external chain height. Heights only move
    /// forward; a stale observation is ignored.
    pub(crate) fn set_last_chain_height(&mut self, chain: Chain, height: u64) -> Result<(), Report> {
        if height > self.last_chain_height(chain)? {
            self.store.put(&format!("last_chain_height/{chain}"), &height);
        }
        Ok(())
    }

    /// The last external height at which one of our outbounds was observed.
    pub fn last_signed_height(&self) -> Result<u64, Report> {
        Ok(self.store.get::<u64>("last_signed_height/")?.unwrap_or(0))
    }

    pub(crate) fn set_last_signed_height(&mut self, height: u64) -> Result<(), Report> {
        if height > self.last_signed_height()? {
            self.store.put("last_signed_height/", &height);
        }
        Ok(())
    }

    /// The set of chains the network has seen valid inbounds on.
    pub fn chains(&self) -> Result<BTreeSet<Chain>, Report> {
        Ok(self
            .store
            .get::<BTreeSet<Chain>>("chains/")?
            .unwrap_or_default())
    }

    pub(crate) fn add_chain(&mut self, chain: Chain) -> Result<(), Report> {
        let mut chains = self.chains()?;
        if chains.insert(chain) {
            self.store.put("chains/", &chains);
        }
        Ok(())
    }

    /// The block ragnarok was triggered at; zero while the network is
    /// healthy.
    pub fn ragnarok_block_height(&self) -> Result<u64, Report> {
        Ok(self.store.get::<u64>("ragnarok_height/")?.unwrap_or(0))
    }

    pub fn ragnarok_in_progress(&self) -> Result<bool, Report> {
        Ok(self.ragnarok_block_height()? != 0)
    }

    pub(crate) fn set_ragnarok_block_height(&mut self, height: u64) {
        self.store.put("ragnarok_height/", &height);
    }
}
