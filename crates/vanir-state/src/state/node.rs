use super::*;

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    pub fn get_node_account(&self, addr: &Address) -> Result<Option<NodeAccount>, Report> {
        self.store.get(&format!("node/{addr}"))
    }

    pub fn set_node_account(&mut self, na: &NodeAccount) {
        self.store.put(&format!("node/{}", na.node_address), na);
    }

    /// All node accounts, in address order.
    pub fn node_accounts(&self) -> Result<Vec<NodeAccount>, Report> {
        Ok(self
            .store
            .prefix::<NodeAccount>("node/")?
            .into_iter()
            .map(|(_, na)| na)
            .collect())
    }

    pub fn list_node_accounts_by_status(
        &self,
        status: NodeStatus,
    ) -> Result<Vec<NodeAccount>, Report> {
        Ok(self
            .node_accounts()?
            .into_iter()
            .filter(|na| na.status == status)
            .collect())
    }

    pub fn list_active_node_accounts(&self) -> Result<Vec<NodeAccount>, Report> {
        self.list_node_accounts_by_status(NodeStatus::Active)
    }

    pub fn total_active_node_accounts(&self) -> Result<usize, Report> {
        Ok(self.list_active_node_accounts()?.len())
    }

    /// Whether the given address belongs to an active node. Only active
    /// nodes may vote and sign.
    pub fn is_active_node_account(&self, addr: &Address) -> Result<bool, Report> {
        Ok(self
            .get_node_account(addr)?
            .map(|na| na.status == NodeStatus::Active)
            .unwrap_or(false))
    }

    /// Find the node that owns the given vault membership key.
    pub fn node_account_by_pub_key(&self, key: &PubKey) -> Result<Option<NodeAccount>, Report> {
        Ok(self
            .node_accounts()?
            .into_iter()
            .find(|na| na.pub_key_set.contains(key)))
    }

    pub fn node_account_by_bond_address(
        &self,
        addr: &Address,
    ) -> Result<Option<NodeAccount>, Report> {
        Ok(self
            .node_accounts()?
            .into_iter()
            .find(|na| &na.bond_address == addr))
    }

    /// Add slash points to a node. Points only ever grow within a block; they
    /// reset indirectly by lowering churn and reward outcomes.
    pub fn slash_node_account(&mut self, addr: &Address, points: i64) -> Result<(), Report> {
        let Some(mut na) = self.get_node_account(addr)? else {
            bail!("cannot slash unknown node account {addr}");
        };
        na.slash_points = na.slash_points.saturating_add(points.max(0));
        self.set_node_account(&na);
        Ok(())
    }

    /// The addresses that contributed an observation since the set was last
    /// cleared. The slasher uses this to find nodes that stopped observing.
    pub fn observing_addresses(&self) -> Result<BTreeSet<Address>, Report> {
        Ok(self
            .store
            .get::<BTreeSet<Address>>("observing_addresses/")?
            .unwrap_or_default())
    }

    pub fn add_observing_addresses(&mut self, addrs: &[Address]) -> Result<(), Report> {
        let mut observing = self.observing_addresses()?;
        let before = observing.len();
        observing.extend(addrs.iter().cloned());
        if observing.len() != before {
            self.store.put("observing_addresses/", &observing);
        }
        Ok(())
    }

    pub fn clear_observing_addresses(&mut self) {
        self.store.delete("observing_addresses/");
    }
}
