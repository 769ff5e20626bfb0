use tendermint::{validator::Update, vote::Power, PublicKey};

use super::*;

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// Validator work at the start of a block: genesis setup, marking bad
    /// and old actors, and scheduling the next keygen when rotation is due.
    pub fn validator_begin_block(&mut self) -> Result<(), Report> {
        let height = self.block_height()?;
        let constants = self.constants()?;

        if height == 1 {
            self.setup_validator_nodes(&constants)?;
        }
        if self.ragnarok_in_progress()? {
            // While unwinding, the only validator work left is driving the
            // unwind itself; marking and rotation stop.
            let active_nodes = self.list_active_node_accounts()?;
            self.process_ragnarok(&active_nodes, &constants)?;
            return Ok(());
        }

        let total_active = self.total_active_node_accounts()?;
        let artificial = constants.artificial_ragnarok_block_height;
        if constants.minimum_nodes_for_bft + 2 < total_active
            || (artificial > 0 && height >= artificial)
        {
            self.mark_bad_actor(constants.bad_validator_rate)?;
            self.mark_old_actor(constants.old_validator_rate)?;
        }

        if height % constants.rotate_per_block_height == 0 {
            info!(height, "checking for node account rotation");
            let (next, rotating) =
                self.next_vault_node_accounts(constants.desire_validator_set, &constants)?;
            if rotating {
                let membership = next
                    .iter()
                    .map(|na| na.pub_key_set.secp256k1.clone())
                    .collect();
                self.trigger_keygen(membership)?;
            }
        }

        Ok(())
    }

    /// Validator work at the end of a block: apply membership changes driven
    /// by the active asgard vaults and hand the consensus engine its
    /// validator updates.
    pub fn validator_end_block(&mut self) -> Result<Vec<Update>, Report> {
        let height = self.block_height()?;
        let constants = self.constants()?;
        let active_nodes = self.list_active_node_accounts()?;

        if self.ragnarok_in_progress()? {
            // Begin-block drives the unwind; no validator updates go out.
            return Ok(vec![]);
        }

        let (new_nodes, removed_nodes) = self.get_changed_nodes(&active_nodes)?;
        if new_nodes.is_empty() && removed_nodes.is_empty() {
            return Ok(vec![]);
        }

        let after_change = active_nodes.len() + new_nodes.len() - removed_nodes.len();
        if active_nodes.len() >= constants.minimum_nodes_for_bft
            && after_change < constants.minimum_nodes_for_bft
        {
            // Not enough validators left for BFT: unwind instead of churning.
            self.process_ragnarok(&active_nodes, &constants)?;
            return Ok(vec![]);
        }

        let mut updates = Vec::with_capacity(new_nodes.len() + removed_nodes.len());
        for mut na in new_nodes {
            info!(
                node = %na.node_address,
                former = %na.status,
                "node account becoming active"
            );
            na.update_status(NodeStatus::Active, height);
            self.set_node_account(&na);
            // Working vaults only make sense once the set is large enough
            // that per-node float is a small fraction of custody.
            if self.total_active_node_accounts()? >= constants.minimum_nodes_for_yggdrasil {
                self.ensure_yggdrasil(&na)?;
            }
            match self.node_validator_update(&na, Power::from(100u32)) {
                Some(update) => updates.push(update),
                None => warn!(node = %na.node_address, "invalid consensus public key"),
            }
        }
        for mut na in removed_nodes {
            let status = if na.requested_to_leave {
                NodeStatus::Disabled
            } else {
                NodeStatus::Standby
            };
            info!(
                node = %na.node_address,
                former = %na.status,
                current = %status,
                "node account leaving the active set"
            );
            na.update_status(status, height);
            self.set_node_account(&na);
            self.pay_node_account_bond_award(&na.node_address)?;
            match self.node_validator_update(&na, Power::from(0u32)) {
                Some(update) => updates.push(update),
                None => warn!(node = %na.node_address, "invalid consensus public key"),
            }
        }

        Ok(updates)
    }

    fn node_validator_update(&self, na: &NodeAccount, power: Power) -> Option<Update> {
        let bytes = hex::decode(&na.validator_cons_pub_key).ok()?;
        let pub_key = PublicKey::from_raw_ed25519(&bytes)?;
        Some(Update { pub_key, power })
    }

    /// Compare the active node set to the membership of the active asgard
    /// vaults: actives missing from every vault get removed, ready nodes
    /// present in a vault get promoted.
    fn get_changed_nodes(
        &self,
        active_nodes: &[NodeAccount],
    ) -> Result<(Vec<NodeAccount>, Vec<NodeAccount>), Report> {
        let ready_nodes = self.list_node_accounts_by_status(NodeStatus::Ready)?;
        let active_vaults = self.asgard_vaults_by_status(VaultStatus::Active)?;
        if active_vaults.is_empty() {
            // Between genesis and the first acknowledged keygen there is no
            // vault to diff against; nothing churns yet.
            debug!("no active asgard vault; skipping membership diff");
            return Ok((vec![], vec![]));
        }
        let membership: Vec<PubKey> = active_vaults
            .iter()
            .flat_map(|v| v.membership.iter().cloned())
            .collect();

        let mut removed = vec![];
        for na in active_nodes {
            let found = active_vaults
                .iter()
                .any(|v| v.contains(&na.pub_key_set.secp256k1));
            if !found && !membership.is_empty() {
                removed.push(na.clone());
            }
        }

        let mut new_active = vec![];
        for na in ready_nodes {
            if membership.iter().any(|m| na.pub_key_set.contains(m)) {
                new_active.push(na);
            }
        }

        Ok((new_active, removed))
    }

    /// Pay a departing node the bond rewards it earned while active.
    pub fn pay_node_account_bond_award(&mut self, addr: &Address) -> Result<(), Report> {
        let Some(mut na) = self.get_node_account(addr)? else {
            return Ok(());
        };
        if na.active_block_height == 0 || na.bond == 0 {
            return Ok(());
        }
        let height = self.block_height()?;
        let mut data = self.vault_data()?;

        let total_active_blocks = height.saturating_sub(na.active_block_height);
        let earned_blocks = na.earned_blocks(height);
        let reward = data.node_reward(earned_blocks);

        na.bond = na.bond.saturating_add(reward);
        data.bond_reward_rune = data.bond_reward_rune.saturating_sub(reward);
        data.total_bond_units = data
            .total_bond_units
            .saturating_sub(total_active_blocks as u128);

        self.set_vault_data(&data);
        na.active_block_height = 0;
        self.set_node_account(&na);
        Ok(())
    }

    /// One-off genesis setup: the first `desire_validator_set` candidates
    /// become active, ready before standby, in a stable order.
    fn setup_validator_nodes(&mut self, constants: &ConstantValues) -> Result<(), Report> {
        let height = self.block_height()?;
        let mut candidates = self.list_active_node_accounts()?;
        let mut ready = self.list_node_accounts_by_status(NodeStatus::Ready)?;
        candidates.append(&mut ready);
        if candidates.is_empty() {
            bail!("no validators available");
        }

        let activating = candidates.len().min(constants.desire_validator_set);
        for (idx, na) in candidates.iter_mut().enumerate() {
            if idx < constants.desire_validator_set {
                na.update_status(NodeStatus::Active, height);
                if activating >= constants.minimum_nodes_for_yggdrasil {
                    self.ensure_yggdrasil(na)?;
                }
            } else {
                na.update_status(NodeStatus::Standby, height);
            }
            self.set_node_account(na);
        }

        // The genesis asgard vault holds every initial active node.
        let membership: Vec<PubKey> = self
            .list_active_node_accounts()?
            .iter()
            .map(|na| na.pub_key_set.secp256k1.clone())
            .collect();
        self.trigger_keygen(membership)?;
        Ok(())
    }

    /// The active node whose age most outweighs its misbehavior, compared by
    /// cross multiplication so no floats are involved. Nodes without slash
    /// points are never bad actors.
    pub(crate) fn find_bad_actor(&self) -> Result<Option<NodeAccount>, Report> {
        let mut bad: Option<NodeAccount> = None;
        for na in self.list_active_node_accounts()? {
            if na.slash_points == 0 {
                continue;
            }
            let Some(current) = &bad else {
                bad = Some(na);
                continue;
            };
            // na.status_since / na.slash_points > current.status_since / current.slash_points
            let lhs = na.status_since as i128 * current.slash_points as i128;
            let rhs = current.status_since as i128 * na.slash_points as i128;
            if lhs > rhs || (lhs == rhs && na.slash_points > current.slash_points) {
                bad = Some(na);
            }
        }
        Ok(bad)
    }

    /// The active node that has held its status the longest.
    pub(crate) fn find_old_actor(&self) -> Result<Option<NodeAccount>, Report> {
        Ok(self
            .list_active_node_accounts()?
            .into_iter()
            .min_by_key(|na| na.status_since))
    }

    /// Mark a node to be churned out, once.
    pub(crate) fn mark_actor(&mut self, na: Option<NodeAccount>) -> Result<(), Report> {
        let Some(mut na) = na else { return Ok(()) };
        if na.leave_height == 0 {
            info!(node = %na.node_address, "marked validator to be churned out");
            na.leave_height = self.block_height()?;
            self.set_node_account(&na);
        }
        Ok(())
    }

    fn mark_bad_actor(&mut self, rate: u64) -> Result<(), Report> {
        if self.block_height()? % rate == 0 {
            let bad = self.find_bad_actor()?;
            self.mark_actor(bad)?;
        }
        Ok(())
    }

    fn mark_old_actor(&mut self, rate: u64) -> Result<(), Report> {
        if self.block_height()? % rate == 0 {
            let old = self.find_old_actor()?;
            self.mark_actor(old)?;
        }
        Ok(())
    }

    /// Promote standby nodes that run an acceptable software version to
    /// ready, and demote ready nodes that fell behind.
    fn mark_ready_actors(&mut self) -> Result<(), Report> {
        let height = self.block_height()?;
        let min_version = self.min_join_version()?;
        let mut candidates = self.list_node_accounts_by_status(NodeStatus::Standby)?;
        candidates.extend(self.list_node_accounts_by_status(NodeStatus::Ready)?);

        for mut na in candidates {
            // Everyone starts with the benefit of the doubt.
            na.update_status(NodeStatus::Ready, height);
            if na.version() < min_version {
                na.update_status(NodeStatus::Standby, height);
            }
            self.set_node_account(&na);
        }
        Ok(())
    }

    /// The node set the next asgard vault should be keyed to, and whether it
    /// differs from the current actives.
    ///
    /// Ready nodes are taken by descending bond. Actives sort leavers first
    /// (requested leaves ahead of marked ones); if the head is leaving it is
    /// evicted, and up to `rotate_in_limit` ready nodes fill the set back
    /// toward the target.
    pub fn next_vault_node_accounts(
        &mut self,
        target: usize,
        constants: &ConstantValues,
    ) -> Result<(Vec<NodeAccount>, bool), Report> {
        let mut rotation = false;

        self.mark_ready_actors()?;

        let mut ready = self.list_node_accounts_by_status(NodeStatus::Ready)?;
        ready.sort_by(|a, b| b.bond.cmp(&a.bond));

        let mut active = self.list_active_node_accounts()?;
        active.sort_by(|a, b| {
            b.requested_to_leave
                .cmp(&a.requested_to_leave)
                .then_with(|| b.leave_height.cmp(&a.leave_height))
        });

        if let Some(head) = active.first() {
            if head.leave_height > 0 || head.requested_to_leave {
                rotation = true;
                active.remove(0);
            }
        }

        let missing = target.saturating_sub(active.len());
        for na in ready.into_iter().take(missing.min(constants.rotate_in_limit)) {
            rotation = true;
            active.push(na);
        }

        Ok((active, rotation))
    }
}

