use parity_scale_codec::{Decode, Encode};

use super::*;

/// A keygen ceremony that has been requested but whose vault pubkey has not
/// been acknowledged yet.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode)]
pub struct PendingKeygen {
    /// Secp256k1 keys of the nodes that should hold the new vault.
    pub membership: Vec<PubKey>,
    /// Block at which the ceremony was requested.
    pub height: u64,
}

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    pub fn vault_exists(&self, pub_key: &PubKey) -> bool {
        self.store.has(&format!("vault/{pub_key}"))
    }

    pub fn get_vault(&self, pub_key: &PubKey) -> Result<Option<Vault>, Report> {
        self.store.get(&format!("vault/{pub_key}"))
    }

    /// Save a vault, keeping the asgard index in sync.
    pub fn set_vault(&mut self, vault: &Vault) -> Result<(), Report> {
        if vault.is_asgard() {
            let mut index = self.asgard_index()?;
            if !index.contains(&vault.pub_key) {
                index.push(vault.pub_key.clone());
                self.store.put("asgard_index/", &index);
            }
        }
        self.store.put(&format!("vault/{}", vault.pub_key), vault);
        Ok(())
    }

    /// Delete a vault. Deleting a vault that still holds funds is forbidden;
    /// funds must be migrated or recalled first.
    pub fn delete_vault(&mut self, pub_key: &PubKey) -> Result<(), Report> {
        let Some(vault) = self.get_vault(pub_key)? else {
            return Ok(());
        };
        if vault.has_funds() {
            bail!("unable to delete vault {pub_key}: it still contains funds");
        }
        if vault.is_asgard() {
            let index: Vec<PubKey> = self
                .asgard_index()?
                .into_iter()
                .filter(|pk| pk != pub_key)
                .collect();
            if index.is_empty() {
                self.store.delete("asgard_index/");
            } else {
                self.store.put("asgard_index/", &index);
            }
        }
        self.store.delete(&format!("vault/{pub_key}"));
        Ok(())
    }

    fn asgard_index(&self) -> Result<Vec<PubKey>, Report> {
        Ok(self.store.get::<Vec<PubKey>>("asgard_index/")?.unwrap_or_default())
    }

    pub fn asgard_vaults(&self) -> Result<Vec<Vault>, Report> {
        let mut asgards = vec![];
        for pk in self.asgard_index()? {
            if let Some(vault) = self.get_vault(&pk)? {
                if vault.is_asgard() {
                    asgards.push(vault);
                }
            }
        }
        Ok(asgards)
    }

    pub fn asgard_vaults_by_status(&self, status: VaultStatus) -> Result<Vec<Vault>, Report> {
        Ok(self
            .asgard_vaults()?
            .into_iter()
            .filter(|v| v.status == status)
            .collect())
    }

    /// The vault inbound funds are currently directed to: the most recently
    /// created active asgard, with the pubkey as a deterministic tie break.
    pub fn current_signing_vault(&self) -> Result<Option<Vault>, Report> {
        Ok(self
            .asgard_vaults_by_status(VaultStatus::Active)?
            .into_iter()
            .max_by(|a, b| {
                a.block_height
                    .cmp(&b.block_height)
                    .then_with(|| a.pub_key.cmp(&b.pub_key))
            }))
    }

    /// The active asgard holding the least of the given asset, used to level
    /// inventory when scheduling outbounds.
    pub fn select_asgard_by_min_asset(&self, asset: &Asset) -> Result<Option<Vault>, Report> {
        Ok(self
            .asgard_vaults_by_status(VaultStatus::Active)?
            .into_iter()
            .min_by(|a, b| {
                a.balance_of(asset)
                    .cmp(&b.balance_of(asset))
                    .then_with(|| a.pub_key.cmp(&b.pub_key))
            }))
    }

    /// Enqueue a keygen ceremony for the given node set. The TSS runtime
    /// picks this up off-process; completion comes back as acknowledgment
    /// messages carrying the new vault pubkey.
    pub fn trigger_keygen(&mut self, membership: Vec<PubKey>) -> Result<(), Report> {
        let height = self.block_height()?;
        info!(members = membership.len(), height, "triggering keygen");
        self.store.put("keygen/", &PendingKeygen { membership, height });
        Ok(())
    }

    pub fn pending_keygen(&self) -> Result<Option<PendingKeygen>, Report> {
        self.store.get("keygen/")
    }

    /// Promote an acknowledged keygen result: the new asgard becomes active
    /// and every previously active asgard starts retiring.
    pub fn promote_keygen_vault(&mut self, pub_key: &PubKey) -> Result<(), Report> {
        let Some(pending) = self.pending_keygen()? else {
            bail!("no pending keygen to promote");
        };
        let height = self.block_height()?;

        for mut vault in self.asgard_vaults_by_status(VaultStatus::Active)? {
            vault.status = VaultStatus::Retiring;
            self.set_vault(&vault)?;
        }

        let vault = Vault::new(
            pub_key.clone(),
            VaultType::Asgard,
            VaultStatus::Active,
            height,
            pending.membership,
        );
        self.set_vault(&vault)?;
        self.store.delete("keygen/");
        self.store.put("vault_rotation_height/", &height);
        info!(vault = %pub_key, height, "promoted new asgard vault");
        Ok(())
    }

    pub fn vault_rotation_height(&self) -> Result<u64, Report> {
        Ok(self.store.get::<u64>("vault_rotation_height/")?.unwrap_or(0))
    }

    /// Move a slice of every retiring asgard's funds to the current active
    /// asgard. Runs every `fund_migration_interval` blocks after a rotation;
    /// the nth pass moves `min(nth, rounds)/rounds` of what remains, so the
    /// vault drains within a bounded number of passes and is then deleted.
    pub fn migrate_retiring_funds(&mut self) -> Result<(), Report> {
        let constants = self.constants()?;
        let rotation_height = self.vault_rotation_height()?;
        if rotation_height == 0 {
            return Ok(());
        }
        let height = self.block_height()?;
        let since = height.saturating_sub(rotation_height);
        if since == 0 || since % constants.fund_migration_interval != 0 {
            return Ok(());
        }
        let nth = (since / constants.fund_migration_interval).min(constants.migration_rounds);

        let retiring = self.asgard_vaults_by_status(VaultStatus::Retiring)?;
        let Some(target) = self.current_signing_vault()? else {
            return Ok(());
        };

        for vault in retiring {
            if !vault.has_funds() {
                self.delete_vault(&vault.pub_key)?;
                continue;
            }
            for coin in vault.coins.iter() {
                let amount = util::mul_div(coin.amount, nth as u128, constants.migration_rounds as u128)?;
                if amount == 0 {
                    continue;
                }
                let item = TxOutItem::new(
                    coin.asset.chain,
                    target.pub_key.address(coin.asset.chain),
                    Coin::new(coin.asset.clone(), amount),
                    TxId::blank(),
                )
                .with_vault(vault.pub_key.clone())
                .with_memo(Memo::Migrate { block_height: height }.to_string());
                self.try_add_tx_out_item_lenient(item)?;
            }
        }
        Ok(())
    }

    /// Create a node's yggdrasil working vault if it does not exist yet.
    pub fn ensure_yggdrasil(&mut self, na: &NodeAccount) -> Result<(), Report> {
        let key = &na.pub_key_set.secp256k1;
        if key.is_empty() || self.vault_exists(key) {
            return Ok(());
        }
        let height = self.block_height()?;
        let vault = Vault::new(
            key.clone(),
            VaultType::Yggdrasil,
            VaultStatus::Active,
            height,
            vec![key.clone()],
        );
        self.set_vault(&vault)
    }

    /// Ask a node's yggdrasil vault to send everything it holds back to
    /// asgard: one outbound per supported chain, addressed to the asgard
    /// vault's address on that chain. A no-op for empty or asgard vaults.
    pub fn request_ygg_return(&mut self, na: &NodeAccount) -> Result<(), Report> {
        let Some(ygg) = self.get_vault(&na.pub_key_set.secp256k1)? else {
            return Ok(());
        };
        if ygg.is_asgard() || !ygg.has_funds() {
            return Ok(());
        }

        let Some(asgard) = self.select_asgard_by_min_asset(&Asset::rune())? else {
            bail!("unable to determine asgard vault for yggdrasil recall");
        };

        let height = self.block_height()?;
        for chain in self.chains()? {
            let to_addr = asgard.pub_key.address(chain);
            if to_addr.is_empty() {
                continue;
            }
            // The recall is an instruction, not a transfer: the signer sends
            // whatever the vault holds on that chain, so the item carries a
            // zero coin and reserves nothing.
            let item = TxOutItem::new(
                chain,
                to_addr,
                Coin::new(chain.gas_asset(), 0),
                TxId::blank(),
            )
            .with_vault(ygg.pub_key.clone())
            .with_memo(Memo::YggdrasilReturn { block_height: height }.to_string());
            self.try_add_tx_out_item(item)?;
        }
        Ok(())
    }
}
