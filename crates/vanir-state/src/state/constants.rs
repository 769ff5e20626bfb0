use super::*;

/// Network constants for one protocol version.
///
/// The table is resolved once per block from the lowest version the active
/// set runs, so every replica gates on the same values regardless of what it
/// has installed locally.
#[derive(Clone, Debug)]
pub struct ConstantValues {
    /// Fraction of the reserve emitted per year, as a divisor.
    pub emission_curve: u128,
    pub blocks_per_year: u128,
    /// Minimum node count to keep the network running; below this the
    /// ragnarok unwind begins.
    pub minimum_nodes_for_bft: usize,
    pub minimum_nodes_for_yggdrasil: usize,
    pub desire_validator_set: usize,
    /// Blocks between fund-migration passes out of retiring vaults.
    pub fund_migration_interval: u64,
    /// Number of migration passes it takes to empty a retiring vault.
    pub migration_rounds: u64,
    /// Blocks between validator rotation attempts.
    pub rotate_per_block_height: u64,
    pub bad_validator_rate: u64,
    pub old_validator_rate: u64,
    pub lack_of_observation_penalty: i64,
    /// Blocks before an unsigned outbound counts as delinquent.
    pub signing_transaction_period: u64,
    pub minimum_bond_in_rune: u128,
    /// Chaosnet-only switch that forces ragnarok at a fixed height; zero
    /// disables it.
    pub artificial_ragnarok_block_height: u64,
    /// Max ready nodes rotated in per churn.
    pub rotate_in_limit: usize,
}

/// The constant table for protocol 0.1.x.
fn constants_v1() -> ConstantValues {
    ConstantValues {
        emission_curve: 6,
        blocks_per_year: 6_311_390,
        minimum_nodes_for_bft: 4,
        minimum_nodes_for_yggdrasil: 6,
        desire_validator_set: 33,
        fund_migration_interval: 360,
        migration_rounds: 5,
        rotate_per_block_height: 51840,
        bad_validator_rate: 51840,
        old_validator_rate: 51840,
        lack_of_observation_penalty: 2,
        signing_transaction_period: 100,
        minimum_bond_in_rune: 100_000_000_000_000,
        artificial_ragnarok_block_height: 0,
        rotate_in_limit: 2,
    }
}

pub fn constants_for(_version: &semver::Version) -> ConstantValues {
    // A single table so far; new protocol versions add arms here.
    constants_v1()
}

impl<S: StateReadExt + StateWriteExt + 'static> State<S> {
    /// The constant table in force for the current block.
    pub fn constants(&self) -> Result<ConstantValues, Report> {
        Ok(constants_for(&self.lowest_active_version()?))
    }

    /// The lowest software version among active nodes; the version every
    /// handler gate resolves against. Defaults to the genesis version while
    /// no node is active.
    pub fn lowest_active_version(&self) -> Result<semver::Version, Report> {
        Ok(self
            .list_active_node_accounts()?
            .iter()
            .map(|na| na.version())
            .min()
            .unwrap_or_else(|| semver::Version::new(0, 1, 0)))
    }

    /// The minimum version a standby node must run to be promoted to ready.
    pub fn min_join_version(&self) -> Result<semver::Version, Report> {
        self.lowest_active_version()
    }

    /// Get one admin config value for a specific admin address, if set.
    pub fn admin_config(&self, key: &str, addr: &Address) -> Result<Option<String>, Report> {
        self.store.get::<String>(&format!("admin/{key}/{addr}"))
    }

    pub fn set_admin_config(&mut self, key: &str, addr: &Address, value: String) {
        self.store.put(&format!("admin/{key}/{addr}"), &value);
    }

    /// The pool status newly created pools start in. Any active node may
    /// override the default through admin config.
    pub fn default_pool_status(&self) -> Result<PoolStatus, Report> {
        for (_, value) in self.store.prefix::<String>("admin/DefaultPoolStatus/")? {
            if let Ok(status) = PoolStatus::from_str(&value) {
                return Ok(status);
            }
        }
        Ok(PoolStatus::Enabled)
    }
}
