use std::collections::BTreeMap;
use std::sync::Arc;

use color_eyre::Report;
use tokio::sync::RwLock;
use vanir_types::DomainType;

use crate::State;

/// Read access to an ordered byte-keyed mapping.
///
/// The persistent backend is an external collaborator; the state machine only
/// requires ordered reads with prefix iteration, so replicas walk keys in an
/// identical order.
pub trait StateRead {
    fn get_raw(&self, key: &str) -> Option<Vec<u8>>;

    /// All key-value pairs under a prefix, in ascending key order.
    fn prefix_raw(&self, prefix: &str) -> Vec<(String, Vec<u8>)>;
}

/// Write access to the mapping.
///
/// Writes accumulate in delta layers until the block commits. A checkpoint
/// opens a nested layer so one message's writes can be discarded without
/// touching the rest of the block, the way a failed handler must leave no
/// state behind.
pub trait StateWrite: StateRead {
    fn put_raw(&mut self, key: String, value: Vec<u8>);
    fn delete_raw(&mut self, key: &str);

    /// Open a nested delta layer.
    fn checkpoint(&mut self);
    /// Fold the top layer into the one below it.
    fn commit_checkpoint(&mut self);
    /// Throw the top layer away.
    fn rollback_checkpoint(&mut self);
}

type Delta = BTreeMap<String, Option<Vec<u8>>>;

/// In-memory store: a committed snapshot plus a stack of uncommitted delta
/// layers. `None` in a delta marks a deletion.
#[derive(Debug, Clone)]
pub struct MemStore {
    committed: BTreeMap<String, Vec<u8>>,
    deltas: Vec<Delta>,
}

impl Default for MemStore {
    fn default() -> Self {
        Self {
            committed: BTreeMap::new(),
            deltas: vec![Delta::new()],
        }
    }
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply every pending delta layer to the committed snapshot.
    pub fn commit(&mut self) {
        let deltas = std::mem::replace(&mut self.deltas, vec![Delta::new()]);
        for delta in deltas {
            for (key, value) in delta {
                match value {
                    Some(value) => {
                        self.committed.insert(key, value);
                    }
                    None => {
                        self.committed.remove(&key);
                    }
                }
            }
        }
    }

    /// Discard everything pending.
    pub fn abort(&mut self) {
        self.deltas = vec![Delta::new()];
    }

    /// A logical fork with all deltas flattened in, for speculative
    /// execution that must not touch the original.
    pub fn fork(&self) -> Self {
        let mut committed = self.committed.clone();
        for delta in &self.deltas {
            for (key, value) in delta {
                match value {
                    Some(value) => {
                        committed.insert(key.clone(), value.clone());
                    }
                    None => {
                        committed.remove(key);
                    }
                }
            }
        }
        Self {
            committed,
            deltas: vec![Delta::new()],
        }
    }

    fn top(&mut self) -> &mut Delta {
        self.deltas.last_mut().expect("delta stack is never empty")
    }
}

impl StateRead for MemStore {
    fn get_raw(&self, key: &str) -> Option<Vec<u8>> {
        for delta in self.deltas.iter().rev() {
            if let Some(value) = delta.get(key) {
                return value.clone();
            }
        }
        self.committed.get(key).cloned()
    }

    fn prefix_raw(&self, prefix: &str) -> Vec<(String, Vec<u8>)> {
        // Merge the committed snapshot and every delta layer; later layers
        // win.
        let mut merged: BTreeMap<String, Option<Vec<u8>>> = self
            .committed
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), Some(v.clone())))
            .collect();
        for delta in &self.deltas {
            for (key, value) in delta
                .range(prefix.to_string()..)
                .take_while(|(k, _)| k.starts_with(prefix))
            {
                merged.insert(key.clone(), value.clone());
            }
        }
        merged
            .into_iter()
            .filter_map(|(k, v)| v.map(|v| (k, v)))
            .collect()
    }
}

impl StateWrite for MemStore {
    fn put_raw(&mut self, key: String, value: Vec<u8>) {
        self.top().insert(key, Some(value));
    }

    fn delete_raw(&mut self, key: &str) {
        self.top().insert(key.to_string(), None);
    }

    fn checkpoint(&mut self) {
        self.deltas.push(Delta::new());
    }

    fn commit_checkpoint(&mut self) {
        if self.deltas.len() > 1 {
            let top = self.deltas.pop().expect("delta stack is never empty");
            self.top().extend(top);
        }
    }

    fn rollback_checkpoint(&mut self) {
        if self.deltas.len() > 1 {
            self.deltas.pop();
        }
    }
}

impl<T> StateReadExt for T where T: StateRead {}

pub trait StateReadExt: StateRead {
    /// Get a value from the state by key, decoding it into the given domain
    /// type. A decode failure is fatal: it means the stored state is corrupt.
    fn get<V: DomainType>(&self, key: &str) -> Result<Option<V>, Report> {
        match self.get_raw(key) {
            Some(bytes) => Ok(Some(V::decode_all(&bytes)?)),
            None => Ok(None),
        }
    }

    /// All key-value pairs under a prefix, decoded, in ascending key order.
    fn prefix<V: DomainType>(&self, prefix: &str) -> Result<Vec<(String, V)>, Report> {
        self.prefix_raw(prefix)
            .into_iter()
            .map(|(key, bytes)| Ok((key, V::decode_all(&bytes)?)))
            .collect()
    }

    fn has(&self, key: &str) -> bool {
        self.get_raw(key).is_some()
    }
}

impl<T> StateWriteExt for T where T: StateWrite {}

pub trait StateWriteExt: StateWrite {
    /// Set a value in the state by key, encoding it canonically.
    fn put<V: DomainType>(&mut self, key: &str, value: &V) {
        self.put_raw(key.to_string(), value.encode_to_vec());
    }

    fn delete(&mut self, key: &str) {
        self.delete_raw(key);
    }
}

/// Shared handle to the state machine, cloned into every ABCI service.
#[derive(Clone)]
pub struct Store {
    pub state: Arc<RwLock<State<MemStore>>>,
}

impl Store {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(State::new(MemStore::new()))),
        }
    }

    /// Commit all pending changes.
    pub async fn commit(&self) {
        self.state.write().await.store_mut().commit();
    }

    /// Fork the state for speculative execution (CheckTx must never mutate
    /// the real state).
    pub async fn fork(&self) -> State<MemStore> {
        State::new(self.state.read().await.store().fork())
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
