//! The deterministic replicated state machine of the vanir network.
//!
//! The consensus engine supplies a total order of blocks and messages; this
//! crate executes them. Each block runs as begin-block, the ordered message
//! list, then end-block, entirely synchronously: block execution is a pure
//! function of the prior state, the block header, and the ordered messages.

#[macro_use]
extern crate tracing;

mod abci;
mod query;
mod state;
mod store;

pub use abci::{Consensus, Info, Mempool, Snapshot};
pub use query::handle_query;
pub use state::State;
pub use store::{MemStore, StateRead, StateReadExt, StateWrite, StateWriteExt, Store};
