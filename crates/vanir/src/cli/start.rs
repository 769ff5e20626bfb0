use std::net::{IpAddr, Ipv4Addr};

use clap::Parser;
use color_eyre::eyre::OptionExt;
use vanir_state::{Consensus, Info, Mempool, Snapshot, Store};

use super::Run;

/// Run the state machine behind an ABCI server, driven by an external
/// consensus engine.
#[derive(Parser)]
pub struct Start {
    /// Which port should the ABCI server listen on?
    #[clap(long, default_value = "26658")]
    abci: u16,
}

impl Run for Start {
    async fn run(self) -> color_eyre::Result<()> {
        let Self { abci } = self;

        let store = Store::new();
        let consensus = Consensus::new(store.clone());
        let mempool = Mempool::new(store.clone());
        let info = Info::new(store.clone());
        let snapshot = Snapshot {};

        let server = tower_abci::v034::ServerBuilder::default()
            .consensus(consensus)
            .mempool(mempool)
            .info(info)
            .snapshot(snapshot)
            .finish()
            .ok_or_eyre("could not construct ABCI server")?;

        info!(port = abci, "ABCI server listening");
        server
            .listen_tcp((IpAddr::V4(Ipv4Addr::LOCALHOST), abci))
            .await
            .map_err(|e| color_eyre::eyre::eyre!("could not start ABCI server on port {abci}: {e}"))?;
        Ok(())
    }
}
