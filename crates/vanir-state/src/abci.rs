use std::num::NonZero;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use tendermint::abci::Code;
use tendermint::v0_34::abci::{
    self, ConsensusRequest, ConsensusResponse, InfoRequest, InfoResponse, MempoolRequest,
    MempoolResponse, SnapshotRequest, SnapshotResponse,
};
use tower::{BoxError, Service};
use vanir_types::{DomainType, HandlerError, Msg};

use crate::Store;

/// Translate ABCI consensus requests into calls on the state machine.
///
/// Handler rejections surface as non-zero result codes; anything else is an
/// infrastructure failure, and failing the service refuses the commit.
#[derive(Clone)]
pub struct Consensus {
    store: Store,
}

impl Consensus {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

fn reject_code(e: &color_eyre::Report) -> Option<(u32, String)> {
    e.downcast_ref::<HandlerError>()
        .map(|he| (he.code.value(), he.to_string()))
}

impl Service<ConsensusRequest> for Consensus {
    type Response = ConsensusResponse;
    type Error = BoxError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ConsensusRequest) -> Self::Future {
        debug!(?req);
        let store = self.store.clone();

        Box::pin(async move {
            Ok(match req {
                ConsensusRequest::InitChain(init_chain) => {
                    let response = store.state.write().await.init_chain(init_chain)?;
                    ConsensusResponse::InitChain(response)
                }
                ConsensusRequest::BeginBlock(begin_block) => {
                    let response = store.state.write().await.begin_block(begin_block)?;
                    ConsensusResponse::BeginBlock(response)
                }
                ConsensusRequest::DeliverTx(abci::request::DeliverTx { tx }) => {
                    let result = store.state.write().await.deliver_tx(&tx);
                    let response = match result {
                        Ok(()) => abci::response::DeliverTx::default(),
                        Err(e) => match reject_code(&e) {
                            Some((code, log)) => {
                                warn!(log, "transaction rejected");
                                abci::response::DeliverTx {
                                    code: Code::Err(
                                        NonZero::new(code.max(1)).expect("nonzero code"),
                                    ),
                                    log,
                                    ..Default::default()
                                }
                            }
                            // Infrastructure failure: refuse to continue.
                            None => return Err(e.into()),
                        },
                    };
                    ConsensusResponse::DeliverTx(response)
                }
                ConsensusRequest::EndBlock(end_block) => {
                    let response = store.state.write().await.end_block(end_block)?;
                    ConsensusResponse::EndBlock(response)
                }
                ConsensusRequest::Commit => {
                    store.commit().await;
                    ConsensusResponse::Commit(abci::response::Commit::default())
                }
            })
        })
    }
}

/// Mempool admission: decode and statelessly validate, against a fork so the
/// real state is never touched.
#[derive(Clone)]
pub struct Mempool {
    store: Store,
}

impl Mempool {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

impl Service<MempoolRequest> for Mempool {
    type Response = MempoolResponse;
    type Error = BoxError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: MempoolRequest) -> Self::Future {
        let store = self.store.clone();

        Box::pin(async move {
            let MempoolRequest::CheckTx(abci::request::CheckTx { tx, kind: _ }) = req;

            let reject = |log: String| {
                Ok(MempoolResponse::CheckTx(abci::response::CheckTx {
                    code: Code::Err(NonZero::new(1).expect("1 != 0")),
                    log,
                    ..Default::default()
                }))
            };

            let msg = match Msg::decode_all(&tx) {
                Ok(msg) => msg,
                Err(e) => return reject(e.to_string()),
            };
            if let Err(e) = msg.validate_basic() {
                return reject(e.to_string());
            }

            // !!! Run the full handler against a fork only: CheckTx must not
            // modify the state.
            let mut fork = store.fork().await;
            if let Err(e) = fork.deliver_msg(&msg) {
                return reject(e.to_string());
            }

            Ok(MempoolResponse::CheckTx(abci::response::CheckTx::default()))
        })
    }
}

/// Info and read-only query projections over the committed state.
#[derive(Clone)]
pub struct Info {
    store: Store,
}

impl Info {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

impl Service<InfoRequest> for Info {
    type Response = InfoResponse;
    type Error = BoxError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: InfoRequest) -> Self::Future {
        let store = self.store.clone();

        Box::pin(async move {
            Ok(match req {
                InfoRequest::Info(_info) => {
                    let last_block_height = store
                        .state
                        .read()
                        .await
                        .block_height()
                        .unwrap_or_default();
                    InfoResponse::Info(abci::response::Info {
                        data: env!("CARGO_PKG_NAME").to_string(),
                        version: env!("CARGO_PKG_VERSION").to_string(),
                        app_version: 1,
                        last_block_height: u32::try_from(last_block_height)
                            .unwrap_or_default()
                            .into(),
                        last_block_app_hash: Default::default(),
                    })
                }
                InfoRequest::Query(abci::request::Query { path, .. }) => {
                    let state = store.state.read().await;
                    match crate::handle_query(&state, &path) {
                        Ok(value) => InfoResponse::Query(abci::response::Query {
                            code: Code::Ok,
                            value: value.into(),
                            ..Default::default()
                        }),
                        Err(e) => InfoResponse::Query(abci::response::Query {
                            code: Code::Err(NonZero::new(1).expect("1 != 0")),
                            log: e.to_string(),
                            ..Default::default()
                        }),
                    }
                }
                InfoRequest::Echo(abci::request::Echo { message }) => {
                    InfoResponse::Echo(abci::response::Echo { message })
                }
                InfoRequest::SetOption(_) => InfoResponse::SetOption(abci::response::SetOption {
                    code: Code::Err(NonZero::new(1).expect("1 != 0")),
                    log: "set option is not implemented".to_string(),
                    info: String::new(),
                }),
            })
        })
    }
}

/// State-sync snapshots are not implemented.
#[derive(Clone)]
pub struct Snapshot {}

impl Service<SnapshotRequest> for Snapshot {
    type Response = SnapshotResponse;
    type Error = BoxError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, _req: SnapshotRequest) -> Self::Future {
        Box::pin(async move { Err("snapshots are not implemented".into()) })
    }
}
