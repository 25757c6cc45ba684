//! The ferrite node's HTTP RPC server.
//!
//! This crate is the request-serving façade over the node: a plain-path
//! HTTP/JSON surface exposing chain state, the transaction pool, mining
//! primitives and the wallet synchronization feed to external clients.
//!
//! The moving parts are deliberately few. A static route table describes
//! every endpoint together with its access requirements; the dispatcher
//! walks each request through the same ordered pipeline (CORS preflight,
//! route resolution, permission check, sync gate, body parsing) before the
//! handler runs; handlers read the node through the narrow provider traits
//! and serialize `fp-wire` shapes straight into the response body. Failures
//! of any kind funnel through the error taxonomy into a
//! `{errorCode, errorMessage}` envelope.
//!
//! The server itself owns nothing but the listening socket and its
//! lifecycle; chain state, the peer table and sync status are external
//! collaborators injected as `Arc<dyn _>`.

mod error;
mod handlers;
mod helpers;
mod middleware;
mod routes;

pub mod providers;
pub mod service;

#[cfg(test)]
mod test_utils;
#[cfg(test)]
mod tests;

pub use error::{ErrorCode, OptionExt, ResultExt, RpcError};
pub use routes::RpcMode;
pub use service::{ConnectionInfo, RpcServer, ServerConfig};

use providers::{ChainReader, PeerTable, SubmitProvider, SyncState};
use std::sync::Arc;

/// Version string reported by the /info endpoint.
pub const NODE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Everything a request handler can reach: the immutable server
/// configuration plus the injected collaborators. One instance is shared by
/// every in-flight request.
pub struct RpcContext {
    pub config: ServerConfig,
    pub chain: Arc<dyn ChainReader>,
    pub submit: Arc<dyn SubmitProvider>,
    pub peers: Arc<dyn PeerTable>,
    pub sync: Arc<dyn SyncState>,
}

impl RpcContext {
    pub fn new(
        config: ServerConfig,
        chain: Arc<dyn ChainReader>,
        submit: Arc<dyn SubmitProvider>,
        peers: Arc<dyn PeerTable>,
        sync: Arc<dyn SyncState>,
    ) -> Self {
        Self { config, chain, submit, peers, sync }
    }
}
