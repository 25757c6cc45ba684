//! Server lifecycle: bind, accept loop, stop.
//!
//! The server owns only its listening socket and the task driving it.
//! `start` and `stop` are externally serialized by the owner; everything on
//! the request path is reentrant.

use crate::middleware::dispatch;
use crate::providers::{ChainReader, PeerTable, SubmitProvider, SyncState};
use crate::routes::RpcMode;
use crate::RpcContext;
use anyhow::{bail, Context};
use fp_utils::service::ServiceContext;
use hyper::{server::conn::http1, service::service_fn};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::mem;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Immutable server configuration, fixed for the lifetime of the instance.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: IpAddr,
    pub bind_port: u16,
    /// Value served as `Access-Control-Allow-Origin`. `None` or empty means
    /// the header is omitted entirely.
    pub cors_header: Option<String>,
    /// Donation address advertised by the /fee endpoint.
    pub fee_address: String,
    /// Donation amount advertised by the /fee endpoint, in atomic units.
    pub fee_amount: u64,
    pub mode: RpcMode,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            bind_port: 24888,
            cors_header: None,
            fee_address: String::new(),
            fee_amount: 0,
            mode: RpcMode::Default,
        }
    }
}

/// The host/port pair the server is (or will be) reachable on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub host: String,
    pub port: u16,
}

enum Lifecycle {
    NotStarted,
    Running { ctx: ServiceContext, handle: JoinHandle<()> },
    Stopped,
}

/// The node's HTTP RPC server. One `start`/`stop` cycle per instance;
/// starting a running server or stopping one that never ran is a
/// programming error and fails fast without touching the socket.
pub struct RpcServer {
    context: Arc<RpcContext>,
    lifecycle: Lifecycle,
    connection_info: ConnectionInfo,
}

impl RpcServer {
    pub fn new(
        config: ServerConfig,
        chain: Arc<dyn ChainReader>,
        submit: Arc<dyn SubmitProvider>,
        peers: Arc<dyn PeerTable>,
        sync: Arc<dyn SyncState>,
    ) -> Self {
        let connection_info =
            ConnectionInfo { host: config.bind_address.to_string(), port: config.bind_port };
        Self {
            context: Arc::new(RpcContext::new(config, chain, submit, peers, sync)),
            lifecycle: Lifecycle::NotStarted,
            connection_info,
        }
    }

    /// Binds the configured address and spawns the accept loop. Returns once
    /// the socket is listening, or fails fast if the port is unavailable or
    /// the server is not in its initial state.
    pub async fn start(&mut self) -> anyhow::Result<()> {
        match self.lifecycle {
            Lifecycle::NotStarted => {}
            Lifecycle::Running { .. } => bail!("RPC server is already running"),
            Lifecycle::Stopped => bail!("RPC server has been stopped and cannot be restarted"),
        }

        let addr = SocketAddr::new(self.context.config.bind_address, self.context.config.bind_port);
        let listener = TcpListener::bind(addr).await.with_context(|| format!("Opening RPC socket at {addr}"))?;
        let local_addr = listener.local_addr().context("Reading the bound-to address")?;
        self.connection_info = ConnectionInfo { host: local_addr.ip().to_string(), port: local_addr.port() };

        tracing::info!("RPC endpoint started at {local_addr}");

        let ctx = ServiceContext::new();
        let handle = tokio::spawn(accept_loop(listener, Arc::clone(&self.context), ctx.branch()));
        self.lifecycle = Lifecycle::Running { ctx, handle };
        Ok(())
    }

    /// Signals the accept loop to unwind and joins it. In-flight connections
    /// are abandoned per the transport's shutdown contract. Valid exactly
    /// once, after a successful `start`.
    pub async fn stop(&mut self) -> anyhow::Result<()> {
        match mem::replace(&mut self.lifecycle, Lifecycle::Stopped) {
            Lifecycle::Running { ctx, handle } => {
                ctx.cancel_global();
                handle.await.context("Joining the RPC accept loop")?;
                tracing::info!("RPC endpoint stopped");
                Ok(())
            }
            Lifecycle::NotStarted => {
                self.lifecycle = Lifecycle::NotStarted;
                bail!("RPC server was never started")
            }
            Lifecycle::Stopped => bail!("RPC server is already stopped"),
        }
    }

    /// The bound host/port. Reflects the configured values until `start`
    /// resolves them to the actual socket address (relevant when binding
    /// port 0).
    pub fn connection_info(&self) -> ConnectionInfo {
        self.connection_info.clone()
    }

    pub fn is_running(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Running { .. })
    }
}

async fn accept_loop(listener: TcpListener, context: Arc<RpcContext>, ctx: ServiceContext) {
    while let Some(res) = ctx.run_until_cancelled(listener.accept()).await {
        let (stream, _) = match res {
            Ok(conn) => conn,
            Err(e) => {
                tracing::debug!(target: "rpc_calls", "Failed to accept connection: {e:#}");
                continue;
            }
        };
        let io = TokioIo::new(stream);
        let context = Arc::clone(&context);

        tokio::task::spawn(async move {
            let service = service_fn(move |req| {
                let context = Arc::clone(&context);
                async move { Ok::<_, Infallible>(dispatch(req, context).await) }
            });

            // A client hanging up mid-response lands here; it is that
            // request's problem alone, never the process's.
            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                tracing::debug!(target: "rpc_calls", "Error serving connection: {err:#}");
            }
        });
    }
}
