use crate::error::RpcError;
use crate::handlers;
use crate::RpcContext;
use fp_types::Hash;
use futures::future::{BoxFuture, FutureExt};
use hyper::{Method, Response};
use std::sync::Arc;

/// Which RPC methods a server instance exposes. Modes are ordered: a route
/// is callable iff the server's configured mode is at least the route's
/// requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum RpcMode {
    #[default]
    Default = 0,
    BlockExplorerEnabled = 1,
    AllMethodsEnabled = 2,
}

/// The parsed variable segment of a matched path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PathParam {
    Hash(Hash),
    Height(u64),
}

impl PathParam {
    pub(crate) fn hash(&self) -> Hash {
        match self {
            PathParam::Hash(hash) => *hash,
            PathParam::Height(_) => unreachable!("route pattern guarantees a hash segment"),
        }
    }

    pub(crate) fn height(&self) -> u64 {
        match self {
            PathParam::Height(height) => *height,
            PathParam::Hash(_) => unreachable!("route pattern guarantees a height segment"),
        }
    }
}

/// Path shape of a route: either a fixed path, or a fixed prefix followed by
/// exactly one variable segment.
#[derive(Debug, Clone, Copy)]
pub(crate) enum PathPattern {
    Exact(&'static str),
    /// Prefix followed by a 64 character case-insensitive hex hash. A
    /// malformed or wrong-length segment does not match the route at all;
    /// routing and parameter validation are distinct failure layers.
    HashParam(&'static str),
    /// Prefix followed by a decimal height.
    HeightParam(&'static str),
}

impl PathPattern {
    /// `Some(param)` when `path` matches this pattern. `matched(None)` is
    /// expressed as the outer `Option` in [`find_route`].
    pub(crate) fn capture(&self, path: &str) -> Option<Option<PathParam>> {
        match self {
            PathPattern::Exact(expected) => (path == *expected).then_some(None),
            PathPattern::HashParam(prefix) => {
                let rest = path.strip_prefix(prefix)?;
                let hash: Hash = rest.parse().ok()?;
                Some(Some(PathParam::Hash(hash)))
            }
            PathPattern::HeightParam(prefix) => {
                let rest = path.strip_prefix(prefix)?;
                if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                let height = rest.parse().ok()?;
                Some(Some(PathParam::Height(height)))
            }
        }
    }
}

/// What the dispatcher hands a handler: the parsed path capture and the
/// parsed request body (`Null` for routes that take none).
pub(crate) struct RouteRequest {
    pub param: Option<PathParam>,
    pub body: serde_json::Value,
}

impl RouteRequest {
    /// The capture is guaranteed by the matched pattern; this is the typed
    /// accessor handlers use.
    pub(crate) fn param(&self) -> &PathParam {
        self.param.as_ref().expect("handler registered on a parameterized route")
    }
}

pub(crate) type HandlerFuture = BoxFuture<'static, Result<Response<String>, RpcError>>;
pub(crate) type Handler = fn(Arc<RpcContext>, RouteRequest) -> HandlerFuture;

/// One endpoint: its shape, its access requirements, and its handler. The
/// table below is the single source of truth the dispatcher consults; the
/// gating metadata lives here, next to the handler, instead of being
/// re-checked ad hoc per endpoint.
#[derive(Debug)]
pub(crate) struct RouteSpec {
    pub method: Method,
    pub pattern: PathPattern,
    pub required_mode: RpcMode,
    pub sync_required: bool,
    pub body_required: bool,
    pub handler: Handler,
}

macro_rules! route {
    ($method:ident $pattern:expr, $mode:ident, sync: $sync:literal, body: $body:literal, $handler:path) => {
        RouteSpec {
            method: Method::$method,
            pattern: $pattern,
            required_mode: RpcMode::$mode,
            sync_required: $sync,
            body_required: $body,
            handler: |ctx, req| $handler(ctx, req).boxed(),
        }
    };
}

use PathPattern::{Exact, HashParam, HeightParam};

pub(crate) static ROUTES: &[RouteSpec] = &[
    route!(GET Exact("/info"), Default, sync: false, body: false, handlers::handle_info),
    route!(GET Exact("/height"), Default, sync: false, body: false, handlers::handle_height),
    route!(GET Exact("/fee"), Default, sync: false, body: false, handlers::handle_fee),
    route!(GET Exact("/peers"), Default, sync: false, body: false, handlers::handle_peers),
    route!(GET Exact("/block/count"), Default, sync: true, body: false, handlers::handle_block_count),
    route!(GET HeightParam("/block/hash/"), Default, sync: true, body: false, handlers::handle_block_hash_for_height),
    route!(GET Exact("/block/header/top"), Default, sync: true, body: false, handlers::handle_top_block_header),
    route!(GET HashParam("/block/header/hash/"), BlockExplorerEnabled, sync: true, body: false, handlers::handle_block_header_by_hash),
    route!(GET HeightParam("/block/header/height/"), BlockExplorerEnabled, sync: true, body: false, handlers::handle_block_header_by_height),
    route!(GET HeightParam("/blocks/"), BlockExplorerEnabled, sync: true, body: false, handlers::handle_blocks_by_height),
    route!(GET HashParam("/transaction/details/"), BlockExplorerEnabled, sync: true, body: false, handlers::handle_transaction_details),
    route!(GET Exact("/transactions/pool"), BlockExplorerEnabled, sync: true, body: false, handlers::handle_transactions_in_pool),
    route!(GET Exact("/transactions/pool/raw"), BlockExplorerEnabled, sync: true, body: false, handlers::handle_raw_transactions_in_pool),
    route!(GET HashParam("/block/raw/hash/"), BlockExplorerEnabled, sync: true, body: false, handlers::handle_raw_block_by_hash),
    route!(GET HeightParam("/block/raw/height/"), BlockExplorerEnabled, sync: true, body: false, handlers::handle_raw_block_by_height),
    route!(GET HashParam("/transaction/raw/"), BlockExplorerEnabled, sync: true, body: false, handlers::handle_raw_transaction_by_hash),
    route!(POST Exact("/transaction"), Default, sync: true, body: true, handlers::handle_send_transaction),
    route!(POST Exact("/randomoutputs"), Default, sync: true, body: true, handlers::handle_random_outputs),
    route!(POST Exact("/indexes"), Default, sync: true, body: true, handlers::handle_global_indexes),
    route!(POST Exact("/transactions/status"), Default, sync: true, body: true, handlers::handle_transactions_status),
    route!(POST Exact("/pool/changes"), Default, sync: true, body: true, handlers::handle_pool_changes),
    route!(POST Exact("/blocks/raw"), Default, sync: true, body: true, handlers::handle_raw_blocks),
    route!(POST Exact("/sync"), Default, sync: true, body: true, handlers::handle_wallet_sync_data),
    route!(POST Exact("/block/template"), AllMethodsEnabled, sync: true, body: true, handlers::handle_block_template),
    route!(POST Exact("/block/submit"), AllMethodsEnabled, sync: true, body: true, handlers::handle_submit_block),
];

/// Resolves a request to the unique matching route, if any. Patterns in the
/// table are mutually exclusive per method, so first match is the match.
pub(crate) fn find_route(method: &Method, path: &str) -> Option<(&'static RouteSpec, Option<PathParam>)> {
    ROUTES
        .iter()
        .filter(|route| route.method == *method)
        .find_map(|route| route.pattern.capture(path).map(|param| (route, param)))
}
