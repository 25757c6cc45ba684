//! The request pipeline every inbound call walks through, in a fixed order:
//! CORS preflight, route resolution, permission check, sync-readiness
//! check, body acquisition, handler invocation, error mapping. The CORS
//! origin header is applied to every response on the way out.

use crate::error::RpcError;
use crate::helpers::{apply_cors, options_response, read_json_body};
use crate::routes::{find_route, RouteRequest};
use crate::RpcContext;
use hyper::{Method, Request, Response};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Serves one request. Infallible by construction: every failure path,
/// handler-reported or pipeline-detected, is folded into a mapped JSON
/// error response here and nowhere else.
pub(crate) async fn dispatch<B>(req: Request<B>, context: Arc<RpcContext>) -> Response<String>
where
    B: hyper::body::Body,
    B::Error: fmt::Display,
{
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let mut response = run_pipeline(req, &context).await.unwrap_or_else(Into::into);
    apply_cors(&mut response, context.config.cors_header.as_deref());

    let status = response.status().as_u16();
    let response_len = response.body().len();
    let elapsed = started.elapsed().as_micros();
    tracing::debug!(
        target: "rpc_calls",
        method = %method,
        path = %path,
        status = status,
        response_len = response_len,
        elapsed_micros = %elapsed,
        "{method} {path} {status} {response_len} - {elapsed} micros"
    );

    response
}

async fn run_pipeline<B>(req: Request<B>, context: &Arc<RpcContext>) -> Result<Response<String>, RpcError>
where
    B: hyper::body::Body,
    B::Error: fmt::Display,
{
    // Preflight requests skip routing and gating entirely.
    if req.method() == Method::OPTIONS {
        return Ok(options_response());
    }

    let (route, param) =
        find_route(req.method(), req.uri().path()).ok_or_else(RpcError::route_not_found)?;

    if route.required_mode > context.config.mode {
        return Err(RpcError::MethodDisabled);
    }

    // Gated before the body is even read: a node that is catching up
    // answers retryably without doing any per-request work.
    if route.sync_required && !context.sync.is_synchronized() {
        return Err(RpcError::NotSynchronized);
    }

    let body = if route.body_required { read_json_body(req).await? } else { serde_json::Value::Null };

    (route.handler)(Arc::clone(context), RouteRequest { param, body }).await
}
