use crate::error::RpcError;
use http_body_util::BodyExt;
use hyper::{header, Request, Response, StatusCode};
use serde::Serialize;
use std::fmt;

/// Last-resort plain response for when even building an error body fails.
pub(crate) fn internal_error_response() -> Response<String> {
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .body("Internal Server Error".to_string())
        .expect("Failed to build INTERNAL_SERVER_ERROR response with a valid status and body")
}

/// Creates a JSON response with the given status code and a body that can be
/// serialized to JSON.
///
/// If the serialization fails, this function returns a 500 Internal Server
/// Error response.
pub(crate) fn create_json_response<T>(status: StatusCode, body: &T) -> Response<String>
where
    T: Serialize,
{
    let body = match serde_json::to_string(body) {
        Ok(body) => body,
        Err(e) => {
            tracing::error!(target: "rpc_errors", "Failed to serialize response body: {e}");
            return internal_error_response();
        }
    };

    match Response::builder().status(status).header(header::CONTENT_TYPE, "application/json").body(body) {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(target: "rpc_errors", "Failed to build response: {e}");
            internal_error_response()
        }
    }
}

/// CORS preflight reply. Allowed methods and headers are static; the origin
/// header itself is added by [`apply_cors`] like on every other response.
pub(crate) fn options_response() -> Response<String> {
    match Response::builder()
        .status(StatusCode::OK)
        .header(header::ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, OPTIONS")
        .header(header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type, Accept")
        .header(header::ALLOW, "GET, POST, OPTIONS")
        .body(String::new())
    {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(target: "rpc_errors", "Failed to build OPTIONS response: {e}");
            internal_error_response()
        }
    }
}

/// Adds the configured `Access-Control-Allow-Origin` value to a response.
/// Applied uniformly, success and error paths alike; an unconfigured or
/// empty value means the header is omitted.
pub(crate) fn apply_cors(response: &mut Response<String>, cors_header: Option<&str>) {
    let Some(origin) = cors_header.filter(|v| !v.is_empty()) else {
        return;
    };
    match header::HeaderValue::from_str(origin) {
        Ok(value) => {
            response.headers_mut().insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
        }
        Err(e) => {
            tracing::warn!(target: "rpc_errors", "Configured CORS header is not a valid header value: {e}");
        }
    }
}

/// Collects and parses a required JSON request body. An empty or unreadable
/// body, or one that is not valid JSON, short-circuits the request.
pub(crate) async fn read_json_body<B>(req: Request<B>) -> Result<serde_json::Value, RpcError>
where
    B: hyper::body::Body,
    B::Error: fmt::Display,
{
    let bytes = match req.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => return Err(RpcError::invalid_body(format!("failed to read request body: {e}"))),
    };
    if bytes.is_empty() {
        return Err(RpcError::invalid_body("body is required for this method"));
    }
    serde_json::from_slice(&bytes).map_err(RpcError::invalid_body)
}
