use crate::helpers::create_json_response;
use crate::providers::{CoreError, SubmitError};
use hyper::{Response, StatusCode};
use serde::Serialize;
use std::fmt;

/// Everything a request can fail with. Handlers return these; the
/// dispatcher is the single place they become wire responses.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// No matching route, or a queried entity does not exist.
    #[error("{0}")]
    NotFound(String),
    /// The route requires a higher RPC mode than the server is running in.
    #[error("Method is disabled under the current RPC mode")]
    MethodDisabled,
    /// The route requires a synchronized node and this one is still
    /// catching up. Clients should retry later.
    #[error("Node is still synchronizing with the network, try again later")]
    NotSynchronized,
    /// A required request body was absent or not valid JSON.
    #[error("Missing or malformed request body: {0}")]
    InvalidBody(String),
    /// The body parsed but its values do not make sense.
    #[error("{0}")]
    InvalidParams(String),
    /// A collaborator failed unexpectedly. The detail is logged, not
    /// served.
    #[error("Internal server error")]
    Internal(String),
}

/// Stable wire codes for the `errorCode` envelope field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    NotFound = 10,
    MethodDisabled = 11,
    NotSynchronized = 12,
    InvalidBody = 13,
    InvalidParams = 14,
    Internal = 15,
}

impl RpcError {
    pub fn route_not_found() -> Self {
        Self::NotFound("Route not found".to_string())
    }

    pub fn block_not_found() -> Self {
        Self::NotFound("Block not found".to_string())
    }

    pub fn transaction_not_found() -> Self {
        Self::NotFound("Transaction not found".to_string())
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams(message.into())
    }

    pub fn invalid_body(e: impl fmt::Display) -> Self {
        Self::InvalidBody(e.to_string())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            RpcError::NotFound(_) => ErrorCode::NotFound,
            RpcError::MethodDisabled => ErrorCode::MethodDisabled,
            RpcError::NotSynchronized => ErrorCode::NotSynchronized,
            RpcError::InvalidBody(_) => ErrorCode::InvalidBody,
            RpcError::InvalidParams(_) => ErrorCode::InvalidParams,
            RpcError::Internal(_) => ErrorCode::Internal,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            RpcError::NotFound(_) => StatusCode::NOT_FOUND,
            RpcError::MethodDisabled => StatusCode::FORBIDDEN,
            // Distinct from plain client errors so well-behaved clients
            // retry instead of giving up.
            RpcError::NotSynchronized => StatusCode::LOCKED,
            RpcError::InvalidBody(_) | RpcError::InvalidParams(_) => StatusCode::BAD_REQUEST,
            RpcError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error_code: i32,
    error_message: String,
}

impl From<RpcError> for Response<String> {
    fn from(e: RpcError) -> Response<String> {
        if let RpcError::Internal(detail) = &e {
            tracing::error!(target: "rpc_errors", "Internal server error: {detail}");
        }
        let body = ErrorBody { error_code: e.code() as i32, error_message: e.to_string() };
        create_json_response(e.status(), &body)
    }
}

impl From<CoreError> for RpcError {
    fn from(e: CoreError) -> Self {
        tracing::error!(target: "rpc_errors", "Chain core error: {e:#}");
        Self::Internal(e.to_string())
    }
}

impl From<SubmitError> for RpcError {
    fn from(e: SubmitError) -> Self {
        match e {
            SubmitError::Rejected { reason } => Self::InvalidParams(reason),
            SubmitError::Internal(error) => {
                tracing::error!(target: "rpc_errors", "Submission failed: {error:#}");
                Self::Internal(format!("{error:#}"))
            }
        }
    }
}

pub trait ResultExt<T, E> {
    fn or_internal_error<C: fmt::Display>(self, context: C) -> Result<T, RpcError>;
}

impl<T, E: fmt::Display> ResultExt<T, E> for Result<T, E> {
    fn or_internal_error<C: fmt::Display>(self, context: C) -> Result<T, RpcError> {
        match self {
            Ok(val) => Ok(val),
            Err(err) => {
                tracing::error!(target: "rpc_errors", "{context}: {err:#}");
                Err(RpcError::Internal(err.to_string()))
            }
        }
    }
}

pub trait OptionExt<T> {
    fn ok_or_internal_error<C: fmt::Display>(self, context: C) -> Result<T, RpcError>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_internal_error<C: fmt::Display>(self, context: C) -> Result<T, RpcError> {
        match self {
            Some(val) => Ok(val),
            None => {
                tracing::error!(target: "rpc_errors", "{context}");
                Err(RpcError::Internal(context.to_string()))
            }
        }
    }
}
