//! Cancellation context shared between a service and the tasks it spawns.

use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Cancellation scope handed to every long-running task a service spawns.
///
/// A context carries a global token, shared by every context cloned or
/// branched from the same root, plus an optional local token created by
/// [`ServiceContext::child`]. Cancelling the global token stops everything;
/// cancelling a local token stops only the tasks running under that branch.
#[derive(Debug, Clone, Default)]
pub struct ServiceContext {
    token_global: CancellationToken,
    token_local: Option<CancellationToken>,
}

impl ServiceContext {
    pub fn new() -> Self {
        Self { token_global: CancellationToken::new(), token_local: None }
    }

    /// Stops every task under the same global scope.
    pub fn cancel_global(&self) {
        self.token_global.cancel();
    }

    /// Stops every task under the same local scope, or the global scope if
    /// this context was never branched.
    pub fn cancel_local(&self) {
        self.token_local.as_ref().unwrap_or(&self.token_global).cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token_global.is_cancelled() || self.token_local.as_ref().is_some_and(|t| t.is_cancelled())
    }

    pub async fn cancelled(&self) {
        match &self.token_local {
            Some(token_local) => {
                tokio::select! {
                    _ = self.token_global.cancelled() => {},
                    _ = token_local.cancelled() => {},
                }
            }
            None => self.token_global.cancelled().await,
        }
    }

    /// Runs `f` to completion unless this context is cancelled first.
    /// Returns `None` when cancellation won.
    pub async fn run_until_cancelled<T, F>(&self, f: F) -> Option<T>
    where
        F: Future<Output = T>,
    {
        tokio::select! {
            _ = self.cancelled() => None,
            res = f => Some(res),
        }
    }

    /// Copies the context, keeping its scope.
    pub fn branch(&self) -> Self {
        self.clone()
    }

    /// Copies the context into a new local scope, cancellable on its own
    /// without affecting the parent.
    pub fn child(&self) -> Self {
        let token_local = self.token_local.as_ref().unwrap_or(&self.token_global).child_token();
        Self { token_global: self.token_global.clone(), token_local: Some(token_local) }
    }
}
