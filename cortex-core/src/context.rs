//! Execution context handed to every lifecycle hook
//!
//! The context travels with the orchestration loop. It carries a
//! cancellation token and the optional tenant scope of the run that produced
//! the event. Hooks may observe cancellation; the registry never triggers it.

use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// Cancellation-bearing context passed to lifecycle hooks
#[derive(Debug, Clone, Default)]
pub struct HookContext {
    token: CancellationToken,
    tenant_id: Option<String>,
    app_id: Option<String>,
}

impl HookContext {
    /// Create a fresh, uncancelled context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context driven by an existing cancellation token
    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            token,
            ..Self::default()
        }
    }

    /// Scope the context to a tenant
    pub fn tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    /// Scope the context to an application
    pub fn app(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = Some(app_id.into());
        self
    }

    /// Derive a context that is cancelled with this one but can also be
    /// cancelled on its own
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            tenant_id: self.tenant_id.clone(),
            app_id: self.app_id.clone(),
        }
    }

    /// Tenant scope, if any
    pub fn tenant_id(&self) -> Option<&str> {
        self.tenant_id.as_deref()
    }

    /// Application scope, if any
    pub fn app_id(&self) -> Option<&str> {
        self.app_id.as_deref()
    }

    /// The underlying cancellation token
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Whether the caller has given up on this context
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the context is cancelled
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    /// Cancel this context and every child derived from it
    pub fn cancel(&self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_follows_parent_cancellation() {
        let parent = HookContext::new().tenant("acme");
        let child = parent.child();
        assert_eq!(child.tenant_id(), Some("acme"));

        parent.cancel();
        assert!(child.is_cancelled());
    }

    #[test]
    fn test_child_cancel_does_not_reach_parent() {
        let parent = HookContext::new();
        let child = parent.child();

        child.cancel();
        assert!(child.is_cancelled());
        assert!(!parent.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_future_resolves() {
        let ctx = HookContext::new().app("billing");
        let waiter = ctx.clone();
        let handle = tokio::spawn(async move { waiter.cancelled().await });

        ctx.cancel();
        handle.await.unwrap();
        assert_eq!(ctx.app_id(), Some("billing"));
    }
}
