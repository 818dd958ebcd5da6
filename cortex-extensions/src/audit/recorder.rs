//! Audit backends
//!
//! A [`Recorder`] receives every [`AuditEvent`] the audit hook builds. The
//! hook logs recorder failures and carries on, so a recorder never affects
//! the orchestration loop beyond the time it takes.

use async_trait::async_trait;
use cortex_core::context::HookContext;
use cortex_core::error::{Error, Result};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::info;

use super::event::AuditEvent;

/// Destination for audit events
#[async_trait]
pub trait Recorder: Send + Sync {
    /// Persist or forward one event
    async fn record(&self, ctx: &HookContext, event: &AuditEvent) -> Result<()>;
}

/// Adapter turning a closure into a [`Recorder`]
pub struct RecorderFn<F>(pub F);

#[async_trait]
impl<F> Recorder for RecorderFn<F>
where
    F: Fn(&HookContext, &AuditEvent) -> Result<()> + Send + Sync,
{
    async fn record(&self, ctx: &HookContext, event: &AuditEvent) -> Result<()> {
        (self.0)(ctx, event)
    }
}

/// Writes each event as an `info` record on the `cortex::audit` target
#[derive(Debug, Default, Clone, Copy)]
pub struct LogRecorder;

#[async_trait]
impl Recorder for LogRecorder {
    async fn record(&self, _ctx: &HookContext, event: &AuditEvent) -> Result<()> {
        let metadata = serde_json::to_string(&event.metadata)?;
        info!(
            target: "cortex::audit",
            action = %event.action,
            resource = %event.resource,
            category = %event.category,
            resource_id = %event.resource_id,
            outcome = ?event.outcome,
            severity = ?event.severity,
            reason = event.reason.as_deref().unwrap_or(""),
            metadata = %metadata,
            "audit event"
        );
        Ok(())
    }
}

/// Keeps events in memory; useful in tests and for short-lived inspection
#[derive(Debug, Default)]
pub struct MemoryRecorder {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryRecorder {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every recorded event, oldest first
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().clone()
    }

    /// Actions of every recorded event, oldest first
    pub fn actions(&self) -> Vec<String> {
        self.events.lock().iter().map(|e| e.action.clone()).collect()
    }

    /// Number of recorded events
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Drop every recorded event
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

#[async_trait]
impl Recorder for MemoryRecorder {
    async fn record(&self, _ctx: &HookContext, event: &AuditEvent) -> Result<()> {
        self.events.lock().push(event.clone());
        Ok(())
    }
}

/// Forwards events over a bounded channel to a consumer task.
///
/// Never waits: a full channel is reported as a recorder error.
#[derive(Debug, Clone)]
pub struct ChannelRecorder {
    tx: mpsc::Sender<AuditEvent>,
}

impl ChannelRecorder {
    /// Create a recorder and the receiving end of its channel
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<AuditEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

#[async_trait]
impl Recorder for ChannelRecorder {
    async fn record(&self, _ctx: &HookContext, event: &AuditEvent) -> Result<()> {
        self.tx.try_send(event.clone()).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => Error::recorder("audit channel full"),
            mpsc::error::TrySendError::Closed(_) => Error::recorder("audit channel closed"),
        })
    }
}

#[cfg(feature = "http")]
pub use http::{HttpConfig, HttpRecorder};

#[cfg(feature = "http")]
mod http {
    use super::*;
    use std::time::Duration;

    /// HTTP client configuration
    #[derive(Debug, Clone)]
    pub struct HttpConfig {
        /// Request timeout in seconds
        pub timeout_secs: u64,
        /// Connection pool idle timeout
        pub pool_idle_timeout_secs: u64,
        /// Max idle connections per host
        pub pool_max_idle_per_host: usize,
    }

    impl Default for HttpConfig {
        fn default() -> Self {
            Self {
                timeout_secs: 10,
                pool_idle_timeout_secs: 90,
                pool_max_idle_per_host: 8,
            }
        }
    }

    impl HttpConfig {
        /// Build a reqwest client
        pub fn build_client(&self) -> Result<reqwest::Client> {
            reqwest::Client::builder()
                .timeout(Duration::from_secs(self.timeout_secs))
                .pool_idle_timeout(Duration::from_secs(self.pool_idle_timeout_secs))
                .pool_max_idle_per_host(self.pool_max_idle_per_host)
                .build()
                .map_err(|e| Error::Internal(e.to_string()))
        }
    }

    /// POSTs each event as JSON to an audit collector
    #[derive(Debug, Clone)]
    pub struct HttpRecorder {
        client: reqwest::Client,
        endpoint: String,
        bearer_token: Option<String>,
    }

    impl HttpRecorder {
        /// Create a recorder posting to `endpoint`
        pub fn new(endpoint: impl Into<String>) -> Result<Self> {
            Self::with_config(endpoint, &HttpConfig::default())
        }

        /// Create a recorder with custom HTTP settings
        pub fn with_config(endpoint: impl Into<String>, config: &HttpConfig) -> Result<Self> {
            Ok(Self {
                client: config.build_client()?,
                endpoint: endpoint.into(),
                bearer_token: None,
            })
        }

        /// Send `Authorization: Bearer <token>` with every request
        pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
            self.bearer_token = Some(token.into());
            self
        }
    }

    #[async_trait]
    impl Recorder for HttpRecorder {
        async fn record(&self, _ctx: &HookContext, event: &AuditEvent) -> Result<()> {
            let mut request = self.client.post(&self.endpoint).json(event);
            if let Some(token) = &self.bearer_token {
                request = request.bearer_auth(token);
            }

            let response = request
                .send()
                .await
                .map_err(|e| Error::recorder(format!("audit POST failed: {}", e)))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(Error::recorder(format!(
                    "audit collector returned {}: {}",
                    status, body
                )));
            }
            Ok(())
        }
    }
}
