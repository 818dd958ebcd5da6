use async_trait::async_trait;
use cortex_core::prelude::*;
use parking_lot::Mutex;
use std::io;
use std::sync::Arc;

/// Writer that appends formatted log lines to a shared buffer
#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Capture {
    fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock())
            .lines()
            .map(str::to_string)
            .collect()
    }
}

struct BrokenSink;

#[async_trait]
impl ToolFailed for BrokenSink {
    async fn on_tool_failed(
        &self,
        _ctx: &HookContext,
        _run_id: RunId,
        _tool_name: &str,
        _error: &DynError,
    ) -> Result<()> {
        Err(Error::recorder("disk full"))
    }
}

#[async_trait]
impl CheckpointResolved for BrokenSink {
    async fn on_checkpoint_resolved(
        &self,
        _ctx: &HookContext,
        _checkpoint_id: CheckpointId,
        _decision: &str,
    ) -> Result<()> {
        panic!("resolver exploded");
    }
}

impl Extension for BrokenSink {
    fn name(&self) -> &str {
        "broken-sink"
    }

    fn as_tool_failed(self: Arc<Self>) -> Option<Arc<dyn ToolFailed>> {
        Some(self)
    }

    fn as_checkpoint_resolved(self: Arc<Self>) -> Option<Arc<dyn CheckpointResolved>> {
        Some(self)
    }
}

fn capture_subscriber(capture: &Capture) -> impl tracing::Subscriber + Send + Sync {
    let writer = capture.clone();
    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(move || writer.clone())
        .finish()
}

#[tokio::test]
async fn test_hook_error_produces_one_warning() {
    let capture = Capture::default();
    let _guard = tracing::subscriber::set_default(capture_subscriber(&capture));

    let registry = Registry::builder()
        .with_extension(Arc::new(BrokenSink))
        .build();

    let tool_error = io::Error::new(io::ErrorKind::TimedOut, "upstream timed out");
    registry
        .emit_tool_failed(&HookContext::new(), RunId::new(), "fetch", &tool_error)
        .await;

    let lines = capture.lines();
    assert_eq!(lines.len(), 1, "{lines:?}");
    let line = &lines[0];
    assert!(line.contains("WARN"));
    assert!(line.contains("extension hook error"));
    assert!(line.contains("hook=on_tool_failed"));
    assert!(line.contains("extension=broken-sink"));
    assert!(line.contains("error=Recorder error: disk full"));
}

#[tokio::test]
async fn test_hook_panic_produces_one_error() {
    let capture = Capture::default();
    let _guard = tracing::subscriber::set_default(capture_subscriber(&capture));

    let registry = Registry::builder()
        .with_extension(Arc::new(BrokenSink))
        .build();

    registry
        .emit_checkpoint_resolved(&HookContext::new(), CheckpointId::new(), "approved")
        .await;

    let lines = capture.lines();
    assert_eq!(lines.len(), 1, "{lines:?}");
    assert!(lines[0].contains("ERROR"));
    assert!(lines[0].contains("extension hook panicked"));
    assert!(lines[0].contains("hook=on_checkpoint_resolved"));
    assert!(lines[0].contains("error=resolver exploded"));
}

#[tokio::test]
async fn test_successful_emit_is_silent() {
    let capture = Capture::default();
    let _guard = tracing::subscriber::set_default(capture_subscriber(&capture));

    let registry = Registry::builder()
        .with_extension(Arc::new(BrokenSink))
        .build();

    // BrokenSink does not subscribe to run_started
    registry
        .emit_run_started(&HookContext::new(), AgentId::new(), RunId::new(), "hello")
        .await;

    assert!(capture.lines().is_empty());
}
