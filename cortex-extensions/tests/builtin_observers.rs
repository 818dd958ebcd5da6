use cortex_core::config::CortexConfig;
use cortex_core::prelude::*;
use cortex_extensions::audit::{AuditEvent, AuditHook, MemoryRecorder, RecorderFn};
use cortex_extensions::metrics::{InMemoryMetrics, MetricsExtension};
use cortex_extensions::Builtins;
use std::sync::Arc;
use std::time::Duration;

/// Drive one agent run with a tool call and a phase change through `registry`
async fn drive_run(registry: &Registry) {
    let ctx = HookContext::new();
    let agent = AgentId::new();
    let run = RunId::new();

    registry.emit_run_started(&ctx, agent, run, "summarize").await;
    registry.emit_step_started(&ctx, run, 0).await;
    registry
        .emit_cognitive_phase_changed(&ctx, run, "plan", "act")
        .await;
    registry
        .emit_tool_called(&ctx, run, "search", &serde_json::json!({"q": "rust"}))
        .await;
    let err = std::io::Error::other("timeout");
    registry.emit_tool_failed(&ctx, run, "search", &err).await;
    registry
        .emit_run_completed(&ctx, agent, run, "done", Duration::from_millis(42))
        .await;
}

#[tokio::test]
async fn test_audit_and_metrics_both_see_their_events() {
    let recorder = Arc::new(MemoryRecorder::new());
    let metrics = InMemoryMetrics::new();

    let registry = Registry::builder()
        .with_extension(Arc::new(AuditHook::new(recorder.clone())))
        .with_extension(Arc::new(MetricsExtension::new(&metrics)))
        .build();

    drive_run(&registry).await;

    // step_started and cognitive_phase_changed are not audited
    assert_eq!(
        recorder.actions(),
        vec![
            "cortex.agent.run.started",
            "cortex.tool.called",
            "cortex.tool.failed",
            "cortex.agent.run.completed",
        ]
    );

    let completed = &recorder.events()[3];
    assert_eq!(completed.meta("elapsed_ms"), Some(&serde_json::json!(42)));

    assert_eq!(metrics.get("cortex.agent.run.started"), 1);
    assert_eq!(metrics.get("cortex.cognitive.phase_changed"), 1);
    assert_eq!(metrics.get("cortex.tool.called"), 1);
    assert_eq!(metrics.get("cortex.tool.failed"), 1);
    assert_eq!(metrics.get("cortex.agent.run.completed"), 1);
    assert_eq!(metrics.get("cortex.agent.run.failed"), 0);
}

#[tokio::test]
async fn test_broken_audit_backend_does_not_affect_metrics() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let broken = RecorderFn(|_ctx: &HookContext, _evt: &AuditEvent| -> Result<()> {
        Err(Error::recorder("collector unreachable"))
    });
    let metrics = InMemoryMetrics::new();

    let registry = Registry::builder()
        .with_extension(Arc::new(AuditHook::new(Arc::new(broken))))
        .with_extension(Arc::new(MetricsExtension::new(&metrics)))
        .build();

    drive_run(&registry).await;

    assert_eq!(metrics.get("cortex.agent.run.started"), 1);
    assert_eq!(metrics.get("cortex.agent.run.completed"), 1);
}

#[tokio::test]
async fn test_engine_from_yaml_config() -> anyhow::Result<()> {
    let yaml = r#"
extensions:
  cortex:
    shutdown_timeout_secs: 5
    extensions:
      audit:
        enabled: true
        actions:
          - cortex.tool.failed
      metrics:
        enabled: true
      log:
        enabled: true
"#;
    let config = CortexConfig::from_yaml_str(yaml, true)?;
    let recorder = Arc::new(MemoryRecorder::new());
    let metrics = Arc::new(InMemoryMetrics::new());

    let builtins = Builtins::new(&config.extensions)
        .recorder(recorder.clone())
        .metrics(metrics.clone())
        .build();

    let engine = Engine::builder()
        .config(config.clone())
        .extensions(builtins)
        .build()?;

    let ctx = HookContext::new();
    engine.start(&ctx).await?;

    let registry = engine.extensions();
    assert_eq!(
        registry.subscribers(HookKind::ToolFailed),
        vec!["audit-hook", "observability-metrics", "log"]
    );
    assert_eq!(registry.subscribers(HookKind::Shutdown), vec!["log"]);

    drive_run(&registry).await;
    engine.stop(&ctx).await?;

    assert_eq!(recorder.actions(), vec!["cortex.tool.failed"]);
    assert_eq!(metrics.get("cortex.tool.called"), 1);
    assert!(!ctx.is_cancelled());
    Ok(())
}
