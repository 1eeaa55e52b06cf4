//! Streaming adapter behavior seen from a subscriber.

use async_trait::async_trait;
use futures::future::join_all;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use strand::{
    Engine, FailureKind, ModelCollaborator, ModelError, RunConfig, RunEvent, RunState,
    ThinkDecision, ThinkRequest,
};
use strand_testing::{EventAssertions, MockTool, RunAssertions, ScriptedModel, collect_events};

async fn engine(config: RunConfig, model: ScriptedModel) -> Engine {
    Engine::builder()
        .config(config)
        .model(Arc::new(model))
        .tool(Arc::new(MockTool::new("noop").with_default_response("ok")))
        .build()
        .await
        .unwrap()
}

fn script() -> ScriptedModel {
    ScriptedModel::new()
        .then_call("noop", json!({}))
        .then_finish("all good now")
}

#[tokio::test]
async fn partials_precede_exactly_one_completed_event() {
    let engine = engine(RunConfig::default(), script()).await;

    let events = collect_events(engine.stream("do it").unwrap()).await;

    assert_eq!(events.partial_text(), "all good now");
    assert_eq!(
        events.assert_single_terminal(),
        &RunEvent::Completed("Step 1: noop: ok\nStep 2: no further action needed".into())
    );
}

#[tokio::test]
async fn streamed_and_blocking_runs_produce_the_same_text() {
    let blocking = engine(RunConfig::default(), script())
        .await
        .execute("do it")
        .await
        .unwrap();

    let mut stream = engine(RunConfig::default(), script())
        .await
        .stream("do it")
        .unwrap();
    let mut completed = None;
    while let Some(event) = stream.recv().await {
        if let RunEvent::Completed(text) = event {
            completed = Some(text);
        }
    }
    let streamed = stream.finish().await.unwrap();

    assert_eq!(completed.as_deref(), Some(blocking.text()));
    assert_eq!(streamed.text, blocking.text);
    assert_eq!(streamed.state, blocking.state);
}

#[tokio::test]
async fn budget_exhaustion_completes_rather_than_errors() {
    let config = RunConfig::builder().step_budget(2).build().unwrap();
    let engine = engine(config, ScriptedModel::new().otherwise_call("noop")).await;

    let events = collect_events(engine.stream("loop").unwrap()).await;

    match events.assert_single_terminal() {
        RunEvent::Completed(text) => {
            assert!(text.ends_with("Terminated: reached step budget (2)"));
        }
        other => panic!("expected completion, got {other:?}"),
    }
}

#[tokio::test]
async fn model_failure_emits_error_event() {
    let model = ScriptedModel::new().then_fail(ModelError::Provider("overloaded".into()));
    let engine = engine(RunConfig::default(), model).await;

    let events = collect_events(engine.stream("goal").unwrap()).await;

    assert_eq!(
        events,
        [RunEvent::Error(
            "Model invocation failed: provider error: overloaded".into()
        )]
    );
}

#[tokio::test(start_paused = true)]
async fn timeout_emits_error_event() {
    let config = RunConfig::builder()
        .stream_timeout(Duration::from_secs(30))
        .build()
        .unwrap();
    let engine = engine(config, ScriptedModel::new().then_hang()).await;

    let stream = engine.stream("wait forever").unwrap();
    let handle = stream.cancel_handle();
    let events = collect_events(stream).await;

    assert_eq!(events, [RunEvent::Error("run timed out after 30s".into())]);
    assert!(handle.is_cancelled());
    assert_eq!(handle.failure().kind, FailureKind::TimedOut);
}

#[tokio::test(start_paused = true)]
async fn cancelled_stream_gets_no_terminal_event() {
    let engine = engine(RunConfig::default(), ScriptedModel::new().then_hang()).await;

    let mut stream = engine.stream("wait").unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    stream.cancel();

    assert_eq!(stream.recv().await, None);
    stream
        .finish()
        .await
        .unwrap()
        .assert_failed_with(FailureKind::Cancelled)
        .assert_text_contains("Terminated: run cancelled");
}

#[tokio::test(start_paused = true)]
async fn disconnecting_stops_further_steps() {
    let model = ScriptedModel::new()
        .otherwise_call("noop")
        .with_delay(Duration::from_secs(10));
    let engine = engine(RunConfig::default(), model.clone()).await;

    let stream = engine.stream("busy work").unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    drop(stream);
    tokio::time::sleep(Duration::from_secs(120)).await;

    assert_eq!(model.call_count(), 1);
}

async fn engine_with_slow_tool(config: RunConfig, slow: &MockTool) -> Engine {
    Engine::builder()
        .config(config)
        .model(Arc::new(ScriptedModel::new().otherwise_call("slow")))
        .tool(Arc::new(slow.clone()))
        .build()
        .await
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn timeout_interrupts_a_running_tool() {
    let config = RunConfig::builder()
        .stream_timeout(Duration::from_secs(30))
        .build()
        .unwrap();
    let slow = MockTool::new("slow")
        .with_default_response("finally")
        .with_delay(Duration::from_secs(600));
    let engine = engine_with_slow_tool(config, &slow).await;

    let started = tokio::time::Instant::now();
    let stream = engine.stream("long job").unwrap();
    let handle = stream.cancel_handle();
    let events = collect_events(stream).await;

    assert_eq!(
        events.assert_single_terminal(),
        &RunEvent::Error("run timed out after 30s".into())
    );
    assert_eq!(handle.failure().kind, FailureKind::TimedOut);
    assert_eq!(slow.call_count(), 1);
    assert!(started.elapsed() < Duration::from_secs(600));
}

#[tokio::test(start_paused = true)]
async fn cancelling_a_blocking_run_interrupts_a_running_tool() {
    let slow = MockTool::new("slow")
        .with_default_response("finally")
        .with_delay(Duration::from_secs(600));
    let engine = engine_with_slow_tool(RunConfig::default(), &slow).await;

    let run = engine.run();
    let handle = run.cancel_handle();
    let started = tokio::time::Instant::now();
    let task = tokio::spawn(run.execute("long job"));
    tokio::time::sleep(Duration::from_secs(1)).await;
    handle.cancel();

    task.await
        .unwrap()
        .unwrap()
        .assert_failed_with(FailureKind::Cancelled)
        .assert_text_contains("Terminated: run cancelled");
    assert_eq!(slow.call_count(), 1);
    assert!(started.elapsed() < Duration::from_secs(600));
}

/// Answers with the goal it was given after a short pause.
struct EchoGoal;

#[async_trait]
impl ModelCollaborator for EchoGoal {
    async fn think(&self, request: ThinkRequest<'_>) -> Result<ThinkDecision, ModelError> {
        let goal = request.latest_user_text().unwrap_or_default().to_string();
        tokio::time::sleep(Duration::from_millis(5)).await;
        Ok(ThinkDecision::finish(format!("echo: {goal}")))
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_runs_are_isolated() {
    let engine = Arc::new(
        Engine::builder()
            .model(Arc::new(EchoGoal))
            .build()
            .await
            .unwrap(),
    );

    let runs = (0..16).map(|i| {
        let engine = engine.clone();
        tokio::spawn(async move {
            let goal = format!("goal {i}");
            let result = if i % 2 == 0 {
                engine.execute(goal.clone()).await.unwrap()
            } else {
                engine.stream(goal.clone()).unwrap().finish().await.unwrap()
            };
            (goal, result)
        })
    });

    for joined in join_all(runs).await {
        let (goal, result) = joined.unwrap();
        assert_eq!(result.state, RunState::Finished);
        assert_eq!(result.history.len(), 2);
        assert_eq!(result.history[0].content, goal);
        assert_eq!(result.answer(), Some(format!("echo: {goal}").as_str()));
    }
}
