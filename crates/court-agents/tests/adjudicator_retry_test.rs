//! Retry and classification behaviour of `RemoteAdjudicator`.
//!
//! Runs on a paused clock so backoff delays are observed exactly.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use court_agents::{BackendError, CompletionBackend, RemoteAdjudicator};
use court_coordination::{Adjudicator, FailureKind, RetryPolicy};
use tokio::time::Instant;

const BASE: Duration = Duration::from_millis(2000);

/// Backend that replays a script and records when each call happened.
struct ScriptedBackend {
    script: Mutex<VecDeque<Result<String, BackendError>>>,
    fallback: Result<String, BackendError>,
    calls: Mutex<Vec<Instant>>,
}

impl ScriptedBackend {
    fn new(script: Vec<Result<String, BackendError>>) -> Self {
        Self::with_fallback(script, Err(BackendError::Transport("script exhausted".into())))
    }

    fn with_fallback(
        script: Vec<Result<String, BackendError>>,
        fallback: Result<String, BackendError>,
    ) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn gaps(&self) -> Vec<Duration> {
        let calls = self.calls.lock().unwrap();
        calls.windows(2).map(|w| w[1] - w[0]).collect()
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(&self, _system: &str, _prompt: &str) -> Result<String, BackendError> {
        self.calls.lock().unwrap().push(Instant::now());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

fn http(status: u16, body: &str) -> BackendError {
    BackendError::Http {
        status,
        body: body.to_string(),
    }
}

fn judge(backend: ScriptedBackend) -> RemoteAdjudicator<ScriptedBackend> {
    RemoteAdjudicator::new(backend, RetryPolicy::new(3, BASE))
}

async fn run(judge: &RemoteAdjudicator<ScriptedBackend>) -> Result<String, FailureKind> {
    judge
        .adjudicate("he never does dishes", "I work nights")
        .await
        .map_err(|e| e.kind())
}

#[tokio::test(start_paused = true)]
async fn test_quota_errors_back_off_exponentially_then_succeed() {
    let backend = ScriptedBackend::new(vec![
        Err(http(429, "RESOURCE_EXHAUSTED")),
        Err(http(429, "RESOURCE_EXHAUSTED")),
        Err(http(429, "RESOURCE_EXHAUSTED")),
        Ok("【判决】Both must compromise.".into()),
    ]);
    let judge = judge(backend);

    let verdict = run(&judge).await.unwrap();
    assert_eq!(verdict, "【判决】Both must compromise.");

    let gaps = ScriptedBackend::gaps(judge_backend(&judge));
    assert_eq!(gaps, vec![BASE, BASE * 2, BASE * 4]);
}

#[tokio::test(start_paused = true)]
async fn test_persistent_overload_fails_after_four_attempts() {
    let _ = tracing_subscriber::fmt().with_env_filter("info").try_init();
    let backend = ScriptedBackend::with_fallback(vec![], Err(http(503, "overloaded")));
    let judge = judge(backend);
    let started = Instant::now();

    let err = judge
        .adjudicate("he never does dishes", "I work nights")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::ServiceOverloaded);
    assert_eq!(judge_backend(&judge).call_count(), 4);
    assert_eq!(started.elapsed(), BASE * 7);

    let reason = err.failure_reason();
    assert_eq!(reason.kind, FailureKind::ServiceOverloaded);
    assert_eq!(reason.message, FailureKind::ServiceOverloaded.user_message());
}

#[tokio::test(start_paused = true)]
async fn test_configuration_error_is_not_retried() {
    let backend = ScriptedBackend::with_fallback(vec![], Err(BackendError::MissingCredentials));
    let judge = judge(backend);
    let started = Instant::now();

    assert_eq!(run(&judge).await.unwrap_err(), FailureKind::Configuration);
    assert_eq!(judge_backend(&judge).call_count(), 1);
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_unknown_error_is_not_retried() {
    let backend = ScriptedBackend::new(vec![Err(BackendError::Transport(
        "connection reset by peer".into(),
    ))]);
    let judge = judge(backend);

    assert_eq!(run(&judge).await.unwrap_err(), FailureKind::Unknown);
    assert_eq!(judge_backend(&judge).call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_empty_response_is_retried() {
    let backend = ScriptedBackend::new(vec![
        Ok(String::new()),
        Ok("   \n".into()),
        Ok("【判决】finally".into()),
    ]);
    let judge = judge(backend);

    assert_eq!(run(&judge).await.unwrap(), "【判决】finally");
    assert_eq!(judge_backend(&judge).gaps(), vec![BASE, BASE * 2]);
}

#[tokio::test(start_paused = true)]
async fn test_always_empty_ends_as_empty_response() {
    let backend = ScriptedBackend::with_fallback(vec![], Ok(String::new()));
    let judge = judge(backend);

    assert_eq!(run(&judge).await.unwrap_err(), FailureKind::EmptyResponse);
    assert_eq!(judge_backend(&judge).call_count(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_last_error_wins_after_mixed_failures() {
    let backend = ScriptedBackend::new(vec![
        Err(http(503, "UNAVAILABLE")),
        Err(http(429, "quota")),
        Err(http(503, "UNAVAILABLE")),
        Err(http(429, "quota")),
    ]);
    let judge = judge(backend);

    assert_eq!(run(&judge).await.unwrap_err(), FailureKind::QuotaExceeded);
    assert_eq!(judge_backend(&judge).call_count(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_quota_then_fatal_stops_immediately() {
    let backend = ScriptedBackend::new(vec![Err(http(429, "quota")), Err(http(401, "bad key"))]);
    let judge = judge(backend);

    assert_eq!(run(&judge).await.unwrap_err(), FailureKind::Configuration);
    assert_eq!(judge_backend(&judge).gaps(), vec![BASE]);
}

fn judge_backend(judge: &RemoteAdjudicator<ScriptedBackend>) -> &ScriptedBackend {
    judge.backend()
}
