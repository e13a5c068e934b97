//! Retrying adjudicator over a completion backend.

use async_trait::async_trait;
use court_coordination::{AdjudicationError, Adjudicator, RetryPolicy};
use tracing::{error, info, warn};

use crate::backend::{CompletionBackend, GeminiBackend};
use crate::classify::classify;
use crate::config::CourtConfig;
use crate::prompts::{case_prompt, JUDGE_PREAMBLE, PROMPT_VERSION};

/// Sends both statements to the judge, retrying transient failures with
/// exponential backoff.
pub struct RemoteAdjudicator<B> {
    backend: B,
    policy: RetryPolicy,
}

impl<B: CompletionBackend> RemoteAdjudicator<B> {
    pub fn new(backend: B, policy: RetryPolicy) -> Self {
        Self { backend, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// One attempt: call, classify, reject blank text.
    async fn attempt(&self, prompt: &str) -> Result<String, AdjudicationError> {
        let text = self
            .backend
            .complete(JUDGE_PREAMBLE, prompt)
            .await
            .map_err(|e| classify(&e))?;
        if text.trim().is_empty() {
            return Err(AdjudicationError::EmptyResponse);
        }
        Ok(text)
    }
}

impl RemoteAdjudicator<GeminiBackend> {
    /// Gemini-backed adjudicator from process configuration.
    pub fn from_config(config: &CourtConfig) -> Result<Self, AdjudicationError> {
        let backend = GeminiBackend::new(config).map_err(|e| classify(&e))?;
        Ok(Self::new(backend, config.retry))
    }
}

#[async_trait]
impl<B: CompletionBackend> Adjudicator for RemoteAdjudicator<B> {
    async fn adjudicate(
        &self,
        statement_a: &str,
        statement_b: &str,
    ) -> Result<String, AdjudicationError> {
        let prompt = case_prompt(statement_a, statement_b);
        let total = self.policy.total_attempts();

        let mut attempt = 0;
        loop {
            info!(
                attempt = attempt + 1,
                total,
                prompt_version = PROMPT_VERSION,
                "Requesting verdict"
            );
            let err = match self.attempt(&prompt).await {
                Ok(verdict) => return Ok(verdict),
                Err(e) => e,
            };

            if !err.is_retriable() || !self.policy.allows_retry_after(attempt) {
                error!(
                    attempts = attempt + 1,
                    kind = %err.kind(),
                    error = %err,
                    "Adjudication failed"
                );
                return Err(err);
            }

            let backoff = self.policy.delay_before_retry(attempt);
            warn!(
                attempt = attempt + 1,
                max_retries = self.policy.max_retries,
                backoff_ms = backoff.as_millis() as u64,
                kind = %err.kind(),
                error = %err,
                "Transient error — retrying"
            );
            tokio::time::sleep(backoff).await;
            attempt += 1;
        }
    }
}
