//! Model fallback chain with bounded retry
//!
//! Models are tried in priority order, each up to `max_attempts` times.
//! Rate-limited attempts back off linearly (`step * attempt`) and retry the
//! same model; any other error, or an empty reply, moves on to the next model.
//! Termination: at most `models * max_attempts` generator calls.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::GenerationSettings;
use crate::errors::{ProviderError, Result, SentiflowError};
use crate::providers::TextGenerator;
use crate::types::{GenerationAttempt, GenerationConfig};

/// Attempts per model
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;

/// Linear backoff step (1.5 seconds)
const DEFAULT_BACKOFF_STEP_MS: u64 = 1500;

/// Retry policy applied per model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff_step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, Duration::from_millis(DEFAULT_BACKOFF_STEP_MS))
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_step: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_step,
        }
    }

    /// Delay before retrying after a rate-limited `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff_step * attempt
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Upper bound on total sleep for one model
    pub fn max_total_delay(&self) -> Duration {
        (1..self.max_attempts).map(|a| self.delay_for(a)).sum()
    }
}

/// Ordered, de-duplicated list of models to try
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelChain {
    models: Vec<String>,
}

impl ModelChain {
    /// Primary first, then fallbacks; unset, blank and repeated entries are skipped
    pub fn new(primary: Option<&str>, fallbacks: &[String]) -> Self {
        let mut models: Vec<String> = Vec::new();
        let candidates = primary.into_iter().chain(fallbacks.iter().map(String::as_str));

        for model in candidates {
            let model = model.trim();
            if model.is_empty() || models.iter().any(|m| m == model) {
                continue;
            }
            models.push(model.to_string());
        }

        Self { models }
    }

    pub fn from_settings(settings: &GenerationSettings) -> Self {
        Self::new(settings.primary_model.as_deref(), &settings.fallback_models)
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub fn first(&self) -> Option<&str> {
        self.models.first().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// Text produced by the chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainOutput {
    pub model: String,
    pub text: String,
    /// Generator calls made, including failed ones
    pub attempts: usize,
}

/// Runs a prompt through the model chain
#[derive(Clone)]
pub struct FallbackGenerator {
    generator: Arc<dyn TextGenerator>,
    chain: ModelChain,
    policy: RetryPolicy,
    config: GenerationConfig,
}

impl FallbackGenerator {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        chain: ModelChain,
        policy: RetryPolicy,
        config: GenerationConfig,
    ) -> Self {
        Self {
            generator,
            chain,
            policy,
            config,
        }
    }

    pub fn from_settings(generator: Arc<dyn TextGenerator>, settings: &GenerationSettings) -> Self {
        Self::new(
            generator,
            ModelChain::from_settings(settings),
            RetryPolicy::new(settings.max_attempts, Duration::from_millis(settings.backoff_step_ms)),
            settings.sampling(),
        )
    }

    /// Generate text for `prompt`; the first non-empty reply wins
    pub async fn generate(&self, prompt: &str) -> Result<ChainOutput> {
        let mut last_error: Option<(String, ProviderError)> = None;
        let mut attempts = 0usize;

        for model in self.chain.models() {
            info!(model = %model, provider = self.generator.name(), "Using model");

            for attempt in 1..=self.policy.max_attempts() {
                let current = GenerationAttempt { model, attempt };
                attempts += 1;

                match self.generator.generate(model, prompt, &self.config).await {
                    Ok(text) if !text.trim().is_empty() => {
                        info!(model = %model, chars = text.len(), "Response generated");
                        return Ok(ChainOutput {
                            model: model.clone(),
                            text,
                            attempts,
                        });
                    }
                    Ok(_) => {
                        warn!(model = %model, attempt, "Model returned empty text; trying next model");
                        break;
                    }
                    Err(e) if e.is_rate_limited() => {
                        self.back_off(current, &e).await;
                        last_error = Some((model.clone(), e));
                    }
                    Err(e) => {
                        warn!(model = %model, attempt, error = %e, "Model failed; trying next model");
                        last_error = Some((model.clone(), e));
                        break;
                    }
                }
            }
        }

        match last_error {
            Some((model, source)) => Err(SentiflowError::GenerationExhausted {
                model,
                attempts,
                source,
            }),
            None => Err(SentiflowError::NoUsableOutput {
                models_tried: self.chain.models().to_vec(),
            }),
        }
    }

    /// Sleep `step * attempt` before retrying a rate-limited model. No sleep
    /// follows a model's final attempt, so the chain moves on at once and the
    /// worst case is `max_total_delay` per model rather than one extra step.
    async fn back_off(&self, current: GenerationAttempt<'_>, error: &ProviderError) {
        if current.attempt >= self.policy.max_attempts() {
            warn!(model = %current.model, attempt = current.attempt, error = %error, "Rate limited; attempts exhausted");
            return;
        }

        let delay = self.policy.delay_for(current.attempt);
        warn!(
            model = %current.model,
            attempt = current.attempt,
            delay_secs = delay.as_secs_f64(),
            "Rate limited; retrying"
        );
        sleep(delay).await;
    }

    pub fn chain(&self) -> &ModelChain {
        &self.chain
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_backoff() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_millis(1500));
        assert_eq!(policy.delay_for(2), Duration::from_millis(3000));
        assert_eq!(policy.max_total_delay(), Duration::from_millis(1500));
    }

    #[test]
    fn test_zero_attempts_clamped() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts(), 1);
    }

    #[test]
    fn test_chain_skips_unset_and_duplicates() {
        let fallbacks = vec![
            "gemini-1.5-flash".to_string(),
            "".to_string(),
            "gemini-1.5-flash".to_string(),
            "gemini-1.5-flash-8b".to_string(),
        ];
        let chain = ModelChain::new(Some("gemini-1.5-flash"), &fallbacks);
        assert_eq!(chain.models(), &["gemini-1.5-flash", "gemini-1.5-flash-8b"]);

        let chain = ModelChain::new(None, &fallbacks);
        assert_eq!(chain.first(), Some("gemini-1.5-flash"));
    }

    #[test]
    fn test_chain_from_default_settings() {
        let chain = ModelChain::from_settings(&GenerationSettings::default());
        assert_eq!(
            chain.models(),
            &["gemini-2.0-flash-exp", "gemini-1.5-flash", "gemini-1.5-flash-8b"]
        );
    }
}
