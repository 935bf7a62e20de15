//! Resilient invocation: submit, wait for completion, parse, retry
//!
//! Both clients run their predictions through [`ResilientInvoker`]. One
//! invocation makes at most `max_retries` strictly sequential attempts and
//! always ends in an [`InferenceOutcome`]; provider errors never escape.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::config::{API_TOKEN_ENV, TIMING_CONFIG};
use crate::error::{InferenceError, Result};
use crate::image_ref::preview;
use crate::outcome::InferenceOutcome;
use crate::provider::{PredictionProvider, PredictionRequest, PredictionStatus};

/// Attempts per invocation
pub const MAX_RETRIES: u32 = 3;
/// Wait after a rate-limit error that carries no `retry_after` hint
pub const DEFAULT_RATE_LIMIT_WAIT: Duration = Duration::from_secs(3);
/// Added on top of a provider-suggested `retry_after`
pub const RETRY_AFTER_MARGIN: Duration = Duration::from_secs(1);
/// Wait after any other error
pub const TRANSIENT_WAIT: Duration = Duration::from_secs(2);

const UNKNOWN_ERROR: &str = "Unknown error";

lazy_static! {
    static ref RETRY_AFTER: Regex =
        Regex::new(r#"retry_after['":=\s]*(\d+)"#).expect("retry_after pattern is valid");
}

/// How a failed attempt should be retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Provider throttling; wait this long before the next attempt
    RateLimit { wait: Duration },
    /// Anything else; retried after the policy's fixed wait
    Transient,
}

/// Signature of a pluggable error classifier
pub type ErrorClassifier = fn(&str) -> ErrorClass;

/// Classify an error by its message text
///
/// A message mentioning `429` or `Too Many Requests` is a rate limit. Its
/// wait is the scanned `retry_after` seconds plus one second of margin, or
/// three seconds when no usable hint is present.
pub fn classify_error(message: &str) -> ErrorClass {
    if !(message.contains("429") || message.contains("Too Many Requests")) {
        return ErrorClass::Transient;
    }

    let wait = extract_retry_after(message)
        .map(|secs| Duration::from_secs(secs.saturating_add(RETRY_AFTER_MARGIN.as_secs())))
        .unwrap_or(DEFAULT_RATE_LIMIT_WAIT);

    ErrorClass::RateLimit { wait }
}

/// Scan `retry_after` seconds out of free-form error text
fn extract_retry_after(message: &str) -> Option<u64> {
    RETRY_AFTER
        .captures(message)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Retry limits and timing for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub transient_wait: Duration,
    /// Deadline for one submission to reach a terminal state; `None` waits indefinitely
    pub completion_timeout: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            transient_wait: TRANSIENT_WAIT,
            completion_timeout: TIMING_CONFIG.completion_timeout(),
        }
    }
}

impl RetryPolicy {
    /// Set the per-submission completion deadline
    pub fn with_completion_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.completion_timeout = timeout;
        self
    }
}

/// Runs predictions against a provider with bounded, sequential retries
pub struct ResilientInvoker<P> {
    provider: P,
    api_token: Option<String>,
    policy: RetryPolicy,
    classifier: ErrorClassifier,
}

impl<P: PredictionProvider> ResilientInvoker<P> {
    /// Create an invoker; a missing or blank token fails every invocation up front
    pub fn new(provider: P, api_token: Option<String>) -> Self {
        Self {
            provider,
            api_token,
            policy: RetryPolicy::default(),
            classifier: classify_error,
        }
    }

    /// Set the retry policy
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the message-based error classifier
    pub fn with_classifier(mut self, classifier: ErrorClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    fn credential(&self) -> Option<&str> {
        self.api_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }

    /// Run `request` to completion and extract its output with `parse`
    ///
    /// `label` names the job in log lines.
    pub async fn invoke<F>(&self, label: &str, request: &PredictionRequest, parse: F) -> InferenceOutcome
    where
        F: Fn(Option<&Value>) -> Result<String>,
    {
        let Some(api_token) = self.credential() else {
            let err = InferenceError::Configuration(format!(
                "Replicate API token is not configured; set {}",
                API_TOKEN_ENV
            ));
            error!("{}: {}", label, err);
            return InferenceOutcome::failure(err.to_string());
        };

        let max_retries = self.policy.max_retries;
        let mut last_error: Option<InferenceError> = None;

        for attempt in 1..=max_retries {
            info!("{} started (attempt {}/{})", label, attempt, max_retries);

            let err = match self.attempt(api_token, request, &parse).await {
                Ok(image_url) => {
                    info!("{} succeeded: {}", label, preview(&image_url, 80));
                    return InferenceOutcome::success(image_url);
                }
                Err(err) => err,
            };

            let message = err.to_string();
            let wait = match (self.classifier)(&message) {
                ErrorClass::RateLimit { wait } => {
                    warn!(
                        "{} rate limited (attempt {}/{}): {}",
                        label, attempt, max_retries, message
                    );
                    wait
                }
                ErrorClass::Transient => {
                    error!(
                        "{} failed (attempt {}/{}): {}",
                        label, attempt, max_retries, message
                    );
                    self.policy.transient_wait
                }
            };
            last_error = Some(err);

            if attempt < max_retries {
                info!("Retrying {} in {:.1}s", label, wait.as_secs_f64());
                tokio::time::sleep(wait).await;
            }
        }

        InferenceOutcome::failure(
            last_error
                .map(|err| err.to_string())
                .unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
        )
    }

    /// One submission: create, wait for a terminal state, parse
    async fn attempt<F>(&self, api_token: &str, request: &PredictionRequest, parse: &F) -> Result<String>
    where
        F: Fn(Option<&Value>) -> Result<String>,
    {
        let prediction = self.provider.create(api_token, request).await?;
        let id = prediction.id.clone();
        debug!("Prediction {} created, waiting for completion", id);

        let waiting = self.provider.wait(api_token, prediction);
        let finished = match self.policy.completion_timeout {
            Some(limit) => tokio::time::timeout(limit, waiting).await.map_err(|_| {
                InferenceError::Timeout(format!(
                    "Prediction {} did not complete within {:.1}s",
                    id,
                    limit.as_secs_f64()
                ))
            })??,
            None => waiting.await?,
        };

        debug!("Prediction {} finished with status {}", id, finished.status.as_str());

        match finished.status {
            PredictionStatus::Succeeded => parse(finished.output.as_ref()),
            PredictionStatus::Failed | PredictionStatus::Canceled => {
                Err(InferenceError::Provider(finished.error_message().unwrap_or_else(
                    || format!("Prediction {} {}", id, finished.status.as_str()),
                )))
            }
            ref other => Err(InferenceError::MalformedResponse(format!(
                "Prediction {} returned non-terminal status {}",
                id,
                other.as_str()
            ))),
        }
    }
}
