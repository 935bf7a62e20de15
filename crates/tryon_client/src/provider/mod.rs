//! Prediction provider abstraction
//!
//! This module provides:
//! - `PredictionProvider`: the submit / await-completion seam used by the retry loop
//! - `Prediction`: a job handle and, once terminal, its result payload
//! - `replicate`: the HTTP implementation backed by the Replicate API

mod replicate;

pub use replicate::ReplicateProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::error::Result;

/// Lifecycle state of a prediction
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PredictionStatus {
    #[default]
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
    Other(String),
}

impl PredictionStatus {
    /// Whether no further status changes will occur
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Starting => "starting",
            Self::Processing => "processing",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
            Self::Other(s) => s.as_str(),
        }
    }
}

impl From<String> for PredictionStatus {
    fn from(s: String) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "starting" => Self::Starting,
            "processing" => Self::Processing,
            "succeeded" => Self::Succeeded,
            "failed" => Self::Failed,
            "canceled" | "cancelled" => Self::Canceled,
            _ => Self::Other(s),
        }
    }
}

impl From<PredictionStatus> for String {
    fn from(status: PredictionStatus) -> Self {
        status.as_str().to_string()
    }
}

/// Links returned alongside a prediction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionUrls {
    #[serde(default)]
    pub get: Option<String>,
    #[serde(default)]
    pub cancel: Option<String>,
}

/// A submitted job as reported by the provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub id: String,
    #[serde(default)]
    pub status: PredictionStatus,
    #[serde(default)]
    pub output: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub urls: Option<PredictionUrls>,
}

impl Prediction {
    /// Provider-reported failure text, if any
    pub fn error_message(&self) -> Option<String> {
        match self.error.as_ref()? {
            Value::Null => None,
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// How a prediction selects the model that runs it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredictionTarget {
    /// Latest version of an `owner/name` model
    Model(String),
    /// A pinned model version hash
    Version(String),
}

/// A job submission: which model to run and its input document
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRequest {
    pub target: PredictionTarget,
    pub input: Value,
}

impl PredictionRequest {
    pub fn for_model(model: impl Into<String>, input: Value) -> Self {
        Self {
            target: PredictionTarget::Model(model.into()),
            input,
        }
    }

    pub fn for_version(version: impl Into<String>, input: Value) -> Self {
        Self {
            target: PredictionTarget::Version(version.into()),
            input,
        }
    }
}

/// Remote inference provider: submits jobs and waits for them to finish
///
/// `wait` suspends until the prediction is terminal and returns it as is,
/// including failed or canceled predictions. Transport and HTTP status
/// failures are reported as errors.
#[async_trait]
pub trait PredictionProvider: Send + Sync {
    /// Submit a job and return its handle
    async fn create(&self, api_token: &str, request: &PredictionRequest) -> Result<Prediction>;

    /// Suspend until the prediction reaches a terminal state
    async fn wait(&self, api_token: &str, prediction: Prediction) -> Result<Prediction>;
}

#[async_trait]
impl<P: PredictionProvider + ?Sized> PredictionProvider for Arc<P> {
    async fn create(&self, api_token: &str, request: &PredictionRequest) -> Result<Prediction> {
        (**self).create(api_token, request).await
    }

    async fn wait(&self, api_token: &str, prediction: Prediction) -> Result<Prediction> {
        (**self).wait(api_token, prediction).await
    }
}
