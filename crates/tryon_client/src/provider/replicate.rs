//! Replicate HTTP prediction provider

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use super::{Prediction, PredictionProvider, PredictionRequest, PredictionTarget};
use crate::config::{ReplicateConfig, TIMING_CONFIG};
use crate::error::{InferenceError, Result};

/// Talks to the Replicate predictions API over HTTP/JSON
#[derive(Debug, Clone)]
pub struct ReplicateProvider {
    http: Client,
    api_base: String,
    poll_interval: Duration,
}

impl ReplicateProvider {
    /// Create a provider for the given API base URL
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            poll_interval: TIMING_CONFIG.poll_interval(),
        }
    }

    /// Create a provider for the endpoint in `config`
    pub fn from_config(config: &ReplicateConfig) -> Self {
        Self::new(&config.api_base)
    }

    /// Set the delay between status polls
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Endpoint and body for a job submission
    fn create_call(&self, request: &PredictionRequest) -> (String, Value) {
        match &request.target {
            PredictionTarget::Model(model) => (
                format!("{}/models/{}/predictions", self.api_base, model),
                json!({ "input": request.input }),
            ),
            PredictionTarget::Version(version) => (
                format!("{}/predictions", self.api_base),
                json!({ "version": version, "input": request.input }),
            ),
        }
    }

    fn poll_url(&self, prediction: &Prediction) -> String {
        prediction
            .urls
            .as_ref()
            .and_then(|urls| urls.get.clone())
            .unwrap_or_else(|| format!("{}/predictions/{}", self.api_base, prediction.id))
    }

    /// Decode a prediction body, turning non-2xx statuses into provider errors
    async fn read_prediction(url: &str, response: Response) -> Result<Prediction> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            debug!("Request to {} failed with status {}", url, status);
            return Err(status_error(status, &body));
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// Error for a non-2xx response
///
/// Only the status line and the raw body are kept, so rate-limit hints such
/// as `retry_after` stay visible while hosts, ports and prediction ids do not
/// leak into message-based classification.
fn status_error(status: StatusCode, body: &str) -> InferenceError {
    InferenceError::Provider(format!(
        "Request failed with status {}: {}",
        status,
        body.trim()
    ))
}

#[async_trait]
impl PredictionProvider for ReplicateProvider {
    async fn create(&self, api_token: &str, request: &PredictionRequest) -> Result<Prediction> {
        let (url, body) = self.create_call(request);

        debug!("Creating prediction at {}", url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(api_token)
            .json(&body)
            .send()
            .await?;

        let prediction = Self::read_prediction(&url, response).await?;
        debug!(
            "Prediction {} created with status {}",
            prediction.id,
            prediction.status.as_str()
        );
        Ok(prediction)
    }

    async fn wait(&self, api_token: &str, prediction: Prediction) -> Result<Prediction> {
        let mut prediction = prediction;

        while !prediction.status.is_terminal() {
            tokio::time::sleep(self.poll_interval).await;

            let url = self.poll_url(&prediction);
            let response = self.http.get(&url).bearer_auth(api_token).send().await?;
            prediction = Self::read_prediction(&url, response).await?;

            debug!(
                "Prediction {} status {}",
                prediction.id,
                prediction.status.as_str()
            );
        }

        Ok(prediction)
    }
}
