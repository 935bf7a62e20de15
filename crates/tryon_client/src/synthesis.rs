//! Garment image synthesis from a text prompt (FLUX.1 schnell)

use serde::Serialize;
use serde_json::Value;

use crate::config::ReplicateConfig;
use crate::error::{InferenceError, Result};
use crate::invocation::{ResilientInvoker, RetryPolicy};
use crate::outcome::InferenceOutcome;
use crate::provider::{PredictionProvider, PredictionRequest, ReplicateProvider};

/// Text-to-image model used for garment generation
pub const FLUX_SCHNELL_MODEL: &str = "black-forest-labs/flux-schnell";

/// Input document for a FLUX.1 schnell prediction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FluxSchnellInput {
    pub prompt: String,
    pub num_outputs: u32,
    pub aspect_ratio: &'static str,
    pub output_format: &'static str,
    pub output_quality: u32,
    pub disable_safety_checker: bool,
}

impl FluxSchnellInput {
    /// One square PNG at quality 90 with the safety checker on; the prompt is sent verbatim
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            num_outputs: 1,
            aspect_ratio: "1:1",
            output_format: "png",
            output_quality: 90,
            disable_safety_checker: false,
        }
    }

    pub fn into_request(self) -> Result<PredictionRequest> {
        Ok(PredictionRequest::for_model(
            FLUX_SCHNELL_MODEL,
            serde_json::to_value(self)?,
        ))
    }
}

/// Extract the image URL from a finished synthesis prediction
///
/// The output must be a non-empty list whose first element is a non-empty string.
pub fn parse_synthesis_output(output: Option<&Value>) -> Result<String> {
    let url = output
        .and_then(Value::as_array)
        .and_then(|items| items.first())
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty());

    match url {
        Some(url) => Ok(url.to_string()),
        None => Err(InferenceError::MalformedResponse(format!(
            "Image URL not found in output: {}",
            output.map(Value::to_string).unwrap_or_else(|| "null".to_string())
        ))),
    }
}

/// Generates a single garment image per prompt
pub struct ImageSynthesisClient<P = ReplicateProvider> {
    invoker: ResilientInvoker<P>,
}

impl ImageSynthesisClient<ReplicateProvider> {
    /// Create a client backed by the Replicate HTTP API
    pub fn new(config: &ReplicateConfig) -> Self {
        Self::with_provider(
            ReplicateProvider::from_config(config),
            config.api_token.clone(),
        )
    }

    /// Create a client from `REPLICATE_API_TOKEN` / `REPLICATE_API_BASE`
    pub fn from_env() -> Self {
        Self::new(&ReplicateConfig::from_env())
    }
}

impl<P: PredictionProvider> ImageSynthesisClient<P> {
    /// Create a client with a custom provider
    pub fn with_provider(provider: P, api_token: Option<String>) -> Self {
        Self {
            invoker: ResilientInvoker::new(provider, api_token),
        }
    }

    /// Set the retry policy
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.invoker = self.invoker.with_policy(policy);
        self
    }

    /// Generate an image for `prompt`
    ///
    /// The prompt is sent as given; see
    /// [`create_english_prompt`](crate::prompt::create_english_prompt) for
    /// the optional fashion-photography template.
    pub async fn generate(&self, prompt: &str) -> InferenceOutcome {
        let request = match FluxSchnellInput::new(prompt).into_request() {
            Ok(request) => request,
            Err(e) => return InferenceOutcome::failure(e.to_string()),
        };

        self.invoker
            .invoke("Image synthesis", &request, parse_synthesis_output)
            .await
    }
}
