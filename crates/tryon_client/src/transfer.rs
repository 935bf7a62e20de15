//! Virtual try-on: composite a garment image onto a person image (IDM-VTON)

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::ReplicateConfig;
use crate::error::{InferenceError, Result};
use crate::image_ref::preview;
use crate::invocation::{ResilientInvoker, RetryPolicy};
use crate::outcome::InferenceOutcome;
use crate::provider::{PredictionProvider, PredictionRequest, ReplicateProvider};

/// Pinned IDM-VTON model version
pub const IDM_VTON_VERSION: &str = "c871bb9b046607b680449ecbae55fd8c6d945e0a1948644bf2361b3d021d3ff4";

/// Input document for an IDM-VTON prediction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdmVtonInput {
    pub human_img: String,
    pub garm_img: String,
    pub garment_des: &'static str,
    pub is_checked: bool,
    pub is_checked_crop: bool,
    pub denoise_steps: u32,
    pub seed: u64,
}

impl IdmVtonInput {
    /// Fixed description, masking flags, 30 denoising steps and seed 42
    pub fn new(person_image: impl Into<String>, garment_image: impl Into<String>) -> Self {
        Self {
            human_img: person_image.into(),
            garm_img: garment_image.into(),
            garment_des: "clothing",
            is_checked: true,
            is_checked_crop: false,
            denoise_steps: 30,
            seed: 42,
        }
    }

    pub fn into_request(self) -> Result<PredictionRequest> {
        Ok(PredictionRequest::for_version(
            IDM_VTON_VERSION,
            serde_json::to_value(self)?,
        ))
    }
}

type ShapeMatcher = fn(&Value) -> Option<String>;

/// Output shapes in priority order
const SHAPE_MATCHERS: [(&str, ShapeMatcher); 3] = [
    ("sequence", match_sequence),
    ("string", match_string),
    ("object", match_object),
];

/// Non-empty list: its first element
fn match_sequence(output: &Value) -> Option<String> {
    match output.as_array()?.first()? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Bare string: used as is
fn match_string(output: &Value) -> Option<String> {
    output
        .as_str()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Object: its `image` field, then `url`, then the whole object serialized
fn match_object(output: &Value) -> Option<String> {
    let object = output.as_object()?;

    ["image", "url"]
        .iter()
        .find_map(|key| {
            object
                .get(*key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
        .or_else(|| Some(output.to_string()))
}

/// Extract the result image reference from a finished try-on prediction
pub fn parse_transfer_output(output: Option<&Value>) -> Result<String> {
    let output = match output {
        Some(Value::Null) | None => {
            return Err(InferenceError::MalformedResponse(
                "Prediction output is empty".to_string(),
            ))
        }
        Some(output) => output,
    };

    for (shape, matcher) in SHAPE_MATCHERS {
        if let Some(image) = matcher(output) {
            debug!("Try-on output matched {} shape", shape);
            return Ok(image);
        }
    }

    Err(InferenceError::MalformedResponse(format!(
        "Unexpected output format: {}",
        output
    )))
}

/// Dresses a person image in a garment image
pub struct GarmentTransferClient<P = ReplicateProvider> {
    invoker: ResilientInvoker<P>,
}

impl GarmentTransferClient<ReplicateProvider> {
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

impl<P: PredictionProvider> GarmentTransferClient<P> {
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

    /// Composite `garment_image` onto `person_image`
    ///
    /// Both images are HTTP(S) URLs or data URIs and are passed through
    /// unchanged; size limits are enforced by the provider.
    pub async fn transfer(&self, person_image: &str, garment_image: &str) -> InferenceOutcome {
        debug!("Person image: {}", preview(person_image, 50));
        debug!("Garment image: {}", preview(garment_image, 50));

        let request = match IdmVtonInput::new(person_image, garment_image).into_request() {
            Ok(request) => request,
            Err(e) => return InferenceOutcome::failure(e.to_string()),
        };

        self.invoker
            .invoke("Virtual try-on", &request, parse_transfer_output)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::testing::{ScriptedProvider, Step};
    use crate::provider::PredictionTarget;
    use serde_json::json;
    use std::sync::Arc;

    const PERSON: &str = "data:image/jpeg;base64,/9j/4AAQSkZJRgABAQAAAQABAAD";
    const GARMENT: &str = "https://replicate.delivery/xezq/garment.png";

    fn client(provider: &Arc<ScriptedProvider>) -> GarmentTransferClient<Arc<ScriptedProvider>> {
        GarmentTransferClient::with_provider(provider.clone(), Some("r8_test".to_string()))
            .with_policy(RetryPolicy::default().with_completion_timeout(None))
    }

    #[test]
    fn test_output_shapes() {
        let cases = [
            (json!(["url1"]), "url1".to_string()),
            (json!("url2"), "url2".to_string()),
            (json!({"image": "url3"}), "url3".to_string()),
            (json!({"url": "url4"}), "url4".to_string()),
            (json!({"other": "x"}), r#"{"other":"x"}"#.to_string()),
        ];

        for (output, expected) in cases {
            assert_eq!(parse_transfer_output(Some(&output)).unwrap(), expected);
        }
    }

    #[test]
    fn test_image_field_wins_over_url() {
        let output = json!({"url": "url4", "image": "url3"});
        assert_eq!(parse_transfer_output(Some(&output)).unwrap(), "url3");
    }

    #[test]
    fn test_empty_image_field_falls_through() {
        let output = json!({"image": "", "url": "url4"});
        assert_eq!(parse_transfer_output(Some(&output)).unwrap(), "url4");
    }

    #[test]
    fn test_rejected_shapes() {
        assert!(parse_transfer_output(None).is_err());
        assert!(parse_transfer_output(Some(&Value::Null)).is_err());
        assert!(parse_transfer_output(Some(&json!([]))).is_err());
        assert!(parse_transfer_output(Some(&json!(""))).is_err());
        assert!(parse_transfer_output(Some(&json!(7))).is_err());
        assert!(parse_transfer_output(Some(&json!(true))).is_err());
    }

    #[test]
    fn test_input_document() {
        let request = IdmVtonInput::new(PERSON, GARMENT).into_request().unwrap();
        assert_eq!(
            request.target,
            PredictionTarget::Version(IDM_VTON_VERSION.to_string())
        );
        assert_eq!(
            request.input,
            json!({
                "human_img": PERSON,
                "garm_img": GARMENT,
                "garment_des": "clothing",
                "is_checked": true,
                "is_checked_crop": false,
                "denoise_steps": 30,
                "seed": 42
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_transfer_success() {
        let provider = ScriptedProvider::healthy(json!("https://replicate.delivery/result.jpg"));

        let outcome = client(&provider).transfer(PERSON, GARMENT).await;

        assert_eq!(
            outcome,
            InferenceOutcome::success("https://replicate.delivery/result.jpg")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_identical_inputs_send_identical_requests() {
        let provider = ScriptedProvider::healthy(json!(["https://replicate.delivery/result.jpg"]));
        let client = client(&provider);

        client.transfer(PERSON, GARMENT).await;
        client.transfer(PERSON, GARMENT).await;

        let requests = provider.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0], requests[1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transfer_missing_credential() {
        let provider = ScriptedProvider::healthy(json!(["https://replicate.delivery/result.jpg"]));
        let client = GarmentTransferClient::with_provider(provider.clone(), None);

        let outcome = client.transfer(PERSON, GARMENT).await;

        assert!(!outcome.is_success());
        assert_eq!(provider.create_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transfer_retries_after_null_output() {
        let provider = ScriptedProvider::new(
            vec![Step::Output(Value::Null), Step::Reject("status 503".to_string())],
            json!({"image": "https://replicate.delivery/result.jpg"}),
        );

        let outcome = client(&provider).transfer(PERSON, GARMENT).await;

        assert_eq!(
            outcome,
            InferenceOutcome::success("https://replicate.delivery/result.jpg")
        );
        assert_eq!(provider.create_count(), 3);
    }
}
