//! tryon_client: resilient inference clients for virtual try-on
//!
//! This library provides:
//! - Garment image synthesis from a text prompt (FLUX.1 schnell)
//! - Virtual try-on compositing of a garment onto a person (IDM-VTON)
//! - A shared retry loop with rate-limit aware backoff
//! - A network-free connectivity probe for readiness indicators
//!
//! # Example
//!
//! ```no_run
//! use tryon_client::{GarmentTransferClient, ImageSynthesisClient, ReplicateConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ReplicateConfig::from_env();
//!
//!     let garment = ImageSynthesisClient::new(&config).generate("red dress").await;
//!     if let Some(garment_url) = garment.image_url() {
//!         let result = GarmentTransferClient::new(&config)
//!             .transfer("https://example.com/person.jpg", garment_url)
//!             .await;
//!         println!("Result: {:?}", result);
//!     }
//! }
//! ```

// Core modules
pub mod error;
pub mod outcome;

// Configuration module
pub mod config;

// Provider transport
pub mod provider;

// Core functionality
pub mod image_ref;
pub mod invocation;
pub mod probe;
pub mod prompt;
pub mod synthesis;
pub mod transfer;

// Re-export commonly used types and functions
pub use error::{InferenceError, Result};
pub use outcome::InferenceOutcome;

// Config re-exports
pub use config::{
    get_message, get_messages, Language, PollingTimingConfig, ReplicateConfig, API_BASE_ENV,
    API_TOKEN_ENV, DEFAULT_API_BASE, TIMING_CONFIG,
};

// Provider re-exports
pub use provider::{
    Prediction, PredictionProvider, PredictionRequest, PredictionStatus, PredictionTarget,
    ReplicateProvider,
};

// Invocation re-exports
pub use invocation::{classify_error, ErrorClass, ResilientInvoker, RetryPolicy, MAX_RETRIES};

// Client re-exports
pub use image_ref::{preview, ImageRef};
pub use probe::{probe_connectivity, ConnectivityStatus};
pub use prompt::create_english_prompt;
pub use synthesis::{parse_synthesis_output, FluxSchnellInput, ImageSynthesisClient};
pub use transfer::{parse_transfer_output, GarmentTransferClient, IdmVtonInput};

/// A request the caller can hand to [`InferenceRequest::run`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InferenceRequest {
    TextToImage {
        prompt: String,
    },
    ImageComposite {
        person_image: String,
        garment_image: String,
    },
}

impl InferenceRequest {
    /// Dispatch to the matching client built from `config`
    pub async fn run(&self, config: &ReplicateConfig) -> InferenceOutcome {
        match self {
            Self::TextToImage { prompt } => ImageSynthesisClient::new(config).generate(prompt).await,
            Self::ImageComposite {
                person_image,
                garment_image,
            } => {
                GarmentTransferClient::new(config)
                    .transfer(person_image, garment_image)
                    .await
            }
        }
    }
}
