//! Configuration module for tryon_client
//!
//! This module contains:
//! - `i18n`: Localized status messages
//! - `replicate`: Provider credential and endpoint settings
//! - `timing`: Polling and completion timing

mod i18n;
mod replicate;
mod timing;

pub use i18n::{get_message, get_messages, Language, MESSAGES_EN, MESSAGES_JA};
pub use replicate::{ReplicateConfig, API_BASE_ENV, API_TOKEN_ENV, DEFAULT_API_BASE};
pub use timing::{PollingTimingConfig, TIMING_CONFIG};
