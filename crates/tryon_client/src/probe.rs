//! Connectivity probe for UI readiness indicators

use serde::Serialize;

use crate::config::{get_message, Language, ReplicateConfig};

/// Whether the provider credential is configured
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectivityStatus {
    pub configured: bool,
    pub message: String,
}

/// Report credential presence without touching the network
pub fn probe_connectivity(config: &ReplicateConfig, lang: Language) -> ConnectivityStatus {
    let configured = config.has_credential();
    let key = if configured {
        "probe_configured"
    } else {
        "probe_not_configured"
    };

    ConnectivityStatus {
        configured,
        message: get_message(key, lang).to_string(),
    }
}
