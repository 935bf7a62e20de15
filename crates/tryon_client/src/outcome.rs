//! Result of one client invocation

use serde::{Serialize, Serializer};

/// Outcome handed back to the caller; every invocation ends in one of these
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InferenceOutcome {
    Success { image_url: String },
    Failure { message: String },
}

impl InferenceOutcome {
    pub fn success(image_url: impl Into<String>) -> Self {
        Self::Success {
            image_url: image_url.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn image_url(&self) -> Option<&str> {
        match self {
            Self::Success { image_url } => Some(image_url),
            Self::Failure { .. } => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { message } => Some(message),
        }
    }

    /// Convert into a `Result` of image URL or failure message
    pub fn into_result(self) -> std::result::Result<String, String> {
        match self {
            Self::Success { image_url } => Ok(image_url),
            Self::Failure { message } => Err(message),
        }
    }
}

/// Response body shape: `{"success": true, "image_url": ...}` or `{"success": false, "error": ...}`
#[derive(Serialize)]
struct OutcomeBody<'a> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

impl Serialize for InferenceOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        OutcomeBody {
            success: self.is_success(),
            image_url: self.image_url(),
            error: self.message(),
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accessors() {
        let ok = InferenceOutcome::success("https://example.com/a.png");
        assert!(ok.is_success());
        assert_eq!(ok.image_url(), Some("https://example.com/a.png"));
        assert_eq!(ok.message(), None);

        let err = InferenceOutcome::failure("boom");
        assert!(!err.is_success());
        assert_eq!(err.message(), Some("boom"));
        assert_eq!(err.into_result(), Err("boom".to_string()));
    }

    #[test]
    fn test_serialize_body() {
        let ok = serde_json::to_value(InferenceOutcome::success("data:image/png;base64,AAAA"))
            .unwrap();
        assert_eq!(
            ok,
            json!({"success": true, "image_url": "data:image/png;base64,AAAA"})
        );

        let err = serde_json::to_value(InferenceOutcome::failure("Unknown error")).unwrap();
        assert_eq!(err, json!({"success": false, "error": "Unknown error"}));
    }
}
