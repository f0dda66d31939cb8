//! Shared error response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Standard error response structure used across all API endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for client identification
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Additional error details (field errors, etc.)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,

    /// Timestamp when the error occurred
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
            timestamp: Utc::now(),
        }
    }

    /// Add a detail field to the error response
    pub fn add_detail(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let details = self.details.get_or_insert_with(HashMap::new);
        if let Ok(json_value) = serde_json::to_value(value) {
            details.insert(key.into(), json_value);
        }
        self
    }
}

/// Error codes returned by the password reset endpoints
pub mod error_codes {
    pub const VALIDATION_ERROR: &str = "validation_error";
    pub const INVALID_RECIPIENT: &str = "invalid_recipient";
    pub const INVALID_CODE: &str = "invalid_code";
    pub const ACCOUNT_NOT_FOUND: &str = "account_not_found";
    pub const WEAK_CREDENTIAL: &str = "weak_credential";
    pub const RATE_LIMITED: &str = "rate_limited";
    pub const DELIVERY_FAILED: &str = "delivery_failed";
    pub const IDENTITY_UNAVAILABLE: &str = "identity_unavailable";
    pub const INTERNAL_ERROR: &str = "internal_error";
    pub const NOT_FOUND: &str = "not_found";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_details() {
        let response = ErrorResponse::new(error_codes::WEAK_CREDENTIAL, "Password too weak")
            .add_detail("min_length", 8);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["error"], "weak_credential");
        assert_eq!(json["details"]["min_length"], 8);
    }

    #[test]
    fn test_error_response_omits_empty_details() {
        let response = ErrorResponse::new(error_codes::INVALID_CODE, "Invalid code");
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("details"));
    }
}
