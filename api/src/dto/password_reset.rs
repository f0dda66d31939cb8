use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RequestCodeRequest {
    /// Email address or E.164 phone number the code is sent to
    #[validate(length(min = 1, max = 254))]
    pub recipient: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestCodeResponse {
    pub message: String,
    pub expires_in: i64, // seconds until the code expires
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VerifyCodeRequest {
    #[validate(length(min = 1, max = 254))]
    pub recipient: String,

    #[validate(length(max = 16))]
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyCodeResponse {
    pub valid: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ConfirmResetRequest {
    #[validate(length(min = 1, max = 254))]
    pub recipient: String,

    #[validate(length(max = 16))]
    pub code: String,

    /// Strength rules belong to the identity provider; only the size is bounded here
    #[validate(length(max = 128))]
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmResetResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_code_validation() {
        let valid = RequestCodeRequest {
            recipient: "a@x.com".to_string(),
        };
        assert!(valid.validate().is_ok());

        let empty = RequestCodeRequest {
            recipient: String::new(),
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_confirm_request_bounds_password() {
        let request = ConfirmResetRequest {
            recipient: "a@x.com".to_string(),
            code: "483920".to_string(),
            new_password: "x".repeat(129),
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("new_password"));
    }
}
