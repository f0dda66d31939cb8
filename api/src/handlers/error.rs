//! Mapping of domain and request errors onto HTTP responses

use actix_web::{error::JsonPayloadError, HttpRequest, HttpResponse};
use std::collections::HashMap;
use validator::ValidationErrors;

use bk_core::errors::{IdentityError, VerificationError};
use bk_shared::errors::{error_codes, ErrorResponse};

/// Single message for every code rejection, so callers cannot tell
/// a wrong code from an expired or missing one
pub const INVALID_CODE_MESSAGE: &str = "The verification code is invalid or has expired";

/// Convert a verification error into the matching HTTP response
pub fn verification_error_response(error: &VerificationError) -> HttpResponse {
    match error {
        VerificationError::InvalidRecipient => HttpResponse::BadRequest().json(ErrorResponse::new(
            error_codes::INVALID_RECIPIENT,
            "Recipient must be a non-empty email address or phone number",
        )),
        VerificationError::CodeNotFound
        | VerificationError::CodeExpired
        | VerificationError::CodeMismatch => HttpResponse::BadRequest()
            .json(ErrorResponse::new(error_codes::INVALID_CODE, INVALID_CODE_MESSAGE)),
        VerificationError::AccountNotFound => HttpResponse::NotFound().json(ErrorResponse::new(
            error_codes::ACCOUNT_NOT_FOUND,
            "No account is registered for this recipient",
        )),
        VerificationError::DeliveryFailed { .. } => HttpResponse::ServiceUnavailable().json(
            ErrorResponse::new(
                error_codes::DELIVERY_FAILED,
                "The verification code could not be delivered. Please try again later",
            ),
        ),
        VerificationError::CredentialUpdateFailed { reason } => identity_error_response(reason),
        VerificationError::Internal { message } => {
            tracing::error!(error = %message, "Internal verification error");
            HttpResponse::InternalServerError().json(ErrorResponse::new(
                error_codes::INTERNAL_ERROR,
                "An internal error occurred",
            ))
        }
    }
}

fn identity_error_response(error: &IdentityError) -> HttpResponse {
    match error {
        IdentityError::WeakCredential { reason } => HttpResponse::UnprocessableEntity().json(
            ErrorResponse::new(
                error_codes::WEAK_CREDENTIAL,
                "The new password does not meet the password policy",
            )
            .add_detail("reason", reason),
        ),
        IdentityError::RateLimited => HttpResponse::TooManyRequests().json(ErrorResponse::new(
            error_codes::RATE_LIMITED,
            "Too many attempts. Please try again later",
        )),
        IdentityError::NotFound => HttpResponse::NotFound().json(ErrorResponse::new(
            error_codes::ACCOUNT_NOT_FOUND,
            "No account is registered for this recipient",
        )),
        IdentityError::Unavailable { .. } => HttpResponse::ServiceUnavailable().json(
            ErrorResponse::new(
                error_codes::IDENTITY_UNAVAILABLE,
                "The identity service is temporarily unavailable",
            ),
        ),
    }
}

/// Convert request validation failures into a 400 response listing the fields
pub fn validation_error_response(errors: &ValidationErrors) -> HttpResponse {
    let fields: HashMap<String, Vec<String>> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errors)| {
            let messages = errors
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect();

    HttpResponse::BadRequest().json(
        ErrorResponse::new(error_codes::VALIDATION_ERROR, "Invalid request data")
            .add_detail("fields", fields),
    )
}

/// JSON extractor error handler producing the shared error shape
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = HttpResponse::BadRequest().json(ErrorResponse::new(
        error_codes::VALIDATION_ERROR,
        format!("Malformed request body: {}", err),
    ));
    actix_web::error::InternalError::from_response(err, response).into()
}

/// Default handler for unknown routes
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_code_rejections_share_status() {
        for error in [
            VerificationError::CodeNotFound,
            VerificationError::CodeExpired,
            VerificationError::CodeMismatch,
        ] {
            assert_eq!(
                verification_error_response(&error).status(),
                StatusCode::BAD_REQUEST
            );
        }
    }

    #[test]
    fn test_credential_update_failures() {
        let cases = [
            (
                IdentityError::WeakCredential {
                    reason: "too short".to_string(),
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (IdentityError::RateLimited, StatusCode::TOO_MANY_REQUESTS),
            (IdentityError::NotFound, StatusCode::NOT_FOUND),
            (
                IdentityError::Unavailable {
                    message: "timeout".to_string(),
                },
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];

        for (reason, status) in cases {
            let error = VerificationError::CredentialUpdateFailed { reason };
            assert_eq!(verification_error_response(&error).status(), status);
        }
    }

    #[test]
    fn test_account_not_found_and_delivery() {
        assert_eq!(
            verification_error_response(&VerificationError::AccountNotFound).status(),
            StatusCode::NOT_FOUND
        );
        let delivery = VerificationError::DeliveryFailed {
            reason: bk_core::errors::DeliveryError::Provider {
                message: "down".to_string(),
            },
        };
        assert_eq!(
            verification_error_response(&delivery).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
