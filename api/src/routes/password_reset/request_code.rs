use actix_web::{web, HttpResponse};
use validator::Validate;

use bk_core::{IdentityDelegate, NotificationSender};
use bk_shared::utils::mask_recipient;

use crate::app::AppState;
use crate::dto::{RequestCodeRequest, RequestCodeResponse};
use crate::handlers::{validation_error_response, verification_error_response};

/// Handler for POST /api/v1/password-reset/request-code
///
/// Issues a verification code and sends it to the recipient.
///
/// # Request Body
///
/// ```json
/// { "recipient": "a@x.com" }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// The body is the same whether or not an account exists for the recipient.
/// ```json
/// {
///     "message": "If an account exists for this recipient, a verification code has been sent",
///     "expires_in": 600
/// }
/// ```
///
/// ## Errors
/// - 400 `validation_error` / `invalid_recipient`
/// - 503 `delivery_failed`
pub async fn request_code<I, N>(
    state: web::Data<AppState<I, N>>,
    request: web::Json<RequestCodeRequest>,
) -> HttpResponse
where
    I: IdentityDelegate + ?Sized + 'static,
    N: NotificationSender + ?Sized + 'static,
{
    if let Err(errors) = request.validate() {
        tracing::warn!(error = %errors, "Validation failed for request_code");
        return validation_error_response(&errors);
    }

    match state.manager.issue(&request.recipient).await {
        Ok(issued) => {
            tracing::info!(
                recipient = %mask_recipient(&issued.recipient),
                event = "password_reset_code_requested",
                "Password reset code requested"
            );
            HttpResponse::Ok().json(RequestCodeResponse {
                message: "If an account exists for this recipient, a verification code has been sent"
                    .to_string(),
                expires_in: state.manager.config().code_ttl().num_seconds(),
            })
        }
        Err(error) => verification_error_response(&error),
    }
}
