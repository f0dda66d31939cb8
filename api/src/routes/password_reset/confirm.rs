use actix_web::{web, HttpResponse};
use validator::Validate;

use bk_core::{Credential, IdentityDelegate, NotificationSender};
use bk_shared::utils::mask_recipient;

use crate::app::AppState;
use crate::dto::{ConfirmResetRequest, ConfirmResetResponse};
use crate::handlers::{validation_error_response, verification_error_response};

/// Handler for POST /api/v1/password-reset/confirm
///
/// Resets the password of the account behind the recipient and consumes
/// the code.
///
/// # Request Body
///
/// ```json
/// {
///     "recipient": "a@x.com",
///     "code": "483920",
///     "new_password": "NewPass1!"
/// }
/// ```
///
/// ## Errors
/// - 400 `invalid_code` for a missing, expired or wrong code
/// - 404 `account_not_found`
/// - 422 `weak_credential` (the code stays valid for a retry)
/// - 429 `rate_limited`
/// - 503 `identity_unavailable`
pub async fn confirm<I, N>(
    state: web::Data<AppState<I, N>>,
    request: web::Json<ConfirmResetRequest>,
) -> HttpResponse
where
    I: IdentityDelegate + ?Sized + 'static,
    N: NotificationSender + ?Sized + 'static,
{
    if let Err(errors) = request.validate() {
        return validation_error_response(&errors);
    }

    let ConfirmResetRequest {
        recipient,
        code,
        new_password,
    } = request.into_inner();

    match state
        .manager
        .reset_credential(&recipient, &code, Credential::new(new_password))
        .await
    {
        Ok(()) => {
            tracing::info!(
                recipient = %mask_recipient(&recipient),
                event = "password_reset_confirmed",
                "Password reset confirmed"
            );
            HttpResponse::Ok().json(ConfirmResetResponse {
                message: "Password has been reset".to_string(),
            })
        }
        Err(error) => {
            tracing::info!(
                recipient = %mask_recipient(&recipient),
                reason = error.kind(),
                event = "password_reset_rejected",
                "Password reset rejected"
            );
            verification_error_response(&error)
        }
    }
}
