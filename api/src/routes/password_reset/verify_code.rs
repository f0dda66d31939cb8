use actix_web::{web, HttpResponse};
use validator::Validate;

use bk_core::{IdentityDelegate, NotificationSender};

use crate::app::AppState;
use crate::dto::{VerifyCodeRequest, VerifyCodeResponse};
use crate::handlers::validation_error_response;

/// Handler for POST /api/v1/password-reset/verify-code
///
/// Reports whether a code is currently valid. Never consumes the code, so a
/// client can check it before asking the user for a new password.
pub async fn verify_code<I, N>(
    state: web::Data<AppState<I, N>>,
    request: web::Json<VerifyCodeRequest>,
) -> HttpResponse
where
    I: IdentityDelegate + ?Sized + 'static,
    N: NotificationSender + ?Sized + 'static,
{
    if let Err(errors) = request.validate() {
        return validation_error_response(&errors);
    }

    let valid = state
        .manager
        .validate(&request.recipient, &request.code)
        .await;

    HttpResponse::Ok().json(VerifyCodeResponse { valid })
}
