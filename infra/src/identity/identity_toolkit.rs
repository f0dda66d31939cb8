//! Identity toolkit delegate
//!
//! Talks to a managed identity platform over its admin REST API:
//! `accounts:lookup` resolves a recipient to an account and
//! `accounts:update` overwrites the password.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, error, warn};

use bk_core::{AccountHandle, Credential, IdentityDelegate, IdentityError};
use bk_shared::config::IdentityConfig;
use bk_shared::utils::mask_recipient;

use crate::InfraError;

/// Identity delegate backed by the identity toolkit REST API
pub struct IdentityToolkitDelegate {
    client: Client,
    base_url: String,
    project_id: Option<String>,
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<ToolkitUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToolkitUser {
    local_id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

impl IdentityToolkitDelegate {
    /// Create a delegate from configuration
    ///
    /// Fails when no access token is configured.
    pub fn new(config: &IdentityConfig) -> Result<Self, InfraError> {
        let access_token = config
            .access_token
            .clone()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                InfraError::Config("IDENTITY_TOOLKIT_ACCESS_TOKEN not set".to_string())
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs.max(1)))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            access_token,
        })
    }

    fn endpoint(&self, operation: &str) -> String {
        match &self.project_id {
            Some(project) => format!("{}/projects/{}/accounts:{}", self.base_url, project, operation),
            None => format!("{}/accounts:{}", self.base_url, operation),
        }
    }

    async fn call(&self, operation: &str, body: Value) -> Result<Value, IdentityError> {
        let response = self
            .client
            .post(self.endpoint(operation))
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(operation, error = %e, "Identity toolkit request failed");
                IdentityError::Unavailable {
                    message: e.to_string(),
                }
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| IdentityError::Unavailable {
            message: e.to_string(),
        })?;

        if !status.is_success() {
            let mapped = map_error_response(status, &text);
            warn!(operation, status = status.as_u16(), error = %mapped, "Identity toolkit rejected request");
            return Err(mapped);
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| IdentityError::Unavailable {
            message: format!("malformed identity toolkit response: {}", e),
        })
    }
}

/// Request body for `accounts:lookup` by email or phone number
fn lookup_body(recipient: &str) -> Value {
    if recipient.contains('@') {
        json!({ "email": [recipient] })
    } else {
        json!({ "phoneNumber": [recipient] })
    }
}

/// Resolve the first account in an `accounts:lookup` response
///
/// An empty body means no match. A body that does not decode is a provider
/// failure, never a missing account.
fn parse_lookup(recipient: &str, response: Value) -> Result<Option<AccountHandle>, IdentityError> {
    if response.is_null() {
        return Ok(None);
    }

    let lookup: LookupResponse =
        serde_json::from_value(response).map_err(|e| IdentityError::Unavailable {
            message: format!("unexpected identity toolkit lookup response: {}", e),
        })?;

    Ok(lookup
        .users
        .into_iter()
        .next()
        .map(|user| AccountHandle::new(user.local_id, recipient)))
}

/// Map a failed toolkit response onto an identity error
///
/// Toolkit errors carry a code in `error.message`, optionally followed by
/// ` : <detail>`.
fn map_error_response(status: StatusCode, body: &str) -> IdentityError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_default();
    let (code, detail) = match message.split_once(" : ") {
        Some((code, detail)) => (code.trim(), detail.trim()),
        None => (message.trim(), ""),
    };

    match code {
        "USER_NOT_FOUND" | "EMAIL_NOT_FOUND" => IdentityError::NotFound,
        "WEAK_PASSWORD" => IdentityError::WeakCredential {
            reason: if detail.is_empty() {
                "password rejected by identity provider".to_string()
            } else {
                detail.to_string()
            },
        },
        "TOO_MANY_ATTEMPTS_TRY_LATER" | "QUOTA_EXCEEDED" => IdentityError::RateLimited,
        _ if status == StatusCode::TOO_MANY_REQUESTS => IdentityError::RateLimited,
        _ if status == StatusCode::NOT_FOUND => IdentityError::NotFound,
        _ => IdentityError::Unavailable {
            message: if code.is_empty() {
                format!("identity toolkit returned {}", status)
            } else {
                format!("identity toolkit returned {}: {}", status, code)
            },
        },
    }
}

#[async_trait]
impl IdentityDelegate for IdentityToolkitDelegate {
    async fn find_account(&self, recipient: &str) -> Result<Option<AccountHandle>, IdentityError> {
        let response = self.call("lookup", lookup_body(recipient)).await?;
        let account = parse_lookup(recipient, response)?;

        debug!(
            recipient = %mask_recipient(recipient),
            found = account.is_some(),
            "Identity toolkit lookup completed"
        );
        Ok(account)
    }

    async fn update_credential(
        &self,
        account: &AccountHandle,
        credential: &Credential,
    ) -> Result<(), IdentityError> {
        let body = json!({
            "localId": account.account_id,
            "password": credential.expose(),
        });
        self.call("update", body).await?;
        Ok(())
    }
}
