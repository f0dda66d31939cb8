//! Email notification sender
//!
//! Delivers verification codes through a transactional mail API
//! (SendGrid v3 `mail/send` request shape).
//!
//! ## Features
//!
//! - Recipient validation before any request is made
//! - Bounded retries with exponential backoff on 429, 5xx and transport errors
//! - Address masking in logs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use bk_core::{DeliveryError, NotificationSender};
use bk_shared::config::EmailSettings;
use bk_shared::utils::{is_valid_email, mask_recipient};

use super::code_message;
use crate::InfraError;

/// Mail API email sender
pub struct EmailNotificationSender {
    client: Client,
    settings: EmailSettings,
}

/// Outcome of a single send attempt
enum Attempt {
    Sent(String),
    Retry(String),
    Fatal(String),
}

impl EmailNotificationSender {
    /// Create a new email sender
    ///
    /// The sender address must be a valid email address and the API key
    /// must be set.
    pub fn new(settings: EmailSettings) -> Result<Self, InfraError> {
        if settings.api_key.is_empty() {
            return Err(InfraError::Config("EMAIL_API_KEY must be set".to_string()));
        }
        if !is_valid_email(&settings.from_address) {
            return Err(InfraError::Config(
                "EMAIL_FROM_ADDRESS must be a valid email address".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs.max(1)))
            .build()?;

        info!(
            from = %mask_recipient(&settings.from_address),
            api_url = %settings.api_url,
            "Email notification sender initialized"
        );

        Ok(Self { client, settings })
    }

    fn payload(&self, to: &str, body: &str) -> Value {
        let mut from = json!({ "email": self.settings.from_address });
        if let Some(name) = &self.settings.from_name {
            from["name"] = json!(name);
        }

        json!({
            "personalizations": [{ "to": [{ "email": to }] }],
            "from": from,
            "subject": self.settings.subject,
            "content": [{ "type": "text/plain", "value": body }],
        })
    }

    async fn attempt(&self, payload: &Value) -> Attempt {
        let response = match self
            .client
            .post(&self.settings.api_url)
            .bearer_auth(&self.settings.api_key)
            .json(payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return Attempt::Retry(e.to_string()),
        };

        let status = response.status();
        if status.is_success() {
            let message_id = response
                .headers()
                .get("x-message-id")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
                .unwrap_or_else(|| format!("email_{}", Uuid::new_v4()));
            return Attempt::Sent(message_id);
        }

        let detail = format!("mail API returned {}", status);
        if is_retryable_status(status) {
            Attempt::Retry(detail)
        } else {
            Attempt::Fatal(detail)
        }
    }

    /// Send the email with retry logic
    async fn send_with_retry(&self, to: &str, body: &str) -> Result<String, DeliveryError> {
        let payload = self.payload(to, body);
        let max_attempts = self.settings.max_retries.max(1);
        let mut attempts = 0;
        let mut delay = Duration::from_millis(self.settings.retry_delay_ms);

        loop {
            attempts += 1;

            debug!(
                attempt = attempts,
                max_attempts,
                recipient = %mask_recipient(to),
                "Sending verification email"
            );

            match self.attempt(&payload).await {
                Attempt::Sent(message_id) => {
                    info!(
                        recipient = %mask_recipient(to),
                        message_id = %message_id,
                        event = "verification_email_sent",
                        "Verification email sent"
                    );
                    return Ok(message_id);
                }
                Attempt::Fatal(detail) => {
                    error!(error = %detail, "Mail API rejected verification email");
                    return Err(DeliveryError::Provider {
                        message: format!("invalid request: {}", detail),
                    });
                }
                Attempt::Retry(detail) => {
                    error!(
                        attempt = attempts,
                        max_attempts,
                        error = %detail,
                        "Failed to send verification email"
                    );

                    if attempts >= max_attempts {
                        return Err(DeliveryError::Provider {
                            message: format!(
                                "failed to send email after {} attempts: {}",
                                attempts, detail
                            ),
                        });
                    }

                    warn!(delay_ms = delay.as_millis() as u64, "Retrying verification email");
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
            }
        }
    }
}

/// Rate limits and server errors are worth retrying, client errors are not
fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

#[async_trait]
impl NotificationSender for EmailNotificationSender {
    async fn deliver_code(
        &self,
        recipient: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<String, DeliveryError> {
        if !is_valid_email(recipient) {
            return Err(DeliveryError::Unreachable {
                reason: format!("{} is not an email address", mask_recipient(recipient)),
            });
        }

        let body = code_message(code, expires_at, Utc::now());
        self.send_with_retry(recipient, &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    fn settings(api_url: &str) -> EmailSettings {
        EmailSettings {
            api_url: api_url.to_string(),
            api_key: "SG.test".to_string(),
            from_address: "no-reply@bookly.app".to_string(),
            from_name: Some("Bookly".to_string()),
            subject: "Your Bookly password reset code".to_string(),
            max_retries: 3,
            retry_delay_ms: 10,
            request_timeout_secs: 5,
        }
    }

    // Read one full HTTP request (headers plus Content-Length body)
    async fn read_request(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf);
            if let Some(head_end) = text.find("\r\n\r\n") {
                let content_length = text[..head_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= head_end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    type Requests = Arc<tokio::sync::Mutex<Vec<String>>>;

    // Serve the canned responses in order, one per connection
    async fn mail_api(responses: Vec<&'static str>) -> (String, Arc<AtomicUsize>, Requests) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/v3/mail/send", listener.local_addr().unwrap());
        let hits = Arc::new(AtomicUsize::new(0));
        let requests = Arc::new(tokio::sync::Mutex::new(Vec::new()));

        let counter = hits.clone();
        let seen = requests.clone();
        tokio::spawn(async move {
            for response in responses {
                let (mut stream, _) = listener.accept().await.unwrap();
                let request = read_request(&mut stream).await;
                seen.lock().await.push(request);
                counter.fetch_add(1, Ordering::SeqCst);
                stream.write_all(response.as_bytes()).await.unwrap();
                stream.shutdown().await.ok();
            }
        });

        (url, hits, requests)
    }

    const ACCEPTED: &str =
        "HTTP/1.1 202 Accepted\r\nX-Message-Id: msg-42\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";
    const UNAVAILABLE: &str =
        "HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";
    const BAD_REQUEST: &str =
        "HTTP/1.1 400 Bad Request\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";

    #[test]
    fn test_settings_validation() {
        let mut missing_key = settings("http://localhost/send");
        missing_key.api_key.clear();
        assert!(matches!(
            EmailNotificationSender::new(missing_key),
            Err(InfraError::Config(_))
        ));

        let mut bad_from = settings("http://localhost/send");
        bad_from.from_address = "bookly".to_string();
        assert!(matches!(
            EmailNotificationSender::new(bad_from),
            Err(InfraError::Config(_))
        ));
    }

    #[test]
    fn test_payload_shape() {
        let sender = EmailNotificationSender::new(settings("http://localhost/send")).unwrap();
        let payload = sender.payload("a@x.com", "Your code is 483920");

        assert_eq!(payload["personalizations"][0]["to"][0]["email"], "a@x.com");
        assert_eq!(payload["from"]["email"], "no-reply@bookly.app");
        assert_eq!(payload["from"]["name"], "Bookly");
        assert_eq!(payload["content"][0]["value"], "Your code is 483920");
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable_status(StatusCode::BAD_GATEWAY));
        assert!(!is_retryable_status(StatusCode::BAD_REQUEST));
        assert!(!is_retryable_status(StatusCode::UNAUTHORIZED));
    }

    #[tokio::test]
    async fn test_phone_recipient_is_unreachable() {
        let sender = EmailNotificationSender::new(settings("http://localhost/send")).unwrap();
        let result = sender.deliver_code("+61412345678", "483920", Utc::now()).await;
        assert!(matches!(result, Err(DeliveryError::Unreachable { .. })));
    }

    #[tokio::test]
    async fn test_delivers_after_server_error() {
        let (url, hits, requests) = mail_api(vec![UNAVAILABLE, ACCEPTED]).await;
        let sender = EmailNotificationSender::new(settings(&url)).unwrap();

        let id = sender
            .deliver_code("a@x.com", "483920", Utc::now() + chrono::Duration::minutes(10))
            .await
            .unwrap();

        assert_eq!(id, "msg-42");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        let requests = requests.lock().await;
        assert!(requests[1].to_lowercase().contains("authorization: bearer sg.test"));
        assert!(requests[1].contains("483920"));
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let (url, hits, _) = mail_api(vec![BAD_REQUEST]).await;
        let sender = EmailNotificationSender::new(settings(&url)).unwrap();

        let result = sender.deliver_code("a@x.com", "483920", Utc::now()).await;
        assert!(matches!(result, Err(DeliveryError::Provider { .. })));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
