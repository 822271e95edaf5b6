//! API Client: the single point of entry for every call to the matching backend.
//!
//! Ingestion, profile sync, match retrieval, and the notification self-test all
//! go through `ApiClient`. Each collaborator capability the pipeline needs is a
//! trait (`DocumentParser`, `ProfileStore`, `MatchSource`) so the orchestrator can
//! be driven by in-memory fakes.
//!
//! No retries happen at this layer. Requests carry no cookies or credentials.

use std::future::Future;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::errors::ClientError;

pub mod matches;
pub mod notifications;
pub mod parse_cv;
pub mod profiles;

pub use matches::MatchSource;
pub use notifications::{NotificationReport, NotificationResults, NotificationTally};
pub use parse_cv::DocumentParser;
pub use profiles::ProfileStore;

/// Tagged collaborator response: either the decoded payload or the reason the
/// collaborator gave for refusing.
#[derive(Debug, PartialEq)]
pub enum Reply<T> {
    Success(T),
    Failure { status: Option<u16>, reason: String },
}

impl<T: DeserializeOwned> Reply<T> {
    /// Classifies a raw HTTP exchange.
    ///
    /// Non-2xx and 2xx-with-`"success": false` are both failures; the reason is
    /// the body's `detail` when present, otherwise `fallback`.
    pub fn decode(status: u16, body: &[u8], fallback: &str) -> Result<Self, ClientError> {
        if !(200..300).contains(&status) {
            return Ok(Reply::Failure {
                status: Some(status),
                reason: failure_reason(body, fallback),
            });
        }

        let value: Value = serde_json::from_slice(body)?;
        if value.get("success").and_then(Value::as_bool) == Some(false) {
            return Ok(Reply::Failure {
                status: Some(status),
                reason: failure_reason(body, fallback),
            });
        }

        Ok(Reply::Success(serde_json::from_value(value)?))
    }
}

impl<T> Reply<T> {
    pub fn into_result(self) -> Result<T, ClientError> {
        match self {
            Reply::Success(payload) => Ok(payload),
            Reply::Failure { status, reason } => Err(ClientError::Rejected { status, reason }),
        }
    }
}

fn failure_reason(body: &[u8], fallback: &str) -> String {
    let detail = serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|v| v.get("detail").cloned());

    match detail {
        Some(Value::String(s)) if !s.trim().is_empty() => s,
        Some(Value::Null) | Some(Value::String(_)) | None => fallback.to_string(),
        // FastAPI validation errors arrive as an array of objects.
        Some(other) => other.to_string(),
    }
}

/// Races `fut` against `cancel`. A cancelled call resolves to `ClientError::Cancelled`.
pub(crate) async fn cancellable<T, F>(cancel: &CancellationToken, fut: F) -> Result<T, ClientError>
where
    F: Future<Output = Result<T, ClientError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ClientError::Cancelled),
        result = fut => result,
    }
}

/// HTTP client for the matching backend.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("Invalid API base URL '{base_url}'"))?;
        if base_url.cannot_be_a_base() {
            bail!("API base URL '{base_url}' cannot carry a path");
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends percent-encoded path segments to the base URL.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub(crate) fn http(&self) -> &Client {
        &self.client
    }

    /// Sends `request` and decodes the tagged reply, honouring `cancel`.
    pub(crate) async fn exchange<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        fallback: &str,
        cancel: &CancellationToken,
    ) -> Result<T, ClientError> {
        cancellable(cancel, async {
            let response = request.send().await?;
            let status = response.status().as_u16();
            let body = response.bytes().await?;
            debug!("API responded {} ({} bytes)", status, body.len());
            let payload = Reply::<T>::decode(status, &body, fallback)?.into_result()?;
            Ok::<T, ClientError>(payload)
        })
        .await
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Payload {
        data: u32,
    }

    #[test]
    fn test_decode_success() {
        let reply = Reply::<Payload>::decode(200, br#"{"success": true, "data": 7}"#, "x").unwrap();
        assert_eq!(reply, Reply::Success(Payload { data: 7 }));
    }

    #[test]
    fn test_decode_non_2xx_uses_detail() {
        let reply =
            Reply::<Payload>::decode(400, br#"{"detail": "Invalid file type"}"#, "fallback")
                .unwrap();
        assert_eq!(
            reply,
            Reply::Failure {
                status: Some(400),
                reason: "Invalid file type".to_string()
            }
        );
    }

    #[test]
    fn test_decode_non_2xx_without_json_falls_back() {
        let reply = Reply::<Payload>::decode(502, b"<html>bad gateway</html>", "Failed to parse CV")
            .unwrap();
        assert_eq!(
            reply.into_result().unwrap_err().to_string(),
            "Failed to parse CV"
        );
    }

    #[test]
    fn test_decode_structured_detail_is_compacted() {
        let body = br#"{"detail": [{"loc": ["body", "user_id"], "msg": "field required"}]}"#;
        let err = Reply::<Payload>::decode(422, body, "fallback")
            .unwrap()
            .into_result()
            .unwrap_err();
        assert!(err.to_string().contains("field required"));
        assert_eq!(err.status(), Some(422));
    }

    #[test]
    fn test_decode_success_false_is_failure() {
        let reply = Reply::<Payload>::decode(200, br#"{"success": false}"#, "nope").unwrap();
        assert_eq!(
            reply,
            Reply::Failure {
                status: Some(200),
                reason: "nope".to_string()
            }
        );
    }

    #[test]
    fn test_decode_malformed_success_body() {
        let err = Reply::<Payload>::decode(200, br#"{"success": true}"#, "x").unwrap_err();
        assert!(matches!(err, ClientError::Malformed(_)));
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let client = ApiClient::new("http://localhost:8000/", Duration::from_secs(1)).unwrap();
        let url = client.endpoint(&["api", "profiles", "a b/c"]);
        assert_eq!(url.as_str(), "http://localhost:8000/api/profiles/a%20b%2Fc");
    }

    #[test]
    fn test_endpoint_keeps_base_path_prefix() {
        let client = ApiClient::new("http://example.com/backend", Duration::from_secs(1)).unwrap();
        let url = client.endpoint(&["api", "parse-cv"]);
        assert_eq!(url.as_str(), "http://example.com/backend/api/parse-cv");
    }

    #[test]
    fn test_rejects_unusable_base_url() {
        assert!(ApiClient::new("not a url", Duration::from_secs(1)).is_err());
        assert!(ApiClient::new("mailto:someone@example.com", Duration::from_secs(1)).is_err());
    }

    #[tokio::test]
    async fn test_cancellable_short_circuits() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result: Result<(), ClientError> =
            cancellable(&cancel, std::future::pending()).await;
        assert!(result.unwrap_err().is_cancelled());
    }
}
