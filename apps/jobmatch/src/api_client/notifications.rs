//! Notification self-test. Delivery itself (Slack webhooks) happens server-side;
//! this only asks the backend to fire test messages and reports the tallies.

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::api_client::ApiClient;
use crate::errors::ClientError;

const NOTIFICATIONS_FALLBACK: &str = "Failed to test notifications";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationTally {
    pub success: u32,
    pub failed: u32,
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationResults {
    pub job_notifications: NotificationTally,
    pub pr_notifications: Vec<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationReport {
    pub results: NotificationResults,
    #[serde(default)]
    pub message: String,
}

impl NotificationReport {
    /// e.g. "3/4 successful"
    pub fn job_summary(&self) -> String {
        let tally = &self.results.job_notifications;
        format!("{}/{} successful", tally.success, tally.total)
    }

    pub fn pr_summary(&self) -> String {
        let prs = &self.results.pr_notifications;
        let delivered = prs.iter().filter(|ok| **ok).count();
        format!("{}/{} successful", delivered, prs.len())
    }
}

impl ApiClient {
    /// POST /api/test/notifications
    pub async fn test_notifications(
        &self,
        cancel: &CancellationToken,
    ) -> Result<NotificationReport, ClientError> {
        let request = self
            .http()
            .post(self.endpoint(&["api", "test", "notifications"]));
        let report: NotificationReport = self
            .exchange(request, NOTIFICATIONS_FALLBACK, cancel)
            .await?;
        info!(
            "Notification test: jobs {}, PRs {}",
            report.job_summary(),
            report.pr_summary()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_client::test_support;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::json;

    #[tokio::test]
    async fn test_notification_report_summaries() {
        let router = Router::new().route(
            "/api/test/notifications",
            post(|| async {
                Json(json!({
                    "success": true,
                    "results": {
                        "job_notifications": {"success": 2, "failed": 1, "total": 3},
                        "pr_notifications": [true, false]
                    },
                    "message": "Test notifications sent"
                }))
            }),
        );
        let client = test_support::serve(router).await;

        let report = client
            .test_notifications(&CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.job_summary(), "2/3 successful");
        assert_eq!(report.pr_summary(), "1/2 successful");
        assert_eq!(report.message, "Test notifications sent");
    }

    #[tokio::test]
    async fn test_notification_failure_reason() {
        let router = Router::new().route(
            "/api/test/notifications",
            post(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"detail": "Slack webhook URL not configured"})),
                )
            }),
        );
        let client = test_support::serve(router).await;

        let err = client
            .test_notifications(&CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Slack webhook URL not configured");
    }
}
