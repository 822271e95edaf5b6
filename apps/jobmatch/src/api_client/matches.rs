use async_trait::async_trait;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::api_client::ApiClient;
use crate::errors::RetrievalError;
use crate::models::{JobMatch, MatchFilters};
use crate::session::SessionId;

const MATCHES_FALLBACK: &str = "Failed to fetch job matches";

/// Ranked opportunities for a synced profile.
///
/// Ordering is the collaborator's (descending total score in practice) and is
/// never changed here. An empty list is a valid answer, not an error.
#[async_trait]
pub trait MatchSource: Send + Sync {
    async fn fetch_matches(
        &self,
        session_id: &SessionId,
        filters: &MatchFilters,
        cancel: &CancellationToken,
    ) -> Result<Vec<JobMatch>, RetrievalError>;
}

#[derive(Debug, Deserialize)]
struct MatchesReply {
    #[serde(default)]
    matches: Vec<JobMatch>,
    #[serde(default)]
    timestamp: Option<String>,
}

/// GET /api/jobs/match/{userId}?remote_only&min_salary&employment_types
#[async_trait]
impl MatchSource for ApiClient {
    async fn fetch_matches(
        &self,
        session_id: &SessionId,
        filters: &MatchFilters,
        cancel: &CancellationToken,
    ) -> Result<Vec<JobMatch>, RetrievalError> {
        debug!("Fetching matches for {} with {:?}", session_id, filters);
        let request = self
            .http()
            .get(self.endpoint(&["api", "jobs", "match", session_id.as_str()]))
            .query(&filters.query_pairs());
        let reply: MatchesReply = self.exchange(request, MATCHES_FALLBACK, cancel).await?;

        for m in &reply.matches {
            if let Some(range) = m.job.salary_range {
                if !range.is_consistent() {
                    warn!(
                        "Job {} has salary min {} above max {:?}",
                        m.job.id, range.min, range.max
                    );
                }
            }
        }

        debug!(
            "Received {} matches for {} (generated {})",
            reply.matches.len(),
            session_id,
            reply.timestamp.as_deref().unwrap_or("unknown")
        );
        Ok(reply.matches)
    }
}
