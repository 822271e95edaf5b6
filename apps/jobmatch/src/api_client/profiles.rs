use async_trait::async_trait;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::api_client::ApiClient;
use crate::errors::{ClientError, SyncError};
use crate::models::{Profile, ProfileUpdate};
use crate::session::SessionId;

const SYNC_FALLBACK: &str = "Failed to update profile";
const FETCH_FALLBACK: &str = "Failed to fetch profile";

/// Durable profile records keyed by session id.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Full upsert. Returns the canonical record with its fresh `last_updated`.
    async fn sync(
        &self,
        update: &ProfileUpdate,
        cancel: &CancellationToken,
    ) -> Result<Profile, SyncError>;

    /// Looks a profile up. `Ok(None)` when the store has no record for `session_id`.
    async fn fetch(
        &self,
        session_id: &SessionId,
        cancel: &CancellationToken,
    ) -> Result<Option<Profile>, SyncError>;
}

#[derive(Debug, Deserialize)]
struct ProfileReply {
    profile: Profile,
}

#[async_trait]
impl ProfileStore for ApiClient {
    /// POST /api/profiles
    async fn sync(
        &self,
        update: &ProfileUpdate,
        cancel: &CancellationToken,
    ) -> Result<Profile, SyncError> {
        debug!("Syncing profile {}", update.user_id);
        let request = self
            .http()
            .post(self.endpoint(&["api", "profiles"]))
            .json(update);
        let reply: ProfileReply = self.exchange(request, SYNC_FALLBACK, cancel).await?;
        debug!(
            "Profile {} stored at {}",
            reply.profile.user_id, reply.profile.last_updated
        );
        Ok(reply.profile)
    }

    /// GET /api/profiles/{userId}
    async fn fetch(
        &self,
        session_id: &SessionId,
        cancel: &CancellationToken,
    ) -> Result<Option<Profile>, SyncError> {
        let request = self
            .http()
            .get(self.endpoint(&["api", "profiles", session_id.as_str()]));
        match self
            .exchange::<ProfileReply>(request, FETCH_FALLBACK, cancel)
            .await
        {
            Ok(reply) => Ok(Some(reply.profile)),
            Err(ClientError::Rejected {
                status: Some(404), ..
            }) => Ok(None),
            Err(e) => Err(SyncError(e)),
        }
    }
}
