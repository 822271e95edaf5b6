use thiserror::Error;

/// Failure of a single collaborator call, shared by every HTTP client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The collaborator answered but refused the request. `reason` is its
    /// human-readable `detail` when present, otherwise the call's generic message.
    #[error("{reason}")]
    Rejected { status: Option<u16>, reason: String },

    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("request cancelled")]
    Cancelled,
}

impl ClientError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ClientError::Cancelled)
    }

    /// HTTP status of a rejection, if the collaborator sent one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Rejected { status, .. } => *status,
            ClientError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
#[error("{0}")]
pub struct IngestionError(#[from] pub ClientError);

#[derive(Debug, Error)]
#[error("{0}")]
pub struct SyncError(#[from] pub ClientError);

#[derive(Debug, Error)]
#[error("{0}")]
pub struct RetrievalError(#[from] pub ClientError);

macro_rules! reason_accessor {
    ($($ty:ty),*) => {
        $(impl $ty {
            /// The reason surfaced to the user.
            pub fn reason(&self) -> String {
                self.0.to_string()
            }

            pub fn is_cancelled(&self) -> bool {
                self.0.is_cancelled()
            }
        })*
    };
}

reason_accessor!(IngestionError, SyncError, RetrievalError);

/// Everything a pipeline run can end with other than a published match list.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("a pipeline run is already in progress")]
    Busy,

    #[error("CV ingestion failed: {0}")]
    Ingestion(#[from] IngestionError),

    #[error("profile sync failed: {0}")]
    Sync(#[from] SyncError),

    #[error("match retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("pipeline run was superseded")]
    Superseded,
}
