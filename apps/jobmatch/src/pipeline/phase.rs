use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::models::JobMatch;
use crate::session::SessionId;

/// Where the orchestrator is in a run. There is no terminal state: every run
/// ends back at `Idle`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelinePhase {
    #[default]
    Idle,
    Uploading,
    Matching,
}

impl PipelinePhase {
    pub fn is_idle(self) -> bool {
        self == PipelinePhase::Idle
    }
}

impl fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PipelinePhase::Idle => "idle",
            PipelinePhase::Uploading => "uploading",
            PipelinePhase::Matching => "matching",
        })
    }
}

/// Everything the presentation layer may read, published atomically so phase
/// and session id are never observed torn.
#[derive(Debug, Clone, Default)]
pub struct PipelineSnapshot {
    pub phase: PipelinePhase,
    pub session_id: Option<SessionId>,
    pub matches: Arc<Vec<JobMatch>>,
    pub last_error: Option<String>,
}
