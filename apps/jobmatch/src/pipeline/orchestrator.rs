//! Pipeline Orchestrator: sequences ingestion, profile sync, and match retrieval.
//!
//! Transitions:
//!   Idle      --start_upload-->          Uploading (mint session id, ingest)
//!   Uploading --ingestion succeeded-->   Matching  (sync profile, fetch matches)
//!   Matching  --retrieval succeeded-->   Idle      (publish matches, clear error)
//!   Uploading|Matching --any failure-->  Idle      (publish empty list + error)
//!
//! A run holds the pipeline exclusively; a second `start_upload` is rejected
//! with `PipelineError::Busy`. Nothing is retried. Each run gets a child of the
//! orchestrator's lifetime token, and that token is checked before every
//! transition is committed, so `retire()` discards in-flight outcomes.

use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api_client::{ApiClient, DocumentParser, MatchSource, ProfileStore};
use crate::errors::PipelineError;
use crate::models::{Document, JobMatch, MatchFilters, Preferences, ProfileUpdate};
use crate::pipeline::phase::{PipelinePhase, PipelineSnapshot};
use crate::session::{new_session_id, SessionId};

/// The three collaborators a run depends on.
#[derive(Clone)]
pub struct Collaborators {
    pub parser: Arc<dyn DocumentParser>,
    pub profiles: Arc<dyn ProfileStore>,
    pub matches: Arc<dyn MatchSource>,
}

impl Collaborators {
    /// All three capabilities served by one backend.
    pub fn from_client(client: ApiClient) -> Self {
        let client = Arc::new(client);
        Self {
            parser: client.clone(),
            profiles: client.clone(),
            matches: client,
        }
    }
}

/// What every run sends unless the caller overrides it.
#[derive(Debug, Clone)]
pub struct PipelineDefaults {
    pub preferences: Preferences,
    pub filters: MatchFilters,
    pub email: Option<String>,
}

impl Default for PipelineDefaults {
    fn default() -> Self {
        Self {
            preferences: Preferences::pipeline_defaults(),
            filters: MatchFilters::default(),
            email: None,
        }
    }
}

pub struct Orchestrator {
    collaborators: Collaborators,
    defaults: PipelineDefaults,
    state: watch::Sender<PipelineSnapshot>,
    lifetime: CancellationToken,
}

impl Orchestrator {
    pub fn new(collaborators: Collaborators, defaults: PipelineDefaults) -> Self {
        let (state, _) = watch::channel(PipelineSnapshot::default());
        Self {
            collaborators,
            defaults,
            state,
            lifetime: CancellationToken::new(),
        }
    }

    pub fn phase(&self) -> PipelinePhase {
        self.state.borrow().phase
    }

    pub fn snapshot(&self) -> PipelineSnapshot {
        self.state.borrow().clone()
    }

    /// Read-only feed of snapshots for the presentation layer.
    pub fn subscribe(&self) -> watch::Receiver<PipelineSnapshot> {
        self.state.subscribe()
    }

    pub fn defaults(&self) -> &PipelineDefaults {
        &self.defaults
    }

    /// Marks this instance as replaced. Any in-flight run resolves to
    /// `PipelineError::Superseded` without publishing, and later runs do too.
    pub fn retire(&self) {
        if !self.lifetime.is_cancelled() {
            info!("Orchestrator retired; in-flight results will be discarded");
        }
        self.lifetime.cancel();
    }

    /// Runs the whole pipeline for `document` and returns the published matches.
    ///
    /// `preferences` are merged over the configured defaults before the
    /// profile is synced.
    pub async fn start_upload(
        &self,
        document: Document,
        preferences: Option<Preferences>,
    ) -> Result<Arc<Vec<JobMatch>>, PipelineError> {
        if self.lifetime.is_cancelled() {
            debug!("Ignoring upload of '{}' on a retired orchestrator", document.file_name);
            return Err(PipelineError::Superseded);
        }

        let mut minted: Option<SessionId> = None;
        self.state.send_if_modified(|s| {
            if !s.phase.is_idle() {
                return false;
            }
            let session_id = new_session_id();
            s.phase = PipelinePhase::Uploading;
            s.session_id = Some(session_id.clone());
            minted = Some(session_id);
            true
        });
        let Some(session_id) = minted else {
            warn!(
                "Rejected upload of '{}': a pipeline run is already in progress",
                document.file_name
            );
            return Err(PipelineError::Busy);
        };

        info!(session_id = %session_id, "Uploading '{}'", document.file_name);
        let guard = RunGuard::new(&self.state);
        let run = self.lifetime.child_token();
        let outcome = self.run(&session_id, &document, preferences, &run).await;
        guard.disarm();
        self.settle(&session_id, &run, outcome)
    }

    async fn run(
        &self,
        session_id: &SessionId,
        document: &Document,
        preferences: Option<Preferences>,
        cancel: &CancellationToken,
    ) -> Result<Vec<JobMatch>, PipelineError> {
        let candidate = self.collaborators.parser.ingest(document, cancel).await?;
        self.advance(cancel, PipelinePhase::Matching)?;
        info!(
            session_id = %session_id,
            "CV parsed ({} skills); syncing profile",
            candidate.skills.len()
        );

        let preferences = match preferences {
            Some(p) => p.merged_over(&self.defaults.preferences),
            None => self.defaults.preferences.clone(),
        };
        let update = ProfileUpdate {
            user_id: session_id.clone(),
            cv_data: candidate,
            email: self.defaults.email.clone(),
            preferences: Some(preferences),
        };
        let profile = self.collaborators.profiles.sync(&update, cancel).await?;
        if cancel.is_cancelled() {
            return Err(PipelineError::Superseded);
        }
        debug!(session_id = %session_id, "Profile synced at {}", profile.last_updated);

        let matches = self
            .collaborators
            .matches
            .fetch_matches(session_id, &self.defaults.filters, cancel)
            .await?;
        Ok(matches)
    }

    fn advance(&self, cancel: &CancellationToken, phase: PipelinePhase) -> Result<(), PipelineError> {
        if cancel.is_cancelled() {
            return Err(PipelineError::Superseded);
        }
        self.state.send_modify(|s| s.phase = phase);
        Ok(())
    }

    /// Commits the terminal `Idle` transition for a finished run.
    fn settle(
        &self,
        session_id: &SessionId,
        cancel: &CancellationToken,
        outcome: Result<Vec<JobMatch>, PipelineError>,
    ) -> Result<Arc<Vec<JobMatch>>, PipelineError> {
        if cancel.is_cancelled() {
            info!(session_id = %session_id, "Discarding outcome of superseded run");
            self.state.send_modify(|s| s.phase = PipelinePhase::Idle);
            return Err(PipelineError::Superseded);
        }

        match outcome {
            Ok(matches) => {
                let published = Arc::new(matches);
                info!(
                    session_id = %session_id,
                    "Pipeline finished with {} matches",
                    published.len()
                );
                self.state.send_modify(|s| {
                    s.phase = PipelinePhase::Idle;
                    s.matches = Arc::clone(&published);
                    s.last_error = None;
                });
                Ok(published)
            }
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "Pipeline run failed");
                self.state.send_modify(|s| {
                    s.phase = PipelinePhase::Idle;
                    s.matches = Arc::default();
                    s.last_error = Some(e.to_string());
                });
                Err(e)
            }
        }
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        self.lifetime.cancel();
    }
}

/// Returns the phase to `Idle` if a run's future is dropped before it settles.
struct RunGuard<'a> {
    state: &'a watch::Sender<PipelineSnapshot>,
    armed: bool,
}

impl<'a> RunGuard<'a> {
    fn new(state: &'a watch::Sender<PipelineSnapshot>) -> Self {
        Self { state, armed: true }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!("Pipeline run abandoned before completion");
            self.state.send_modify(|s| s.phase = PipelinePhase::Idle);
        }
    }
}
