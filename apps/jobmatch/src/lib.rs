//! Résumé-to-opportunities client: uploads a CV, syncs an anonymous profile,
//! and retrieves ranked job matches from the matching backend.

pub mod api_client;
pub mod config;
pub mod errors;
pub mod models;
pub mod pipeline;
pub mod presentation;
pub mod session;

pub use api_client::ApiClient;
pub use config::Config;
pub use errors::PipelineError;
pub use pipeline::{Collaborators, Orchestrator, PipelineDefaults, PipelinePhase, PipelineSnapshot};
