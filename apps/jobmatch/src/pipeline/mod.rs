// Candidate-to-match pipeline: ingest → sync profile → retrieve matches.
// One run at a time per orchestrator; phase changes are published over a
// watch channel so the presentation layer never writes pipeline state.

pub mod orchestrator;
pub mod phase;

pub use orchestrator::{Collaborators, Orchestrator, PipelineDefaults};
pub use phase::{PipelinePhase, PipelineSnapshot};
