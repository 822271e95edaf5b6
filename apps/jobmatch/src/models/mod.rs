// Wire and domain types shared by the clients, the pipeline, and presentation.
// Everything here is plain data; the only logic is decoding leniency and
// preference merging.

pub mod candidate;
pub mod document;
pub mod filters;
pub mod job;
pub mod timestamp;

pub use candidate::{CandidateData, NotificationPreferences, Preferences, Profile, ProfileUpdate};
pub use document::{Document, DocumentKind};
pub use filters::MatchFilters;
pub use job::{JobListing, JobMatch, SalaryRange, ScoreDetails, StatusEntry};
