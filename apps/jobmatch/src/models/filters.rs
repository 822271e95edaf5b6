use serde::{Deserialize, Serialize};

pub const DEFAULT_MIN_SALARY: u64 = 100_000;

/// Criteria sent with every match request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchFilters {
    pub remote_only: bool,
    /// `None` leaves the threshold to the collaborator.
    pub min_salary: Option<u64>,
    /// Empty means every type the collaborator supports.
    pub employment_types: Vec<String>,
}

impl Default for MatchFilters {
    fn default() -> Self {
        Self {
            remote_only: true,
            min_salary: Some(DEFAULT_MIN_SALARY),
            employment_types: Vec::new(),
        }
    }
}

impl MatchFilters {
    /// Query pairs for `GET /api/jobs/match/{userId}`; employment types are comma-joined.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("remote_only", self.remote_only.to_string())];
        if let Some(min_salary) = self.min_salary {
            pairs.push(("min_salary", min_salary.to_string()));
        }
        if !self.employment_types.is_empty() {
            pairs.push(("employment_types", self.employment_types.join(",")));
        }
        pairs
    }
}
