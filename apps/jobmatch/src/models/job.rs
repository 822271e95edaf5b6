use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Advertised pay band. `min` is always present; `max` is optional.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl SalaryRange {
    /// `min <= max` whenever `max` is present.
    pub fn is_consistent(&self) -> bool {
        self.max.map_or(true, |max| self.min <= max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobListing {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(
        default,
        deserialize_with = "lenient_salary_range",
        skip_serializing_if = "Option::is_none"
    )]
    pub salary_range: Option<SalaryRange>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub employment_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Output of the scoring collaborator. Scores are in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreDetails {
    pub total_score: f64,
    #[serde(default)]
    pub category_scores: BTreeMap<String, f64>,
    #[serde(default)]
    pub cv_relevance: f64,
    #[serde(default)]
    pub matched_keywords: Vec<String>,
    #[serde(default)]
    pub high_priority: bool,
}

impl ScoreDetails {
    pub fn category(&self, name: &str) -> Option<f64> {
        self.category_scores.get(name).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub status: String,
    #[serde(with = "crate::models::timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A scored listing as returned by the match collaborator. Read-only snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMatch {
    pub job: JobListing,
    pub score_details: ScoreDetails,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub status_history: Vec<StatusEntry>,
    #[serde(with = "crate::models::timestamp")]
    pub timestamp: DateTime<Utc>,
}

fn default_status() -> String {
    "new".to_string()
}

/// Accepts a full range, `null`, or a range object without `min` (`{}`),
/// the last two decoding as "no salary published".
fn lenient_salary_range<'de, D>(deserializer: D) -> Result<Option<SalaryRange>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct RawRange {
        min: Option<f64>,
        max: Option<f64>,
    }

    let raw = Option::<RawRange>::deserialize(deserializer)?;
    Ok(raw.and_then(|r| r.min.map(|min| SalaryRange { min, max: r.max })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn match_json(salary_range: serde_json::Value) -> serde_json::Value {
        json!({
            "job": {
                "id": "job-1",
                "title": "Creative Technologist",
                "company": "Studio",
                "location": "Remote",
                "salary_range": salary_range,
                "description": "Generative art tooling",
                "employment_type": "full-time"
            },
            "score_details": {
                "total_score": 0.82,
                "category_scores": {"technical": 0.9, "artistic": 0.7},
                "cv_relevance": 0.6,
                "matched_keywords": ["ai", "animation"],
                "high_priority": true
            },
            "status": "new",
            "status_history": [
                {"status": "new", "timestamp": "2024-05-01T09:30:00.000001"}
            ],
            "timestamp": "2024-05-01T09:30:00.000001"
        })
    }

    #[test]
    fn test_decodes_collaborator_match() {
        let m: JobMatch = serde_json::from_value(match_json(json!({"min": 50000, "max": 70000})))
            .unwrap();
        assert_eq!(m.job.salary_range, Some(SalaryRange { min: 50000.0, max: Some(70000.0) }));
        assert_eq!(m.score_details.category("technical"), Some(0.9));
        assert!(m.score_details.high_priority);
        assert_eq!(m.status_history.len(), 1);
        assert!(m.job.url.is_none());
    }

    #[test]
    fn test_empty_or_null_salary_range_is_absent() {
        for raw in [json!({}), json!(null)] {
            let m: JobMatch = serde_json::from_value(match_json(raw)).unwrap();
            assert!(m.job.salary_range.is_none());
        }
    }

    #[test]
    fn test_salary_consistency() {
        assert!(SalaryRange { min: 1.0, max: None }.is_consistent());
        assert!(SalaryRange { min: 1.0, max: Some(1.0) }.is_consistent());
        assert!(!SalaryRange { min: 2.0, max: Some(1.0) }.is_consistent());
    }
}
