use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::SessionId;

/// Structured résumé content extracted by the parsing collaborator.
/// Either complete or absent: every list is required on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateData {
    pub skills: Vec<String>,
    pub experience: Vec<String>,
    pub certifications: Vec<String>,
    pub education: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_summary: Option<bool>,
}

/// User-declared matching constraints. Every field is optional; absent
/// fields are filled from defaults by [`Preferences::merged_over`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_types: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_salary: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications: Option<NotificationPreferences>,
}

impl Preferences {
    /// Defaults used when the caller states nothing: remote work, all
    /// notifications on.
    pub fn pipeline_defaults() -> Self {
        Self {
            job_types: Some(vec!["remote".to_string()]),
            min_salary: None,
            currency: None,
            notifications: Some(NotificationPreferences {
                email: Some(true),
                daily_summary: Some(true),
            }),
        }
    }

    /// Overlays `self` on `defaults`: fields set here win, unset ones are
    /// taken from `defaults`. Notification toggles merge field by field.
    pub fn merged_over(&self, defaults: &Preferences) -> Preferences {
        let notifications = match (&self.notifications, &defaults.notifications) {
            (Some(mine), Some(theirs)) => Some(NotificationPreferences {
                email: mine.email.or(theirs.email),
                daily_summary: mine.daily_summary.or(theirs.daily_summary),
            }),
            (mine, theirs) => mine.clone().or_else(|| theirs.clone()),
        };

        Preferences {
            job_types: self.job_types.clone().or_else(|| defaults.job_types.clone()),
            min_salary: self.min_salary.or(defaults.min_salary),
            currency: self.currency.clone().or_else(|| defaults.currency.clone()),
            notifications,
        }
    }
}

/// Body of `POST /api/profiles`. Always a full upsert.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub user_id: SessionId,
    pub cv_data: CandidateData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Preferences>,
}

/// The collaborator's canonical profile record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: SessionId,
    pub cv_data: CandidateData,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub preferences: Option<Preferences>,
    #[serde(with = "crate::models::timestamp")]
    pub last_updated: DateTime<Utc>,
}
