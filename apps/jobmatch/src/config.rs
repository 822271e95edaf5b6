use std::time::Duration;

use anyhow::{Context, Result};

use crate::models::filters::DEFAULT_MIN_SALARY;
use crate::models::{MatchFilters, Preferences};
use crate::pipeline::PipelineDefaults;
use crate::presentation::Currency;

const DEFAULT_EMPLOYMENT_TYPES: &str = "full-time,contract,self-employed,freelance";

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub rust_log: String,
    pub currency: Currency,
    pub profile_email: Option<String>,
    pub filters: MatchFilters,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_base_url = var("API_BASE_URL")
            .with_context(|| "Required environment variable 'API_BASE_URL' is not set")?;

        let request_timeout = match var("HTTP_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.trim()
                    .parse::<u64>()
                    .context("HTTP_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            None => Duration::from_secs(60),
        };

        let remote_only = match var("MATCH_REMOTE_ONLY") {
            Some(raw) => raw
                .trim()
                .parse::<bool>()
                .context("MATCH_REMOTE_ONLY must be 'true' or 'false'")?,
            None => true,
        };

        let min_salary = match var("MATCH_MIN_SALARY") {
            Some(raw) if raw.trim().eq_ignore_ascii_case("none") => None,
            Some(raw) => Some(
                raw.trim()
                    .parse::<u64>()
                    .context("MATCH_MIN_SALARY must be a whole number or 'none'")?,
            ),
            None => Some(DEFAULT_MIN_SALARY),
        };

        // Present-but-empty means "every type", so this one bypasses `var`.
        let employment_types = lookup("MATCH_EMPLOYMENT_TYPES")
            .unwrap_or_else(|| DEFAULT_EMPLOYMENT_TYPES.to_string())
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect();

        Ok(Config {
            api_base_url,
            request_timeout,
            rust_log: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            currency: var("DISPLAY_CURRENCY")
                .map(|c| Currency::new(&c))
                .unwrap_or_default(),
            profile_email: var("PROFILE_EMAIL"),
            filters: MatchFilters {
                remote_only,
                min_salary,
                employment_types,
            },
        })
    }

    pub fn pipeline_defaults(&self) -> PipelineDefaults {
        PipelineDefaults {
            preferences: Preferences::pipeline_defaults(),
            filters: self.filters.clone(),
            email: self.profile_email.clone(),
        }
    }
}
