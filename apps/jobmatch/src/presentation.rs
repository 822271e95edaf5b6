//! Match Presentation Model: a pure view over published matches.
//!
//! Card order is the collaborator's order; nothing is re-ranked here. No I/O,
//! no failure mode.

use serde::Serialize;

use crate::models::{JobMatch, Preferences, SalaryRange};
use crate::pipeline::PipelineSnapshot;

pub const LOADING_MESSAGE: &str = "Finding matching opportunities...";
pub const EMPTY_MESSAGE: &str =
    "No matching opportunities found. Try adjusting your preferences or uploading an updated CV.";
pub const SALARY_NOT_SPECIFIED: &str = "Salary not specified";

/// Currency used for salary lines, identified by ISO code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Currency(String);

impl Default for Currency {
    fn default() -> Self {
        Currency("GBP".to_string())
    }
}

impl Currency {
    pub fn new(code: &str) -> Self {
        Currency(code.trim().to_ascii_uppercase())
    }

    /// The preferences' currency if they name one, otherwise `fallback`.
    pub fn for_preferences(preferences: &Preferences, fallback: &Currency) -> Self {
        preferences
            .currency
            .as_deref()
            .map(Currency::new)
            .unwrap_or_else(|| fallback.clone())
    }

    pub fn code(&self) -> &str {
        &self.0
    }

    /// Symbol prefixed to amounts. Codes without a known symbol render as "CODE ".
    pub fn symbol(&self) -> String {
        match self.0.as_str() {
            "GBP" => "£".to_string(),
            "USD" => "$".to_string(),
            "EUR" => "€".to_string(),
            other => format!("{other} "),
        }
    }
}

/// One rendered opportunity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchCard {
    pub job_id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub employment_type: String,
    pub salary: String,
    pub description: String,
    pub url: Option<String>,
    pub technical: String,
    pub artistic: String,
    pub overall: String,
    pub high_priority: bool,
    pub matched_keywords: Vec<String>,
}

/// What the opportunities list shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "cards", rename_all = "lowercase")]
pub enum MatchListView {
    Loading,
    Empty,
    Ready(Vec<MatchCard>),
}

impl MatchListView {
    /// Placeholder text for the non-card states.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            MatchListView::Loading => Some(LOADING_MESSAGE),
            MatchListView::Empty => Some(EMPTY_MESSAGE),
            MatchListView::Ready(_) => None,
        }
    }
}

pub fn present(matches: &[JobMatch], currency: &Currency) -> Vec<MatchCard> {
    matches.iter().map(|m| card(m, currency)).collect()
}

/// Derives the list view from a pipeline snapshot: loading while a run is in
/// flight, otherwise the published matches.
pub fn present_snapshot(snapshot: &PipelineSnapshot, currency: &Currency) -> MatchListView {
    if !snapshot.phase.is_idle() {
        return MatchListView::Loading;
    }
    if snapshot.matches.is_empty() {
        return MatchListView::Empty;
    }
    MatchListView::Ready(present(&snapshot.matches, currency))
}

fn card(m: &JobMatch, currency: &Currency) -> MatchCard {
    let scores = &m.score_details;
    MatchCard {
        job_id: m.job.id.clone(),
        title: m.job.title.clone(),
        company: m.job.company.clone(),
        location: m.job.location.clone(),
        employment_type: m.job.employment_type.clone(),
        salary: format_salary(m.job.salary_range.as_ref(), currency),
        description: m.job.description.clone(),
        url: m.job.url.clone(),
        technical: format_percent(scores.category("technical").unwrap_or(0.0)),
        artistic: format_percent(scores.category("artistic").unwrap_or(0.0)),
        overall: format_percent(scores.total_score),
        high_priority: scores.high_priority,
        matched_keywords: scores.matched_keywords.clone(),
    }
}

/// "£50,000", "£50,000 – £70,000", or "Salary not specified".
///
/// A zero minimum counts as unpublished, matching how the backend fills gaps.
pub fn format_salary(range: Option<&SalaryRange>, currency: &Currency) -> String {
    let Some(range) = range.filter(|r| r.min > 0.0) else {
        return SALARY_NOT_SPECIFIED.to_string();
    };
    let symbol = currency.symbol();
    let min = format!("{symbol}{}", group_thousands(range.min));
    match range.max.filter(|max| *max > 0.0) {
        Some(max) => format!("{min} – {symbol}{}", group_thousands(max)),
        None => min,
    }
}

/// Score in `[0, 1]` as a whole percentage, e.g. `0.82` → "82%". Halves round up.
pub fn format_percent(score: f64) -> String {
    format!("{}%", (score * 100.0).round())
}

fn group_thousands(amount: f64) -> String {
    let rounded = amount.round();
    let digits = format!("{}", rounded.abs() as u64);
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        grouped.insert(0, '-');
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::PipelinePhase;
    use serde_json::json;
    use std::sync::Arc;

    fn job_match(id: &str, total: f64, high_priority: bool, salary: serde_json::Value) -> JobMatch {
        serde_json::from_value(json!({
            "job": {
                "id": id,
                "title": "Creative Technologist",
                "company": "Studio",
                "location": "Remote",
                "salary_range": salary,
                "description": "Generative art tooling",
                "employment_type": "full-time"
            },
            "score_details": {
                "total_score": total,
                "category_scores": {"technical": 0.754, "artistic": 0.5},
                "cv_relevance": 0.6,
                "matched_keywords": ["typescript"],
                "high_priority": high_priority
            },
            "status": "new",
            "status_history": [],
            "timestamp": "2024-05-01T09:30:00"
        }))
        .unwrap()
    }

    #[test]
    fn test_salary_formats() {
        let gbp = Currency::default();
        assert_eq!(
            format_salary(Some(&SalaryRange { min: 50000.0, max: None }), &gbp),
            "£50,000"
        );
        assert_eq!(
            format_salary(
                Some(&SalaryRange {
                    min: 50000.0,
                    max: Some(70000.0)
                }),
                &gbp
            ),
            "£50,000 – £70,000"
        );
        assert_eq!(format_salary(None, &gbp), "Salary not specified");
        assert_eq!(
            format_salary(Some(&SalaryRange { min: 0.0, max: None }), &gbp),
            "Salary not specified"
        );
    }

    #[test]
    fn test_salary_currency_symbols() {
        let range = SalaryRange {
            min: 1_250_000.0,
            max: None,
        };
        assert_eq!(format_salary(Some(&range), &Currency::new("usd")), "$1,250,000");
        assert_eq!(format_salary(Some(&range), &Currency::new("EUR")), "€1,250,000");
        assert_eq!(format_salary(Some(&range), &Currency::new("CHF")), "CHF 1,250,000");
    }

    #[test]
    fn test_currency_from_preferences() {
        let fallback = Currency::new("EUR");
        let prefs = Preferences {
            currency: Some("gbp".into()),
            ..Default::default()
        };
        assert_eq!(Currency::for_preferences(&prefs, &fallback).code(), "GBP");
        assert_eq!(
            Currency::for_preferences(&Preferences::default(), &fallback),
            fallback
        );
    }

    #[test]
    fn test_group_thousands_edges() {
        assert_eq!(group_thousands(0.0), "0");
        assert_eq!(group_thousands(999.0), "999");
        assert_eq!(group_thousands(1000.0), "1,000");
        assert_eq!(group_thousands(99999.6), "100,000");
    }

    #[test]
    fn test_percentages_round() {
        assert_eq!(format_percent(0.82), "82%");
        assert_eq!(format_percent(0.754), "75%");
        assert_eq!(format_percent(1.0), "100%");
        assert_eq!(format_percent(0.0), "0%");
    }

    #[test]
    fn test_percent_halves_round_up() {
        assert_eq!(format_percent(0.125), "13%");
        assert_eq!(format_percent(0.625), "63%");
    }

    #[test]
    fn test_zero_max_is_dropped() {
        let range = SalaryRange {
            min: 50000.0,
            max: Some(0.0),
        };
        assert_eq!(format_salary(Some(&range), &Currency::default()), "£50,000");
    }

    #[test]
    fn test_cards_keep_input_order_and_flags() {
        let matches = vec![
            job_match("low", 0.3, false, json!({"min": 50000})),
            job_match("high", 0.82, true, json!({"min": 50000, "max": 70000})),
        ];

        let cards = present(&matches, &Currency::default());

        let ids: Vec<_> = cards.iter().map(|c| c.job_id.as_str()).collect();
        assert_eq!(ids, vec!["low", "high"]);
        assert_eq!(cards[1].overall, "82%");
        assert!(cards[1].high_priority);
        assert!(!cards[0].high_priority);
        assert_eq!(cards[0].salary, "£50,000");
        assert_eq!(cards[1].salary, "£50,000 – £70,000");
        assert_eq!(cards[0].technical, "75%");
        assert_eq!(cards[0].artistic, "50%");
    }

    #[test]
    fn test_missing_category_renders_zero() {
        let mut m = job_match("x", 0.5, false, json!(null));
        m.score_details.category_scores.clear();
        let card = &present(&[m], &Currency::default())[0];
        assert_eq!(card.technical, "0%");
        assert_eq!(card.salary, "Salary not specified");
    }

    #[test]
    fn test_snapshot_views() {
        let currency = Currency::default();
        let mut snapshot = PipelineSnapshot::default();
        assert_eq!(present_snapshot(&snapshot, &currency), MatchListView::Empty);
        assert_eq!(
            present_snapshot(&snapshot, &currency).message(),
            Some(EMPTY_MESSAGE)
        );

        snapshot.phase = PipelinePhase::Matching;
        snapshot.matches = Arc::new(vec![job_match("a", 0.9, true, json!({}))]);
        assert_eq!(present_snapshot(&snapshot, &currency), MatchListView::Loading);

        snapshot.phase = PipelinePhase::Idle;
        match present_snapshot(&snapshot, &currency) {
            MatchListView::Ready(cards) => assert_eq!(cards.len(), 1),
            other => panic!("expected cards, got {other:?}"),
        }
    }

    #[test]
    fn test_view_serializes_with_state_tag() {
        let value = serde_json::to_value(MatchListView::Loading).unwrap();
        assert_eq!(value, json!({"state": "loading"}));
    }
}
