//! Candidate → canonical record mapping.
//!
//! Everything here is a pure function of its input; the caller supplies
//! `today` so relative deadlines are reproducible.

use chrono::{Duration, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::types::{CandidateRecord, CanonicalRecord};

/// `M/D/YYYY` or `M-D-YYYY`, found anywhere in the text.
static EXPLICIT_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})[/-](\d{1,2})[/-](\d{4})").expect("valid date regex"));

/// "in 10 days", "3 days left", "1 day"
static RELATIVE_DAYS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s*days?").expect("valid relative-days regex"));

/// Length caps applied during normalization, in characters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    pub title_max: usize,
    pub description_max: usize,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            title_max: 200,
            description_max: 500,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizeConfig,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: NormalizeConfig) -> Self {
        Self { config }
    }

    pub fn normalize(&self, candidate: &CandidateRecord, today: NaiveDate) -> CanonicalRecord {
        CanonicalRecord {
            title: clean(candidate.title.as_deref()).map(|t| truncate_chars(&t, self.config.title_max)),
            organization: clean(candidate.organization.as_deref()),
            url: clean(candidate.url.as_deref()),
            description: clean(candidate.description.as_deref())
                .map(|d| truncate_chars(&d, self.config.description_max)),
            prize: clean(candidate.prize.as_deref()),
            deadline: candidate
                .deadline
                .as_deref()
                .and_then(|text| parse_deadline(text, today)),
            location: clean(candidate.location.as_deref()),
            category: candidate.category,
        }
    }
}

/// Best-effort deadline extraction.
///
/// An explicit date is read month first (`12/31/2025` is December 31st). Text
/// written day first (`31/12/2025`) yields no date rather than a guess, and
/// `05/06/2025` is always May 6th. Without an explicit date, an "N days"
/// phrase is taken relative to `today`.
pub fn parse_deadline(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    if let Some(caps) = EXPLICIT_DATE.captures(text) {
        let month: u32 = caps[1].parse().ok()?;
        let day: u32 = caps[2].parse().ok()?;
        let year: i32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(caps) = RELATIVE_DAYS.captures(text) {
        let days: i64 = caps[1].parse().ok()?;
        return today.checked_add_signed(Duration::try_days(days)?);
    }

    None
}

fn clean(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn truncate_chars(value: &str, max: usize) -> String {
    match value.char_indices().nth(max) {
        Some((idx, _)) => value[..idx].trim_end().to_string(),
        None => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    #[test]
    fn explicit_date_is_month_first() {
        assert_eq!(
            parse_deadline("12/31/2025", today()),
            NaiveDate::from_ymd_opt(2025, 12, 31)
        );
        assert_eq!(
            parse_deadline("Submissions close 3-7-2026 at noon", today()),
            NaiveDate::from_ymd_opt(2026, 3, 7)
        );
    }

    #[test]
    fn impossible_calendar_date_is_absent() {
        assert_eq!(parse_deadline("31/12/2025", today()), None);
        assert_eq!(parse_deadline("2/30/2025", today()), None);
    }

    #[test]
    fn relative_days_use_supplied_today() {
        assert_eq!(
            parse_deadline("in 10 days", today()),
            NaiveDate::from_ymd_opt(2025, 3, 11)
        );
        assert_eq!(
            parse_deadline("1 DAY left", today()),
            NaiveDate::from_ymd_opt(2025, 3, 2)
        );
    }

    #[test]
    fn unrecognized_text_is_absent() {
        assert_eq!(parse_deadline("sometime soon", today()), None);
        assert_eq!(parse_deadline("", today()), None);
        assert_eq!(parse_deadline("in 99999999999999999999 days", today()), None);
    }

    #[test]
    fn trims_and_drops_blank_fields() {
        let mut candidate = CandidateRecord::new(Category::Job);
        candidate.title = Some("  Rust Engineer \n".into());
        candidate.organization = Some("   ".into());
        candidate.location = Some(" Remote ".into());

        let record = Normalizer::new().normalize(&candidate, today());
        assert_eq!(record.title.as_deref(), Some("Rust Engineer"));
        assert_eq!(record.organization, None);
        assert_eq!(record.location.as_deref(), Some("Remote"));
        assert_eq!(record.deadline, None);
        assert_eq!(record.category, Category::Job);
    }

    #[test]
    fn caps_title_and_description_without_lengthening() {
        let mut candidate = CandidateRecord::new(Category::Hackathon);
        candidate.title = Some("é".repeat(250));
        candidate.description = Some("x".repeat(800));

        let record = Normalizer::new().normalize(&candidate, today());
        assert_eq!(record.title.as_ref().unwrap().chars().count(), 200);
        assert_eq!(record.description.as_ref().unwrap().chars().count(), 500);

        candidate.title = Some("Short".into());
        candidate.description = Some("Brief".into());
        let record = Normalizer::new().normalize(&candidate, today());
        assert_eq!(record.title.as_deref(), Some("Short"));
        assert_eq!(record.description.as_deref(), Some("Brief"));
    }

    #[test]
    fn custom_caps_apply() {
        let normalizer = Normalizer::with_config(NormalizeConfig {
            title_max: 4,
            description_max: 3,
        });
        let mut candidate = CandidateRecord::new(Category::Competition);
        candidate.title = Some("Kaggle".into());
        candidate.description = Some("abcdef".into());
        let record = normalizer.normalize(&candidate, today());
        assert_eq!(record.title.as_deref(), Some("Kagg"));
        assert_eq!(record.description.as_deref(), Some("abc"));
    }
}
