use crate::error::HubError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Kind of opportunity a source produces. Every record and source carries one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Hackathon,
    Job,
    Competition,
    Certification,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Hackathon,
        Category::Job,
        Category::Competition,
        Category::Certification,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Hackathon => "hackathon",
            Category::Job => "job",
            Category::Competition => "competition",
            Category::Certification => "certification",
        }
    }

    /// Hackathons and competitions are scored on deadline and prize.
    pub fn is_contest(&self) -> bool {
        matches!(self, Category::Hackathon | Category::Competition)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hackathon" => Ok(Category::Hackathon),
            "job" => Ok(Category::Job),
            "competition" => Ok(Category::Competition),
            "certification" => Ok(Category::Certification),
            other => Err(HubError::InvalidCategory(other.to_string())),
        }
    }
}

/// Quality bucket assigned by the scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Verified,
    Pending,
    Rejected,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Verified => "verified",
            Status::Pending => "pending",
            Status::Rejected => "rejected",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "verified" => Ok(Status::Verified),
            "pending" => Ok(Status::Pending),
            "rejected" => Ok(Status::Rejected),
            other => Err(HubError::InvalidStatus(other.to_string())),
        }
    }
}

/// Raw item as a collector scraped it, before normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub title: Option<String>,
    pub organization: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub prize: Option<String>,
    /// Free text as found on the page, e.g. "Ends 12/31/2025" or "in 10 days"
    pub deadline: Option<String>,
    pub location: Option<String>,
    pub category: Category,
}

impl CandidateRecord {
    pub fn new(category: Category) -> Self {
        Self {
            title: None,
            organization: None,
            url: None,
            description: None,
            prize: None,
            deadline: None,
            location: None,
            category,
        }
    }
}

/// Normalized item: trimmed, bounded, deadline parsed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub title: Option<String>,
    pub organization: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub prize: Option<String>,
    pub deadline: Option<NaiveDate>,
    pub location: Option<String>,
    pub category: Category,
}

/// A persisted record. Written once by the orchestrator, never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: String,
    pub user_id: String,
    #[serde(flatten)]
    pub record: CanonicalRecord,
    pub quality_score: u8,
    pub status: Status,
    pub collected_at: DateTime<Utc>,
}

/// A configured (name, url, category) pair driving one collector invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub url: String,
    pub category: Category,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Source {
    pub fn new(user_id: &str, name: &str, url: &str, category: Category) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: name.to_string(),
            url: url.to_string(),
            category,
            active: true,
            created_at: Utc::now(),
        }
    }
}

/// Category/status filter for listing collected records
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordFilter {
    pub category: Option<Category>,
    pub status: Option<Status>,
    pub limit: Option<u32>,
}

impl RecordFilter {
    pub const DEFAULT_LIMIT: u32 = 100;

    /// Build a filter from user-facing text, where empty or `all` means no
    /// restriction on that field
    pub fn parse(category: Option<&str>, status: Option<&str>, limit: Option<u32>) -> Result<Self, HubError> {
        let category = match category.map(str::trim) {
            None | Some("") | Some("all") => None,
            Some(c) => Some(c.parse::<Category>()?),
        };
        let status = match status.map(str::trim) {
            None | Some("") | Some("all") => None,
            Some(s) => Some(s.parse::<Status>()?),
        };
        Ok(Self { category, status, limit })
    }

    pub fn effective_limit(&self) -> u32 {
        self.limit.unwrap_or(Self::DEFAULT_LIMIT)
    }

    pub fn matches(&self, record: &StoredRecord) -> bool {
        self.category.map_or(true, |c| record.record.category == c)
            && self.status.map_or(true, |s| record.status == s)
    }
}

/// Per-user dashboard totals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardCounts {
    pub total: u64,
    pub verified: u64,
    pub pending: u64,
    pub rejected: u64,
    #[serde(rename = "categories")]
    pub by_category: BTreeMap<String, u64>,
}

/// Outcome of one collection run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub collected: usize,
    pub verified: usize,
    /// Every active source of the user, including ones skipped for sharing a category
    pub active_sources: usize,
    pub sources_processed: usize,
    pub sources_failed: usize,
    pub skipped_duplicates: usize,
}

/// Recurring collection schedule, one per user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub user_id: String,
    pub frequency: String,
    pub time: String,
    pub timezone: String,
    pub enabled: bool,
    pub next_run: DateTime<Utc>,
    pub last_run: Option<DateTime<Utc>>,
}
