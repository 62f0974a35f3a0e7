use crate::error::Result;
use crate::types::{DashboardCounts, RecordFilter, Schedule, Source, StoredRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub mod in_memory;
pub mod sqlite;

pub use in_memory::InMemoryStore;
pub use sqlite::SqliteStore;

/// Durable per-user storage for sources, collected records and schedules
#[async_trait]
pub trait Store: Send + Sync {
    // Collected records
    async fn insert_record(&self, record: &StoredRecord) -> Result<String>;
    /// True if the user already has a record with this title or this url.
    /// An absent value never matches.
    async fn exists_by_title_or_url(&self, user_id: &str, title: Option<&str>, url: Option<&str>) -> Result<bool>;
    /// Newest first, at most `filter.effective_limit()` rows
    async fn query_records(&self, user_id: &str, filter: &RecordFilter) -> Result<Vec<StoredRecord>>;
    async fn aggregate_counts(&self, user_id: &str) -> Result<DashboardCounts>;

    // Sources, in creation order
    async fn list_sources(&self, user_id: &str) -> Result<Vec<Source>>;
    async fn insert_source(&self, source: &Source) -> Result<()>;

    // Schedules
    async fn upsert_schedule(&self, schedule: &Schedule) -> Result<()>;
    async fn get_schedule(&self, user_id: &str) -> Result<Option<Schedule>>;
    /// Enabled schedules whose `next_run` is at or before `now`
    async fn due_schedules(&self, now: DateTime<Utc>) -> Result<Vec<Schedule>>;
}
