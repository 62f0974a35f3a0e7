use crate::error::{HubError, Result};
use crate::storage::Store;
use crate::types::{DashboardCounts, RecordFilter, Schedule, Source, Status, StoredRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// In-memory store for development/testing
#[derive(Default)]
pub struct InMemoryStore {
    records: Arc<Mutex<Vec<StoredRecord>>>,
    sources: Arc<Mutex<Vec<Source>>>,
    schedules: Arc<Mutex<HashMap<String, Schedule>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| HubError::Persistence("in-memory store mutex poisoned".into()))
}

#[async_trait]
impl Store for InMemoryStore {
    async fn insert_record(&self, record: &StoredRecord) -> Result<String> {
        let mut records = lock(&self.records)?;
        records.push(record.clone());
        debug!("Stored record {:?} with id {}", record.record.title, record.id);
        Ok(record.id.clone())
    }

    async fn exists_by_title_or_url(&self, user_id: &str, title: Option<&str>, url: Option<&str>) -> Result<bool> {
        let records = lock(&self.records)?;
        Ok(records.iter().any(|r| {
            r.user_id == user_id
                && ((title.is_some() && r.record.title.as_deref() == title)
                    || (url.is_some() && r.record.url.as_deref() == url))
        }))
    }

    async fn query_records(&self, user_id: &str, filter: &RecordFilter) -> Result<Vec<StoredRecord>> {
        let records = lock(&self.records)?;
        let mut matching: Vec<StoredRecord> = records
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id && filter.matches(r))
            .cloned()
            .collect();
        // Stable sort keeps later inserts first among equal timestamps
        matching.sort_by(|a, b| b.collected_at.cmp(&a.collected_at));
        matching.truncate(filter.effective_limit() as usize);
        Ok(matching)
    }

    async fn aggregate_counts(&self, user_id: &str) -> Result<DashboardCounts> {
        let records = lock(&self.records)?;
        let mut counts = DashboardCounts::default();
        for r in records.iter().filter(|r| r.user_id == user_id) {
            counts.total += 1;
            match r.status {
                Status::Verified => counts.verified += 1,
                Status::Pending => counts.pending += 1,
                Status::Rejected => counts.rejected += 1,
            }
            *counts
                .by_category
                .entry(r.record.category.as_str().to_string())
                .or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn list_sources(&self, user_id: &str) -> Result<Vec<Source>> {
        let sources = lock(&self.sources)?;
        Ok(sources.iter().filter(|s| s.user_id == user_id).cloned().collect())
    }

    async fn insert_source(&self, source: &Source) -> Result<()> {
        let mut sources = lock(&self.sources)?;
        sources.push(source.clone());
        debug!("Created source {} with id {}", source.name, source.id);
        Ok(())
    }

    async fn upsert_schedule(&self, schedule: &Schedule) -> Result<()> {
        let mut schedules = lock(&self.schedules)?;
        schedules.insert(schedule.user_id.clone(), schedule.clone());
        Ok(())
    }

    async fn get_schedule(&self, user_id: &str) -> Result<Option<Schedule>> {
        let schedules = lock(&self.schedules)?;
        Ok(schedules.get(user_id).cloned())
    }

    async fn due_schedules(&self, now: DateTime<Utc>) -> Result<Vec<Schedule>> {
        let schedules = lock(&self.schedules)?;
        let mut due: Vec<Schedule> = schedules
            .values()
            .filter(|s| s.enabled && s.next_run <= now)
            .cloned()
            .collect();
        due.sort_by(|a, b| a.next_run.cmp(&b.next_run));
        Ok(due)
    }
}
