use crate::error::{HubError, Result};
use crate::storage::Store;
use crate::types::{CanonicalRecord, Category, DashboardCounts, RecordFilter, Schedule, Source, Status, StoredRecord};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS data_sources (
        id          TEXT PRIMARY KEY,
        user_id     TEXT NOT NULL,
        name        TEXT NOT NULL,
        url         TEXT NOT NULL,
        type        TEXT NOT NULL,
        active      INTEGER NOT NULL DEFAULT 1,
        created_at  TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_sources_user ON data_sources (user_id);

    CREATE TABLE IF NOT EXISTS collected_data (
        id            TEXT PRIMARY KEY,
        user_id       TEXT NOT NULL,
        title         TEXT,
        category      TEXT NOT NULL,
        organization  TEXT,
        deadline      TEXT,
        url           TEXT,
        description   TEXT,
        prize         TEXT,
        location      TEXT,
        status        TEXT NOT NULL DEFAULT 'pending',
        quality_score INTEGER NOT NULL DEFAULT 0,
        collected_at  TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_collected_user_title ON collected_data (user_id, title);
    CREATE INDEX IF NOT EXISTS idx_collected_user_url ON collected_data (user_id, url);

    CREATE TABLE IF NOT EXISTS schedules (
        user_id    TEXT PRIMARY KEY,
        frequency  TEXT NOT NULL,
        time       TEXT NOT NULL,
        timezone   TEXT NOT NULL,
        enabled    INTEGER NOT NULL DEFAULT 1,
        last_run   TEXT,
        next_run   TEXT NOT NULL
    );
"#;

const RECORD_COLUMNS: &str = "id, user_id, title, category, organization, deadline, url, description, \
                              prize, location, status, quality_score, collected_at";

/// SQLite-backed store. The connection sits behind a mutex that is only held
/// for the duration of a single statement.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        info!("Opened SQLite store at {}", path.display());
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| HubError::Persistence("sqlite connection mutex poisoned".into()))
    }
}

fn ts(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn conversion_error(idx: usize, err: impl std::error::Error + Send + Sync + 'static) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn parse_ts(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<StoredRecord> {
    let category: String = row.get(3)?;
    let deadline: Option<String> = row.get(5)?;
    let status: String = row.get(10)?;
    let score: i64 = row.get(11)?;
    let collected_at: String = row.get(12)?;

    Ok(StoredRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        record: CanonicalRecord {
            title: row.get(2)?,
            category: category.parse::<Category>().map_err(|e| conversion_error(3, e))?,
            organization: row.get(4)?,
            deadline: deadline
                .map(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d"))
                .transpose()
                .map_err(|e| conversion_error(5, e))?,
            url: row.get(6)?,
            description: row.get(7)?,
            prize: row.get(8)?,
            location: row.get(9)?,
        },
        status: status.parse::<Status>().map_err(|e| conversion_error(10, e))?,
        quality_score: score.clamp(0, 100) as u8,
        collected_at: parse_ts(12, &collected_at)?,
    })
}

fn source_from_row(row: &Row<'_>) -> rusqlite::Result<Source> {
    let category: String = row.get(4)?;
    let created_at: String = row.get(6)?;
    Ok(Source {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        url: row.get(3)?,
        category: category.parse::<Category>().map_err(|e| conversion_error(4, e))?,
        active: row.get(5)?,
        created_at: parse_ts(6, &created_at)?,
    })
}

fn schedule_from_row(row: &Row<'_>) -> rusqlite::Result<Schedule> {
    let last_run: Option<String> = row.get(5)?;
    let next_run: String = row.get(6)?;
    Ok(Schedule {
        user_id: row.get(0)?,
        frequency: row.get(1)?,
        time: row.get(2)?,
        timezone: row.get(3)?,
        enabled: row.get(4)?,
        last_run: last_run.as_deref().map(|raw| parse_ts(5, raw)).transpose()?,
        next_run: parse_ts(6, &next_run)?,
    })
}

#[async_trait]
impl Store for SqliteStore {
    async fn insert_record(&self, record: &StoredRecord) -> Result<String> {
        let r = &record.record;
        let conn = self.conn()?;
        conn.execute(
            &format!("INSERT INTO collected_data ({RECORD_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"),
            params![
                record.id,
                record.user_id,
                r.title,
                r.category.as_str(),
                r.organization,
                r.deadline.map(|d| d.format("%Y-%m-%d").to_string()),
                r.url,
                r.description,
                r.prize,
                r.location,
                record.status.as_str(),
                record.quality_score as i64,
                ts(&record.collected_at),
            ],
        )?;
        debug!("Inserted record {} for user {}", record.id, record.user_id);
        Ok(record.id.clone())
    }

    async fn exists_by_title_or_url(&self, user_id: &str, title: Option<&str>, url: Option<&str>) -> Result<bool> {
        // NULL = NULL is never true, so absent fields cannot match
        let conn = self.conn()?;
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM collected_data WHERE user_id = ?1 AND (title = ?2 OR url = ?3))",
            params![user_id, title, url],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    async fn query_records(&self, user_id: &str, filter: &RecordFilter) -> Result<Vec<StoredRecord>> {
        let mut sql = format!("SELECT {RECORD_COLUMNS} FROM collected_data WHERE user_id = ?");
        let mut args: Vec<String> = vec![user_id.to_string()];
        if let Some(category) = filter.category {
            sql.push_str(" AND category = ?");
            args.push(category.as_str().to_string());
        }
        if let Some(status) = filter.status {
            sql.push_str(" AND status = ?");
            args.push(status.as_str().to_string());
        }
        sql.push_str(&format!(
            " ORDER BY collected_at DESC, rowid DESC LIMIT {}",
            filter.effective_limit()
        ));

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args.iter()), record_from_row)?;
        let records = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    async fn aggregate_counts(&self, user_id: &str) -> Result<DashboardCounts> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT category, status, COUNT(*) FROM collected_data WHERE user_id = ?1 GROUP BY category, status",
        )?;
        let rows = stmt.query_map(params![user_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, i64>(2)?))
        })?;

        let mut counts = DashboardCounts::default();
        for row in rows {
            let (category, status, n) = row?;
            let n = n.max(0) as u64;
            counts.total += n;
            match status.parse::<Status>() {
                Ok(Status::Verified) => counts.verified += n,
                Ok(Status::Pending) => counts.pending += n,
                Ok(Status::Rejected) => counts.rejected += n,
                Err(_) => {}
            }
            *counts.by_category.entry(category).or_insert(0) += n;
        }
        Ok(counts)
    }

    async fn list_sources(&self, user_id: &str) -> Result<Vec<Source>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, name, url, type, active, created_at FROM data_sources \
             WHERE user_id = ?1 ORDER BY created_at ASC, rowid ASC",
        )?;
        let rows = stmt.query_map(params![user_id], source_from_row)?;
        let sources = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(sources)
    }

    async fn insert_source(&self, source: &Source) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO data_sources (id, user_id, name, url, type, active, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                source.id,
                source.user_id,
                source.name,
                source.url,
                source.category.as_str(),
                source.active,
                ts(&source.created_at),
            ],
        )?;
        debug!("Created source {} with id {}", source.name, source.id);
        Ok(())
    }

    async fn upsert_schedule(&self, schedule: &Schedule) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO schedules (user_id, frequency, time, timezone, enabled, last_run, next_run)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(user_id) DO UPDATE SET
                frequency=excluded.frequency, time=excluded.time, timezone=excluded.timezone,
                enabled=excluded.enabled, last_run=excluded.last_run, next_run=excluded.next_run",
            params![
                schedule.user_id,
                schedule.frequency,
                schedule.time,
                schedule.timezone,
                schedule.enabled,
                schedule.last_run.as_ref().map(ts),
                ts(&schedule.next_run),
            ],
        )?;
        Ok(())
    }

    async fn get_schedule(&self, user_id: &str) -> Result<Option<Schedule>> {
        let conn = self.conn()?;
        let schedule = conn
            .query_row(
                "SELECT user_id, frequency, time, timezone, enabled, last_run, next_run FROM schedules WHERE user_id = ?1",
                params![user_id],
                schedule_from_row,
            )
            .optional()?;
        Ok(schedule)
    }

    async fn due_schedules(&self, now: DateTime<Utc>) -> Result<Vec<Schedule>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT user_id, frequency, time, timezone, enabled, last_run, next_run FROM schedules \
             WHERE enabled = 1 AND next_run <= ?1 ORDER BY next_run ASC",
        )?;
        let rows = stmt.query_map(params![ts(&now)], schedule_from_row)?;
        let schedules = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(schedules)
    }
}
