use crate::error::{HubError, Result};
use crate::pipeline::CollectionOrchestrator;
use crate::storage::Store;
use crate::types::Schedule;
use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleParams {
    pub frequency: String,
    /// `HH:MM`, interpreted in UTC
    pub time: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_enabled() -> bool {
    true
}

pub fn parse_time_of_day(time: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(time.trim(), "%H:%M")
        .map_err(|e| HubError::InvalidSchedule(format!("time '{}' is not HH:MM: {}", time, e)))
}

/// The next occurrence of `time` strictly after `now`: today if still ahead,
/// otherwise tomorrow.
pub fn next_run_after(now: DateTime<Utc>, time: &str) -> Result<DateTime<Utc>> {
    let at = parse_time_of_day(time)?;
    let today = Utc.from_utc_datetime(&now.date_naive().and_time(at));
    Ok(if today <= now { today + Duration::days(1) } else { today })
}

fn interval_for(frequency: &str) -> Duration {
    match frequency.trim().to_lowercase().as_str() {
        "weekly" => Duration::days(7),
        _ => Duration::days(1),
    }
}

pub fn build_schedule(user_id: &str, params: &ScheduleParams, now: DateTime<Utc>) -> Result<Schedule> {
    Ok(Schedule {
        user_id: user_id.to_string(),
        frequency: params.frequency.clone(),
        time: params.time.trim().to_string(),
        timezone: params.timezone.clone(),
        enabled: params.enabled,
        next_run: next_run_after(now, &params.time)?,
        last_run: None,
    })
}

/// Move a schedule past `now` by whole intervals, keeping its time of day
pub fn advance(schedule: &Schedule, now: DateTime<Utc>) -> DateTime<Utc> {
    let step = interval_for(&schedule.frequency);
    let mut next = schedule.next_run;
    while next <= now {
        next += step;
    }
    next
}

/// Run collection for every due schedule and reschedule it. A failed run is
/// logged and still rescheduled. Returns how many schedules fired.
pub async fn run_due_schedules(
    orchestrator: &CollectionOrchestrator,
    store: &dyn Store,
    now: DateTime<Utc>,
) -> Result<usize> {
    let due = store.due_schedules(now).await?;
    for schedule in &due {
        match orchestrator.run(&schedule.user_id).await {
            Ok(summary) => info!(
                "Scheduled collection for {} done: {} collected, {} verified",
                schedule.user_id, summary.collected, summary.verified
            ),
            Err(e) => warn!("Scheduled collection for {} failed: {}", schedule.user_id, e),
        }

        let mut updated = schedule.clone();
        updated.last_run = Some(now);
        updated.next_run = advance(schedule, now);
        store.upsert_schedule(&updated).await?;
    }
    Ok(due.len())
}

/// Poll for due schedules every `period` until the runtime shuts down
pub fn spawn_scheduler(
    orchestrator: Arc<CollectionOrchestrator>,
    store: Arc<dyn Store>,
    period: std::time::Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            if let Err(e) = run_due_schedules(&orchestrator, store.as_ref(), Utc::now()).await {
                error!("Scheduler tick failed: {}", e);
            }
        }
    })
}
