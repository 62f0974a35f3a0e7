use crate::apis::CollectorRegistry;
use crate::clock::{Clock, SystemClock};
use crate::constants::DEFAULT_SOURCES;
use crate::error::{HubError, Result};
use crate::pipeline::dedup::Deduplicator;
use crate::pipeline::normalize::Normalizer;
use crate::pipeline::quality_gate::QualityScorer;
use crate::storage::Store;
use crate::types::{CandidateRecord, Category, RunSummary, Source, Status, StoredRecord};
use metrics::{counter, histogram};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Drives one collection pass for a user:
/// sources → collector → normalize → dedup → score → store.
///
/// Sources are processed sequentially and only the first active source of each
/// category is used in a run. Collector failures are logged and skipped; store
/// failures end the run.
pub struct CollectionOrchestrator {
    store: Arc<dyn Store>,
    collectors: CollectorRegistry,
    normalizer: Normalizer,
    scorer: QualityScorer,
    dedup: Deduplicator,
    clock: Arc<dyn Clock>,
}

impl CollectionOrchestrator {
    pub fn new(store: Arc<dyn Store>, collectors: CollectorRegistry) -> Self {
        Self {
            dedup: Deduplicator::new(store.clone()),
            store,
            collectors,
            normalizer: Normalizer::new(),
            scorer: QualityScorer::new(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_scorer(mut self, scorer: QualityScorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn collectors(&self) -> &CollectorRegistry {
        &self.collectors
    }

    #[instrument(skip(self))]
    pub async fn run(&self, user_id: &str) -> Result<RunSummary> {
        info!("Starting data collection");
        counter!("opphub_collection_runs_total").increment(1);
        let started = Instant::now();

        let sources = self.resolve_sources(user_id).await?;
        let mut summary = RunSummary {
            active_sources: sources.iter().filter(|s| s.active).count(),
            ..Default::default()
        };

        for source in select_one_per_category(&sources) {
            summary.sources_processed += 1;
            let candidates = match self.collect_from(source).await {
                Ok(candidates) => candidates,
                Err(e) => {
                    warn!(source = %source.name, category = %source.category, "Collector failed: {}", e);
                    counter!("opphub_source_failures_total", "category" => source.category.as_str()).increment(1);
                    summary.sources_failed += 1;
                    continue;
                }
            };

            for candidate in candidates {
                self.ingest(user_id, source, candidate, &mut summary).await?;
            }
        }

        histogram!("opphub_collection_run_duration_seconds").record(started.elapsed().as_secs_f64());
        info!(
            "Collection completed: {} collected, {} verified, {} sources processed ({} failed), {} duplicates skipped",
            summary.collected,
            summary.verified,
            summary.sources_processed,
            summary.sources_failed,
            summary.skipped_duplicates
        );
        Ok(summary)
    }

    /// All of the user's sources in registry order, seeding the defaults on
    /// first use
    async fn resolve_sources(&self, user_id: &str) -> Result<Vec<Source>> {
        let sources = self.store.list_sources(user_id).await?;
        if !sources.is_empty() {
            return Ok(sources);
        }

        info!("No sources found, creating default sources");
        for (name, url, category) in DEFAULT_SOURCES {
            self.store.insert_source(&Source::new(user_id, name, url, category)).await?;
        }
        self.store.list_sources(user_id).await
    }

    async fn collect_from(&self, source: &Source) -> Result<Vec<CandidateRecord>> {
        let collector = self.collectors.get(source.category).ok_or_else(|| HubError::Scrape {
            source_name: source.name.clone(),
            message: format!("no collector registered for category {}", source.category),
        })?;
        info!("Scraping {} from {} via {}", source.category, source.name, collector.name());
        collector.collect(source).await
    }

    async fn ingest(
        &self,
        user_id: &str,
        source: &Source,
        mut candidate: CandidateRecord,
        summary: &mut RunSummary,
    ) -> Result<()> {
        if candidate.category != source.category {
            debug!(
                "Relabelling {} candidate as {} to match source {}",
                candidate.category, source.category, source.name
            );
            candidate.category = source.category;
        }

        let record = self.normalizer.normalize(&candidate, self.clock.today());
        if self.dedup.is_duplicate(user_id, &record).await? {
            debug!("Skipping duplicate {:?}", record.title);
            counter!("opphub_duplicates_skipped_total", "category" => source.category.as_str()).increment(1);
            summary.skipped_duplicates += 1;
            return Ok(());
        }

        // Low scores are labelled rejected but still stored
        let assessment = self.scorer.score(&record, source.category);
        let stored = StoredRecord {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            record,
            quality_score: assessment.score,
            status: assessment.status,
            collected_at: self.clock.now(),
        };
        self.store.insert_record(&stored).await?;

        counter!(
            "opphub_records_collected_total",
            "category" => source.category.as_str(),
            "status" => assessment.status.as_str()
        )
        .increment(1);
        summary.collected += 1;
        if assessment.status == Status::Verified {
            summary.verified += 1;
        }
        Ok(())
    }
}

/// Active sources, keeping only the first one seen for each category
pub fn select_one_per_category(sources: &[Source]) -> Vec<&Source> {
    let mut seen: HashSet<Category> = HashSet::new();
    sources
        .iter()
        .filter(|s| s.active)
        .filter(|s| {
            let first = seen.insert(s.category);
            if !first {
                debug!("Skipping source {}: a {} source already ran", s.name, s.category);
            }
            first
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_active_source_per_category_wins() {
        let mut inactive = Source::new("u", "Old Devpost", "https://old", Category::Hackathon);
        inactive.active = false;
        let sources = vec![
            inactive,
            Source::new("u", "Indeed", "https://indeed", Category::Job),
            Source::new("u", "LinkedIn", "https://linkedin", Category::Job),
            Source::new("u", "Devpost", "https://devpost", Category::Hackathon),
        ];
        let selected: Vec<&str> = select_one_per_category(&sources).iter().map(|s| s.name.as_str()).collect();
        assert_eq!(selected, vec!["Indeed", "Devpost"]);
    }
}
