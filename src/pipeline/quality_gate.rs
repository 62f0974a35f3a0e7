use serde::{Deserialize, Serialize};

use crate::types::{CanonicalRecord, Category, Status};

/// Point rubric and status thresholds for the quality scorer
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub title_points: u32,
    pub title_min_len: usize,
    pub organization_points: u32,
    pub organization_min_len: usize,
    pub url_points: u32,
    pub description_points: u32,
    pub description_min_len: usize,
    /// Hackathons and competitions only
    pub contest_deadline: u32,
    /// Hackathons and competitions only
    pub contest_prize: u32,
    /// Jobs only
    pub job_location: u32,
    /// Scores at or above this are verified
    pub verified_threshold: u32,
    /// Scores at or above this (and below verified) are pending
    pub pending_threshold: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            title_points: 20,
            title_min_len: 5,
            organization_points: 20,
            organization_min_len: 2,
            url_points: 20,
            description_points: 20,
            description_min_len: 20,
            contest_deadline: 10,
            contest_prize: 10,
            job_location: 20,
            verified_threshold: 80,
            pending_threshold: 60,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QualityAssessment {
    pub score: u8,
    pub status: Status,
}

/// Completeness heuristic; a low score labels a record, it never drops one
#[derive(Debug, Clone, Default)]
pub struct QualityScorer {
    pub config: ScoringConfig,
}

impl QualityScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn score(&self, record: &CanonicalRecord, category: Category) -> QualityAssessment {
        let c = &self.config;
        let mut score: u32 = 0;

        if longer_than(&record.title, c.title_min_len) {
            score += c.title_points;
        }
        if longer_than(&record.organization, c.organization_min_len) {
            score += c.organization_points;
        }
        if record.url.as_deref().is_some_and(|u| u.starts_with("http")) {
            score += c.url_points;
        }
        if longer_than(&record.description, c.description_min_len) {
            score += c.description_points;
        }

        if category.is_contest() {
            if record.deadline.is_some() {
                score += c.contest_deadline;
            }
            if record.prize.is_some() {
                score += c.contest_prize;
            }
        }
        if category == Category::Job && record.location.is_some() {
            score += c.job_location;
        }

        let score = score.min(100);
        QualityAssessment {
            score: score as u8,
            status: self.status_for(score),
        }
    }

    pub fn status_for(&self, score: u32) -> Status {
        if score >= self.config.verified_threshold {
            Status::Verified
        } else if score >= self.config.pending_threshold {
            Status::Pending
        } else {
            Status::Rejected
        }
    }
}

fn longer_than(field: &Option<String>, min: usize) -> bool {
    field.as_deref().is_some_and(|v| v.chars().count() > min)
}
