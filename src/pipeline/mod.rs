pub mod dedup;
pub mod normalize;
pub mod orchestrator;
pub mod quality_gate;

pub use dedup::Deduplicator;
pub use normalize::{parse_deadline, NormalizeConfig, Normalizer};
pub use orchestrator::{select_one_per_category, CollectionOrchestrator};
pub use quality_gate::{QualityAssessment, QualityScorer, ScoringConfig};
