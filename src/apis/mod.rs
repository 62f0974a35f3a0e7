pub mod base;
pub mod factory;
pub mod parsers;

pub use base::{Collector, HtmlCollector, ListingParser};
pub use factory::CollectorRegistry;
