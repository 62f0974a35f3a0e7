use crate::apis::base::{Collector, HtmlCollector, ListingParser};
use crate::apis::parsers::{CourseraParser, DevpostParser, IndeedParser, KaggleParser};
use crate::config::HttpConfig;
use crate::error::Result;
use crate::types::Category;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Category → collector mapping. Adding a category means registering a new
/// collector here, not touching the orchestrator.
#[derive(Clone, Default)]
pub struct CollectorRegistry {
    collectors: HashMap<Category, Arc<dyn Collector>>,
}

impl CollectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in HTML collectors for all four categories
    pub fn with_defaults(http: &HttpConfig) -> Result<Self> {
        let parsers: Vec<Box<dyn ListingParser>> = vec![
            Box::new(DevpostParser::new()),
            Box::new(IndeedParser::new()),
            Box::new(KaggleParser::new()),
            Box::new(CourseraParser::new()),
        ];
        let mut registry = Self::new();
        for parser in parsers {
            registry.register(Arc::new(HtmlCollector::new(http, parser)?));
        }
        Ok(registry)
    }

    /// Register a collector for its category, replacing any previous one
    pub fn register(&mut self, collector: Arc<dyn Collector>) -> &mut Self {
        debug!("Registering collector {} for {}", collector.name(), collector.category());
        self.collectors.insert(collector.category(), collector);
        self
    }

    pub fn get(&self, category: Category) -> Option<Arc<dyn Collector>> {
        self.collectors.get(&category).cloned()
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.collectors.values().map(|c| c.name()).collect();
        names.sort_unstable();
        names
    }
}
