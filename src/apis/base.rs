use crate::config::HttpConfig;
use crate::error::{HubError, Result};
use crate::types::{CandidateRecord, Category, Source};
use std::time::Duration;
use tracing::{info, instrument, warn};

/// One collector per category. The orchestrator only ever talks to this trait.
#[async_trait::async_trait]
pub trait Collector: Send + Sync {
    /// Unique identifier for this collector
    fn name(&self) -> &'static str;

    /// Category of every record this collector produces
    fn category(&self) -> Category;

    /// Fetch candidate records for a configured source. Any error here is
    /// treated as a failure of this source only.
    async fn collect(&self, source: &Source) -> Result<Vec<CandidateRecord>>;
}

/// Site-specific listing extraction, kept separate from fetching so it can be
/// exercised against saved HTML
pub trait ListingParser: Send + Sync {
    fn name(&self) -> &'static str;

    fn category(&self) -> Category;

    /// Extract candidates from a listing page. Returns an error when the page
    /// does not contain the expected listing markup at all.
    fn parse_listing(&self, html: &str) -> Result<Vec<CandidateRecord>>;
}

/// Collector that downloads the source URL and hands the body to a parser
pub struct HtmlCollector {
    client: reqwest::Client,
    parser: Box<dyn ListingParser>,
}

impl HtmlCollector {
    pub fn new(http: &HttpConfig, parser: Box<dyn ListingParser>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(http.timeout_seconds))
            .user_agent(http.user_agent.clone())
            .gzip(true)
            .build()?;
        Ok(Self { client, parser })
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(HubError::Scrape {
                source_name: self.parser.name().to_string(),
                message: format!("GET {} returned status {}", url, status.as_u16()),
            });
        }
        Ok(response.text().await?)
    }
}

#[async_trait::async_trait]
impl Collector for HtmlCollector {
    fn name(&self) -> &'static str {
        self.parser.name()
    }

    fn category(&self) -> Category {
        self.parser.category()
    }

    #[instrument(skip(self, source), fields(collector = self.parser.name(), url = %source.url))]
    async fn collect(&self, source: &Source) -> Result<Vec<CandidateRecord>> {
        let html = self.fetch(&source.url).await?;
        let records = self.parser.parse_listing(&html)?;
        if records.is_empty() {
            warn!("Listing page parsed but produced no records");
        }
        info!("Collected {} candidates from {}", records.len(), source.name);
        Ok(records)
    }
}
