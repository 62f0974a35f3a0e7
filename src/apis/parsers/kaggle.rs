use crate::apis::base::ListingParser;
use crate::apis::parsers::{absolute_url, first_href, first_text, listing_items, selector};
use crate::constants::KAGGLE_COLLECTOR;
use crate::error::Result;
use crate::types::{CandidateRecord, Category};
use scraper::Html;

const ORIGIN: &str = "https://www.kaggle.com";
const MAX_ITEMS: usize = 8;

pub struct KaggleParser;

impl KaggleParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for KaggleParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ListingParser for KaggleParser {
    fn name(&self) -> &'static str {
        KAGGLE_COLLECTOR
    }

    fn category(&self) -> Category {
        Category::Competition
    }

    fn parse_listing(&self, html: &str) -> Result<Vec<CandidateRecord>> {
        let document = Html::parse_document(html);
        let title_sel = selector(KAGGLE_COLLECTOR, r#"a[data-testid="competition-list-item-title"]"#)?;
        let reward_sel = selector(KAGGLE_COLLECTOR, r#"[data-testid="competition-list-item-reward"]"#)?;
        let deadline_sel = selector(KAGGLE_COLLECTOR, r#"[data-testid="competition-list-item-deadline"]"#)?;

        let mut records = Vec::new();
        for item in listing_items(KAGGLE_COLLECTOR, &document, r#"[data-testid="competition-list-item"]"#)?
            .into_iter()
            .take(MAX_ITEMS)
        {
            let Some(title) = first_text(&item, &title_sel) else {
                continue;
            };
            let mut record = CandidateRecord::new(Category::Competition);
            record.url = first_href(&item, &title_sel).map(|h| absolute_url(ORIGIN, &h));
            record.organization = Some("Kaggle".to_string());
            record.prize = Some(first_text(&item, &reward_sel).unwrap_or_else(|| "Knowledge & Recognition".to_string()));
            record.deadline = first_text(&item, &deadline_sel);
            record.location = Some("Online".to_string());
            record.description = Some(format!("Kaggle machine learning competition: {}", title));
            record.title = Some(title);
            records.push(record);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_competitions() {
        let html = r#"
            <div data-testid="competition-list-item">
              <a data-testid="competition-list-item-title" href="/competitions/titanic">Titanic - Machine Learning from Disaster</a>
              <span data-testid="competition-list-item-reward">$25,000</span>
              <span data-testid="competition-list-item-deadline">in 30 days</span>
            </div>
            <div data-testid="competition-list-item">
              <a data-testid="competition-list-item-title" href="/competitions/digits">Digit Recognizer</a>
            </div>
        "#;
        let records = KaggleParser::new().parse_listing(html).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].url.as_deref(), Some("https://www.kaggle.com/competitions/titanic"));
        assert_eq!(records[0].deadline.as_deref(), Some("in 30 days"));
        assert_eq!(records[0].prize.as_deref(), Some("$25,000"));
        assert_eq!(records[1].prize.as_deref(), Some("Knowledge & Recognition"));
        assert_eq!(records[1].organization.as_deref(), Some("Kaggle"));
        assert!(records.iter().all(|r| r.category == Category::Competition));
    }
}
