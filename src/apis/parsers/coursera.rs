use crate::apis::base::ListingParser;
use crate::apis::parsers::{absolute_url, first_href, first_text, listing_items, selector};
use crate::constants::COURSERA_COLLECTOR;
use crate::error::Result;
use crate::types::{CandidateRecord, Category};
use scraper::Html;

const ORIGIN: &str = "https://www.coursera.org";
const MAX_ITEMS: usize = 6;

pub struct CourseraParser;

impl CourseraParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CourseraParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ListingParser for CourseraParser {
    fn name(&self) -> &'static str {
        COURSERA_COLLECTOR
    }

    fn category(&self) -> Category {
        Category::Certification
    }

    fn parse_listing(&self, html: &str) -> Result<Vec<CandidateRecord>> {
        let document = Html::parse_document(html);
        let title_sel = selector(COURSERA_COLLECTOR, "h3 a")?;
        let partner_sel = selector(COURSERA_COLLECTOR, r#"[data-testid="partner-name"]"#)?;

        let mut records = Vec::new();
        for card in listing_items(COURSERA_COLLECTOR, &document, r#"[data-testid="search-results-list"] > div"#)?
            .into_iter()
            .take(MAX_ITEMS)
        {
            let Some(title) = first_text(&card, &title_sel) else {
                continue;
            };
            let mut record = CandidateRecord::new(Category::Certification);
            record.url = first_href(&card, &title_sel).map(|h| absolute_url(ORIGIN, &h));
            record.organization = Some(first_text(&card, &partner_sel).unwrap_or_else(|| "Coursera".to_string()));
            record.location = Some("Online".to_string());
            record.description = Some(format!("Free online course: {}", title));
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
    fn extracts_course_cards() {
        let html = r#"
            <div data-testid="search-results-list">
              <div>
                <h3><a href="/learn/machine-learning">Machine Learning</a></h3>
                <p data-testid="partner-name">Stanford University</p>
              </div>
              <div><h3><a href="/learn/python">Python for Everybody</a></h3></div>
              <div><span>Advertisement</span></div>
            </div>
        "#;
        let records = CourseraParser::new().parse_listing(html).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].organization.as_deref(), Some("Stanford University"));
        assert_eq!(records[0].url.as_deref(), Some("https://www.coursera.org/learn/machine-learning"));
        assert_eq!(records[1].organization.as_deref(), Some("Coursera"));
        assert_eq!(records[1].description.as_deref(), Some("Free online course: Python for Everybody"));
        assert_eq!(records[1].prize, None);
    }
}
