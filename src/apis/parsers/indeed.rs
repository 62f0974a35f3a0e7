use crate::apis::base::ListingParser;
use crate::apis::parsers::{absolute_url, first_href, first_text, listing_items, selector};
use crate::constants::INDEED_COLLECTOR;
use crate::error::Result;
use crate::types::{CandidateRecord, Category};
use scraper::Html;

const ORIGIN: &str = "https://www.indeed.com";
const MAX_ITEMS: usize = 8;

pub struct IndeedParser;

impl IndeedParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for IndeedParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ListingParser for IndeedParser {
    fn name(&self) -> &'static str {
        INDEED_COLLECTOR
    }

    fn category(&self) -> Category {
        Category::Job
    }

    fn parse_listing(&self, html: &str) -> Result<Vec<CandidateRecord>> {
        let document = Html::parse_document(html);
        let title_sel = selector(INDEED_COLLECTOR, r#"[data-testid="job-title"] a"#)?;
        let company_sel = selector(INDEED_COLLECTOR, r#"[data-testid="company-name"]"#)?;
        let location_sel = selector(INDEED_COLLECTOR, r#"[data-testid="job-location"]"#)?;
        let salary_sel = selector(INDEED_COLLECTOR, r#"[data-testid="salary-snippet"]"#)?;
        let snippet_sel = selector(INDEED_COLLECTOR, r#"[data-testid="job-snippet"]"#)?;

        let mut records = Vec::new();
        for card in listing_items(INDEED_COLLECTOR, &document, r#"[data-testid="job-result"]"#)?
            .into_iter()
            .take(MAX_ITEMS)
        {
            let Some(title) = first_text(&card, &title_sel) else {
                continue;
            };
            let mut record = CandidateRecord::new(Category::Job);
            record.url = first_href(&card, &title_sel).map(|h| absolute_url(ORIGIN, &h));
            record.organization = Some(first_text(&card, &company_sel).unwrap_or_else(|| "Unknown Company".to_string()));
            record.location = Some(first_text(&card, &location_sel).unwrap_or_else(|| "Remote".to_string()));
            // Salary is the closest thing a job posting has to a prize
            record.prize = first_text(&card, &salary_sel);
            record.description =
                Some(first_text(&card, &snippet_sel).unwrap_or_else(|| format!("{} position", title)));
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
    fn extracts_job_cards() {
        let html = r#"
            <ul>
              <li data-testid="job-result">
                <h2 data-testid="job-title"><a href="/viewjob?jk=abc123">Senior Rust Engineer</a></h2>
                <span data-testid="company-name">Oxide</span>
                <div data-testid="job-location">Emeryville, CA</div>
                <div data-testid="salary-snippet">$180,000 a year</div>
                <div data-testid="job-snippet">Build the control plane for rack-scale computers.</div>
              </li>
              <li data-testid="job-result">
                <h2 data-testid="job-title"><a href="/viewjob?jk=def456">Backend Developer</a></h2>
              </li>
            </ul>
        "#;
        let records = IndeedParser::new().parse_listing(html).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].url.as_deref(), Some("https://www.indeed.com/viewjob?jk=abc123"));
        assert_eq!(records[0].organization.as_deref(), Some("Oxide"));
        assert_eq!(records[0].prize.as_deref(), Some("$180,000 a year"));
        assert_eq!(records[0].deadline, None);
        assert_eq!(records[1].organization.as_deref(), Some("Unknown Company"));
        assert_eq!(records[1].location.as_deref(), Some("Remote"));
        assert_eq!(records[1].description.as_deref(), Some("Backend Developer position"));
    }

    #[test]
    fn caps_cards_per_page() {
        let card = r#"<div data-testid="job-result"><h2 data-testid="job-title"><a href="/j">Job</a></h2></div>"#;
        let html = card.repeat(12);
        assert_eq!(IndeedParser::new().parse_listing(&html).unwrap().len(), 8);
    }
}
