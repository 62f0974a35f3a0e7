use crate::apis::base::ListingParser;
use crate::apis::parsers::{absolute_url, first_href, first_text, listing_items, selector};
use crate::constants::DEVPOST_COLLECTOR;
use crate::error::Result;
use crate::types::{CandidateRecord, Category};
use scraper::Html;

const ORIGIN: &str = "https://devpost.com";
const MAX_ITEMS: usize = 10;

pub struct DevpostParser;

impl DevpostParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DevpostParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ListingParser for DevpostParser {
    fn name(&self) -> &'static str {
        DEVPOST_COLLECTOR
    }

    fn category(&self) -> Category {
        Category::Hackathon
    }

    fn parse_listing(&self, html: &str) -> Result<Vec<CandidateRecord>> {
        let document = Html::parse_document(html);
        let title_sel = selector(DEVPOST_COLLECTOR, ".hackathon-tile-header h3 a")?;
        let organizer_sel = selector(DEVPOST_COLLECTOR, ".hackathon-tile-organizer")?;
        let prize_sel = selector(DEVPOST_COLLECTOR, ".prize-amount")?;
        let deadline_sel = selector(DEVPOST_COLLECTOR, ".submission-period")?;
        let location_sel = selector(DEVPOST_COLLECTOR, ".hackathon-tile-location")?;

        let mut records = Vec::new();
        for tile in listing_items(DEVPOST_COLLECTOR, &document, ".hackathon-tile")?
            .into_iter()
            .take(MAX_ITEMS)
        {
            let Some(title) = first_text(&tile, &title_sel) else {
                continue;
            };
            let mut record = CandidateRecord::new(Category::Hackathon);
            record.url = first_href(&tile, &title_sel).map(|h| absolute_url(ORIGIN, &h));
            record.organization = Some(first_text(&tile, &organizer_sel).unwrap_or_else(|| "Devpost".to_string()));
            record.prize = first_text(&tile, &prize_sel);
            record.deadline = first_text(&tile, &deadline_sel);
            record.location = Some(first_text(&tile, &location_sel).unwrap_or_else(|| "Online".to_string()));
            record.description = Some(format!("Hackathon hosted on Devpost: {}", title));
            record.title = Some(title);
            records.push(record);
        }
        Ok(records)
    }
}
