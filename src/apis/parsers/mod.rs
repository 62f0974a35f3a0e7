pub mod coursera;
pub mod devpost;
pub mod indeed;
pub mod kaggle;

pub use coursera::CourseraParser;
pub use devpost::DevpostParser;
pub use indeed::IndeedParser;
pub use kaggle::KaggleParser;

use crate::error::{HubError, Result};
use scraper::{ElementRef, Html, Selector};

pub(crate) fn selector(parser: &str, css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| HubError::Scrape {
        source_name: parser.to_string(),
        message: format!("invalid selector '{}': {:?}", css, e),
    })
}

/// Select the listing cards, failing when the page has none of them
pub(crate) fn listing_items<'a>(parser: &str, document: &'a Html, css: &str) -> Result<Vec<ElementRef<'a>>> {
    let sel = selector(parser, css)?;
    let items: Vec<ElementRef<'a>> = document.select(&sel).collect();
    if items.is_empty() {
        return Err(HubError::Scrape {
            source_name: parser.to_string(),
            message: format!("no listings matched '{}'", css),
        });
    }
    Ok(items)
}

/// Whitespace-collapsed text of the first match under `element`
pub(crate) fn first_text(element: &ElementRef<'_>, sel: &Selector) -> Option<String> {
    element.select(sel).next().map(|e| collapse(&e.text().collect::<String>())).filter(|t| !t.is_empty())
}

pub(crate) fn first_href(element: &ElementRef<'_>, sel: &Selector) -> Option<String> {
    element
        .select(sel)
        .next()
        .and_then(|e| e.value().attr("href"))
        .map(|h| h.trim().to_string())
}

/// Make a scraped href absolute against the site origin
pub(crate) fn absolute_url(origin: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else if href.starts_with('/') {
        format!("{}{}", origin.trim_end_matches('/'), href)
    } else {
        format!("{}/{}", origin.trim_end_matches('/'), href)
    }
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_url_handles_relative_and_absolute() {
        assert_eq!(absolute_url("https://www.kaggle.com", "/c/titanic"), "https://www.kaggle.com/c/titanic");
        assert_eq!(absolute_url("https://www.kaggle.com/", "c/titanic"), "https://www.kaggle.com/c/titanic");
        assert_eq!(absolute_url("https://www.kaggle.com", "https://other.org/x"), "https://other.org/x");
    }

    #[test]
    fn missing_listing_markup_is_an_error() {
        let doc = Html::parse_document("<html><body><p>Access denied</p></body></html>");
        let err = listing_items("devpost", &doc, ".hackathon-tile").unwrap_err();
        assert!(matches!(err, HubError::Scrape { .. }));
    }
}
