//! Nate News scraper.
//!
//! Ranking pages (`/rank/interest?sc=...`) link each story through an anchor
//! whose `href` contains `/view/`. Article pages are less uniform, so body
//! extraction tries a list of selectors in order and falls back to the page's
//! longer paragraphs.

use super::{FetchError, NewsSource};
use crate::config::Config;
use crate::models::{ArticleDetail, CONTENT_UNAVAILABLE, ListingEntry};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Body containers, most specific first.
const CONTENT_SELECTORS: [&str; 8] = [
    "div.articleCont",
    "div.article_body",
    "div.article_content",
    "div#articleCont",
    "div.article",
    "div.content",
    r#"div[class*="article"]"#,
    r#"div[class*="content"]"#,
];

/// Paragraphs must be longer than this (in characters) to count as body text.
const MIN_PARAGRAPH_CHARS: usize = 20;

fn selector(css: &str) -> Result<Selector, FetchError> {
    Selector::parse(css).map_err(|e| FetchError::Selector {
        selector: css.to_string(),
        message: e.to_string(),
    })
}

/// Whitespace-trimmed text nodes of an element, joined by single spaces.
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extract up to `max` story anchors from a ranking page.
pub fn parse_listing(html: &str, max: usize) -> Result<Vec<ListingEntry>, FetchError> {
    let document = Html::parse_document(html);
    let story_selector = selector(r#"a[href*="/view/"]"#)?;

    let entries = document
        .select(&story_selector)
        .filter_map(|a| {
            a.value().attr("href").map(|href| ListingEntry {
                raw_title: element_text(a),
                href: href.to_string(),
            })
        })
        .take(max)
        .collect();
    Ok(entries)
}

/// Extract body text, meta description and thumbnail from an article page.
pub fn parse_detail(html: &str) -> Result<ArticleDetail, FetchError> {
    let document = Html::parse_document(html);

    let mut content = String::new();
    for css in CONTENT_SELECTORS {
        if let Some(element) = document.select(&selector(css)?).next() {
            debug!(selector = css, "Matched content selector");
            content = element_text(element);
            break;
        }
    }

    if content.is_empty() {
        let paragraph_selector = selector("p")?;
        content = document
            .select(&paragraph_selector)
            .map(element_text)
            .filter(|t| t.chars().count() > MIN_PARAGRAPH_CHARS)
            .collect::<Vec<_>>()
            .join(" ");
    }

    if content.is_empty() {
        content = CONTENT_UNAVAILABLE.to_string();
    }

    let description = document
        .select(&selector(r#"meta[name="description"]"#)?)
        .next()
        .and_then(|m| m.value().attr("content"))
        .unwrap_or_default()
        .to_string();

    let image_url = document
        .select(&selector("img.thumb")?)
        .next()
        .and_then(|img| img.value().attr("src"))
        .unwrap_or_default()
        .to_string();

    Ok(ArticleDetail {
        content,
        description,
        image_url,
    })
}

/// Live [`NewsSource`] backed by `reqwest`.
#[derive(Debug)]
pub struct NateScraper {
    client: reqwest::Client,
}

impl NateScraper {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.fetch_timeout)
            .build()?;
        Ok(Self { client })
    }

    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(body)
    }
}

impl NewsSource for NateScraper {
    #[instrument(level = "info", skip(self))]
    async fn list_articles(&self, listing_url: &str, max: usize) -> Result<Vec<ListingEntry>, FetchError> {
        let html = self.get_text(listing_url).await?;
        let entries = parse_listing(&html, max)?;
        if entries.is_empty() {
            return Err(FetchError::EmptyListing(listing_url.to_string()));
        }
        info!(count = entries.len(), "Indexed Nate ranking page");
        Ok(entries)
    }

    #[instrument(level = "info", skip(self))]
    async fn fetch_detail(&self, link: &str) -> Result<ArticleDetail, FetchError> {
        let html = self.get_text(link).await?;
        let detail = parse_detail(&html)?;
        debug!(chars = detail.content.chars().count(), "Parsed Nate article");
        Ok(detail)
    }
}
