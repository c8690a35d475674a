//! Article fetching from ranked listing pages.
//!
//! Fetching runs in two phases per category, the same way for every source:
//!
//! 1. **Listing**: Read the category's ranking page into raw [`ListingEntry`] values
//! 2. **Detail**: Download each article page and extract its text
//!
//! The HTML work lives behind the [`NewsSource`] trait ([`nate`] is the live
//! implementation). [`ArticleFetcher`] owns everything source-independent:
//! outlet extraction, title cleanup, link normalisation, pacing and the
//! "log and skip" error policy.

pub mod nate;

use crate::config::{CategoryConfig, Config};
use crate::models::{ArticleDetail, CategoryBatch, ListingEntry, NewsArticle, UNKNOWN_PRESS};
use crate::pacing::RateGate;
use futures::stream::{self, StreamExt};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Titles shorter than this many characters are navigation noise.
const MIN_TITLE_CHARS: usize = 10;

static PRESS_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(([^)]+)\)").expect("static regex"));

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid selector {selector:?}: {message}")]
    Selector { selector: String, message: String },
    #[error("no article links found on {0}")]
    EmptyListing(String),
}

/// An HTML source of ranked news.
pub trait NewsSource {
    /// Raw entries from a ranking page, already capped to `max`.
    async fn list_articles(&self, listing_url: &str, max: usize) -> Result<Vec<ListingEntry>, FetchError>;

    /// Text, description and image of one article page.
    async fn fetch_detail(&self, link: &str) -> Result<ArticleDetail, FetchError>;
}

/// Split a listing title into the cleaned headline and the outlet name.
///
/// The outlet is the first parenthesised group; every parenthesised group is
/// removed from the headline.
pub fn split_press(raw_title: &str) -> (String, String) {
    let press = PRESS_PATTERN
        .captures(raw_title)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_else(|| UNKNOWN_PRESS.to_string());
    let title = PRESS_PATTERN.replace_all(raw_title, "").trim().to_string();
    (title, press)
}

/// Resolve an `href` from a listing page to an absolute URL.
///
/// # Arguments
///
/// * `href` - The anchor's `href`: absolute, protocol-relative or relative
/// * `base_url` - Site root that relative links are joined to
///
/// # Returns
///
/// `href` unchanged when it is already absolute, `https:` prepended when it is
/// protocol-relative, otherwise the join with `base_url`. An empty string when
/// the link cannot be resolved.
pub fn normalize_link(href: &str, base_url: &str) -> String {
    let href = href.trim();
    if href.is_empty() {
        return String::new();
    }
    if href.starts_with("http") {
        return href.to_string();
    }
    if let Some(rest) = href.strip_prefix("//") {
        return format!("https://{rest}");
    }
    Url::parse(base_url)
        .and_then(|base| base.join(href))
        .map(|u| u.to_string())
        .unwrap_or_default()
}

/// Turn listing entries into article stubs, skipping short titles.
///
/// `rank` is the 1-based position in the capped listing, so skipped entries
/// leave gaps.
pub fn build_stubs(entries: &[ListingEntry], category: &CategoryConfig, base_url: &str) -> Vec<NewsArticle> {
    entries
        .iter()
        .enumerate()
        .filter_map(|(i, entry)| {
            let (title, press) = split_press(&entry.raw_title);
            if title.chars().count() < MIN_TITLE_CHARS {
                debug!(raw_title = %entry.raw_title, "Skipping short listing title");
                return None;
            }
            let link = normalize_link(&entry.href, base_url);
            Some(NewsArticle::stub(title, link, press, category.category, i as u32 + 1))
        })
        .collect()
}

/// Crawls every configured category through a [`NewsSource`].
#[derive(Debug)]
pub struct ArticleFetcher<S> {
    source: S,
    base_url: String,
    max_per_category: usize,
    categories: Vec<CategoryConfig>,
    item_gate: RateGate,
    category_gate: RateGate,
}

impl<S> ArticleFetcher<S>
where
    S: NewsSource,
{
    pub fn new(source: S, config: &Config) -> Self {
        Self {
            source,
            base_url: config.base_url.clone(),
            max_per_category: config.max_news_per_category,
            categories: config.categories.clone(),
            item_gate: RateGate::new(config.item_interval),
            category_gate: RateGate::new(config.category_interval),
        }
    }

    /// Crawl all categories in configuration order.
    ///
    /// The category interval is measured from the end of one category's
    /// last detail fetch to the next listing fetch. A category whose listing
    /// cannot be read yields an empty batch.
    #[instrument(level = "info", skip_all)]
    pub async fn crawl_all_categories(&self) -> Vec<CategoryBatch> {
        info!(
            categories = self.categories.len(),
            item_interval = ?self.item_gate.min_interval(),
            category_interval = ?self.category_gate.min_interval(),
            "Starting crawl"
        );
        let mut batches = Vec::with_capacity(self.categories.len());
        for category in &self.categories {
            self.category_gate.wait().await;
            let articles = self.crawl_category(category).await;
            self.category_gate.mark().await;
            info!(category = %category.category, count = articles.len(), "Completed category crawl");
            batches.push(CategoryBatch {
                category: category.category,
                articles,
            });
        }
        batches
    }

    #[instrument(level = "info", skip_all, fields(category = %category.category))]
    async fn crawl_category(&self, category: &CategoryConfig) -> Vec<NewsArticle> {
        let entries = match self
            .source
            .list_articles(&category.listing_url, self.max_per_category)
            .await
        {
            Ok(entries) => entries,
            Err(e) => {
                warn!(url = %category.listing_url, error = %e, "Listing fetch failed");
                return Vec::new();
            }
        };
        let stubs = build_stubs(&entries, category, &self.base_url);
        info!(listed = entries.len(), kept = stubs.len(), "Indexed listing page");

        stream::iter(stubs)
            .then(|stub| self.fetch_content(stub))
            .filter_map(|opt| std::future::ready(opt))
            .collect()
            .await
    }

    async fn fetch_content(&self, stub: NewsArticle) -> Option<NewsArticle> {
        if stub.link.is_empty() {
            warn!(title = %stub.title, "Article has no resolvable link; skipping");
            return None;
        }
        self.item_gate.wait().await;
        match self.source.fetch_detail(&stub.link).await {
            Ok(detail) => {
                debug!(url = %stub.link, chars = detail.content.chars().count(), "Fetched article");
                Some(stub.with_detail(detail))
            }
            Err(e) => {
                warn!(url = %stub.link, error = %e, "Article fetch failed; skipping");
                None
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::HashMap;

    /// In-memory source keyed by listing URL and article link.
    #[derive(Debug, Default)]
    pub struct FakeSource {
        pub listings: HashMap<String, Vec<ListingEntry>>,
        pub details: HashMap<String, ArticleDetail>,
    }

    impl FakeSource {
        pub fn with_listing(mut self, url: &str, entries: &[(&str, &str)]) -> Self {
            self.listings.insert(
                url.to_string(),
                entries
                    .iter()
                    .map(|(title, href)| ListingEntry {
                        raw_title: title.to_string(),
                        href: href.to_string(),
                    })
                    .collect(),
            );
            self
        }

        pub fn with_detail(mut self, link: &str, content: &str) -> Self {
            self.details.insert(
                link.to_string(),
                ArticleDetail {
                    content: content.to_string(),
                    ..ArticleDetail::default()
                },
            );
            self
        }
    }

    impl NewsSource for FakeSource {
        async fn list_articles(&self, listing_url: &str, max: usize) -> Result<Vec<ListingEntry>, FetchError> {
            self.listings
                .get(listing_url)
                .map(|entries| entries.iter().take(max).cloned().collect())
                .ok_or_else(|| FetchError::EmptyListing(listing_url.to_string()))
        }

        async fn fetch_detail(&self, link: &str) -> Result<ArticleDetail, FetchError> {
            self.details
                .get(link)
                .cloned()
                // stands in for a 404
                .ok_or_else(|| FetchError::EmptyListing(link.to_string()))
        }
    }
}
