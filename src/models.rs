//! Data models shared by every pipeline stage.
//!
//! - [`Category`]: The fixed set of ranking sections that are crawled
//! - [`ListingEntry`] / [`ArticleDetail`]: Raw values handed over by a news source
//! - [`NewsArticle`]: One article, enriched stage by stage during a run
//! - [`CategoryBatch`]: The articles crawled for one category, in listing order
//! - [`AgroReport`]: The immutable result of a run, persisted as JSON

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Press name used when the listing title carries no outlet in parentheses.
pub const UNKNOWN_PRESS: &str = "언론사 정보 없음";

/// Content used when no article body could be extracted from the detail page.
pub const CONTENT_UNAVAILABLE: &str = "본문을 추출할 수 없습니다.";

/// A ranking section of the news site.
///
/// Declaration order is the default crawl order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Economy,
    Sports,
    Entertainment,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Economy, Category::Sports, Category::Entertainment];

    /// Identifier used in configuration keys and in the JSON report.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Economy => "economy",
            Category::Sports => "sports",
            Category::Entertainment => "entertainment",
        }
    }

    pub fn default_label(&self) -> &'static str {
        match self {
            Category::Economy => "경제",
            Category::Sports => "스포츠",
            Category::Entertainment => "연예",
        }
    }

    /// Value of the `sc` query parameter on the ranking page.
    pub fn section_code(&self) -> &'static str {
        match self {
            Category::Economy => "eco",
            Category::Sports => "spo",
            Category::Entertainment => "ent",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "economy" | "eco" => Ok(Category::Economy),
            "sports" | "spo" => Ok(Category::Sports),
            "entertainment" | "ent" => Ok(Category::Entertainment),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

/// A raw link found on a ranking page: the anchor text (title with the outlet
/// still attached) and its `href`, which may be relative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    /// Anchor text, e.g. `"환율 급등에 수입 물가 비상 (머니투데이)"`.
    pub raw_title: String,
    /// The anchor's `href` exactly as found on the page.
    pub href: String,
}

/// Text extracted from an article detail page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArticleDetail {
    /// Body text, or [`CONTENT_UNAVAILABLE`] when nothing could be extracted.
    pub content: String,
    /// Value of `<meta name="description">`, empty when missing.
    pub description: String,
    /// `src` of the page's thumbnail image, empty when missing.
    pub image_url: String,
}

/// One news article as it moves through crawl, scoring and summarization.
///
/// # Lifecycle
///
/// - Crawling fills everything up to `image_url`
/// - Scoring sets `score`, `score_reasoning` and `analyzed_at`
/// - Summarizing sets `summary`, `key_points`, `estimated_duration_seconds`
///   and `summary_created_at`
///
/// Fields owned by a later stage stay `None`/empty until that stage has run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    /// Headline with every parenthesised group (the outlet) removed.
    pub title: String,
    /// Absolute URL of the article page, empty when it could not be resolved.
    pub link: String,
    /// Outlet name, or [`UNKNOWN_PRESS`].
    pub press: String,
    /// Ranking section the article was listed in.
    pub category: Category,
    /// 1-based position on the ranking page.
    pub rank: u32,
    /// When the listing entry was turned into an article.
    pub crawled_at: DateTime<Local>,
    /// Body text, or [`CONTENT_UNAVAILABLE`].
    pub content: String,
    /// Meta description of the article page.
    #[serde(default)]
    pub description: String,
    /// Thumbnail URL from the article page.
    #[serde(default)]
    pub image_url: String,
    /// Attention score, always within `0..=100`.
    pub score: Option<u8>,
    /// Why the article got its score.
    pub score_reasoning: Option<String>,
    /// When the article was scored.
    pub analyzed_at: Option<DateTime<Local>>,
    /// Short narrative summary for a sub-minute video.
    pub summary: Option<String>,
    /// Bullet points shown under the summary.
    #[serde(default)]
    pub key_points: Vec<String>,
    /// Estimated reading time. 30-60 from the keyword rules, unbounded from a model.
    pub estimated_duration_seconds: Option<u32>,
    /// When the summary was written.
    pub summary_created_at: Option<DateTime<Local>>,
}

impl NewsArticle {
    /// Create an article stub from a listing entry, before its detail page is fetched.
    pub fn stub(title: String, link: String, press: String, category: Category, rank: u32) -> Self {
        Self {
            title,
            link,
            press,
            category,
            rank,
            crawled_at: Local::now(),
            content: String::new(),
            description: String::new(),
            image_url: String::new(),
            score: None,
            score_reasoning: None,
            analyzed_at: None,
            summary: None,
            key_points: Vec::new(),
            estimated_duration_seconds: None,
            summary_created_at: None,
        }
    }

    pub fn with_detail(mut self, detail: ArticleDetail) -> Self {
        self.content = detail.content;
        self.description = detail.description;
        self.image_url = detail.image_url;
        self
    }

    /// Score used for ranking; unscored articles rank as 0.
    pub fn rank_score(&self) -> u8 {
        self.score.unwrap_or(0)
    }
}

/// Articles crawled for a single category, in ranking-page order.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryBatch {
    /// The crawled category.
    pub category: Category,
    /// Articles whose detail page was fetched, possibly none.
    pub articles: Vec<NewsArticle>,
}

/// The result of one pipeline run.
///
/// A failed run yields [`AgroReport::empty`], never a partial report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgroReport {
    /// When the report was assembled.
    pub analysis_timestamp: DateTime<Local>,
    /// Articles crawled across all categories, before selection.
    pub total_news_crawled: usize,
    /// Categories crawled, in crawl order.
    pub categories_analyzed: Vec<Category>,
    /// Selected and summarized articles, highest score first.
    pub top_agro_news: Vec<NewsArticle>,
}

impl AgroReport {
    /// The report of a failed run: no articles, stamped now.
    pub fn empty() -> Self {
        Self {
            analysis_timestamp: Local::now(),
            total_news_crawled: 0,
            categories_analyzed: Vec::new(),
            top_agro_news: Vec::new(),
        }
    }

    /// `true` when no article made it into the report.
    pub fn is_empty(&self) -> bool {
        self.top_agro_news.is_empty()
    }
}
