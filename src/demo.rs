//! Offline demo (`--demo`).
//!
//! Runs the full pipeline with keyword-rule scoring and summarizing over three
//! built-in articles, one per category. No network access and no model are
//! needed, so it is the quickest way to see what a report looks like.

use crate::config::Config;
use crate::models::{ArticleDetail, Category, ListingEntry};
use crate::pipeline::Pipeline;
use crate::scoring::HeuristicScorer;
use crate::scrapers::{ArticleFetcher, FetchError, NewsSource};
use crate::summarizer::HeuristicSummarizer;
use std::collections::HashMap;
use std::time::Duration;

/// Listing title, link and body for each sample.
const SAMPLES: [(Category, &str, &str, &str); 3] = [
    (
        Category::Economy,
        "삼성전자, AI 반도체 시장 진출 선언 (경제일보)",
        "https://example.com/news1",
        "삼성전자가 AI 반도체 시장에 본격 진출한다고 발표했습니다. 이는 반도체 업계에 큰 변화를 가져올 것으로 예상됩니다.",
    ),
    (
        Category::Sports,
        "손흥민, 프리미어리그 득점왕 등극 (스포츠뉴스)",
        "https://example.com/news2",
        "손흥민이 프리미어리그에서 득점왕에 등극했습니다. 아시아 선수 최초의 기록입니다.",
    ),
    (
        Category::Entertainment,
        "BTS 지민, 솔로 앨범 발매 예정 (연예뉴스)",
        "https://example.com/news3",
        "BTS 지민이 솔로 앨범을 발매할 예정입니다. 팬들의 기대가 높아지고 있습니다.",
    ),
];

pub const OLLAMA_SETUP_GUIDE: &str = "\
🦙 Ollama 설정 가이드
1. Ollama 설치:
   - https://ollama.ai/download 에서 다운로드
   - 설치 후 터미널에서 'ollama serve' 실행
2. 모델 다운로드:
   ollama pull llama2
3. 환경 변수 설정 (.env 파일):
   LLM_TYPE=ollama
   OLLAMA_MODEL=llama2
   OLLAMA_BASE_URL=http://localhost:11434
";

/// In-memory [`NewsSource`] serving the built-in samples.
#[derive(Debug)]
pub struct DemoSource {
    listings: HashMap<String, Vec<ListingEntry>>,
    details: HashMap<String, ArticleDetail>,
}

impl DemoSource {
    /// Place each sample under its category's configured listing URL.
    pub fn new(config: &Config) -> Self {
        let mut listings = HashMap::new();
        let mut details = HashMap::new();
        for category in &config.categories {
            let entries = SAMPLES
                .iter()
                .filter(|(c, ..)| *c == category.category)
                .map(|(_, title, link, content)| {
                    details.insert(
                        link.to_string(),
                        ArticleDetail {
                            content: content.to_string(),
                            ..ArticleDetail::default()
                        },
                    );
                    ListingEntry {
                        raw_title: title.to_string(),
                        href: link.to_string(),
                    }
                })
                .collect();
            listings.insert(category.listing_url.clone(), entries);
        }
        Self { listings, details }
    }
}

impl NewsSource for DemoSource {
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
            .ok_or_else(|| FetchError::EmptyListing(link.to_string()))
    }
}

/// Keyword-rule pipeline over the samples, with no pacing and no saved report.
pub fn demo_pipeline(
    config: &Config,
    top_n: usize,
) -> Pipeline<DemoSource, HeuristicScorer, HeuristicSummarizer> {
    let mut config = config.clone();
    config.item_interval = Duration::ZERO;
    config.category_interval = Duration::ZERO;

    Pipeline::new(
        ArticleFetcher::new(DemoSource::new(&config), &config),
        HeuristicScorer,
        HeuristicSummarizer::new(config.labels()),
        top_n,
        None,
    )
}
