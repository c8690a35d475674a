//! Short-form ("Shorts") summaries for the top-ranked articles.
//!
//! A summary is a narrative readable in under a minute, a handful of key
//! points and an estimated reading time in seconds. As with scoring, both
//! strategies produce text in a three-section layout that is parsed by
//! [`parse_summary_response`]:
//!
//! ```text
//! <narrative lines>
//!
//! 핵심 포인트:
//! - <point>
//! - <point>
//!
//! 예상 읽기 시간: <N>초
//! ```

use crate::config::{CategoryLabels, Config, ScoringMode};
use crate::llm::{GenerationError, OllamaClient, PacedGenerator, TextGenerator};
use crate::models::NewsArticle;
use crate::pacing::RateGate;
use crate::utils::{excerpt, first_unsigned_integer, truncate_for_log};
use chrono::Local;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Reading time assumed when the response does not state one.
pub const DEFAULT_DURATION_SECS: u32 = 60;
/// Reading time reported when summarization failed outright.
pub const FAILED_DURATION_SECS: u32 = 30;
const MIN_HEURISTIC_SECS: u32 = 30;
const MAX_HEURISTIC_SECS: u32 = 60;
const PROMPT_CONTENT_CHARS: usize = 800;
/// Content must be longer than this (in characters) to quote its first sentence.
const MIN_QUOTABLE_CONTENT_CHARS: usize = 50;

const SUMMARY_PLACEHOLDER: &str = "요약 내용을 생성할 수 없습니다.";
const KEY_POINT_PLACEHOLDER: &str = "핵심 내용 요약";

static KEY_POINTS_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)핵심 ?포인트:|key points:").expect("static regex"));
static TIME_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)예상 읽기 시간:|예상시간:|reading time:").expect("static regex"));

/// Summary fields produced for one article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortSummary {
    pub summary: String,
    pub key_points: Vec<String>,
    pub estimated_duration_seconds: u32,
}

impl ShortSummary {
    /// Substitute used when the summarization call itself failed.
    pub fn failed(article: &NewsArticle) -> Self {
        Self {
            summary: format!("'{}'에 대한 요약을 생성할 수 없습니다.", article.title),
            key_points: vec!["요약 생성 실패".to_string()],
            estimated_duration_seconds: FAILED_DURATION_SECS,
        }
    }

    pub fn apply_to(self, article: &mut NewsArticle) {
        article.summary = Some(self.summary);
        article.key_points = self.key_points;
        article.estimated_duration_seconds = Some(self.estimated_duration_seconds);
        article.summary_created_at = Some(Local::now());
    }
}

/// Contract shared by every summarizing strategy.
pub trait ShortSummarizer {
    async fn summarize(&self, article: &NewsArticle) -> ShortSummary;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Summary,
    KeyPoints,
    Time,
}

fn strip_bullet(line: &str) -> Option<&str> {
    line.strip_prefix('-').or_else(|| line.strip_prefix('•'))
}

/// Parse a three-section summary answer.
///
/// Missing sections are tolerated: the narrative falls back to a fixed
/// sentence, key points to a single placeholder and the duration to 60.
pub fn parse_summary_response(text: &str) -> ShortSummary {
    let mut section = Section::Summary;
    let mut summary_lines: Vec<&str> = Vec::new();
    let mut key_points = Vec::new();
    let mut duration = DEFAULT_DURATION_SECS;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if KEY_POINTS_MARKER.is_match(line) {
            section = Section::KeyPoints;
            continue;
        }
        if TIME_MARKER.is_match(line) {
            if let Some(secs) = first_unsigned_integer(line) {
                duration = secs;
            }
            section = Section::Time;
            continue;
        }

        match (section, strip_bullet(line)) {
            (Section::Summary, None) => summary_lines.push(line),
            (Section::KeyPoints, Some(point)) => {
                let point = point.trim_start_matches(['-', '•', ' ']).trim();
                if !point.is_empty() {
                    key_points.push(point.to_string());
                }
            }
            _ => {}
        }
    }

    let summary = summary_lines.iter().join(" ");
    ShortSummary {
        summary: if summary.is_empty() {
            SUMMARY_PLACEHOLDER.to_string()
        } else {
            summary
        },
        key_points: if key_points.is_empty() {
            vec![KEY_POINT_PLACEHOLDER.to_string()]
        } else {
            key_points
        },
        estimated_duration_seconds: duration,
    }
}

/// Build the summary prompt sent to the text-generation endpoint.
pub fn build_summary_prompt(article: &NewsArticle, label: &str) -> String {
    format!(
        "
다음 뉴스를 유튜브 숏츠(1분 이내)용으로 요약해주세요:

카테고리: {label}
제목: {title}
언론사: {press}
내용: {content}...

요구사항:
1. 핵심 내용을 1분 이내로 읽을 수 있는 분량으로 요약
2. 시청자의 관심을 끌 수 있는 흥미로운 표현 사용
3. 핵심 포인트 3-5개 포함
4. 한국어로 자연스럽게 작성

다음 형식으로 응답해주세요:
[요약 내용 - 1분 이내로 읽을 수 있는 분량]

핵심 포인트:
- [포인트 1]
- [포인트 2]
- [포인트 3]

예상 읽기 시간: [X]초
",
        title = article.title,
        press = article.press,
        content = excerpt(&article.content, PROMPT_CONTENT_CHARS),
    )
}

/// Summarizes articles by asking a text-generation endpoint.
#[derive(Debug)]
pub struct LlmSummarizer<G> {
    generator: G,
    labels: CategoryLabels,
}

impl<G> LlmSummarizer<G>
where
    G: TextGenerator,
{
    pub fn new(generator: G, labels: CategoryLabels) -> Self {
        Self { generator, labels }
    }
}

impl<G> ShortSummarizer for LlmSummarizer<G>
where
    G: TextGenerator,
{
    #[instrument(level = "info", skip_all, fields(title = %article.title))]
    async fn summarize(&self, article: &NewsArticle) -> ShortSummary {
        let prompt = build_summary_prompt(article, self.labels.get(article.category));
        match self.generator.generate(&prompt).await {
            Ok(text) => {
                debug!(response = %truncate_for_log(&text, 300), "Summary response");
                parse_summary_response(&text)
            }
            Err(e) => {
                warn!(error = %e, "Summary call failed; using fallback summary");
                ShortSummary::failed(article)
            }
        }
    }
}

/// Template summary built from the title and first sentence of the content.
#[derive(Debug, Clone, Default)]
pub struct HeuristicSummarizer {
    labels: CategoryLabels,
}

impl HeuristicSummarizer {
    pub fn new(labels: CategoryLabels) -> Self {
        Self { labels }
    }

    /// The heuristic summary in the three-section layout.
    pub fn render(&self, article: &NewsArticle) -> String {
        let mut summary = format!("'{}'에 대한 주요 내용입니다. ", article.title);
        if article.content.chars().count() > MIN_QUOTABLE_CONTENT_CHARS {
            let first_sentence = article.content.split('.').next().unwrap_or_default();
            summary.push_str(first_sentence);
            summary.push('.');
        } else {
            summary.push_str("자세한 내용은 원문을 참고하세요.");
        }

        let word_count = summary.split_whitespace().count() as u32;
        let duration = word_count
            .saturating_mul(2)
            .clamp(MIN_HEURISTIC_SECS, MAX_HEURISTIC_SECS);

        format!(
            "{summary}\n\n핵심 포인트:\n- 카테고리: {label}\n- 제목: {title}\n- {placeholder}\n\n예상 읽기 시간: {duration}초",
            label = self.labels.get(article.category),
            title = article.title,
            placeholder = KEY_POINT_PLACEHOLDER,
        )
    }
}

impl ShortSummarizer for HeuristicSummarizer {
    async fn summarize(&self, article: &NewsArticle) -> ShortSummary {
        parse_summary_response(&self.render(article))
    }
}

/// Summarizing strategy chosen once from [`Config::scoring_mode`].
#[derive(Debug)]
pub enum SummaryStrategy<G> {
    Llm(LlmSummarizer<G>),
    Heuristic(HeuristicSummarizer),
}

impl SummaryStrategy<PacedGenerator<OllamaClient>> {
    /// Build the strategy for `config.scoring_mode`.
    ///
    /// In external mode every model call waits on `item_gate`; pass the same
    /// gate to the scoring and summarizing strategies so their calls share
    /// one spacing.
    pub fn from_config(config: &Config, item_gate: &Arc<RateGate>) -> Result<Self, GenerationError> {
        Ok(match config.scoring_mode {
            ScoringMode::External => {
                let client = OllamaClient::new(&config.llm)?;
                let generator = PacedGenerator::new(client, Arc::clone(item_gate));
                SummaryStrategy::Llm(LlmSummarizer::new(generator, config.labels()))
            }
            ScoringMode::Heuristic => SummaryStrategy::Heuristic(HeuristicSummarizer::new(config.labels())),
        })
    }
}

impl<G> ShortSummarizer for SummaryStrategy<G>
where
    G: TextGenerator,
{
    async fn summarize(&self, article: &NewsArticle) -> ShortSummary {
        match self {
            SummaryStrategy::Llm(summarizer) => summarizer.summarize(article).await,
            SummaryStrategy::Heuristic(summarizer) => summarizer.summarize(article).await,
        }
    }
}

/// An article rendered as a Shorts caption.
pub struct ShortsCaption<'a> {
    pub article: &'a NewsArticle,
    pub label: &'a str,
}

impl fmt::Display for ShortsCaption<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let article = self.article;
        writeln!(f, "🔥 {} 뉴스 요약 🔥", self.label.to_uppercase())?;
        writeln!(f)?;
        writeln!(f, "📰 {}", article.title)?;
        writeln!(f, "📺 {}", article.press)?;
        writeln!(f)?;
        writeln!(f, "📝 요약:")?;
        writeln!(f, "{}", article.summary.as_deref().unwrap_or("요약 없음"))?;
        writeln!(f)?;
        writeln!(f, "💡 핵심 포인트:")?;
        for point in &article.key_points {
            writeln!(f, "• {point}")?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "⏱️ 예상 시청 시간: {}초",
            article.estimated_duration_seconds.unwrap_or(DEFAULT_DURATION_SECS)
        )?;
        write!(f, "🔥 어그로 점수: {}점", article.rank_score())
    }
}
