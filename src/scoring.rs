//! Attention ("agro") scoring.
//!
//! Every article gets an integer score in `0..=100` plus a short rationale.
//! Two strategies share the [`AgroScorer`] contract:
//! - [`LlmScorer`]: Sends a rubric prompt to a [`TextGenerator`]
//! - [`HeuristicScorer`]: Keyword and category rules
//!
//! Both produce free text that goes through [`parse_score_response`], so the
//! heuristic output is rendered and parsed exactly like a model answer.
//! Scoring never fails: a generation error becomes score 50 with a
//! diagnostic rationale.

use crate::config::{CategoryLabels, Config};
use crate::llm::{GenerationError, OllamaClient, PacedGenerator, TextGenerator};
use crate::models::{Category, NewsArticle};
use crate::pacing::RateGate;
use crate::utils::{excerpt, first_signed_integer, truncate_for_log};
use chrono::Local;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

pub const DEFAULT_SCORE: u8 = 50;
const PROMPT_CONTENT_CHARS: usize = 500;

/// Checked in order; the first hit adds the bonus once.
pub const HIGH_IMPACT_KEYWORDS: [&str; 10] =
    ["충격", "폭로", "사건", "사고", "논란", "파문", "폭발", "붕괴", "사망", "부상"];
pub const MEDIUM_IMPACT_KEYWORDS: [&str; 9] =
    ["발표", "공개", "계획", "정책", "결정", "변경", "발견", "연구", "성과"];

const HIGH_IMPACT_BONUS: i32 = 20;
const MEDIUM_IMPACT_BONUS: i32 = 10;

static SCORE_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)점수:|score:").expect("static regex"));
static REASONING_MARKERS: Lazy<[Regex; 3]> = Lazy::new(|| {
    [
        Regex::new(r"분석 이유:").expect("static regex"),
        Regex::new(r"이유:").expect("static regex"),
        Regex::new(r"(?i)reason:").expect("static regex"),
    ]
});

/// Score and rationale for one article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgroScore {
    pub score: u8,
    pub reasoning: String,
}

impl AgroScore {
    /// Substitute used when the scoring call itself failed.
    pub fn fallback(reason: &impl fmt::Display) -> Self {
        Self {
            score: DEFAULT_SCORE,
            reasoning: format!("분석 중 오류 발생: {reason}"),
        }
    }

    pub fn apply_to(self, article: &mut NewsArticle) {
        article.score = Some(self.score);
        article.score_reasoning = Some(self.reasoning);
        article.analyzed_at = Some(Local::now());
    }
}

/// Contract shared by every scoring strategy.
pub trait AgroScorer {
    async fn score(&self, article: &NewsArticle) -> AgroScore;
}

/// Parse a free-text scoring answer.
///
/// The score is the first integer on the first line carrying a score marker,
/// clamped to `0..=100`; 50 when there is no such line or it has no digits.
/// The rationale is the text between the first reasoning marker and the next
/// occurrence of that same marker (or the end), or the whole trimmed text when
/// no marker is present.
pub fn parse_score_response(text: &str) -> AgroScore {
    let score = text
        .lines()
        .find(|line| SCORE_MARKER.is_match(line))
        .and_then(first_signed_integer)
        .map(|n| n.clamp(0, 100) as u8)
        .unwrap_or(DEFAULT_SCORE);

    let reasoning = REASONING_MARKERS
        .iter()
        .find_map(|marker| {
            marker.find(text).map(|m| {
                let rest = &text[m.end()..];
                let end = marker.find(rest).map_or(rest.len(), |next| next.start());
                rest[..end].trim().to_string()
            })
        })
        .unwrap_or_else(|| text.trim().to_string());

    AgroScore { score, reasoning }
}

/// Build the rubric prompt sent to the text-generation endpoint.
pub fn build_score_prompt(article: &NewsArticle, label: &str) -> String {
    format!(
        "
다음 뉴스의 어그로(관심도, 충격도)를 분석해주세요:

카테고리: {label}
제목: {title}
언론사: {press}
내용: {content}...

다음 형식으로 응답해주세요:
어그로 점수: [0-100점]
분석 이유: [구체적인 이유 설명]

어그로 점수 기준:
- 90-100: 매우 높은 어그로 (전국민적 관심, 충격적 내용)
- 80-89: 높은 어그로 (광범위한 관심, 중요한 소식)
- 70-79: 중상위 어그로 (상당한 관심, 주목할 만한 내용)
- 60-69: 중간 어그로 (일반적인 관심, 흥미로운 내용)
- 50-59: 보통 어그로 (평범한 관심, 일반적인 뉴스)
- 40-49: 낮은 어그로 (적은 관심, 일상적인 내용)
- 0-39: 매우 낮은 어그로 (거의 관심 없음, 사소한 내용)
",
        title = article.title,
        press = article.press,
        content = excerpt(&article.content, PROMPT_CONTENT_CHARS),
    )
}

/// Scores articles by asking a text-generation endpoint.
#[derive(Debug)]
pub struct LlmScorer<G> {
    generator: G,
    labels: CategoryLabels,
}

impl<G> LlmScorer<G>
where
    G: TextGenerator,
{
    pub fn new(generator: G, labels: CategoryLabels) -> Self {
        Self { generator, labels }
    }
}

impl<G> AgroScorer for LlmScorer<G>
where
    G: TextGenerator,
{
    #[instrument(level = "info", skip_all, fields(title = %article.title))]
    async fn score(&self, article: &NewsArticle) -> AgroScore {
        let prompt = build_score_prompt(article, self.labels.get(article.category));
        match self.generator.generate(&prompt).await {
            Ok(text) => {
                debug!(response = %truncate_for_log(&text, 300), "Scoring response");
                parse_score_response(&text)
            }
            Err(e) => {
                warn!(error = %e, "Scoring call failed; using fallback score");
                AgroScore::fallback(&e)
            }
        }
    }
}

/// Keyword and category rules; no network access.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicScorer;

impl HeuristicScorer {
    /// Raw heuristic score before rendering.
    pub fn compute(article: &NewsArticle) -> u8 {
        let title = article.title.to_lowercase();
        let mut score = i32::from(DEFAULT_SCORE);

        if HIGH_IMPACT_KEYWORDS.iter().any(|k| title.contains(k)) {
            score += HIGH_IMPACT_BONUS;
        }
        if MEDIUM_IMPACT_KEYWORDS.iter().any(|k| title.contains(k)) {
            score += MEDIUM_IMPACT_BONUS;
        }
        score += category_bonus(article.category);

        score.clamp(0, 100) as u8
    }

    /// The heuristic verdict in the same layout a model is asked to use.
    pub fn render(article: &NewsArticle) -> String {
        let score = Self::compute(article);
        let reasoning = if score >= 80 {
            "높은 충격도와 관심을 끄는 키워드가 포함된 뉴스입니다."
        } else if score >= 60 {
            "상당한 관심을 끌 수 있는 내용을 담고 있습니다."
        } else {
            "일반적인 관심 수준의 뉴스입니다."
        };
        format!("어그로 점수: {score}\n분석 이유: {reasoning}")
    }
}

impl AgroScorer for HeuristicScorer {
    async fn score(&self, article: &NewsArticle) -> AgroScore {
        parse_score_response(&Self::render(article))
    }
}

fn category_bonus(category: Category) -> i32 {
    match category {
        Category::Entertainment => 5,
        Category::Sports => 3,
        Category::Economy => 0,
    }
}

/// Scoring strategy chosen once from [`Config::scoring_mode`].
#[derive(Debug)]
pub enum ScoringStrategy<G> {
    Llm(LlmScorer<G>),
    Heuristic(HeuristicScorer),
}

impl ScoringStrategy<PacedGenerator<OllamaClient>> {
    /// Build the strategy for `config.scoring_mode`.
    ///
    /// In external mode every model call waits on `item_gate`; pass the same
    /// gate to the scoring and summarizing strategies so their calls share
    /// one spacing.
    pub fn from_config(config: &Config, item_gate: &Arc<RateGate>) -> Result<Self, GenerationError> {
        Ok(match config.scoring_mode {
            crate::config::ScoringMode::External => {
                let client = OllamaClient::new(&config.llm)?;
                let generator = PacedGenerator::new(client, Arc::clone(item_gate));
                ScoringStrategy::Llm(LlmScorer::new(generator, config.labels()))
            }
            crate::config::ScoringMode::Heuristic => ScoringStrategy::Heuristic(HeuristicScorer),
        })
    }
}

impl<G> AgroScorer for ScoringStrategy<G>
where
    G: TextGenerator,
{
    async fn score(&self, article: &NewsArticle) -> AgroScore {
        match self {
            ScoringStrategy::Llm(scorer) => scorer.score(article).await,
            ScoringStrategy::Heuristic(scorer) => scorer.score(article).await,
        }
    }
}
