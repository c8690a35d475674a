//! Crawl → score → select → summarize → report.
//!
//! [`Pipeline`] wires the stages together and is the only place where a run
//! can fail. Individual scoring and summarizing calls always produce a value;
//! what fails a run is a stage coming back empty.

use crate::models::{AgroReport, CategoryBatch, NewsArticle};
use crate::outputs::json;
use crate::pacing::RateGate;
use crate::scoring::AgroScorer;
use crate::scrapers::{ArticleFetcher, NewsSource};
use crate::selector::select_top;
use crate::summarizer::ShortSummarizer;
use chrono::Local;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{error, info, instrument};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PipelineError {
    #[error("no articles were crawled")]
    NoArticles,
    #[error("no articles survived top-N selection")]
    NoTopArticles,
    #[error("no summaries were produced")]
    NoSummaries,
}

pub struct Pipeline<S, A, M> {
    fetcher: ArticleFetcher<S>,
    scorer: A,
    summarizer: M,
    top_n: usize,
    output_dir: Option<PathBuf>,
    /// Spacing between the scoring of consecutive categories.
    category_gate: RateGate,
}

impl<S, A, M> Pipeline<S, A, M>
where
    S: NewsSource,
    A: AgroScorer,
    M: ShortSummarizer,
{
    /// `output_dir = None` skips persisting the report.
    pub fn new(
        fetcher: ArticleFetcher<S>,
        scorer: A,
        summarizer: M,
        top_n: usize,
        output_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            fetcher,
            scorer,
            summarizer,
            top_n,
            output_dir,
            category_gate: RateGate::new(Duration::ZERO),
        }
    }

    /// Pause at least `interval` between the last scoring call of one
    /// category and the first of the next. Only worth setting when scoring
    /// calls out to a model.
    pub fn with_category_interval(mut self, interval: Duration) -> Self {
        self.category_gate = RateGate::new(interval);
        self
    }

    /// Run every stage, returning an empty report if any stage came back empty.
    pub async fn run(&self) -> AgroReport {
        match self.try_run().await {
            Ok(report) => report,
            Err(e) => {
                error!(error = %e, "Analysis run failed");
                AgroReport::empty()
            }
        }
    }

    #[instrument(level = "info", skip_all, fields(top_n = self.top_n))]
    pub async fn try_run(&self) -> Result<AgroReport, PipelineError> {
        let t0 = Instant::now();
        info!("Step 1: crawling Nate news");
        let batches = self.crawl_only().await;
        let total_news_crawled: usize = batches.iter().map(|b| b.articles.len()).sum();
        if total_news_crawled == 0 {
            return Err(PipelineError::NoArticles);
        }
        let categories_analyzed = batches.iter().map(|b| b.category).collect();
        info!(total = total_news_crawled, "Crawl complete");

        info!("Step 2: scoring articles");
        let scored = self.score_all(batches).await;
        let top = select_top(scored, self.top_n);
        if top.is_empty() {
            return Err(PipelineError::NoTopArticles);
        }
        info!(selected = top.len(), "Selected top articles");

        info!("Step 3: writing short summaries");
        let summarized = self.summarize_all(top).await;
        if summarized.is_empty() {
            return Err(PipelineError::NoSummaries);
        }

        let report = AgroReport {
            analysis_timestamp: Local::now(),
            total_news_crawled,
            categories_analyzed,
            top_agro_news: summarized,
        };

        if let Some(dir) = &self.output_dir {
            if let Err(e) = json::write_report(&report, dir).await {
                error!(error = %e, "Failed to save report");
            }
        }

        let elapsed = t0.elapsed();
        info!(?elapsed, secs = elapsed.as_secs(), "Analysis complete");
        Ok(report)
    }

    /// Stage 1 only: crawl every configured category.
    pub async fn crawl_only(&self) -> Vec<CategoryBatch> {
        self.fetcher.crawl_all_categories().await
    }

    async fn score_all(&self, mut batches: Vec<CategoryBatch>) -> Vec<CategoryBatch> {
        for batch in batches.iter_mut().filter(|b| !b.articles.is_empty()) {
            self.category_gate.wait().await;
            for article in &mut batch.articles {
                let scored = self.scorer.score(article).await;
                info!(title = %article.title, score = scored.score, "Scored article");
                scored.apply_to(article);
            }
            self.category_gate.mark().await;
        }
        batches
    }

    async fn summarize_all(&self, mut top: Vec<NewsArticle>) -> Vec<NewsArticle> {
        for article in &mut top {
            let summary = self.summarizer.summarize(article).await;
            info!(
                title = %article.title,
                secs = summary.estimated_duration_seconds,
                "Created short summary"
            );
            summary.apply_to(article);
        }
        top
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, ScoringMode, test_config};
    use crate::llm::testing::ScriptedGenerator;
    use crate::llm::GenerationError;
    use crate::scoring::{HeuristicScorer, LlmScorer, ScoringStrategy};
    use crate::scrapers::testing::FakeSource;
    use crate::summarizer::{HeuristicSummarizer, LlmSummarizer, SummaryStrategy};

    fn fixture_source(config: &Config) -> FakeSource {
        let urls: Vec<String> = config.categories.iter().map(|c| c.listing_url.clone()).collect();
        FakeSource::default()
            .with_listing(&urls[0], &[("환율 급등에 수입 물가 비상 걸렸다 (머니투데이)", "/view/eco1")])
            .with_detail(
                "https://news.nate.com/view/eco1",
                "원달러 환율이 이틀 연속 급등하면서 수입 물가에 비상이 걸렸다. 정부는 시장 상황을 면밀히 점검하고 있다고 밝혔다.",
            )
            .with_listing(&urls[1], &[("국가대표 주전 공격수 부상으로 이탈 (스포츠조선)", "/view/spo1")])
            .with_detail("https://news.nate.com/view/spo1", "짧은 본문")
            .with_listing(&urls[2], &[("인기 배우 깜짝 결혼 발표에 팬들 환호 (연예일보)", "/view/ent1")])
            .with_detail(
                "https://news.nate.com/view/ent1",
                "인기 배우가 오늘 소속사를 통해 결혼 소식을 직접 발표했다. 팬들은 SNS를 통해 축하 메시지를 보내고 있다.",
            )
    }

    fn heuristic_pipeline(
        config: &Config,
        source: FakeSource,
        top_n: usize,
        output_dir: Option<PathBuf>,
    ) -> Pipeline<FakeSource, HeuristicScorer, HeuristicSummarizer> {
        Pipeline::new(
            ArticleFetcher::new(source, config),
            HeuristicScorer,
            HeuristicSummarizer::new(config.labels()),
            top_n,
            output_dir,
        )
    }

    #[tokio::test]
    async fn test_end_to_end_heuristic_run() {
        let config = test_config(ScoringMode::Heuristic);
        let tmp = tempfile::tempdir().unwrap();
        let pipeline = heuristic_pipeline(&config, fixture_source(&config), 3, Some(tmp.path().to_path_buf()));

        let report = pipeline.try_run().await.unwrap();

        assert_eq!(report.total_news_crawled, 3);
        assert_eq!(report.categories_analyzed.len(), 3);
        assert_eq!(report.top_agro_news.len(), 3);
        let scores: Vec<u8> = report.top_agro_news.iter().map(|a| a.rank_score()).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]), "{scores:?}");
        // sports: 50 + 20 (부상) + 3; entertainment: 50 + 10 (발표) + 5; economy: 50
        assert_eq!(scores, vec![73, 65, 50]);

        for article in &report.top_agro_news {
            assert!(!article.summary.as_deref().unwrap_or_default().is_empty());
            assert!(!article.key_points.is_empty());
            let secs = article.estimated_duration_seconds.unwrap();
            assert!((30..=60).contains(&secs), "{secs}");
            assert!(article.score_reasoning.is_some());
        }

        let files: Vec<_> = std::fs::read_dir(tmp.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
    }

    #[tokio::test]
    async fn test_top_n_truncates() {
        let config = test_config(ScoringMode::Heuristic);
        let pipeline = heuristic_pipeline(&config, fixture_source(&config), 1, None);
        let report = pipeline.try_run().await.unwrap();
        assert_eq!(report.top_agro_news.len(), 1);
        assert_eq!(report.top_agro_news[0].press, "스포츠조선");
    }

    #[tokio::test]
    async fn test_empty_crawl_yields_empty_report() {
        let config = test_config(ScoringMode::Heuristic);
        let pipeline = heuristic_pipeline(&config, FakeSource::default(), 3, None);

        assert_eq!(pipeline.try_run().await, Err(PipelineError::NoArticles));
        let report = pipeline.run().await;
        assert!(report.is_empty());
        assert_eq!(report.total_news_crawled, 0);
    }

    #[tokio::test]
    async fn test_zero_top_n_is_a_failed_run() {
        let config = test_config(ScoringMode::Heuristic);
        let pipeline = heuristic_pipeline(&config, fixture_source(&config), 0, None);
        assert_eq!(pipeline.try_run().await, Err(PipelineError::NoTopArticles));
    }

    #[tokio::test]
    async fn test_category_interval_spaces_scoring() {
        let config = test_config(ScoringMode::Heuristic);
        let pipeline = heuristic_pipeline(&config, fixture_source(&config), 3, None)
            .with_category_interval(Duration::from_millis(60));

        let t0 = Instant::now();
        pipeline.try_run().await.unwrap();
        // three non-empty categories, two pauses
        assert!(t0.elapsed() >= Duration::from_millis(115), "{:?}", t0.elapsed());
    }

    #[tokio::test]
    async fn test_failing_generator_still_completes_run() {
        let config = test_config(ScoringMode::External);
        let scorer = ScoringStrategy::Llm(LlmScorer::new(
            ScriptedGenerator::failing(GenerationError::Transport("connection refused".to_string())),
            config.labels(),
        ));
        let summarizer = SummaryStrategy::Llm(LlmSummarizer::new(
            ScriptedGenerator::failing(GenerationError::Status(503)),
            config.labels(),
        ));
        let pipeline = Pipeline::new(
            ArticleFetcher::new(fixture_source(&config), &config),
            scorer,
            summarizer,
            3,
            None,
        );

        let report = pipeline.try_run().await.unwrap();
        assert_eq!(report.top_agro_news.len(), 3);
        for article in &report.top_agro_news {
            assert_eq!(article.score, Some(50));
            assert_eq!(article.key_points, vec!["요약 생성 실패"]);
            assert_eq!(article.estimated_duration_seconds, Some(30));
        }
        // equal scores keep category order
        assert_eq!(report.top_agro_news[0].category, crate::models::Category::Economy);
    }
}
