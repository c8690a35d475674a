//! Human-readable rendering of a report for standard output.

use crate::config::CategoryLabels;
use crate::models::AgroReport;
use crate::summarizer::{DEFAULT_DURATION_SECS, ShortsCaption};
use std::fmt;

const RULE_WIDTH: usize = 80;

/// Terminal view of an [`AgroReport`].
pub struct ReportView<'a> {
    pub report: &'a AgroReport,
    pub labels: &'a CategoryLabels,
    /// Append a Shorts caption after each ranked article.
    pub shorts: bool,
}

impl fmt::Display for ReportView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report;
        if report.is_empty() {
            return writeln!(f, "분석 결과가 없습니다.");
        }

        let heavy = "=".repeat(RULE_WIDTH);
        let light = "-".repeat(RULE_WIDTH);

        writeln!(f, "\n{heavy}")?;
        writeln!(f, "🔥 네이트 뉴스 어그로 분석 결과 🔥")?;
        writeln!(f, "{heavy}")?;
        writeln!(
            f,
            "📅 분석 시간: {}",
            report.analysis_timestamp.format("%Y-%m-%d %H:%M:%S")
        )?;
        writeln!(f, "📊 총 수집 뉴스: {}개", report.total_news_crawled)?;
        writeln!(f, "🏆 선별된 뉴스: {}개", report.top_agro_news.len())?;
        writeln!(f, "\n🏆 TOP 어그로 뉴스 요약 🏆")?;
        writeln!(f, "{light}")?;

        for (i, news) in report.top_agro_news.iter().enumerate() {
            let label = self.labels.get(news.category);
            writeln!(f, "\n🥇 {}위 (어그로 점수: {}점)", i + 1, news.rank_score())?;
            writeln!(f, "📰 제목: {}", news.title)?;
            writeln!(f, "📺 언론사: {}", news.press)?;
            writeln!(f, "🏷️ 카테고리: {label}")?;
            writeln!(f, "📝 요약: {}", news.summary.as_deref().unwrap_or("N/A"))?;
            writeln!(
                f,
                "⏱️ 예상 시청 시간: {}초",
                news.estimated_duration_seconds.unwrap_or(DEFAULT_DURATION_SECS)
            )?;
            if !news.key_points.is_empty() {
                writeln!(f, "💡 핵심 포인트:")?;
                for point in &news.key_points {
                    writeln!(f, "   • {point}")?;
                }
            }
            if self.shorts {
                writeln!(f, "\n{}", ShortsCaption { article: news, label })?;
            }
            writeln!(f, "{light}")?;
        }
        Ok(())
    }
}
