//! Menu-driven mode (`--interactive`).

use crate::config::CategoryLabels;
use crate::models::CategoryBatch;
use crate::outputs::console::ReportView;
use crate::pipeline::Pipeline;
use crate::scoring::AgroScorer;
use crate::scrapers::NewsSource;
use crate::summarizer::ShortSummarizer;
use dialoguer::Select;
use std::fmt::Write as _;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    FullRun,
    CrawlOnly,
    Rescore,
    Exit,
}

impl MenuChoice {
    pub const ALL: [MenuChoice; 4] = [
        MenuChoice::FullRun,
        MenuChoice::CrawlOnly,
        MenuChoice::Rescore,
        MenuChoice::Exit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MenuChoice::FullRun => "전체 분석 실행",
            MenuChoice::CrawlOnly => "뉴스 크롤링만 실행",
            MenuChoice::Rescore => "기존 데이터로 어그로 분석",
            MenuChoice::Exit => "종료",
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Per-category counts and titles after a crawl-only run.
pub fn crawl_overview(batches: &[CategoryBatch], labels: &CategoryLabels) -> String {
    let total: usize = batches.iter().map(|b| b.articles.len()).sum();
    let mut out = format!("총 {total}개의 뉴스를 수집했습니다.\n");
    for batch in batches {
        let _ = writeln!(out, "\n[{}] {}개", labels.get(batch.category), batch.articles.len());
        for article in &batch.articles {
            let _ = writeln!(out, "  {}. {} ({})", article.rank, article.title, article.press);
        }
    }
    out
}

/// Loop over the menu until the user exits or the terminal stops answering.
pub async fn run_menu<S, A, M>(pipeline: &Pipeline<S, A, M>, labels: &CategoryLabels, shorts: bool)
where
    S: NewsSource,
    A: AgroScorer,
    M: ShortSummarizer,
{
    println!("=== 네이트 뉴스 어그로 분석 시스템 ===");
    let items = MenuChoice::ALL.map(|c| c.label());

    loop {
        let selection = Select::new()
            .with_prompt("선택하세요")
            .items(&items)
            .default(0)
            .interact();

        let choice = match selection {
            Ok(index) => MenuChoice::from_index(index),
            Err(e) => {
                warn!(error = %e, "Menu input closed");
                println!("\n시스템을 종료합니다.");
                return;
            }
        };

        info!(?choice, "Menu selection");
        match choice {
            Some(MenuChoice::FullRun) => {
                println!("\n전체 분석을 시작합니다...");
                let report = pipeline.run().await;
                print!("{}", ReportView { report: &report, labels, shorts });
            }
            Some(MenuChoice::CrawlOnly) => {
                println!("\n뉴스 크롤링을 시작합니다...");
                let batches = pipeline.crawl_only().await;
                print!("{}", crawl_overview(&batches, labels));
            }
            Some(MenuChoice::Rescore) => {
                println!("\n기존 데이터로 어그로 분석을 실행합니다...");
                println!("기능 준비 중...");
            }
            Some(MenuChoice::Exit) => {
                println!("시스템을 종료합니다.");
                return;
            }
            None => println!("잘못된 선택입니다."),
        }
    }
}
