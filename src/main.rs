//! # Nate Agro News
//!
//! Crawls the Nate News ranking pages, scores every article for how much
//! attention ("agro") it is likely to draw, keeps the highest-scoring few
//! across all categories and writes a short-form summary for each of them.
//!
//! ## Features
//!
//! - Crawls the economy, sports and entertainment ranking pages
//! - Scores and summarizes through an Ollama-compatible endpoint, or with
//!   keyword rules when no model is available
//! - Prints a ranked report and saves it as a timestamped JSON file
//! - Optional Shorts captions and an interactive menu
//! - Offline demo over built-in sample articles
//!
//! ## Usage
//!
//! ```sh
//! nate_agro_news -o ./reports
//! LLM_TYPE=rule_based nate_agro_news --top-n 5 --shorts
//! nate_agro_news --interactive
//! nate_agro_news --demo
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Crawling**: Read each category's ranking page, then every article page
//! 2. **Scoring**: Assign each article a 0-100 attention score
//! 3. **Selection**: Keep the global top N, stable on ties
//! 4. **Summarizing**: Short summary, key points and reading time per pick
//! 5. **Output**: Console report and JSON file

use clap::Parser;
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod demo;
mod interactive;
mod llm;
mod models;
mod outputs;
mod pacing;
mod pipeline;
mod scoring;
mod scrapers;
mod selector;
mod summarizer;
mod utils;

use cli::Cli;
use config::Config;
use config::ScoringMode;
use outputs::console::ReportView;
use pacing::RateGate;
use pipeline::Pipeline;
use scoring::ScoringStrategy;
use scrapers::ArticleFetcher;
use scrapers::nate::NateScraper;
use summarizer::SummaryStrategy;
use utils::ensure_writable_dir;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    info!("nate_agro_news starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let mut config = Config::from_env()?;
    if let Some(mode) = args.scoring_mode {
        config.scoring_mode = mode;
    }
    info!(
        mode = ?config.scoring_mode,
        model = %config.llm.model,
        categories = config.categories.len(),
        max_per_category = config.max_news_per_category,
        "Loaded configuration"
    );

    let labels = config.labels();

    if args.demo {
        info!("Running offline demo");
        let report = demo::demo_pipeline(&config, args.top_n).run().await;
        print!(
            "{}",
            ReportView {
                report: &report,
                labels: &labels,
                shorts: true,
            }
        );
        println!("\n{}", demo::OLLAMA_SETUP_GUIDE);
        return Ok(());
    }

    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir,
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let fetcher = ArticleFetcher::new(NateScraper::new(&config)?, &config);
    // scoring and summarizing calls share one spacing
    let model_gate = Arc::new(RateGate::new(config.item_interval));
    let mut pipeline = Pipeline::new(
        fetcher,
        ScoringStrategy::from_config(&config, &model_gate)?,
        SummaryStrategy::from_config(&config, &model_gate)?,
        args.top_n,
        Some(PathBuf::from(&args.output_dir)),
    );
    if config.scoring_mode == ScoringMode::External {
        pipeline = pipeline.with_category_interval(config.category_interval);
    }

    if args.interactive {
        interactive::run_menu(&pipeline, &labels, args.shorts).await;
    } else {
        let report = pipeline.run().await;
        print!(
            "{}",
            ReportView {
                report: &report,
                labels: &labels,
                shorts: args.shorts,
            }
        );
    }

    info!("nate_agro_news finished");
    Ok(())
}
