//! Command-line interface definitions.
//!
//! Flags only cover how a run is driven and where it writes. Endpoint,
//! category and pacing settings come from the environment (see
//! [`crate::config`]); `--scoring-mode` is the one setting that can be given
//! either way, and the flag wins.

use crate::config::ScoringMode;
use crate::selector::DEFAULT_TOP_N;
use clap::Parser;

/// Command-line arguments for the Nate news attention analyzer.
///
/// # Examples
///
/// ```sh
/// # One full run, report printed and saved to ./reports
/// nate_agro_news -o ./reports
///
/// # Keyword rules only, top five, with Shorts captions
/// nate_agro_news --scoring-mode heuristic --top-n 5 --shorts
///
/// # Menu
/// nate_agro_news --interactive
///
/// # Offline demo over built-in samples
/// nate_agro_news --demo
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Show the interactive menu instead of running once
    #[arg(short, long)]
    pub interactive: bool,

    /// Directory for the JSON report
    #[arg(short, long, default_value = ".")]
    pub output_dir: String,

    /// Number of articles kept across all categories
    #[arg(short = 'n', long, default_value_t = DEFAULT_TOP_N)]
    pub top_n: usize,

    /// Override the scoring mode selected by LLM_TYPE
    #[arg(short, long, value_enum)]
    pub scoring_mode: Option<ScoringMode>,

    /// Print a Shorts caption under each ranked article
    #[arg(long)]
    pub shorts: bool,

    /// Rank three built-in sample articles with keyword rules, offline
    #[arg(long, conflicts_with = "interactive")]
    pub demo: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["nate_agro_news"]);

        assert!(!cli.interactive);
        assert_eq!(cli.output_dir, ".");
        assert_eq!(cli.top_n, 3);
        assert_eq!(cli.scoring_mode, None);
        assert!(!cli.shorts);
        assert!(!cli.demo);
    }

    #[test]
    fn test_cli_demo_flag() {
        let cli = Cli::parse_from(["nate_agro_news", "--demo", "--top-n", "2"]);
        assert!(cli.demo);
        assert_eq!(cli.top_n, 2);

        assert!(Cli::try_parse_from(["nate_agro_news", "--demo", "--interactive"]).is_err());
    }

    #[test]
    fn test_cli_long_flags() {
        let cli = Cli::parse_from([
            "nate_agro_news",
            "--interactive",
            "--output-dir",
            "./reports",
            "--top-n",
            "5",
            "--scoring-mode",
            "heuristic",
            "--shorts",
        ]);

        assert!(cli.interactive);
        assert_eq!(cli.output_dir, "./reports");
        assert_eq!(cli.top_n, 5);
        assert_eq!(cli.scoring_mode, Some(ScoringMode::Heuristic));
        assert!(cli.shorts);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from(["nate_agro_news", "-i", "-o", "/tmp/out", "-n", "1", "-s", "external"]);

        assert!(cli.interactive);
        assert_eq!(cli.output_dir, "/tmp/out");
        assert_eq!(cli.top_n, 1);
        assert_eq!(cli.scoring_mode, Some(ScoringMode::External));
    }

    #[test]
    fn test_cli_rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["nate_agro_news", "--scoring-mode", "magic"]).is_err());
    }
}
