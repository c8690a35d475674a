//! JSON output of the analysis report.
//!
//! Each run writes one pretty-printed UTF-8 file whose name embeds the
//! analysis timestamp:
//! ```text
//! output_dir/nate_news_analysis_20250506_083000.json
//! ```

use crate::models::AgroReport;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{error, info, instrument};

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// File name for a report, e.g. `nate_news_analysis_20250506_083000.json`.
pub fn report_filename(report: &AgroReport) -> String {
    format!(
        "nate_news_analysis_{}.json",
        report.analysis_timestamp.format("%Y%m%d_%H%M%S")
    )
}

/// Write an [`AgroReport`] into `output_dir`, creating the directory if needed.
///
/// Returns the path of the written file.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir.display()))]
pub async fn write_report(report: &AgroReport, output_dir: &Path) -> Result<PathBuf, OutputError> {
    let json = serde_json::to_string_pretty(report)?;

    if let Err(e) = fs::create_dir_all(output_dir).await {
        error!(error = %e, "Failed to create output dir");
        return Err(OutputError::Write {
            path: output_dir.to_path_buf(),
            source: e,
        });
    }

    let path = output_dir.join(report_filename(report));
    info!(path = %path.display(), "Writing JSON");
    fs::write(&path, json).await.map_err(|source| OutputError::Write {
        path: path.clone(),
        source,
    })?;
    info!(path = %path.display(), articles = report.top_agro_news.len(), "Wrote report JSON");

    Ok(path)
}
