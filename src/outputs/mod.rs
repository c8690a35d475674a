//! Output generation for a finished run.
//!
//! # Submodules
//!
//! - [`json`]: Writes the [`AgroReport`](crate::models::AgroReport) to a timestamped JSON file
//! - [`console`]: Renders the report for the terminal
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── nate_news_analysis_20250506_083000.json
//! └── nate_news_analysis_20250506_200000.json
//! ```

pub mod console;
pub mod json;
