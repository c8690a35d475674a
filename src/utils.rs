//! Utility functions for text handling and file system checks.
//!
//! - Character-safe truncation for prompts and log lines
//! - Integer extraction used by the response parsers
//! - Output directory validation

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument, warn};

static SIGNED_INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"-?\d+").expect("static regex"));
static UNSIGNED_INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("static regex"));

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` characters and get an ellipsis plus the
/// number of dropped bytes appended. Cuts always land on a character
/// boundary, so Hangul text is safe.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// The first `max` characters of `s`.
pub fn excerpt(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        None => s,
        Some((cut, _)) => &s[..cut],
    }
}

/// First integer in `line`, honouring a leading minus sign.
///
/// Values too large for `i64` saturate.
pub fn first_signed_integer(line: &str) -> Option<i64> {
    SIGNED_INTEGER.find(line).map(|m| {
        m.as_str().parse::<i64>().unwrap_or(if m.as_str().starts_with('-') {
            i64::MIN
        } else {
            i64::MAX
        })
    })
}

/// First run of digits in `line`. Values too large for `u32` saturate.
pub fn first_unsigned_integer(line: &str) -> Option<u32> {
    UNSIGNED_INTEGER
        .find(line)
        .map(|m| m.as_str().parse::<u32>().unwrap_or(u32::MAX))
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then writes and removes a scratch file.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    let scratch_path = format!("{}/..__write_check__", path.trim_end_matches('/'));
    stdfs::File::create(&scratch_path)?;
    if let Err(e) = stdfs::remove_file(&scratch_path) {
        warn!(file = %scratch_path, error = %e, "Could not remove write check file");
    }
    info!("Output directory is writable");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_multibyte() {
        let result = truncate_for_log("가나다라마", 2);
        assert_eq!(result, "가나…(+9 bytes)");
    }

    #[test]
    fn test_excerpt_counts_characters() {
        assert_eq!(excerpt("가나다라", 2), "가나");
        assert_eq!(excerpt("abc", 10), "abc");
        assert_eq!(excerpt("", 5), "");
    }

    #[test]
    fn test_first_signed_integer() {
        assert_eq!(first_signed_integer("어그로 점수: 85점"), Some(85));
        assert_eq!(first_signed_integer("score: -10"), Some(-10));
        assert_eq!(first_signed_integer("70-79 band"), Some(70));
        assert_eq!(first_signed_integer("no digits"), None);
        assert_eq!(first_signed_integer("score: 99999999999999999999999"), Some(i64::MAX));
    }

    #[test]
    fn test_first_unsigned_integer() {
        assert_eq!(first_unsigned_integer("예상 읽기 시간: 45초"), Some(45));
        assert_eq!(first_unsigned_integer("reading time: -3"), Some(3));
        assert_eq!(first_unsigned_integer("없음"), None);
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("nested/out");
        let target = target.to_str().unwrap();
        ensure_writable_dir(target).await.unwrap();
        assert!(std::path::Path::new(target).is_dir());
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_leaves_dir_empty() {
        let tmp = tempfile::tempdir().unwrap();
        ensure_writable_dir(tmp.path().to_str().unwrap()).await.unwrap();
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_rejects_file_path() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("plain.txt");
        std::fs::write(&file, "x").unwrap();
        let nested = file.join("out");
        assert!(ensure_writable_dir(nested.to_str().unwrap()).await.is_err());
    }
}
