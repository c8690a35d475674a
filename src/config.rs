//! Run configuration sourced from the environment (and a `.env` file).
//!
//! [`Config`] is built once at start-up and handed to every component by
//! reference; nothing reads the environment after that point.

use crate::models::Category;
use std::collections::BTreeMap;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
    #[error("unknown category in CATEGORIES: {0}")]
    UnknownCategory(String),
    #[error("CATEGORIES must name at least one category")]
    NoCategories,
}

/// How articles are scored and summarized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ScoringMode {
    /// Ask the text-generation endpoint.
    External,
    /// Keyword and category rules, no network calls.
    Heuristic,
}

impl FromStr for ScoringMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ollama" | "external" | "llm" => Ok(ScoringMode::External),
            "rule" | "rule_based" | "rules" | "heuristic" => Ok(ScoringMode::Heuristic),
            other => Err(other.to_string()),
        }
    }
}

/// Listing page and display label for one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryConfig {
    /// Which category this entry configures.
    pub category: Category,
    /// Display label (`CATEGORY_LABEL_<ID>`), Korean by default.
    pub label: String,
    /// Ranking page to crawl (`CATEGORY_URL_<ID>`).
    pub listing_url: String,
}

/// Settings for the text-generation endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    /// Endpoint root (`OLLAMA_BASE_URL`); `/api/generate` is appended.
    pub base_url: String,
    /// Model name (`OLLAMA_MODEL`).
    pub model: String,
    /// Token budget per call (`MAX_TOKENS`), sent as `num_predict`.
    pub max_tokens: u32,
    /// Sampling temperature (`TEMPERATURE`).
    pub temperature: f32,
    /// Per-call timeout (`LLM_TIMEOUT_SECS`).
    pub timeout: Duration,
}

/// Everything a run needs, resolved once at start-up.
///
/// # Defaults
///
/// Every key is optional. Missing keys take the defaults below, and
/// malformed numbers or unknown category ids are a [`ConfigError`].
///
/// ```text
/// LLM_TYPE=ollama  OLLAMA_BASE_URL=http://localhost:11434  OLLAMA_MODEL=llama2
/// MAX_TOKENS=1000  TEMPERATURE=0.7  LLM_TIMEOUT_SECS=30
/// NATE_NEWS_BASE_URL=https://news.nate.com  CATEGORIES=economy,sports,entertainment
/// MAX_NEWS_PER_CATEGORY=10  FETCH_TIMEOUT_SECS=10  ITEM_DELAY_MS=1000  CATEGORY_DELAY_MS=2000
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Model or keyword rules (`LLM_TYPE`).
    pub scoring_mode: ScoringMode,
    /// Text-generation endpoint settings.
    pub llm: LlmConfig,
    /// Site root that relative article links are joined to (`NATE_NEWS_BASE_URL`).
    pub base_url: String,
    /// Listing entries read per category (`MAX_NEWS_PER_CATEGORY`).
    pub max_news_per_category: usize,
    /// Categories to crawl, in crawl order (`CATEGORIES`).
    pub categories: Vec<CategoryConfig>,
    /// Per-request timeout for page fetches (`FETCH_TIMEOUT_SECS`).
    pub fetch_timeout: Duration,
    /// Minimum spacing between consecutive article-level external calls.
    pub item_interval: Duration,
    /// Minimum pause after one category finishes before the next starts.
    pub category_interval: Duration,
}

impl Config {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup, falling back to defaults for
    /// anything missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let scoring_mode = match lookup("LLM_TYPE") {
            None => ScoringMode::External,
            Some(raw) => raw.parse().unwrap_or_else(|other: String| {
                warn!(llm_type = %other, "Unknown LLM_TYPE; using heuristic scoring");
                ScoringMode::Heuristic
            }),
        };

        let llm = LlmConfig {
            base_url: lookup("OLLAMA_BASE_URL").unwrap_or_else(|| "http://localhost:11434".to_string()),
            model: lookup("OLLAMA_MODEL").unwrap_or_else(|| "llama2".to_string()),
            max_tokens: parse_or(&lookup, "MAX_TOKENS", 1000)?,
            temperature: parse_or(&lookup, "TEMPERATURE", 0.7)?,
            timeout: Duration::from_secs(parse_or(&lookup, "LLM_TIMEOUT_SECS", 30)?),
        };

        let base_url = lookup("NATE_NEWS_BASE_URL").unwrap_or_else(|| "https://news.nate.com".to_string());

        let selected = match lookup("CATEGORIES") {
            None => Category::ALL.to_vec(),
            Some(raw) => {
                let mut selected = Vec::new();
                for id in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                    let category = id
                        .parse::<Category>()
                        .map_err(|_| ConfigError::UnknownCategory(id.to_string()))?;
                    if !selected.contains(&category) {
                        selected.push(category);
                    }
                }
                if selected.is_empty() {
                    return Err(ConfigError::NoCategories);
                }
                selected
            }
        };

        let categories = selected
            .into_iter()
            .map(|category| {
                let key = category.as_str().to_uppercase();
                CategoryConfig {
                    category,
                    label: lookup(&format!("CATEGORY_LABEL_{key}"))
                        .unwrap_or_else(|| category.default_label().to_string()),
                    listing_url: lookup(&format!("CATEGORY_URL_{key}")).unwrap_or_else(|| {
                        format!(
                            "{}/rank/interest?sc={}",
                            base_url.trim_end_matches('/'),
                            category.section_code()
                        )
                    }),
                }
            })
            .collect();

        Ok(Config {
            scoring_mode,
            llm,
            max_news_per_category: parse_or(&lookup, "MAX_NEWS_PER_CATEGORY", 10)?,
            categories,
            base_url,
            fetch_timeout: Duration::from_secs(parse_or(&lookup, "FETCH_TIMEOUT_SECS", 10)?),
            item_interval: Duration::from_millis(parse_or(&lookup, "ITEM_DELAY_MS", 1000)?),
            category_interval: Duration::from_millis(parse_or(&lookup, "CATEGORY_DELAY_MS", 2000)?),
        })
    }

    /// Owned copy of the category labels for components that outlive `&self`.
    pub fn labels(&self) -> CategoryLabels {
        CategoryLabels(
            self.categories
                .iter()
                .map(|c| (c.category, c.label.clone()))
                .collect(),
        )
    }
}

/// Display labels keyed by category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryLabels(BTreeMap<Category, String>);

impl CategoryLabels {
    pub fn get(&self, category: Category) -> &str {
        self.0
            .get(&category)
            .map(String::as_str)
            .unwrap_or_else(|| category.default_label())
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw,
        }),
    }
}

#[cfg(test)]
pub(crate) fn test_config(mode: ScoringMode) -> Config {
    let mut config = Config::from_lookup(|_| None).unwrap();
    config.scoring_mode = mode;
    config.item_interval = Duration::ZERO;
    config.category_interval = Duration::ZERO;
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.scoring_mode, ScoringMode::External);
        assert_eq!(config.llm.base_url, "http://localhost:11434");
        assert_eq!(config.llm.model, "llama2");
        assert_eq!(config.llm.max_tokens, 1000);
        assert_eq!(config.max_news_per_category, 10);
        assert_eq!(config.item_interval, Duration::from_secs(1));
        assert_eq!(config.category_interval, Duration::from_secs(2));
        assert_eq!(config.categories.len(), 3);
        assert_eq!(
            config.categories[0].listing_url,
            "https://news.nate.com/rank/interest?sc=eco"
        );
        assert_eq!(config.labels().get(Category::Sports), "스포츠");
        assert_eq!(config.labels().get(Category::Entertainment), "연예");
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("LLM_TYPE", "rule_based"),
            ("MAX_NEWS_PER_CATEGORY", "5"),
            ("TEMPERATURE", "0.2"),
            ("CATEGORIES", "entertainment, economy"),
            ("CATEGORY_LABEL_ENTERTAINMENT", "Showbiz"),
            ("CATEGORY_URL_ECONOMY", "http://localhost/eco"),
        ]))
        .unwrap();

        assert_eq!(config.scoring_mode, ScoringMode::Heuristic);
        assert_eq!(config.max_news_per_category, 5);
        assert!((config.llm.temperature - 0.2).abs() < f32::EPSILON);
        let ids: Vec<Category> = config.categories.iter().map(|c| c.category).collect();
        assert_eq!(ids, vec![Category::Entertainment, Category::Economy]);
        let labels = config.labels();
        assert_eq!(labels.get(Category::Entertainment), "Showbiz");
        assert_eq!(labels.get(Category::Sports), "스포츠");
        assert_eq!(config.categories[1].listing_url, "http://localhost/eco");
    }

    #[test]
    fn test_unknown_llm_type_falls_back_to_heuristic() {
        let config = Config::from_lookup(lookup_from(&[("LLM_TYPE", "huggingface")])).unwrap();
        assert_eq!(config.scoring_mode, ScoringMode::Heuristic);
    }

    #[test]
    fn test_invalid_number_is_an_error() {
        let err = Config::from_lookup(lookup_from(&[("MAX_TOKENS", "lots")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: "MAX_TOKENS".to_string(),
                value: "lots".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_category_is_an_error() {
        let err = Config::from_lookup(lookup_from(&[("CATEGORIES", "economy,politics")])).unwrap_err();
        assert_eq!(err, ConfigError::UnknownCategory("politics".to_string()));

        let err = Config::from_lookup(lookup_from(&[("CATEGORIES", " , ")])).unwrap_err();
        assert_eq!(err, ConfigError::NoCategories);
    }
}
