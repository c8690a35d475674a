//! Global top-N selection across categories.

use crate::models::{CategoryBatch, NewsArticle};
use std::cmp::Reverse;

pub const DEFAULT_TOP_N: usize = 3;

/// Sort each batch by score, flatten in category order and keep the best `n`.
///
/// Both sorts are stable, so ties keep listing order within a category and
/// category order across categories. Unscored articles rank as 0.
///
/// # Arguments
///
/// * `batches` - Scored batches in crawl order
/// * `n` - How many articles to keep
///
/// # Returns
///
/// At most `n` articles, highest score first.
pub fn select_top(batches: Vec<CategoryBatch>, n: usize) -> Vec<NewsArticle> {
    let mut all: Vec<NewsArticle> = batches
        .into_iter()
        .flat_map(|mut batch| {
            batch.articles.sort_by_key(|a| Reverse(a.rank_score()));
            batch.articles
        })
        .collect();
    all.sort_by_key(|a| Reverse(a.rank_score()));
    all.truncate(n);
    all
}
