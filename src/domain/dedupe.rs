//! Collapse a quote sequence to unique (text, category) entries.

use std::collections::HashSet;

use super::models::Quote;

/// Remove duplicate quotes, keeping the first occurrence of each
/// (text, category) pair and preserving relative order.
#[must_use]
pub fn dedupe(quotes: &[Quote]) -> Vec<Quote> {
    let mut seen: HashSet<(&str, &str)> = HashSet::with_capacity(quotes.len());

    quotes
        .iter()
        .filter(|q| seen.insert((q.text.as_str(), q.category.as_str())))
        .cloned()
        .collect()
}
