//! Domain models for quotes.
//!
//! A quote is a (text, category) pair with no identifier of its own.

use serde::{Deserialize, Serialize};

/// A single quote record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Quote {
    /// The quote text.
    pub text: String,
    /// Category the quote belongs to.
    pub category: String,
}

impl Quote {
    /// Create a new quote.
    #[must_use]
    pub fn new(text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: category.into(),
        }
    }

    /// Copy with both fields trimmed.
    #[must_use]
    pub fn trimmed(&self) -> Self {
        Self::new(self.text.trim(), self.category.trim())
    }
}

/// Ordered collection of quotes. Order only matters for display.
pub type QuoteCollection = Vec<Quote>;

/// Quotes used when nothing usable is stored yet.
#[must_use]
pub fn seed_quotes() -> QuoteCollection {
    vec![
        Quote::new("The only limit is your mind.", "Motivation"),
        Quote::new("Creativity takes courage.", "Inspiration"),
        Quote::new(
            "Code is like humor. When you have to explain it, it’s bad.",
            "Programming",
        ),
    ]
}

/// Which quotes are visible.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    /// Every category.
    #[default]
    All,
    /// A single category, matched exactly.
    Category(String),
}

impl CategoryFilter {
    /// Whether a quote passes this filter.
    #[must_use]
    pub fn matches(&self, quote: &Quote) -> bool {
        match self {
            Self::All => true,
            Self::Category(name) => quote.category == *name,
        }
    }

    /// Value stored under `selectedCategoryFilter`.
    #[must_use]
    pub fn as_stored(&self) -> &str {
        match self {
            Self::All => "all",
            Self::Category(name) => name,
        }
    }
}

impl std::str::FromStr for CategoryFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            Ok(Self::Category(s.to_string()))
        }
    }
}

impl std::fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_stored())
    }
}

/// Summary of a JSON import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Quotes appended to the collection.
    pub imported: usize,
    /// Entries rejected by validation.
    pub skipped: usize,
}
