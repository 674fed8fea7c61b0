//! Quote collection backed by durable storage.
//!
//! The store keeps the collection in memory and writes the full collection
//! back to storage after every mutation.

use std::sync::Arc;

use rand::seq::SliceRandom;
use tokio::sync::Mutex;

use crate::domain::{
    seed_quotes, AppError, CategoryFilter, ImportSummary, Quote, QuoteCollection, Result,
};
use crate::infrastructure::local_storage::{FILTER_KEY, QUOTES_KEY};
use crate::infrastructure::LocalStorage;

/// Handle shared between the CLI and the sync engine.
pub type SharedStore = Arc<Mutex<QuoteStore>>;

/// Append `quote` to `quotes` after trimming and validating it.
///
/// # Errors
/// Returns `AppError::Validation` if text or category is empty after trimming.
pub fn add(quotes: &[Quote], quote: &Quote) -> Result<QuoteCollection> {
    let quote = quote.trimmed();

    if quote.text.is_empty() || quote.category.is_empty() {
        return Err(AppError::validation(
            "Please enter both quote text and category",
        ));
    }

    let mut next = quotes.to_vec();
    next.push(quote);
    Ok(next)
}

/// In-memory quote collection persisted through `LocalStorage`.
pub struct QuoteStore {
    storage: LocalStorage,
    quotes: QuoteCollection,
    last_quote: Option<Quote>,
}

impl QuoteStore {
    /// Open the store, loading the collection from storage.
    ///
    /// # Errors
    /// Returns error if storage cannot be read or written.
    pub fn open(storage: LocalStorage) -> Result<Self> {
        let mut store = Self {
            storage,
            quotes: Vec::new(),
            last_quote: None,
        };
        store.quotes = store.load()?;
        Ok(store)
    }

    /// Wrap the store in a shared handle.
    #[must_use]
    pub fn into_shared(self) -> SharedStore {
        Arc::new(Mutex::new(self))
    }

    /// Read the stored collection, seeding defaults if it is absent or corrupt.
    ///
    /// # Errors
    /// Returns error only if storage itself fails.
    pub fn load(&self) -> Result<QuoteCollection> {
        let stored = match self.storage.get(QUOTES_KEY)? {
            Some(raw) => match decode_quotes(&raw) {
                Ok(quotes) => Some(quotes),
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding stored quotes");
                    None
                }
            },
            None => None,
        };

        if let Some(quotes) = stored {
            tracing::debug!(count = quotes.len(), "Loaded quotes from storage");
            return Ok(quotes);
        }

        let seeds = seed_quotes();
        self.save(&seeds)?;
        tracing::info!(count = seeds.len(), "Seeded default quotes");
        Ok(seeds)
    }

    /// Replace the stored collection with `quotes`.
    ///
    /// # Errors
    /// Returns error if serialization or the write fails.
    pub fn save(&self, quotes: &[Quote]) -> Result<()> {
        let raw = serde_json::to_string(quotes).map_err(AppError::json_parse)?;
        self.storage.set(QUOTES_KEY, &raw)
    }

    /// Re-read the collection from storage, picking up writes from other handles.
    ///
    /// # Errors
    /// Returns error only if storage itself fails.
    pub fn reload(&mut self) -> Result<&[Quote]> {
        self.quotes = self.load()?;
        Ok(&self.quotes)
    }

    /// Current collection.
    #[must_use]
    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    /// Validate and append a quote, then persist.
    ///
    /// # Errors
    /// Returns `AppError::Validation` for empty fields; the collection is unchanged.
    pub fn add_quote(&mut self, quote: &Quote) -> Result<()> {
        let next = add(&self.quotes, quote)?;
        self.save(&next)?;
        self.quotes = next;
        tracing::info!(count = self.quotes.len(), "Quote added");
        Ok(())
    }

    /// Replace the whole collection, then persist.
    ///
    /// # Errors
    /// Returns error if the write fails; the collection is unchanged.
    pub fn replace_all(&mut self, quotes: QuoteCollection) -> Result<()> {
        self.save(&quotes)?;
        self.quotes = quotes;
        Ok(())
    }

    /// Distinct categories in first-seen order.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();
        for quote in &self.quotes {
            if !categories.contains(&quote.category.as_str()) {
                categories.push(&quote.category);
            }
        }
        categories
    }

    /// Quotes passing `filter`.
    #[must_use]
    pub fn filtered(&self, filter: &CategoryFilter) -> Vec<&Quote> {
        self.quotes.iter().filter(|q| filter.matches(q)).collect()
    }

    /// Persisted category filter; unreadable values mean `All`.
    #[must_use]
    pub fn selected_filter(&self) -> CategoryFilter {
        match self.storage.get(FILTER_KEY) {
            Ok(Some(raw)) => raw.parse::<CategoryFilter>().unwrap_or_default(),
            Ok(None) => CategoryFilter::All,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read category filter");
                CategoryFilter::All
            }
        }
    }

    /// Persist the category filter.
    ///
    /// # Errors
    /// Returns error if the write fails.
    pub fn set_selected_filter(&self, filter: &CategoryFilter) -> Result<()> {
        self.storage.set(FILTER_KEY, filter.as_stored())
    }

    /// Pick a random quote passing `filter` and remember it for this session.
    pub fn random_quote(&mut self, filter: &CategoryFilter) -> Option<Quote> {
        let picked = self
            .filtered(filter)
            .choose(&mut rand::thread_rng())
            .map(|q| (*q).clone())?;
        self.last_quote = Some(picked.clone());
        Some(picked)
    }

    /// Most recently shown quote in this session.
    #[must_use]
    pub const fn last_quote(&self) -> Option<&Quote> {
        self.last_quote.as_ref()
    }

    /// Collection as a pretty-printed JSON array.
    ///
    /// # Errors
    /// Returns error if serialization fails.
    pub fn export_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.quotes).map_err(AppError::json_parse)
    }

    /// Append quotes from a JSON array, skipping invalid entries.
    ///
    /// # Errors
    /// Returns error if `json` is not a quote array or the write fails.
    pub fn import_json(&mut self, json: &str) -> Result<ImportSummary> {
        let incoming: QuoteCollection = serde_json::from_str(json).map_err(AppError::json_parse)?;

        let mut next = self.quotes.clone();
        let mut summary = ImportSummary::default();

        for quote in &incoming {
            match add(&next, quote) {
                Ok(appended) => {
                    next = appended;
                    summary.imported += 1;
                }
                Err(_) => summary.skipped += 1,
            }
        }

        self.replace_all(next)?;
        tracing::info!(
            imported = summary.imported,
            skipped = summary.skipped,
            "Quotes imported"
        );

        Ok(summary)
    }

    /// Underlying storage, for sync state bookkeeping.
    #[must_use]
    pub const fn storage(&self) -> &LocalStorage {
        &self.storage
    }
}

fn decode_quotes(raw: &str) -> Result<QuoteCollection> {
    serde_json::from_str(raw).map_err(|e| AppError::storage_parse(QUOTES_KEY, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn memory_store() -> QuoteStore {
        QuoteStore::open(LocalStorage::open_in_memory().unwrap()).unwrap()
    }

    #[test]
    fn test_empty_storage_is_seeded_and_persisted() {
        let store = memory_store();

        assert_eq!(store.quotes(), seed_quotes().as_slice());
        assert!(store.storage().get(QUOTES_KEY).unwrap().is_some());
    }

    #[test]
    fn test_corrupt_storage_falls_back_to_seeds() {
        let storage = LocalStorage::open_in_memory().unwrap();
        storage.set(QUOTES_KEY, "{not json").unwrap();

        let store = QuoteStore::open(storage).unwrap();

        assert_eq!(store.quotes(), seed_quotes().as_slice());
        let raw = store.storage().get(QUOTES_KEY).unwrap().unwrap();
        assert_eq!(decode_quotes(&raw).unwrap(), seed_quotes());
    }

    #[test]
    fn test_wrong_shape_falls_back_to_seeds() {
        let storage = LocalStorage::open_in_memory().unwrap();
        storage.set(QUOTES_KEY, r#"[{"title": "x"}]"#).unwrap();

        let store = QuoteStore::open(storage).unwrap();
        assert_eq!(store.quotes().len(), 3);
    }

    #[test]
    fn test_stored_empty_array_is_kept() {
        let storage = LocalStorage::open_in_memory().unwrap();
        storage.set(QUOTES_KEY, "[]").unwrap();

        let store = QuoteStore::open(storage).unwrap();
        assert!(store.quotes().is_empty());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("storage.db");

        let quotes = vec![
            Quote::new("A", "Motivation"),
            Quote::new("with \"quotes\" | pipes", "Ünïcode"),
        ];

        let store = QuoteStore::open(LocalStorage::open(&db_path).unwrap()).unwrap();
        store.save(&quotes).unwrap();
        drop(store);

        let reopened = QuoteStore::open(LocalStorage::open(&db_path).unwrap()).unwrap();
        assert_eq!(reopened.quotes(), quotes.as_slice());
        assert_eq!(reopened.load().unwrap(), quotes);
    }

    #[test]
    fn test_add_rejects_empty_fields() {
        let quotes = vec![Quote::new("A", "Motivation")];

        let err = add(&quotes, &Quote::new("", "x")).unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
        assert!(add(&quotes, &Quote::new("text", "   ")).is_err());
        assert_eq!(quotes.len(), 1);
    }

    #[test]
    fn test_add_trims_and_appends() {
        let quotes = vec![Quote::new("A", "Motivation")];
        let next = add(&quotes, &Quote::new("  B ", " Life ")).unwrap();
        assert_eq!(next, vec![Quote::new("A", "Motivation"), Quote::new("B", "Life")]);
    }

    #[test]
    fn test_add_quote_persists() {
        let mut store = memory_store();
        store.add_quote(&Quote::new("New", "Fresh")).unwrap();

        assert_eq!(store.quotes().len(), 4);
        assert_eq!(store.load().unwrap().last(), Some(&Quote::new("New", "Fresh")));
    }

    #[test]
    fn test_reload_sees_other_handle_writes() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("storage.db");

        let mut first = QuoteStore::open(LocalStorage::open(&db_path).unwrap()).unwrap();
        let mut second = QuoteStore::open(LocalStorage::open(&db_path).unwrap()).unwrap();
        second.add_quote(&Quote::new("Mine", "Personal")).unwrap();

        assert_eq!(first.quotes().len(), 3);
        let reloaded = first.reload().unwrap();
        assert_eq!(reloaded.len(), 4);
        assert_eq!(reloaded.last(), Some(&Quote::new("Mine", "Personal")));
    }

    #[test]
    fn test_add_quote_invalid_leaves_store_unchanged() {
        let mut store = memory_store();
        assert!(store.add_quote(&Quote::new("", "x")).is_err());
        assert_eq!(store.quotes(), seed_quotes().as_slice());
        assert_eq!(store.load().unwrap(), seed_quotes());
    }

    #[test]
    fn test_categories_and_filter() {
        let mut store = memory_store();
        store.add_quote(&Quote::new("Another", "Motivation")).unwrap();

        assert_eq!(
            store.categories(),
            vec!["Motivation", "Inspiration", "Programming"]
        );

        let filter = CategoryFilter::Category("Motivation".into());
        assert_eq!(store.filtered(&filter).len(), 2);
        assert_eq!(store.filtered(&CategoryFilter::All).len(), 4);
    }

    #[test]
    fn test_selected_filter_persists() {
        let store = memory_store();
        assert_eq!(store.selected_filter(), CategoryFilter::All);

        let filter = CategoryFilter::Category("Programming".into());
        store.set_selected_filter(&filter).unwrap();
        assert_eq!(store.selected_filter(), filter);

        store.set_selected_filter(&CategoryFilter::All).unwrap();
        assert_eq!(store.selected_filter(), CategoryFilter::All);
    }

    #[test]
    fn test_random_quote_respects_filter_and_remembers() {
        let mut store = memory_store();
        assert!(store.last_quote().is_none());

        let filter = CategoryFilter::Category("Inspiration".into());
        let quote = store.random_quote(&filter).unwrap();

        assert_eq!(quote.category, "Inspiration");
        assert_eq!(store.last_quote(), Some(&quote));

        let none = CategoryFilter::Category("Missing".into());
        assert!(store.random_quote(&none).is_none());
        assert_eq!(store.last_quote(), Some(&quote));
    }

    #[test]
    fn test_import_appends_and_skips_invalid() {
        let mut store = memory_store();
        let json = r#"[
            {"text": "Imported", "category": "Files"},
            {"text": "", "category": "Files"},
            {"text": "Creativity takes courage.", "category": "Inspiration"}
        ]"#;

        let summary = store.import_json(json).unwrap();

        assert_eq!(summary, ImportSummary { imported: 2, skipped: 1 });
        assert_eq!(store.quotes().len(), 5);
        assert_eq!(store.load().unwrap().len(), 5);
    }

    #[test]
    fn test_import_garbage_is_error_and_noop() {
        let mut store = memory_store();
        assert!(store.import_json("not json").is_err());
        assert_eq!(store.quotes().len(), 3);
    }

    #[test]
    fn test_export_is_pretty_array() {
        let store = memory_store();
        let json = store.export_json().unwrap();

        assert!(json.starts_with("[\n"));
        let parsed: QuoteCollection = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, seed_quotes());
    }
}
