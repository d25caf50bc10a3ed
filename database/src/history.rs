//! Saved search terms.
//!
//! The list is most-recent-first, unique ignoring case, and bounded. It is
//! stored as a JSON array of strings under [`SAVED_SEARCH_TERMS_KEY`], the key
//! the browser dashboard used for the same data, so both can read it.

use crate::Database;
use finder_core::CoreError;
use tracing::{debug, warn};

pub const SAVED_SEARCH_TERMS_KEY: &str = "distributorSavedSearchTerms";
/// Last raw term typed by the user. Written on every search, never read back.
pub const LAST_SEARCH_TERM_KEY: &str = "distributorSearchTerm";
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedTerms {
    terms: Vec<String>,
    limit: usize,
}

impl SavedTerms {
    pub fn new(limit: usize) -> Self {
        Self {
            terms: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Builds a list from stored terms, oldest duplicates and overflow dropped.
    pub fn from_terms<I, S>(terms: I, limit: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut saved = Self::new(limit);
        for term in terms {
            let term = term.as_ref().trim();
            if term.is_empty() || saved.position(term).is_some() {
                continue;
            }
            if saved.terms.len() == saved.limit {
                break;
            }
            saved.terms.push(term.to_string());
        }
        saved
    }

    /// Reads the stored JSON form. Anything that is not an array of strings
    /// yields an empty list.
    pub fn parse(raw: &str, limit: usize) -> Self {
        match serde_json::from_str::<Vec<String>>(raw) {
            Ok(terms) => Self::from_terms(terms, limit),
            Err(e) => {
                warn!("Ignoring malformed saved search terms: {}", e);
                Self::new(limit)
            }
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::Value::from(self.terms.clone()).to_string()
    }

    fn position(&self, term: &str) -> Option<usize> {
        let lowered = term.to_lowercase();
        self.terms.iter().position(|t| t.to_lowercase() == lowered)
    }

    /// Moves `term` to the front, replacing any entry equal to it ignoring
    /// case. Returns false for blank terms.
    pub fn push(&mut self, term: &str) -> bool {
        let term = term.trim();
        if term.is_empty() {
            return false;
        }
        if let Some(index) = self.position(term) {
            self.terms.remove(index);
        }
        self.terms.insert(0, term.to_string());
        self.terms.truncate(self.limit);
        true
    }

    pub fn remove(&mut self, term: &str) -> bool {
        match self.position(term.trim()) {
            Some(index) => {
                self.terms.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.terms.clear();
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.terms.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl Default for SavedTerms {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

/// [`SavedTerms`] persisted in the settings store. Every mutation is written
/// before the call returns.
pub struct SearchHistory {
    db: Database,
    saved: SavedTerms,
}

impl SearchHistory {
    pub async fn load(db: Database, limit: usize) -> Result<Self, CoreError> {
        let saved = match db.get_setting(SAVED_SEARCH_TERMS_KEY).await? {
            Some(raw) => SavedTerms::parse(&raw, limit),
            None => SavedTerms::new(limit),
        };
        debug!("Loaded {} saved search terms", saved.len());
        Ok(Self { db, saved })
    }

    pub fn saved(&self) -> &SavedTerms {
        &self.saved
    }

    pub fn terms(&self) -> &[String] {
        self.saved.terms()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.saved.get(index)
    }

    pub async fn add(&mut self, term: &str) -> Result<bool, CoreError> {
        let mut next = self.saved.clone();
        if !next.push(term) {
            return Ok(false);
        }
        self.commit(next).await?;
        Ok(true)
    }

    pub async fn remove(&mut self, term: &str) -> Result<bool, CoreError> {
        let mut next = self.saved.clone();
        if !next.remove(term) {
            return Ok(false);
        }
        self.commit(next).await?;
        Ok(true)
    }

    pub async fn clear(&mut self) -> Result<(), CoreError> {
        self.commit(SavedTerms::new(self.saved.limit())).await
    }

    pub async fn record_raw_term(&self, raw: &str) -> Result<(), CoreError> {
        self.db.save_setting(LAST_SEARCH_TERM_KEY, raw).await
    }

    /// The in-memory list only changes once `next` is stored.
    async fn commit(&mut self, next: SavedTerms) -> Result<(), CoreError> {
        self.db
            .save_setting(SAVED_SEARCH_TERMS_KEY, &next.to_json())
            .await?;
        self.saved = next;
        Ok(())
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn into_database(self) -> Database {
        self.db
    }
}
