//! Dictionary repository: words, definitions and per-user lists.
//!
//! Handlers talk to the [`Dictionary`] trait only; [`InMemoryDictionary`] is
//! the implementation wired by the binary.

mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

pub use memory::InMemoryDictionary;

#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("Word not found: {0}")]
    WordNotFound(String),

    #[error("couldn't find definitions for the word {0}")]
    DefinitionsNotFound(String),

    #[error("failed to read word list: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid word list: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Identificador interno de una palabra.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WordId(pub(crate) usize);

/// Pagina solicitada (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub const DEFAULT_LIMIT: u32 = 10;
    pub const MAX_LIMIT: u32 = 100;

    fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize).saturating_mul(self.limit as usize)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

/// Paginated listing in the API's wire shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub results: Vec<T>,
    pub total_docs: usize,
    pub page: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> Page<T> {
    /// Cuts one page out of the complete, already ordered result set.
    pub fn slice(all: Vec<T>, request: PageRequest) -> Self {
        let total_docs = all.len();
        let limit = request.limit.max(1) as usize;
        let total_pages = total_docs.div_ceil(limit) as u32;

        let results = all
            .into_iter()
            .skip(request.offset())
            .take(limit)
            .collect();

        Self {
            results,
            total_docs,
            page: request.page,
            total_pages,
            has_next: request.page < total_pages,
            has_prev: request.page > 1,
        }
    }
}

/// A word in a user's history or favorites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordEntry {
    pub word: String,
    pub added: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub favorites_count: usize,
    pub history_count: usize,
}

/// Repository behind the dictionary endpoints.
///
/// Users are created implicitly the first time they are referenced.
#[async_trait]
pub trait Dictionary: Send + Sync {
    /// Case-insensitive substring search over the word list.
    async fn search(&self, search: &str, page: PageRequest) -> Result<Page<String>, DictionaryError>;

    /// Resolves a word, failing with `WordNotFound` when it is not listed.
    async fn word_id(&self, word: &str) -> Result<WordId, DictionaryError>;

    /// Definition document for a word.
    async fn word_detail(&self, word: &str) -> Result<serde_json::Value, DictionaryError>;

    async fn add_history(&self, user_id: &str, word: WordId) -> Result<(), DictionaryError>;

    /// Adds a favorite; adding it twice keeps the first timestamp.
    async fn add_favorite(&self, user_id: &str, word: WordId) -> Result<(), DictionaryError>;

    /// Removes a favorite; removing a missing one is not an error.
    async fn remove_favorite(&self, user_id: &str, word: WordId) -> Result<(), DictionaryError>;

    /// History, most recent first.
    async fn history(&self, user_id: &str, page: PageRequest) -> Result<Page<WordEntry>, DictionaryError>;

    /// Favorites, most recent first.
    async fn favorites(&self, user_id: &str, page: PageRequest) -> Result<Page<WordEntry>, DictionaryError>;

    async fn profile(&self, user_id: &str) -> Result<UserProfile, DictionaryError>;
}
