//! In-process dictionary backed by a sorted word list.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde_json::Value;
use tracing::info;

use super::{Dictionary, DictionaryError, Page, PageRequest, UserProfile, WordEntry, WordId};

#[derive(Debug)]
struct UserRecord {
    created_at: DateTime<Utc>,
    /// Orden de insercion (el mas reciente al final).
    favorites: Vec<(WordId, DateTime<Utc>)>,
    history: Vec<(WordId, DateTime<Utc>)>,
}

impl UserRecord {
    fn new() -> Self {
        Self {
            created_at: Utc::now(),
            favorites: Vec::new(),
            history: Vec::new(),
        }
    }
}

/// Dictionary kept entirely in memory.
///
/// The word list is fixed once the value is built; user lists live behind a
/// lock and are lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryDictionary {
    words: Vec<String>,
    index: HashMap<String, WordId>,
    definitions: HashMap<WordId, Value>,
    users: RwLock<HashMap<String, UserRecord>>,
}

impl InMemoryDictionary {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut words: Vec<String> = words.into_iter().map(Into::into).collect();
        words.sort();
        words.dedup();

        let index = words
            .iter()
            .enumerate()
            .map(|(i, word)| (word.clone(), WordId(i)))
            .collect();

        Self {
            words,
            index,
            definitions: HashMap::new(),
            users: RwLock::new(HashMap::new()),
        }
    }

    /// Parses a JSON object whose keys are the words.
    ///
    /// Values that are objects or arrays are kept as the word's definition
    /// document; any other value (the usual `1`) just lists the word.
    pub fn from_json_str(json: &str) -> Result<Self, DictionaryError> {
        let map: serde_json::Map<String, Value> = serde_json::from_str(json)?;

        let mut dictionary = Self::new(map.keys().cloned());
        for (word, value) in map {
            if value.is_object() || value.is_array() {
                dictionary = dictionary.with_definition(word, value);
            }
        }
        Ok(dictionary)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DictionaryError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let dictionary = Self::from_json_str(&contents)?;

        info!(
            path = %path.display(),
            words = dictionary.len(),
            definitions = dictionary.definitions.len(),
            "Word list loaded"
        );
        Ok(dictionary)
    }

    /// Attaches a definition document, adding the word if it is not listed.
    pub fn with_definition(mut self, word: impl Into<String>, definition: Value) -> Self {
        let word = word.into();
        if !self.index.contains_key(&word) {
            // Los ids dependen del orden, se reconstruye el indice
            let definitions: Vec<(String, Value)> = self
                .definitions
                .drain()
                .map(|(id, value)| (self.words[id.0].clone(), value))
                .collect();
            self.words.push(word.clone());

            let mut rebuilt = Self::new(std::mem::take(&mut self.words));
            for (known, value) in definitions {
                if let Some(&id) = rebuilt.index.get(&known) {
                    rebuilt.definitions.insert(id, value);
                }
            }
            self = rebuilt;
        }

        if let Some(&id) = self.index.get(&word) {
            self.definitions.insert(id, definition);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    fn entries(&self, list: &[(WordId, DateTime<Utc>)]) -> Vec<WordEntry> {
        list.iter()
            .rev()
            .map(|(id, added)| WordEntry {
                word: self.words[id.0].clone(),
                added: *added,
            })
            .collect()
    }

    fn with_user<T>(&self, user_id: &str, f: impl FnOnce(&mut UserRecord) -> T) -> T {
        let mut users = self.users.write();
        let record = users
            .entry(user_id.to_string())
            .or_insert_with(UserRecord::new);
        f(record)
    }
}

#[async_trait]
impl Dictionary for InMemoryDictionary {
    async fn search(&self, search: &str, page: PageRequest) -> Result<Page<String>, DictionaryError> {
        let needle = search.to_lowercase();
        let matches: Vec<String> = self
            .words
            .iter()
            .filter(|word| word.to_lowercase().contains(&needle))
            .cloned()
            .collect();

        Ok(Page::slice(matches, page))
    }

    async fn word_id(&self, word: &str) -> Result<WordId, DictionaryError> {
        self.index
            .get(word)
            .copied()
            .ok_or_else(|| DictionaryError::WordNotFound(word.to_string()))
    }

    async fn word_detail(&self, word: &str) -> Result<Value, DictionaryError> {
        self.index
            .get(word)
            .and_then(|id| self.definitions.get(id))
            .cloned()
            .ok_or_else(|| DictionaryError::DefinitionsNotFound(word.to_string()))
    }

    async fn add_history(&self, user_id: &str, word: WordId) -> Result<(), DictionaryError> {
        self.with_user(user_id, |user| user.history.push((word, Utc::now())));
        Ok(())
    }

    async fn add_favorite(&self, user_id: &str, word: WordId) -> Result<(), DictionaryError> {
        self.with_user(user_id, |user| {
            if !user.favorites.iter().any(|(id, _)| *id == word) {
                user.favorites.push((word, Utc::now()));
            }
        });
        Ok(())
    }

    async fn remove_favorite(&self, user_id: &str, word: WordId) -> Result<(), DictionaryError> {
        self.with_user(user_id, |user| user.favorites.retain(|(id, _)| *id != word));
        Ok(())
    }

    async fn history(&self, user_id: &str, page: PageRequest) -> Result<Page<WordEntry>, DictionaryError> {
        let entries = self.with_user(user_id, |user| self.entries(&user.history));
        Ok(Page::slice(entries, page))
    }

    async fn favorites(&self, user_id: &str, page: PageRequest) -> Result<Page<WordEntry>, DictionaryError> {
        let entries = self.with_user(user_id, |user| self.entries(&user.favorites));
        Ok(Page::slice(entries, page))
    }

    async fn profile(&self, user_id: &str) -> Result<UserProfile, DictionaryError> {
        Ok(self.with_user(user_id, |user| UserProfile {
            id: user_id.to_string(),
            created_at: user.created_at,
            favorites_count: user.favorites.len(),
            history_count: user.history.len(),
        }))
    }
}
