//! Cache key generation and normalization.

use std::fmt;

use url::form_urlencoded;

/// Separator between the request part of a key and the caller identity.
const USER_SEGMENT: &str = ":user:";

/// Key unica para una respuesta cacheada.
///
/// Shape: `{prefix}:{path}?{sorted query}[:user:{caller}]`. Query parameters
/// are sorted by name before serializing, so transport order never changes
/// the key. Values use `application/x-www-form-urlencoded` encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Builds the canonical key for a request.
    ///
    /// Any query string already present in `path` is discarded; the query
    /// part is rebuilt from `query` only.
    ///
    /// # Examples
    ///
    /// ```
    /// use flora_cache::CacheKey;
    ///
    /// let key = CacheKey::build(
    ///     "entries",
    ///     "/entries/en",
    ///     &[("search", "fire"), ("limit", "10"), ("page", "1")],
    ///     None,
    /// );
    /// assert_eq!(key.as_str(), "entries:/entries/en?limit=10&page=1&search=fire");
    ///
    /// let key = CacheKey::build("user", "/user/me", &[] as &[(&str, &str)], Some("u1"));
    /// assert_eq!(key.as_str(), "user:/user/me:user:u1");
    /// ```
    pub fn build<K, V>(prefix: &str, path: &str, query: &[(K, V)], caller: Option<&str>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let path = strip_query(path);

        let mut params: Vec<(&str, &str)> = query
            .iter()
            .map(|(name, value)| (name.as_ref(), value.as_ref()))
            .collect();
        // Stable: repeated names keep their transport order
        params.sort_by(|a, b| a.0.cmp(b.0));

        let mut key = String::with_capacity(prefix.len() + path.len() + 32);
        key.push_str(prefix);
        key.push(':');
        push_path(&mut key, path);

        if !params.is_empty() {
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(params.iter())
                .finish();
            key.push('?');
            key.push_str(&query);
        }

        if let Some(caller) = caller.filter(|c| !c.is_empty()) {
            key.push_str(USER_SEGMENT);
            key.extend(form_urlencoded::byte_serialize(caller.as_bytes()));
        }

        Self(key)
    }

    /// Retorna la key como string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume la key y retorna el string interno.
    pub fn into_string(self) -> String {
        self.0
    }
}

fn strip_query(path: &str) -> &str {
    match path.find(['?', '#']) {
        Some(end) => &path[..end],
        None => path,
    }
}

/// A literal `:` is escaped so a path can never forge the user segment.
fn push_path(key: &mut String, path: &str) {
    for c in path.chars() {
        if c == ':' {
            key.push_str("%3A");
        } else {
            key.push(c);
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<CacheKey> for String {
    fn from(key: CacheKey) -> Self {
        key.0
    }
}
