//! Error types for the Flora cache layer.
//!
//! None of these errors are meant to reach an HTTP caller. Store failures
//! degrade to uncached behavior inside the gate and the invalidation
//! planner; registry errors are raised while the application is being wired,
//! before any traffic is accepted.
//!
//! # Example
//!
//! ```
//! use flora_cache::CacheError;
//!
//! let error = CacheError::store_unavailable("redis", "connection refused");
//! assert!(error.is_store_unavailable());
//! assert_eq!(
//!     error.to_string(),
//!     "cache store 'redis' unavailable: connection refused"
//! );
//! ```

use thiserror::Error;

/// Main error type for cache layer operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The backing store could not be reached or refused the operation.
    #[error("cache store '{backend}' unavailable: {message}")]
    StoreUnavailable {
        /// Name of the backend that failed
        backend: String,
        /// Description of what went wrong
        message: String,
        /// Underlying error
        #[source]
        cause: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Some deletes failed during a user invalidation sweep.
    #[error(
        "invalidation for user '{user_id}' left {failed} of {attempted} keys in place"
    )]
    InvalidationPartialFailure {
        /// User whose pages were being invalidated
        user_id: String,
        /// Number of deletes that failed
        failed: usize,
        /// Number of deletes issued
        attempted: usize,
    },

    /// Key prefix is empty or contains the key separator.
    #[error("invalid key prefix '{prefix}': {reason}")]
    InvalidKeyPrefix {
        /// The rejected prefix
        prefix: String,
        /// Why it's invalid
        reason: String,
    },

    /// A cacheable resource declared a zero TTL.
    #[error("resource '{resource}' declares a zero TTL")]
    InvalidTtl {
        /// Resource being registered
        resource: String,
    },

    /// The same resource was registered twice.
    #[error("resource '{resource}' is already registered")]
    DuplicateResource {
        /// Resource being registered
        resource: String,
    },
}

impl CacheError {
    /// Creates a StoreUnavailable error without an underlying cause.
    pub fn store_unavailable(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            backend: backend.into(),
            message: message.into(),
            cause: None,
        }
    }

    /// Creates a StoreUnavailable error wrapping the backend's own error.
    pub fn store_unavailable_with<E>(backend: impl Into<String>, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::StoreUnavailable {
            backend: backend.into(),
            message: cause.to_string(),
            cause: Some(Box::new(cause)),
        }
    }

    /// Returns true if this is a StoreUnavailable error.
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, Self::StoreUnavailable { .. })
    }
}

/// Result alias for cache layer operations.
pub type Result<T> = std::result::Result<T, CacheError>;
