//! Error types for ledgercache.
//!
//! Misses are not errors: every lookup reports absence through `Option`.
//! The only failure surfaces are construction-time parameter validation and
//! the structural self-checks the ledgers expose for tests.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: returned by `try_*` constructors and
//!   [`CacheBuilder::try_build`](crate::builder::CacheBuilder::try_build) when
//!   a parameter is out of range (K = 0, zero shards, zero max average).
//! - [`InvariantError`]: returned by `check_invariants` on the ledger cores
//!   when index and list disagree.
//!
//! A capacity of zero is *not* a configuration error. It builds an inert
//! cache that ignores every `put`.
//!
//! ## Example Usage
//!
//! ```
//! use ledgercache::error::ConfigError;
//! use ledgercache::policy::lru_k::LrukCache;
//!
//! let cache: Result<LrukCache<u64, u64>, ConfigError> = LrukCache::try_new(100, 50, 2);
//! assert!(cache.is_ok());
//!
//! let bad = LrukCache::<u64, u64>::try_new(100, 50, 0);
//! assert!(bad.unwrap_err().to_string().contains("k"));
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when a ledger's index and list no longer describe the same
/// set of entries.
///
/// Produced by [`LruCore::check_invariants`](crate::policy::lru::LruCore::check_invariants)
/// and [`LfuCore::check_invariants`](crate::policy::lfu::LfuCore::check_invariants).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache construction parameters are invalid.
///
/// # Example
///
/// ```
/// use ledgercache::error::ConfigError;
/// use ledgercache::policy::lfu::LfuCache;
///
/// let err = LfuCache::<u64, u64>::try_with_max_average(16, 0).unwrap_err();
/// assert!(err.to_string().contains("max_average"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
