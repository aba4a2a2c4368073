//! Authorized API key set.
//!
//! Keys come from the comma-separated `GMASS_API_KEYS` value. The set is
//! built once at startup and shared read-only; clones share one allocation,
//! so the auth layer and [`AppState`](crate::state::AppState) hold the same
//! set.
//!
//! # Parsing Rules
//!
//! - Split on `,` with no trimming: `"a, b"` yields `"a"` and `" b"`
//! - Comparison is exact and case-sensitive
//! - Empty tokens are kept as members but can never authenticate, since the
//!   auth layer treats an empty header as a missing key

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use subtle::ConstantTimeEq;

use crate::error::{AppError, AppResult};

/// Immutable set of API keys accepted by the webhook routes.
#[derive(Clone)]
pub struct KeyStore {
    keys: Arc<HashSet<String>>,
}

impl KeyStore {
    /// Build a key set from a comma-separated source string.
    ///
    /// Every token becomes a member, including empty ones. Duplicates
    /// collapse.
    pub fn load(source: &str) -> Self {
        Self {
            keys: Arc::new(source.split(',').map(str::to_string).collect()),
        }
    }

    /// Build a key set and reject it if no usable key is present.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ConfigError` if the set is empty or holds only the
    /// empty string.
    pub fn from_source(source: &str) -> AppResult<Self> {
        let store = Self::load(source);
        if !store.is_usable() {
            return Err(AppError::ConfigError(
                "No API keys configured (GMASS_API_KEYS is empty)".to_string(),
            ));
        }
        Ok(store)
    }

    /// Whether at least one non-empty key is present.
    pub fn is_usable(&self) -> bool {
        self.keys.iter().any(|k| !k.is_empty())
    }

    /// Check whether `candidate` is an authorized key.
    ///
    /// Every stored key is compared in constant time, so the total time
    /// depends on the number of keys but not on how much of a key matched.
    pub fn contains(&self, candidate: &[u8]) -> bool {
        self.keys
            .iter()
            .fold(subtle::Choice::from(0u8), |found, key| {
                found | key.as_bytes().ct_eq(candidate)
            })
            .into()
    }

    /// Number of distinct keys, including an empty token if one was parsed.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the set has no members at all.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Number of key characters that may appear in logs.
pub const VISIBLE_KEY_CHARS: usize = 4;

/// First [`VISIBLE_KEY_CHARS`] characters of a key, for logging rejected keys.
pub fn key_prefix(key: &str) -> &str {
    match key.char_indices().nth(VISIBLE_KEY_CHARS) {
        Some((end, _)) => key.get(..end).unwrap_or(key),
        None => key,
    }
}

/// Last [`VISIBLE_KEY_CHARS`] characters of a key, for logging accepted keys.
pub fn key_suffix(key: &str) -> &str {
    match key.char_indices().rev().nth(VISIBLE_KEY_CHARS - 1) {
        Some((start, _)) => key.get(start..).unwrap_or(key),
        None => key,
    }
}

// Key material must never reach the logs.
impl fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyStore")
            .field("keys", &self.keys.len())
            .finish()
    }
}
