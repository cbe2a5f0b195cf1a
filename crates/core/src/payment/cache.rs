//! Memoized payment summaries using Moka.
//!
//! The summary is a pure function of `SummaryInput`, so the input itself is
//! the cache key. Re-reading an unchanged session (e.g. on every render)
//! hits the cache instead of re-deriving.

use moka::sync::Cache;
use std::sync::Arc;
use std::time::Duration;

use super::summary::{DerivedSummary, PaymentSummaryCalculator, SummaryInput};

/// Default cache capacity (number of entries).
const DEFAULT_CACHE_CAPACITY: u64 = 256;

/// Default time-to-live for cache entries (5 minutes).
const DEFAULT_TTL_SECS: u64 = 300;

/// Cache of derived summaries keyed by their full input.
#[derive(Clone)]
pub struct SummaryCache {
    cache: Cache<SummaryInput, Arc<DerivedSummary>>,
}

impl SummaryCache {
    /// Creates a summary cache with default settings.
    ///
    /// Default: 256 entries max, 5 minute TTL.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DEFAULT_CACHE_CAPACITY, DEFAULT_TTL_SECS)
    }

    /// Creates a summary cache with custom capacity and TTL.
    #[must_use]
    pub fn with_config(max_capacity: u64, ttl_secs: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { cache }
    }

    /// Creates a summary cache from application configuration.
    #[must_use]
    pub fn from_config(config: &paydesk_shared::config::CacheConfig) -> Self {
        Self::with_config(config.capacity, config.ttl_secs)
    }

    /// Returns the summary for `input`, deriving and storing it on a miss.
    pub fn get_or_calculate(&self, input: &SummaryInput) -> Arc<DerivedSummary> {
        if let Some(cached) = self.cache.get(input) {
            return cached;
        }

        let summary = Arc::new(PaymentSummaryCalculator::calculate(input));
        self.cache.insert(input.clone(), Arc::clone(&summary));
        summary
    }

    /// Returns true if `input` currently has a memoized summary.
    #[must_use]
    pub fn contains(&self, input: &SummaryInput) -> bool {
        self.cache.contains_key(input)
    }

    /// Invalidates all cached entries.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Returns the number of entries currently in the cache.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Runs pending maintenance so counts and evictions are up to date.
    pub fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks();
    }
}

impl Default for SummaryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SummaryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummaryCache")
            .field("entry_count", &self.cache.entry_count())
            .finish()
    }
}
