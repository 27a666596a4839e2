//! Caching layer for schedule lookups.
//!
//! Timetables change rarely within a minute, while a user paging back and
//! forth or pressing retry asks for the same route again and again. Only
//! successful responses are cached.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use moka::future::Cache as MokaCache;

use crate::domain::{ScheduleOption, StationCode};
use crate::provider::{ProviderError, ScheduleProvider};

/// Cache key for schedule lookups: (from, to, date).
type RouteKey = (StationCode, StationCode, NaiveDate);

/// Cached lookup result.
type RouteEntry = Arc<Vec<ScheduleOption>>;

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            max_capacity: 1000,
        }
    }
}

impl CacheConfig {
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_max_capacity(mut self, n: u64) -> Self {
        self.max_capacity = n;
        self
    }
}

/// Schedule provider with caching.
///
/// Wraps any provider and caches its answers per route and date.
pub struct CachedScheduleProvider<P> {
    inner: P,
    routes: MokaCache<RouteKey, RouteEntry>,
}

impl<P: ScheduleProvider> CachedScheduleProvider<P> {
    /// Create a new cached provider.
    pub fn new(inner: P, config: &CacheConfig) -> Self {
        let routes = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { inner, routes }
    }

    /// Access the underlying provider for operations that bypass cache.
    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Get cache statistics.
    pub fn cache_entry_count(&self) -> u64 {
        self.routes.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_cache(&self) {
        self.routes.invalidate_all();
    }
}

#[async_trait]
impl<P: ScheduleProvider> ScheduleProvider for CachedScheduleProvider<P> {
    async fn get_options(
        &self,
        from: &StationCode,
        to: &StationCode,
        date: NaiveDate,
    ) -> Result<Vec<ScheduleOption>, ProviderError> {
        let key = (from.clone(), to.clone(), date);

        // Try cache first
        if let Some(cached) = self.routes.get(&key).await {
            tracing::debug!(%from, %to, %date, "schedule cache hit");
            return Ok(cached.as_ref().clone());
        }

        let options = self.inner.get_options(from, to, date).await?;
        self.routes.insert(key, Arc::new(options.clone())).await;

        Ok(options)
    }
}
