// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Memoization of expensive analysis runs.
//!
//! [`ResultCache`] runs a computation at most once per key for the lifetime
//! of the cache. Concurrent callers asking for a key that is still being
//! computed wait for the in-flight run and share its result. Failed runs are
//! handed to every waiting caller and are not stored, so the next call
//! retries. Entries are never evicted or expired.

use std::future::Future;
use std::sync::Arc;

use moka::future::Cache;

/// A value returned by [`ResultCache::get_or_compute`]
#[derive(Debug, Clone, PartialEq)]
pub struct Cached<V> {
    pub value: V,
    /// `false` only for the caller whose computation produced the value
    pub from_cache: bool,
}

/// Unbounded single-flight memoization table keyed by canonical strings
#[derive(Clone)]
pub struct ResultCache<V> {
    entries: Cache<String, V>,
}

impl<V> ResultCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create an empty cache. No capacity bound and no expiry are set.
    pub fn new() -> Self {
        Self {
            entries: Cache::builder().name("analysis-results").build(),
        }
    }

    /// Return the value stored for `key`, running `compute` only if absent.
    pub async fn get_or_compute<F, E>(&self, key: &str, compute: F) -> Result<Cached<V>, Arc<E>>
    where
        F: Future<Output = Result<V, E>>,
        E: Send + Sync + 'static,
    {
        let mut computed = false;
        let flag = &mut computed;

        let result = self
            .entries
            .try_get_with_by_ref(key, async move {
                *flag = true;
                compute.await
            })
            .await;

        match &result {
            Ok(_) if computed => tracing::debug!(key = %key, "Result cache MISS - computed"),
            Ok(_) => tracing::debug!(key = %key, "Result cache HIT"),
            Err(_) => tracing::debug!(key = %key, "Result cache computation failed - not stored"),
        }

        result.map(|value| Cached {
            value,
            from_cache: !computed,
        })
    }

    /// Stored value for `key`, without computing.
    pub async fn get(&self, key: &str) -> Option<V> {
        self.entries.get(key).await
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of stored entries.
    pub async fn entry_count(&self) -> u64 {
        self.entries.run_pending_tasks().await;
        self.entries.entry_count()
    }

    /// Drop every entry. Intended for tests and resets.
    pub async fn invalidate_all(&self) {
        self.entries.invalidate_all();
        self.entries.run_pending_tasks().await;
    }
}

impl<V> Default for ResultCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
