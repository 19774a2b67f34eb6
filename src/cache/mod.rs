//! In-memory response cache with TTL expiry and single-flight lookups.
//!
//! While the remote call for a fingerprint is in flight, a second caller for
//! that fingerprint waits for it and then reads the cached result instead
//! of issuing a duplicate call. If the first call fails, the waiter makes
//! its own attempt.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

use crate::error::Result;
use crate::translation::TranslationResult;

#[derive(Debug, Clone)]
struct CacheEntry {
    result: TranslationResult,
    inserted_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.inserted_at.elapsed() > ttl
    }
}

type FlightLock = Arc<tokio::sync::Mutex<()>>;

#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    in_flight: Mutex<HashMap<String, FlightLock>>,
}

// Every critical section is a single map operation, so a poisoned map is still consistent.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached result if present and younger than `ttl`.
    ///
    /// Expired entries are evicted here.
    pub fn get(&self, fingerprint: &str, ttl: Duration) -> Option<TranslationResult> {
        let mut entries = lock(&self.entries);
        match entries.get(fingerprint) {
            Some(entry) if !entry.is_expired(ttl) => Some(entry.result.clone()),
            Some(_) => {
                entries.remove(fingerprint);
                None
            }
            None => None,
        }
    }

    /// Stores a result, replacing any previous entry.
    pub fn put(&self, fingerprint: &str, result: TranslationResult) {
        lock(&self.entries).insert(
            fingerprint.to_string(),
            CacheEntry {
                result,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Returns the cached result, or runs `fetch` and caches its success.
    ///
    /// At most one `fetch` per fingerprint runs at a time; concurrent callers
    /// for the same fingerprint wait and then re-check the cache.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        fingerprint: &str,
        ttl: Duration,
        fetch: F,
    ) -> Result<TranslationResult>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<TranslationResult>>,
    {
        if let Some(hit) = self.get(fingerprint, ttl) {
            tracing::debug!(fingerprint, "cache hit");
            return Ok(hit);
        }

        let flight = Flight {
            cache: self,
            fingerprint,
            lock: Arc::clone(
                lock(&self.in_flight)
                    .entry(fingerprint.to_string())
                    .or_default(),
            ),
        };
        let _guard = flight.lock.lock().await;

        if let Some(hit) = self.get(fingerprint, ttl) {
            tracing::debug!(fingerprint, "cache filled by concurrent request");
            return Ok(hit);
        }

        let fetched = fetch().await;
        if let Ok(result) = &fetched {
            self.put(fingerprint, result.clone());
        }
        fetched
    }

    fn release_flight(&self, fingerprint: &str, flight: &FlightLock) {
        let mut in_flight = lock(&self.in_flight);
        let Some(current) = in_flight.get(fingerprint) else {
            return;
        };
        // One reference is held by the map and one by the caller; more means others are waiting.
        if Arc::ptr_eq(current, flight) && Arc::strong_count(flight) <= 2 {
            in_flight.remove(fingerprint);
        }
    }

    #[cfg(test)]
    fn in_flight_len(&self) -> usize {
        lock(&self.in_flight).len()
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.entries).is_empty()
    }

    pub fn clear(&self) {
        lock(&self.entries).clear();
    }
}

/// A caller's claim on a fingerprint's flight lock, released on drop so an
/// abandoned fetch does not leave its entry behind.
struct Flight<'a> {
    cache: &'a ResponseCache,
    fingerprint: &'a str,
    lock: FlightLock,
}

impl Drop for Flight<'_> {
    fn drop(&mut self) {
        self.cache.release_flight(self.fingerprint, &self.lock);
    }
}
