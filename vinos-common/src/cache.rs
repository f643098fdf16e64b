//! Time-to-live cache for sample data
//!
//! Owns one value, the time it was last refreshed and its TTL. A value
//! older than the TTL, or one dropped by [`TtlCache::invalidate`], is
//! reloaded on the next access.

use chrono::{DateTime, Utc};
use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

use crate::Result;

struct Entry<T> {
    value: T,
    refreshed_at: DateTime<Utc>,
}

pub struct TtlCache<T> {
    ttl: Duration,
    entry: Mutex<Option<Entry<T>>>,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: Mutex::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached value, refreshing it first when empty or expired
    pub async fn get_or_refresh<F, Fut>(&self, refresh: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.get_or_refresh_at(Utc::now(), refresh).await
    }

    /// [`get_or_refresh`](Self::get_or_refresh) with an explicit clock
    ///
    /// The lock is held across `refresh`, so concurrent callers wait for one
    /// load instead of issuing their own. A failed refresh leaves the cache
    /// empty.
    pub async fn get_or_refresh_at<F, Fut>(&self, now: DateTime<Utc>, refresh: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut entry = self.entry.lock().await;
        if let Some(current) = entry.as_ref() {
            // a clock that went backwards counts as expired
            if let Ok(age) = (now - current.refreshed_at).to_std() {
                if age < self.ttl {
                    return Ok(current.value.clone());
                }
            }
            debug!("Cached value expired");
        }

        *entry = None;
        let value = refresh().await?;
        *entry = Some(Entry {
            value: value.clone(),
            refreshed_at: now,
        });
        Ok(value)
    }

    /// Drop the cached value so the next access reloads
    pub async fn invalidate(&self) {
        *self.entry.lock().await = None;
    }

    /// When the cached value was loaded, if there is one
    pub async fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.entry.lock().await.as_ref().map(|e| e.refreshed_at)
    }
}
