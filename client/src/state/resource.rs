//! Generic freshness cache shared by every store.
//!
//! DESIGN
//! ======
//! One resource (or one keyed item) moves through
//! `Idle → Pending → (Success | Error)`, and `Error` falls back to `Idle` on a
//! timer so a later call may retry. Non-forced fetches are skipped while a
//! fetch is pending or the last success is younger than the freshness window.
//!
//! The pending/fresh check and the move to `Pending` happen under one lock, so
//! two near-simultaneous callers cannot both go to the network. A generation
//! counter is bumped on every fetch; completions and reset timers from an older
//! generation do not overwrite the status of a newer one.
//!
//! Locks are `std::sync::Mutex` and are never held across an `.await`.

use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use crate::error::ApiError;
use crate::notify::{Notifier, report_failure};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FetchStatus {
    #[default]
    Idle,
    Pending,
    Success,
    Error,
}

/// Snapshot of one cached resource.
#[derive(Clone, Debug)]
pub struct Resource<T> {
    pub data: Option<T>,
    pub status: FetchStatus,
    pub error: Option<String>,
    fetched_at: Option<Instant>,
    generation: u64,
}

impl<T> Default for Resource<T> {
    fn default() -> Self {
        Self { data: None, status: FetchStatus::Idle, error: None, fetched_at: None, generation: 0 }
    }
}

impl<T> Resource<T> {
    /// `true` if the last success is younger than `window`.
    #[must_use]
    pub fn is_fresh(&self, window: Duration, now: Instant) -> bool {
        self.fetched_at
            .is_some_and(|at| now.saturating_duration_since(at) < window)
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.status == FetchStatus::Pending
    }

    #[must_use]
    pub fn fetched_at(&self) -> Option<Instant> {
        self.fetched_at
    }
}

/// Outcome of [`Cached::begin`].
#[derive(Debug)]
pub enum Begin<T> {
    /// No request needed; carries whatever is cached.
    Skip(Option<T>),
    /// Caller must fetch and then report through `succeed`/`fail`.
    Fetch(Ticket),
}

/// Proof that the holder started the fetch of a given generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
}

/// Shared handle to one cached resource.
pub struct Cached<T> {
    inner: Arc<Mutex<Resource<T>>>,
    label: Arc<str>,
    window: Duration,
    reset_after: Duration,
}

impl<T> Clone for Cached<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            label: Arc::clone(&self.label),
            window: self.window,
            reset_after: self.reset_after,
        }
    }
}

impl<T: Clone + Send + 'static> Cached<T> {
    #[must_use]
    pub fn new(label: impl Into<Arc<str>>, window: Duration, reset_after: Duration) -> Self {
        Self { inner: Arc::new(Mutex::new(Resource::default())), label: label.into(), window, reset_after }
    }

    fn lock(&self) -> MutexGuard<'_, Resource<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn snapshot(&self) -> Resource<T> {
        self.lock().clone()
    }

    #[must_use]
    pub fn data(&self) -> Option<T> {
        self.lock().data.clone()
    }

    #[must_use]
    pub fn status(&self) -> FetchStatus {
        self.lock().status
    }

    /// Decide whether a fetch is needed and, if so, mark it pending.
    pub fn begin(&self, force: bool) -> Begin<T> {
        let mut res = self.lock();
        if !force {
            if res.status == FetchStatus::Pending {
                tracing::debug!(resource = %self.label, "fetch in flight; skipping");
                return Begin::Skip(res.data.clone());
            }
            if res.status == FetchStatus::Success && res.is_fresh(self.window, Instant::now()) {
                tracing::debug!(resource = %self.label, "cache fresh; skipping fetch");
                return Begin::Skip(res.data.clone());
            }
        }
        res.generation = res.generation.wrapping_add(1);
        res.status = FetchStatus::Pending;
        Begin::Fetch(Ticket { generation: res.generation })
    }

    /// Store fetched data.
    ///
    /// Data always lands, even from an older generation; the status only moves
    /// to `Success` for the newest fetch.
    pub fn succeed(&self, ticket: Ticket, data: T) {
        let mut res = self.lock();
        res.data = Some(data);
        res.fetched_at = Some(Instant::now());
        if res.generation == ticket.generation {
            res.status = FetchStatus::Success;
            res.error = None;
        }
    }

    /// Record a failure and schedule the timed reset to `Idle`.
    ///
    /// Previously cached data is kept so views can keep showing it.
    pub fn fail(&self, ticket: Ticket, message: String) {
        {
            let mut res = self.lock();
            if res.generation != ticket.generation {
                return;
            }
            res.status = FetchStatus::Error;
            res.error = Some(message);
        }
        self.schedule_reset(ticket.generation);
    }

    fn schedule_reset(&self, generation: u64) {
        let inner = Arc::clone(&self.inner);
        let delay = self.reset_after;
        let label = Arc::clone(&self.label);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut res = inner.lock().unwrap_or_else(PoisonError::into_inner);
            if res.generation == generation && res.status == FetchStatus::Error {
                res.status = FetchStatus::Idle;
                res.error = None;
                tracing::debug!(resource = %label, "error status reset to idle");
            }
        });
    }

    /// Replace the data as if freshly fetched (e.g. from a mutation response).
    pub fn set(&self, data: T) {
        let mut res = self.lock();
        res.data = Some(data);
        res.fetched_at = Some(Instant::now());
        if res.status != FetchStatus::Pending {
            res.status = FetchStatus::Success;
            res.error = None;
        }
    }

    /// Patch cached data in place without touching status or freshness.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut Option<T>),
    {
        f(&mut self.lock().data);
    }

    /// Make the next non-forced fetch go to the network. Data is kept.
    pub fn invalidate(&self) {
        self.lock().fetched_at = None;
    }

    /// Drop data and state entirely.
    pub fn clear(&self) {
        let mut res = self.lock();
        let generation = res.generation.wrapping_add(1);
        *res = Resource { generation, ..Resource::default() };
    }

    /// Run the whole fetch pattern: freshness guard, request, cache update,
    /// and failure reporting through `notifier` under `error_title`.
    ///
    /// Returns the cached value when skipped, the new value on success, and
    /// `None` on failure.
    pub async fn load<F, Fut>(&self, force: bool, notifier: &dyn Notifier, error_title: &str, fetch: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let ticket = match self.begin(force) {
            Begin::Skip(data) => return data,
            Begin::Fetch(ticket) => ticket,
        };
        match fetch().await {
            Ok(data) => {
                self.succeed(ticket, data.clone());
                Some(data)
            }
            Err(err) => {
                self.fail(ticket, err.user_message());
                report_failure(notifier, error_title, &err);
                None
            }
        }
    }
}

/// Independently cached items keyed by id.
pub struct KeyedCache<K, T> {
    entries: Arc<Mutex<HashMap<K, Cached<T>>>>,
    label: Arc<str>,
    window: Duration,
    reset_after: Duration,
}

impl<K, T> Clone for KeyedCache<K, T> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            label: Arc::clone(&self.label),
            window: self.window,
            reset_after: self.reset_after,
        }
    }
}

impl<K, T> KeyedCache<K, T>
where
    K: Eq + Hash + Clone + Display,
    T: Clone + Send + 'static,
{
    #[must_use]
    pub fn new(label: impl Into<Arc<str>>, window: Duration, reset_after: Duration) -> Self {
        Self { entries: Arc::new(Mutex::new(HashMap::new())), label: label.into(), window, reset_after }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, Cached<T>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Handle for `key`, created idle on first use.
    #[must_use]
    pub fn entry(&self, key: &K) -> Cached<T> {
        self.lock()
            .entry(key.clone())
            .or_insert_with(|| Cached::new(format!("{}/{key}", self.label), self.window, self.reset_after))
            .clone()
    }

    #[must_use]
    pub fn data(&self, key: &K) -> Option<T> {
        let entry = self.lock().get(key).cloned();
        entry.and_then(|cached| cached.data())
    }

    #[must_use]
    pub fn status(&self, key: &K) -> FetchStatus {
        let entry = self.lock().get(key).cloned();
        entry.map_or(FetchStatus::Idle, |cached| cached.status())
    }

    pub fn remove(&self, key: &K) {
        self.lock().remove(key);
    }

    /// Make the next non-forced fetch of every entry go to the network.
    pub fn invalidate_all(&self) {
        let entries: Vec<Cached<T>> = self.lock().values().cloned().collect();
        for entry in entries {
            entry.invalidate();
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
#[path = "resource_test.rs"]
mod tests;
