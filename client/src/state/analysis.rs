//! Starting analysis runs.
//!
//! Validation happens before any request so an obviously bad selection never
//! costs a round trip (or credits).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use wire::{AnalysisRequest, AnalysisStarted};

use super::tasks::TasksStore;
use crate::net::api::ApiClient;
use crate::net::endpoints;
use crate::notify::{Toast, report_failure, report_validation};

pub const MAX_POSTS_LIMIT: u32 = 1000;

const START_FAILED: &str = "Failed to start analysis";

#[derive(Clone)]
pub struct AnalysisStore {
    api: ApiClient,
    tasks: TasksStore,
    in_flight: Arc<AtomicBool>,
    last_started: Arc<Mutex<Option<AnalysisStarted>>>,
}

/// Check a request before sending it.
///
/// # Errors
///
/// Returns the user-facing reason the request cannot be sent.
pub fn validate(request: &AnalysisRequest) -> Result<(), &'static str> {
    if request.filter_ids.is_empty() {
        return Err("Select at least one filter");
    }
    if request.channels.is_empty() {
        return Err("Select at least one channel");
    }
    if request.options.max_posts == 0 || request.options.max_posts > MAX_POSTS_LIMIT {
        return Err("Posts per channel must be between 1 and 1000");
    }
    Ok(())
}

impl AnalysisStore {
    #[must_use]
    pub fn new(api: ApiClient, tasks: TasksStore) -> Self {
        Self {
            api,
            tasks,
            in_flight: Arc::new(AtomicBool::new(false)),
            last_started: Arc::new(Mutex::new(None)),
        }
    }

    /// Submit `request` to `POST /analysis/analyse`.
    ///
    /// On success the task list is force-refreshed so the new task shows up.
    /// Returns `None` when validation fails, another start is in flight, or the
    /// request fails; each case is reported through the notifier except the
    /// in-flight one, which is silent.
    pub async fn start_analysis(&self, request: &AnalysisRequest) -> Option<AnalysisStarted> {
        if let Err(message) = validate(request) {
            report_validation(self.api.notifier(), START_FAILED, message);
            return None;
        }
        let Some(guard) = InFlight::acquire(&self.in_flight) else {
            tracing::debug!("analysis start already in flight; skipping");
            return None;
        };

        let result = self
            .api
            .post::<_, AnalysisStarted>(endpoints::ANALYSE, request)
            .await;
        drop(guard);

        let started = match result {
            Ok(started) => started,
            Err(err) => {
                report_failure(self.api.notifier(), START_FAILED, &err);
                return None;
            }
        };

        tracing::info!(
            task_id = %started.task_id,
            channels = request.channels.len(),
            filters = request.filter_ids.len(),
            mode = ?request.options.processing_mode,
            "analysis started"
        );
        self.api.notifier().toast(Toast::info(
            "Analysis started",
            started
                .message
                .clone()
                .unwrap_or_else(|| format!("Task {} queued", started.task_id)),
        ));
        *self.last_started.lock().unwrap_or_else(PoisonError::into_inner) = Some(started.clone());
        self.tasks.fetch_tasks(true).await;
        Some(started)
    }

    #[must_use]
    pub fn is_starting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// The most recent successful start, if any.
    #[must_use]
    pub fn last_started(&self) -> Option<AnalysisStarted> {
        self.last_started.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

/// Holds the in-flight flag; releases it on drop, including when the start
/// future is dropped mid-request.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        if flag.swap(true, Ordering::AcqRel) { None } else { Some(Self(flag)) }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
#[path = "analysis_test.rs"]
mod tests;
