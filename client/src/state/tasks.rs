//! Analysis-task list and per-task detail state.
//!
//! DESIGN
//! ======
//! The list (`GET /tasks`) and each task's detailed record (`GET /tasks/{id}`)
//! are cached independently: the list is cheap and refreshed often, details
//! carry results and are fetched per task on demand.

use std::time::Duration;

use futures::future::join_all;
use wire::{AnalysisTask, NewTask};

use super::resource::{Cached, FetchStatus, KeyedCache};
use crate::config::Freshness;
use crate::net::api::ApiClient;
use crate::net::endpoints;
use crate::notify::{Toast, report_failure, report_validation};

#[derive(Clone)]
pub struct TasksStore {
    api: ApiClient,
    list: Cached<Vec<AnalysisTask>>,
    details: KeyedCache<String, AnalysisTask>,
}

impl TasksStore {
    #[must_use]
    pub fn new(api: ApiClient, freshness: &Freshness) -> Self {
        Self {
            api,
            list: Cached::new("tasks", freshness.tasks, freshness.error_reset),
            details: KeyedCache::new("task", freshness.task_details, freshness.error_reset),
        }
    }

    /// Fetch the task list unless the cache is fresh or a fetch is in flight.
    pub async fn fetch_tasks(&self, force: bool) -> Option<Vec<AnalysisTask>> {
        let api = self.api.clone();
        self.list
            .load(force, self.api.notifier(), "Failed to load tasks", || async move {
                api.get_list(endpoints::TASKS, &[]).await
            })
            .await
    }

    /// Fetch one task's detailed record, cached per id.
    ///
    /// A successful fetch also copies status and progress into the matching
    /// list entry so list views do not lag behind a detail view.
    pub async fn fetch_task_details(&self, id: &str, force: bool) -> Option<AnalysisTask> {
        let api = self.api.clone();
        let path = endpoints::task(id);
        let task = self
            .details
            .entry(&id.to_owned())
            .load(force, self.api.notifier(), "Failed to load task details", || async move {
                api.get(&path).await
            })
            .await?;

        self.list.update(|items| {
            if let Some(entry) = items.iter_mut().flatten().find(|t| t.id == task.id) {
                entry.status = task.status;
                entry.progress = task.progress;
                entry.error.clone_from(&task.error);
            }
        });
        Some(task)
    }

    /// Fetch the list, then every task's details concurrently.
    ///
    /// Detail fetches are isolated: one failing task yields `None` in its slot
    /// and never cancels the others.
    pub async fn fetch_all_with_details(&self, force: bool) -> Vec<(String, Option<AnalysisTask>)> {
        let Some(tasks) = self.fetch_tasks(force).await else {
            return Vec::new();
        };
        let fetches = tasks.iter().map(|task| {
            let id = task.id.clone();
            async move {
                let details = self.fetch_task_details(&id, force).await;
                (id, details)
            }
        });
        let results = join_all(fetches).await;
        let failed = results.iter().filter(|(_, d)| d.is_none()).count();
        if failed > 0 {
            tracing::warn!(failed, total = results.len(), "some task details failed to load");
        }
        results
    }

    /// Create a task via `POST /tasks` and put it at the head of the list.
    pub async fn create_task(&self, task: &NewTask) -> Option<AnalysisTask> {
        if task.channels.is_empty() {
            report_validation(self.api.notifier(), "Cannot create task", "Select at least one channel");
            return None;
        }
        if task.filter_ids.is_empty() {
            report_validation(self.api.notifier(), "Cannot create task", "Select at least one filter");
            return None;
        }
        match self.api.post::<_, AnalysisTask>(endpoints::TASKS, task).await {
            Ok(created) => {
                self.list.update(|items| {
                    if let Some(items) = items {
                        items.retain(|t| t.id != created.id);
                        items.insert(0, created.clone());
                    }
                });
                self.list.invalidate();
                self.details.entry(&created.id).set(created.clone());
                self.api.notifier().toast(Toast::success("Task created"));
                Some(created)
            }
            Err(err) => {
                report_failure(self.api.notifier(), "Failed to create task", &err);
                None
            }
        }
    }

    /// Force-refresh a task's details until it reaches a terminal status or
    /// `max_polls` requests have been made.
    ///
    /// Returns the last record seen. Failed polls are reported by the detail
    /// fetch and polling continues.
    pub async fn poll_task(&self, id: &str, interval: Duration, max_polls: u32) -> Option<AnalysisTask> {
        let mut last = None;
        for attempt in 1..=max_polls {
            if let Some(task) = self.fetch_task_details(id, true).await {
                tracing::debug!(task_id = id, attempt, status = %task.status, progress = task.progress, "task polled");
                let done = task.status.is_terminal();
                last = Some(task);
                if done {
                    break;
                }
            }
            if attempt < max_polls {
                tokio::time::sleep(interval).await;
            }
        }
        last
    }

    // =========================================================================
    // SNAPSHOTS
    // =========================================================================

    #[must_use]
    pub fn tasks(&self) -> Vec<AnalysisTask> {
        self.list.data().unwrap_or_default()
    }

    #[must_use]
    pub fn task(&self, id: &str) -> Option<AnalysisTask> {
        self.details.data(&id.to_owned())
    }

    #[must_use]
    pub fn list_status(&self) -> FetchStatus {
        self.list.status()
    }

    #[must_use]
    pub fn detail_status(&self, id: &str) -> FetchStatus {
        self.details.status(&id.to_owned())
    }
}

#[cfg(test)]
#[path = "tasks_test.rs"]
mod tests;
