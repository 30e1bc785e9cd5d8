//! Analysis filters: backend-provided system filters plus the user's own.

use wire::{Filter, NewFilter};

use super::resource::{Cached, FetchStatus};
use crate::config::Freshness;
use crate::net::api::ApiClient;
use crate::net::endpoints;
use crate::notify::{Toast, report_failure, report_validation};

#[derive(Clone)]
pub struct FiltersStore {
    api: ApiClient,
    list: Cached<Vec<Filter>>,
}

impl FiltersStore {
    #[must_use]
    pub fn new(api: ApiClient, freshness: &Freshness) -> Self {
        Self { api, list: Cached::new("filters", freshness.filters, freshness.error_reset) }
    }

    pub async fn fetch_filters(&self, force: bool) -> Option<Vec<Filter>> {
        let api = self.api.clone();
        self.list
            .load(force, self.api.notifier(), "Failed to load filters", || async move {
                api.get_list(endpoints::FILTERS, &[]).await
            })
            .await
    }

    pub async fn create_filter(&self, filter: &NewFilter) -> Option<Filter> {
        if filter.name.trim().is_empty() {
            report_validation(self.api.notifier(), "Cannot create filter", "Filter name is required");
            return None;
        }
        if filter.criteria.trim().is_empty() {
            report_validation(self.api.notifier(), "Cannot create filter", "Filter criteria are required");
            return None;
        }
        match self.api.post::<_, Filter>(endpoints::FILTERS, filter).await {
            Ok(created) => {
                self.list.update(|items| {
                    if let Some(items) = items {
                        items.push(created.clone());
                    }
                });
                self.list.invalidate();
                self.api.notifier().toast(Toast::success(format!("Filter \"{}\" created", created.name)));
                Some(created)
            }
            Err(err) => {
                report_failure(self.api.notifier(), "Failed to create filter", &err);
                None
            }
        }
    }

    /// Delete a user filter. System filters are refused locally when the
    /// cache knows about them.
    pub async fn delete_filter(&self, id: &str) -> bool {
        if self.filter(id).is_some_and(|f| f.is_system) {
            report_validation(self.api.notifier(), "Cannot delete filter", "System filters cannot be deleted");
            return false;
        }
        match self.api.delete(&endpoints::filter(id)).await {
            Ok(()) => {
                self.list.update(|items| {
                    if let Some(items) = items {
                        items.retain(|f| f.id != id);
                    }
                });
                self.api.notifier().toast(Toast::success("Filter deleted"));
                true
            }
            Err(err) => {
                report_failure(self.api.notifier(), "Failed to delete filter", &err);
                false
            }
        }
    }

    #[must_use]
    pub fn filters(&self) -> Vec<Filter> {
        self.list.data().unwrap_or_default()
    }

    #[must_use]
    pub fn filter(&self, id: &str) -> Option<Filter> {
        self.filters().into_iter().find(|f| f.id == id)
    }

    #[must_use]
    pub fn system_filters(&self) -> Vec<Filter> {
        self.filters().into_iter().filter(|f| f.is_system).collect()
    }

    #[must_use]
    pub fn user_filters(&self) -> Vec<Filter> {
        self.filters().into_iter().filter(|f| !f.is_system).collect()
    }

    #[must_use]
    pub fn status(&self) -> FetchStatus {
        self.list.status()
    }
}

#[cfg(test)]
#[path = "filters_test.rs"]
mod tests;
