//! Channel sets: the list, per-set details, membership edits, and the
//! parse/build lifecycle.
//!
//! DESIGN
//! ======
//! The list and each set's detail record are cached separately. Mutations
//! write the returned set into the detail cache, patch the matching list row,
//! and mark the list stale so the next list fetch picks up server-side
//! changes (counts, parse state) the response did not carry.
//!
//! Parsing and build status are polled by callers and never cached.

use wire::{
    AddChannelsRequest, AnalysisStarted, BuildStatus, ChannelSetDraft, ChannelsSet, ParsingStatus, SetAnalyzeRequest,
};

use super::resource::{Cached, FetchStatus, KeyedCache};
use crate::config::Freshness;
use crate::net::api::ApiClient;
use crate::net::endpoints;
use crate::notify::{Toast, report_failure, report_validation};
use crate::util::channels::{normalize_channel, normalize_channels};
use crate::util::set_status::{MAX_CHANNELS_PER_SET, SetStatus};

#[derive(Clone)]
pub struct ChannelSetsStore {
    api: ApiClient,
    list: Cached<Vec<ChannelsSet>>,
    details: KeyedCache<String, ChannelsSet>,
}

impl ChannelSetsStore {
    #[must_use]
    pub fn new(api: ApiClient, freshness: &Freshness) -> Self {
        Self {
            api,
            list: Cached::new("channel-sets", freshness.channel_sets, freshness.error_reset),
            details: KeyedCache::new("channel-set", freshness.channel_set_details, freshness.error_reset),
        }
    }

    // =========================================================================
    // FETCHES
    // =========================================================================

    pub async fn fetch_sets(&self, force: bool) -> Option<Vec<ChannelsSet>> {
        let api = self.api.clone();
        self.list
            .load(force, self.api.notifier(), "Failed to load channel sets", || async move {
                api.get_list(endpoints::CHANNEL_SETS, &[]).await
            })
            .await
    }

    pub async fn fetch_set(&self, id: &str, force: bool) -> Option<ChannelsSet> {
        let api = self.api.clone();
        let path = endpoints::channel_set(id);
        let set = self
            .details
            .entry(&id.to_owned())
            .load(force, self.api.notifier(), "Failed to load channel set", || async move {
                api.get(&path).await
            })
            .await?;
        self.patch_list_row(&set);
        Some(set)
    }

    // =========================================================================
    // SET MUTATIONS
    // =========================================================================

    pub async fn create_set(&self, draft: &ChannelSetDraft) -> Option<ChannelsSet> {
        if draft.name.as_deref().is_none_or(|n| n.trim().is_empty()) {
            report_validation(self.api.notifier(), "Cannot create channel set", "Set name is required");
            return None;
        }
        match self.api.post::<_, ChannelsSet>(endpoints::CHANNEL_SETS, draft).await {
            Ok(created) => {
                self.list.update(|items| {
                    if let Some(items) = items {
                        items.insert(0, created.clone());
                    }
                });
                self.remember(&created);
                self.api.notifier().toast(Toast::success(format!("Channel set \"{}\" created", created.name)));
                Some(created)
            }
            Err(err) => {
                report_failure(self.api.notifier(), "Failed to create channel set", &err);
                None
            }
        }
    }

    /// Update name, description, or visibility. Absent draft fields are left
    /// unchanged on the server.
    pub async fn update_set(&self, id: &str, draft: &ChannelSetDraft) -> Option<ChannelsSet> {
        if draft.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            report_validation(self.api.notifier(), "Cannot update channel set", "Set name cannot be empty");
            return None;
        }
        match self.api.put::<_, ChannelsSet>(&endpoints::channel_set(id), draft).await {
            Ok(updated) => {
                self.remember(&updated);
                self.api.notifier().toast(Toast::success("Channel set updated"));
                Some(updated)
            }
            Err(err) => {
                report_failure(self.api.notifier(), "Failed to update channel set", &err);
                None
            }
        }
    }

    pub async fn delete_set(&self, id: &str) -> bool {
        match self.api.delete(&endpoints::channel_set(id)).await {
            Ok(()) => {
                self.details.remove(&id.to_owned());
                self.list.update(|items| {
                    if let Some(items) = items {
                        items.retain(|s| s.id != id);
                    }
                });
                self.api.notifier().toast(Toast::success("Channel set deleted"));
                true
            }
            Err(err) => {
                report_failure(self.api.notifier(), "Failed to delete channel set", &err);
                false
            }
        }
    }

    // =========================================================================
    // MEMBERSHIP
    // =========================================================================

    /// Add channels to a set.
    ///
    /// Inputs are normalized (links, `@`, case) and deduplicated first; names
    /// already in the cached set are dropped. The request is refused locally
    /// when nothing usable remains or the set would exceed its channel cap.
    pub async fn add_channels<S: AsRef<str>>(&self, id: &str, raw: &[S]) -> Option<ChannelsSet> {
        const TITLE: &str = "Cannot add channels";
        let known = self.set(id);
        let mut channels = normalize_channels(raw);
        if let Some(set) = &known {
            channels.retain(|name| !set.channels.iter().any(|c| c.username.eq_ignore_ascii_case(name)));
        }
        if channels.is_empty() {
            report_validation(self.api.notifier(), TITLE, "Enter at least one new channel username or t.me link");
            return None;
        }
        let current = known.as_ref().map_or(0, |s| s.channel_count);
        let requested = u32::try_from(channels.len()).unwrap_or(u32::MAX);
        if current.saturating_add(requested) > MAX_CHANNELS_PER_SET {
            let room = MAX_CHANNELS_PER_SET.saturating_sub(current);
            report_validation(
                self.api.notifier(),
                TITLE,
                &format!("A set holds at most {MAX_CHANNELS_PER_SET} channels ({room} slots left)"),
            );
            return None;
        }

        let body = AddChannelsRequest { channels };
        match self
            .api
            .post::<_, ChannelsSet>(&endpoints::channel_set_channels(id), &body)
            .await
        {
            Ok(updated) => {
                tracing::info!(set_id = id, added = body.channels.len(), "channels added to set");
                self.remember(&updated);
                self.api.notifier().toast(Toast::info(
                    "Channels added",
                    format!("{} channel(s) queued for parsing", body.channels.len()),
                ));
                Some(updated)
            }
            Err(err) => {
                report_failure(self.api.notifier(), "Failed to add channels", &err);
                None
            }
        }
    }

    /// Remove one channel, then reload the set.
    pub async fn remove_channel(&self, id: &str, username: &str) -> bool {
        let Some(name) = normalize_channel(username) else {
            report_validation(self.api.notifier(), "Cannot remove channel", "Invalid channel username");
            return false;
        };
        match self.api.delete(&endpoints::channel_set_channel(id, &name)).await {
            Ok(()) => {
                self.details.entry(&id.to_owned()).update(|set| {
                    if let Some(set) = set {
                        let before = set.channels.len();
                        set.channels.retain(|c| !c.username.eq_ignore_ascii_case(&name));
                        if set.channels.len() < before {
                            set.channel_count = set.channel_count.saturating_sub(1);
                        }
                    }
                });
                self.list.invalidate();
                self.fetch_set(id, true).await;
                true
            }
            Err(err) => {
                report_failure(self.api.notifier(), "Failed to remove channel", &err);
                false
            }
        }
    }

    // =========================================================================
    // PARSE / ANALYZE / BUILD
    // =========================================================================

    /// Uncached parse progress. When everything is parsed the cached set is
    /// marked ready.
    pub async fn parsing_status(&self, id: &str) -> Option<ParsingStatus> {
        match self
            .api
            .get::<ParsingStatus>(&endpoints::channel_set_parsing_status(id))
            .await
        {
            Ok(status) => {
                let all_parsed = status.all_parsed;
                self.details.entry(&id.to_owned()).update(|set| {
                    if let Some(set) = set {
                        set.all_parsed = all_parsed;
                    }
                });
                self.list.update(|items| {
                    if let Some(set) = items.iter_mut().flatten().find(|s| s.id == id) {
                        set.all_parsed = all_parsed;
                    }
                });
                Some(status)
            }
            Err(err) => {
                report_failure(self.api.notifier(), "Failed to load parsing status", &err);
                None
            }
        }
    }

    /// Run the given filters over every channel in the set.
    ///
    /// Refused locally with no filters selected, or when the cached set is
    /// known not to be ready.
    pub async fn analyze_set(&self, id: &str, filter_ids: &[String]) -> Option<AnalysisStarted> {
        const TITLE: &str = "Cannot analyze set";
        if filter_ids.is_empty() {
            report_validation(self.api.notifier(), TITLE, "Select at least one filter");
            return None;
        }
        if let Some(set) = self.set(id) {
            let status = SetStatus::of(&set);
            if !status.can_analyze(set.all_parsed) {
                report_validation(self.api.notifier(), TITLE, &format!("Set is {status}"));
                return None;
            }
        }
        let body = SetAnalyzeRequest { filter_ids: filter_ids.to_vec() };
        match self
            .api
            .post::<_, AnalysisStarted>(&endpoints::channel_set_analyze(id), &body)
            .await
        {
            Ok(started) => {
                tracing::info!(set_id = id, task_id = %started.task_id, "set analysis started");
                self.api.notifier().toast(Toast::info("Analysis started", format!("Task {}", started.task_id)));
                Some(started)
            }
            Err(err) => {
                report_failure(self.api.notifier(), "Failed to start set analysis", &err);
                None
            }
        }
    }

    pub async fn build_status(&self, id: &str) -> Option<BuildStatus> {
        match self.api.get(&endpoints::channel_set_build_status(id)).await {
            Ok(status) => Some(status),
            Err(err) => {
                report_failure(self.api.notifier(), "Failed to load build status", &err);
                None
            }
        }
    }

    pub async fn cancel_build(&self, id: &str) -> bool {
        match self
            .api
            .post_empty::<wire::Ack>(&endpoints::channel_set_cancel_build(id))
            .await
        {
            Ok(ack) if ack.success => {
                self.api.notifier().toast(Toast::success("Build cancelled"));
                true
            }
            Ok(ack) => {
                let reason = ack.message.unwrap_or_else(|| "The build could not be cancelled.".to_owned());
                self.api.notifier().toast(Toast::error("Failed to cancel build", reason));
                false
            }
            Err(err) => {
                report_failure(self.api.notifier(), "Failed to cancel build", &err);
                false
            }
        }
    }

    // =========================================================================
    // SNAPSHOTS
    // =========================================================================

    #[must_use]
    pub fn sets(&self) -> Vec<ChannelsSet> {
        self.list.data().unwrap_or_default()
    }

    /// Best known record for `id`: the detail cache, else the list row.
    #[must_use]
    pub fn set(&self, id: &str) -> Option<ChannelsSet> {
        self.details
            .data(&id.to_owned())
            .or_else(|| self.sets().into_iter().find(|s| s.id == id))
    }

    #[must_use]
    pub fn status_of(&self, id: &str) -> Option<SetStatus> {
        self.set(id).map(|s| SetStatus::of(&s))
    }

    #[must_use]
    pub fn list_status(&self) -> FetchStatus {
        self.list.status()
    }

    #[must_use]
    pub fn detail_status(&self, id: &str) -> FetchStatus {
        self.details.status(&id.to_owned())
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn remember(&self, set: &ChannelsSet) {
        self.details.entry(&set.id).set(set.clone());
        self.patch_list_row(set);
        self.list.invalidate();
    }

    fn patch_list_row(&self, set: &ChannelsSet) {
        self.list.update(|items| {
            if let Some(row) = items.iter_mut().flatten().find(|s| s.id == set.id) {
                *row = set.clone();
            }
        });
    }
}

#[cfg(test)]
#[path = "channel_sets_test.rs"]
mod tests;
