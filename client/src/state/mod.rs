//! Client-side state stores.
//!
//! ARCHITECTURE
//! ============
//! [`resource`] holds the one freshness-cache pattern every store builds on.
//! Each backend resource then gets a thin store that owns its caches and
//! reports failures through the [`Notifier`]. [`Dashboard`] wires them all to
//! a single [`ApiClient`].

pub mod analysis;
pub mod auth;
pub mod channel_sets;
pub mod credits;
pub mod filters;
pub mod resource;
pub mod tasks;

use std::sync::Arc;

use futures::future::join4;

use self::analysis::AnalysisStore;
use self::auth::AuthStore;
use self::channel_sets::ChannelSetsStore;
use self::credits::CreditsStore;
use self::filters::FiltersStore;
use self::tasks::TasksStore;
use crate::config::{ClientConfig, validate_api_url};
use crate::error::ApiError;
use crate::net::api::ApiClient;
use crate::net::token::{FileTokenStore, MemoryTokenStore, TokenStore};
use crate::net::transport::{HttpTransport, ReqwestTransport};
use crate::notify::Notifier;

/// Every store, sharing one API client.
#[derive(Clone)]
pub struct Dashboard {
    pub api: ApiClient,
    pub auth: AuthStore,
    pub tasks: TasksStore,
    pub analysis: AnalysisStore,
    pub credits: CreditsStore,
    pub filters: FiltersStore,
    pub channel_sets: ChannelSetsStore,
}

impl Dashboard {
    #[must_use]
    pub fn new(
        config: &ClientConfig,
        transport: Arc<dyn HttpTransport>,
        tokens: Arc<dyn TokenStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let api = ApiClient::new(transport, tokens, notifier, config.refresh_margin_secs);
        let freshness = &config.freshness;
        let tasks = TasksStore::new(api.clone(), freshness);
        Self {
            auth: AuthStore::new(api.clone()),
            analysis: AnalysisStore::new(api.clone(), tasks.clone()),
            credits: CreditsStore::new(api.clone(), freshness),
            filters: FiltersStore::new(api.clone(), freshness),
            channel_sets: ChannelSetsStore::new(api.clone(), freshness),
            tasks,
            api,
        }
    }

    /// Dashboard over the real HTTP transport.
    ///
    /// The token persists to `config.token_file` when set, otherwise it lives
    /// in memory for the life of the process.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] for an unusable API URL and
    /// [`ApiError::HttpClientBuild`] if the HTTP client cannot be built.
    pub fn connect(config: &ClientConfig, notifier: Arc<dyn Notifier>) -> Result<Self, ApiError> {
        validate_api_url(&config.api_url)?;
        let transport = Arc::new(ReqwestTransport::new(config)?);
        let tokens: Arc<dyn TokenStore> = match &config.token_file {
            Some(path) => Arc::new(FileTokenStore::new(path.clone())),
            None => Arc::new(MemoryTokenStore::default()),
        };
        tracing::debug!(api_url = %config.api_url, persistent_token = config.token_file.is_some(), "dashboard connected");
        Ok(Self::new(config, transport, tokens, notifier))
    }

    /// Load the landing-view resources concurrently: balance, tasks, filters,
    /// and channel sets. Each fetch reports its own failure.
    pub async fn refresh_all(&self, force: bool) {
        let (balance, tasks, filters, sets) = join4(
            self.credits.fetch_balance(force),
            self.tasks.fetch_tasks(force),
            self.filters.fetch_filters(force),
            self.channel_sets.fetch_sets(force),
        )
        .await;
        tracing::debug!(
            balance = balance.is_some(),
            tasks = tasks.is_some(),
            filters = filters.is_some(),
            channel_sets = sets.is_some(),
            "dashboard refreshed"
        );
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
