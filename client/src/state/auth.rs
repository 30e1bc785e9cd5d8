//! Auth-session state for the current Telegram user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Used by front ends to gate authenticated views and show who is signed in.
//! Token storage and refresh live in [`crate::net::api::ApiClient`]; this
//! store only tracks the user identity and the login round trip.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use wire::{PermissionCheck, TelegramUser};

use crate::error::ApiError;
use crate::net::api::ApiClient;
use crate::net::endpoints;
use crate::notify::{Toast, report_failure, report_validation};

const LOGIN_FAILED: &str = "Sign-in failed";

/// Authentication state tracking the current user and loading status.
#[derive(Clone, Debug, Default)]
pub struct AuthState {
    pub user: Option<TelegramUser>,
    pub loading: bool,
}

#[derive(Clone)]
pub struct AuthStore {
    api: ApiClient,
    state: Arc<Mutex<AuthState>>,
}

impl AuthStore {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api, state: Arc::new(Mutex::new(AuthState::default())) }
    }

    fn lock(&self) -> MutexGuard<'_, AuthState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sign in with Telegram Mini-App launch data.
    pub async fn login_with_webapp(&self, init_data: &str) -> bool {
        self.lock().loading = true;
        let result = self.api.login_telegram(init_data).await;
        let mut state = self.lock();
        state.loading = false;
        match result {
            Ok(response) => {
                let greeting = response
                    .user
                    .as_ref()
                    .map_or_else(|| "Signed in".to_owned(), |u| format!("Signed in as {}", u.display_name()));
                state.user = response.user;
                drop(state);
                self.api.notifier().toast(Toast::success(greeting));
                true
            }
            Err(ApiError::Validation(message)) => {
                drop(state);
                report_validation(self.api.notifier(), LOGIN_FAILED, &message);
                false
            }
            Err(err) => {
                drop(state);
                report_failure(self.api.notifier(), LOGIN_FAILED, &err);
                false
            }
        }
    }

    /// Trade the held token for a fresh one.
    pub async fn refresh(&self) -> bool {
        match self.api.refresh_token().await {
            Ok(response) => {
                if response.user.is_some() {
                    self.lock().user = response.user;
                }
                true
            }
            Err(err) => {
                report_failure(self.api.notifier(), "Session refresh failed", &err);
                false
            }
        }
    }

    /// Whether the signed-in user holds `permission`. Any failure is `false`.
    pub async fn check_permission(&self, permission: &str) -> bool {
        let query = [("permission", permission.to_owned())];
        match self
            .api
            .get_query::<PermissionCheck>(endpoints::AUTH_CHECK_PERMISSION, &query)
            .await
        {
            Ok(check) => check.granted,
            Err(err) => {
                tracing::warn!(error = %err, permission, "permission check failed");
                false
            }
        }
    }

    /// Forget the user and token and request the login route.
    pub fn logout(&self) {
        self.lock().user = None;
        self.api.sign_out();
    }

    /// Snapshot of the session. The user is dropped once the token is gone,
    /// e.g. after a 401 cleared it.
    #[must_use]
    pub fn state(&self) -> AuthState {
        let mut state = self.lock();
        if state.user.is_some() && !self.api.is_authenticated() {
            state.user = None;
        }
        state.clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.api.is_authenticated()
    }
}
