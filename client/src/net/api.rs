//! Authenticated REST client.
//!
//! ARCHITECTURE
//! ============
//! Every request goes through [`ApiClient::send`], which:
//! 1. refreshes the bearer token when it expires within the refresh margin,
//! 2. attaches `Authorization: Bearer <token>` when a token is held,
//! 3. maps 401 to [`ApiError::Unauthorized`], clears the token, and requests
//!    navigation to the login route,
//! 4. maps other non-2xx statuses to [`ApiError::Status`].
//!
//! ERROR HANDLING
//! ==============
//! This layer propagates `Result`s. Turning failures into toasts and sentinels
//! is the stores' job.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use wire::{AuthTokenResponse, TelegramAuthRequest};

use super::endpoints;
use super::token::{StoredToken, TokenStore};
use super::transport::{HttpRequest, HttpTransport, Method};
use crate::error::ApiError;
use crate::notify::{LOGIN_ROUTE, Notifier};
use crate::util::clock::now_unix;

/// Cheap-to-clone handle shared by every store.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    transport: Arc<dyn HttpTransport>,
    tokens: Arc<dyn TokenStore>,
    notifier: Arc<dyn Notifier>,
    refresh_margin_secs: i64,
    /// Serializes refreshes so concurrent requests near expiry refresh once.
    refresh_lock: tokio::sync::Mutex<()>,
}

impl ApiClient {
    #[must_use]
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        tokens: Arc<dyn TokenStore>,
        notifier: Arc<dyn Notifier>,
        refresh_margin_secs: i64,
    ) -> Self {
        Self {
            inner: Arc::new(ApiClientInner {
                transport,
                tokens,
                notifier,
                refresh_margin_secs,
                refresh_lock: tokio::sync::Mutex::new(()),
            }),
        }
    }

    #[must_use]
    pub fn notifier(&self) -> &dyn Notifier {
        self.inner.notifier.as_ref()
    }

    #[must_use]
    pub fn tokens(&self) -> &dyn TokenStore {
        self.inner.tokens.as_ref()
    }

    /// `true` when a token is held and has not expired.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner
            .tokens
            .load()
            .is_some_and(|token| !token.is_expired(now_unix()))
    }

    // =========================================================================
    // TYPED VERBS
    // =========================================================================

    /// # Errors
    ///
    /// See [`ApiClient::send`]; also [`ApiError::Decode`] on schema mismatch.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let body = self.send(HttpRequest::new(Method::Get, path)).await?;
        Ok(wire::decode(&body)?)
    }

    /// GET with query parameters.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get`].
    pub async fn get_query<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, ApiError> {
        let mut request = HttpRequest::new(Method::Get, path);
        request.query = query.iter().map(|(k, v)| ((*k).to_owned(), v.clone())).collect();
        let body = self.send(request).await?;
        Ok(wire::decode(&body)?)
    }

    /// GET a collection that may come back bare or wrapped.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get`].
    pub async fn get_list<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<Vec<T>, ApiError> {
        let mut request = HttpRequest::new(Method::Get, path);
        request.query = query.iter().map(|(k, v)| ((*k).to_owned(), v.clone())).collect();
        let body = self.send(request).await?;
        Ok(wire::decode_list(&body)?)
    }

    /// # Errors
    ///
    /// See [`ApiClient::get`].
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let mut request = HttpRequest::new(Method::Post, path);
        request.body = Some(to_json(body)?);
        let body = self.send(request).await?;
        Ok(wire::decode(&body)?)
    }

    /// POST without a request body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get`].
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let body = self.send(HttpRequest::new(Method::Post, path)).await?;
        Ok(wire::decode(&body)?)
    }

    /// # Errors
    ///
    /// See [`ApiClient::get`].
    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let mut request = HttpRequest::new(Method::Put, path);
        request.body = Some(to_json(body)?);
        let body = self.send(request).await?;
        Ok(wire::decode(&body)?)
    }

    /// DELETE; the response body is ignored so `204 No Content` is fine.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(HttpRequest::new(Method::Delete, path)).await?;
        Ok(())
    }

    // =========================================================================
    // AUTH
    // =========================================================================

    /// Exchange Telegram Mini-App launch data for a bearer token and store it.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for empty launch data, otherwise see
    /// [`ApiClient::send`].
    pub async fn login_telegram(&self, init_data: &str) -> Result<AuthTokenResponse, ApiError> {
        if init_data.trim().is_empty() {
            return Err(ApiError::Validation("Telegram launch data is empty".to_owned()));
        }
        let payload = TelegramAuthRequest { init_data: init_data.to_owned() };
        let mut request = HttpRequest::new(Method::Post, endpoints::AUTH_TELEGRAM_WEBAPP);
        request.body = Some(to_json(&payload)?);
        let body = self.send_raw(request).await?;
        let response: AuthTokenResponse = wire::decode(&body)?;
        self.inner
            .tokens
            .save(&StoredToken::from_response(&response, now_unix()));
        tracing::info!(expires_in = response.expires_in, "signed in via telegram webapp");
        Ok(response)
    }

    /// Trade the held token for a fresh one.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] if no token is held or the backend
    /// rejects it, otherwise see [`ApiClient::send`].
    pub async fn refresh_token(&self) -> Result<AuthTokenResponse, ApiError> {
        let _guard = self.inner.refresh_lock.lock().await;
        self.refresh_locked().await
    }

    async fn refresh_locked(&self) -> Result<AuthTokenResponse, ApiError> {
        let current = self.inner.tokens.load().ok_or(ApiError::Unauthorized)?;
        let mut request = HttpRequest::new(Method::Post, endpoints::AUTH_REFRESH);
        request.bearer = Some(current.access_token);
        let body = self.send_raw(request).await?;
        let response: AuthTokenResponse = wire::decode(&body)?;
        self.inner
            .tokens
            .save(&StoredToken::from_response(&response, now_unix()));
        tracing::debug!(expires_in = response.expires_in, "bearer token refreshed");
        Ok(response)
    }

    /// Clear the held token and ask the front end to show the login route.
    pub fn sign_out(&self) {
        self.inner.tokens.clear();
        self.inner.notifier.navigate(LOGIN_ROUTE);
    }

    /// Current bearer, refreshed first when it is about to expire.
    ///
    /// A failed refresh falls back to the old token while it is still valid.
    /// A rejected refresh has already signed out, so it is returned as
    /// [`ApiError::Unauthorized`] and the request is not sent.
    async fn bearer(&self) -> Result<Option<String>, ApiError> {
        let Some(token) = self.inner.tokens.load() else {
            return Ok(None);
        };
        if !token.expires_within(now_unix(), self.inner.refresh_margin_secs) {
            return Ok(Some(token.access_token));
        }

        let _guard = self.inner.refresh_lock.lock().await;
        // Another request may have refreshed while we waited for the lock.
        let Some(token) = self.inner.tokens.load() else {
            return Err(ApiError::Unauthorized);
        };
        if !token.expires_within(now_unix(), self.inner.refresh_margin_secs) {
            return Ok(Some(token.access_token));
        }
        match self.refresh_locked().await {
            Ok(response) => Ok(Some(response.access_token)),
            Err(ApiError::Unauthorized) => Err(ApiError::Unauthorized),
            Err(e) => {
                tracing::warn!(error = %e, "token refresh failed");
                Ok((!token.is_expired(now_unix())).then_some(token.access_token))
            }
        }
    }

    // =========================================================================
    // DISPATCH
    // =========================================================================

    /// Send an authorized request and return the success body.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Transport`] when no response arrived,
    /// - [`ApiError::Unauthorized`] on 401 (token cleared, login requested),
    ///   including a rejected token refresh, in which case nothing is sent,
    /// - [`ApiError::Status`] on any other non-2xx status.
    pub async fn send(&self, mut request: HttpRequest) -> Result<String, ApiError> {
        if request.bearer.is_none() && !endpoints::is_auth_endpoint(&request.path) {
            request.bearer = self.bearer().await?;
        }
        self.send_raw(request).await
    }

    async fn send_raw(&self, request: HttpRequest) -> Result<String, ApiError> {
        let method = request.method;
        let path = request.path.clone();
        let response = self.inner.transport.send(request).await?;
        if response.status == 401 {
            tracing::info!(method = method.as_str(), %path, "401 from backend; redirecting to login");
            self.sign_out();
            return Err(ApiError::Unauthorized);
        }
        if !response.is_success() {
            return Err(ApiError::Status { status: response.status, body: response.body });
        }
        Ok(response.body)
    }
}

fn to_json<B: Serialize + ?Sized>(body: &B) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
