//! Bearer-token persistence.
//!
//! SYSTEM CONTEXT
//! ==============
//! The browser build keeps the token in cookie/local storage; here the same
//! role is played by a [`TokenStore`]. `FileTokenStore` gives the CLI a token
//! that survives between invocations, `MemoryTokenStore` serves tests and
//! embedders that handle persistence themselves.
//!
//! Persistence failures are logged and otherwise ignored: losing the token only
//! costs the user a fresh login.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use wire::AuthTokenResponse;

/// A bearer token with its absolute expiry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    /// Unix seconds.
    pub expires_at: i64,
}

impl StoredToken {
    /// Anchor a token response's relative lifetime at `now` (unix seconds).
    #[must_use]
    pub fn from_response(response: &AuthTokenResponse, now: i64) -> Self {
        let lifetime = i64::try_from(response.expires_in).unwrap_or(i64::MAX);
        Self { access_token: response.access_token.clone(), expires_at: now.saturating_add(lifetime) }
    }

    #[must_use]
    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expires_at
    }

    /// `true` when the token expires within `margin_secs` of `now`.
    #[must_use]
    pub fn expires_within(&self, now: i64, margin_secs: i64) -> bool {
        now.saturating_add(margin_secs) >= self.expires_at
    }
}

pub trait TokenStore: Send + Sync {
    fn load(&self) -> Option<StoredToken>;
    fn save(&self, token: &StoredToken);
    fn clear(&self);
}

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<StoredToken>>,
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<StoredToken> {
        self.token
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn save(&self, token: &StoredToken) {
        *self
            .token
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(token.clone());
    }

    fn clear(&self) {
        *self
            .token
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = None;
    }
}

/// JSON file holding a single [`StoredToken`].
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<StoredToken> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "token file unreadable");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(token) => Some(token),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "token file corrupt; ignoring");
                None
            }
        }
    }

    fn save(&self, token: &StoredToken) {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::warn!(path = %parent.display(), error = %e, "could not create token directory");
                return;
            }
        }
        let Ok(raw) = serde_json::to_string(token) else {
            return;
        };
        if let Err(e) = std::fs::write(&self.path, raw) {
            tracing::warn!(path = %self.path.display(), error = %e, "could not write token file");
        }
    }

    fn clear(&self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %self.path.display(), error = %e, "could not remove token file"),
        }
    }
}

#[cfg(test)]
#[path = "token_test.rs"]
mod tests;
