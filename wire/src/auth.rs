//! Bearer-token issuance keyed off Telegram Mini-App launch data.

use serde::{Deserialize, Serialize};

/// Body for `POST /auth/telegram/webapp`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelegramAuthRequest {
    /// Raw `initData` query string handed to the Mini App by Telegram.
    pub init_data: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl TelegramUser {
    /// Name for status lines: `@username`, else first/last name, else the id.
    #[must_use]
    pub fn display_name(&self) -> String {
        if let Some(username) = self.username.as_deref().filter(|u| !u.is_empty()) {
            return format!("@{username}");
        }
        let full = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if full.is_empty() { self.id.to_string() } else { full }
    }
}

/// Response of `POST /auth/telegram/webapp` and `POST /auth/refresh`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Lifetime in seconds from issuance.
    pub expires_in: u64,
    #[serde(default)]
    pub user: Option<TelegramUser>,
}

fn default_token_type() -> String {
    "bearer".to_owned()
}

/// Response of `GET /auth/check-permission`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionCheck {
    #[serde(default)]
    pub permission: String,
    #[serde(alias = "has_permission")]
    pub granted: bool,
}
