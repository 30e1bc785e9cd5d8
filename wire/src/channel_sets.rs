//! Channel-set records for `/channel-sets` and its sub-resources.

use serde::{Deserialize, Serialize};

/// Per-channel parse state reported by the backend crawler.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseStatus {
    #[default]
    Pending,
    Parsing,
    Parsed,
    Failed,
}

/// A Telegram channel inside a set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub username: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub parse_status: ParseStatus,
    #[serde(default)]
    pub subscribers: Option<u64>,
    #[serde(default)]
    pub last_parsed_at: Option<String>,
}

/// A named collection of channels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelsSet {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub channel_count: u32,
    #[serde(default)]
    pub all_parsed: bool,
    #[serde(default)]
    pub channels: Vec<Channel>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub can_edit: bool,
    #[serde(default)]
    pub can_delete: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Body for `POST /channel-sets` and `PUT /channel-sets/{id}`.
///
/// Absent fields are omitted so an update only touches what was given.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSetDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
}

/// Body for `POST /channel-sets/{id}/channels`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddChannelsRequest {
    pub channels: Vec<String>,
}

/// Body for `POST /channel-sets/{id}/analyze`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetAnalyzeRequest {
    pub filter_ids: Vec<String>,
}

/// Response of `GET /channel-sets/{id}/parsing-status`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsingStatus {
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub parsed: u32,
    #[serde(default)]
    pub pending: u32,
    #[serde(default)]
    pub failed: u32,
    #[serde(default)]
    pub all_parsed: bool,
}

/// Lifecycle of a set's background build.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildState {
    #[default]
    Idle,
    Building,
    Completed,
    Failed,
    Cancelled,
}

/// Response of `GET /channel-sets/{id}/build-status`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildStatus {
    #[serde(default)]
    pub status: BuildState,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub message: Option<String>,
}
