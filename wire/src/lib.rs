//! Shared REST schema for the dashboard backend.
//!
//! This crate owns the JSON representation used by both `client` and `cli`.
//! Records are plain DTOs: the backend owns every lifecycle transition, so
//! nothing here enforces invariants beyond what serde checks on decode.
//!
//! Optional and newer fields default on decode so an older or newer backend
//! does not break list rendering.

pub mod analysis;
pub mod auth;
pub mod channel_sets;
pub mod credits;
pub mod filters;
pub mod tasks;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub use analysis::{AnalysisOptions, AnalysisRequest, AnalysisStarted, ProcessingMode};
pub use auth::{AuthTokenResponse, PermissionCheck, TelegramAuthRequest, TelegramUser};
pub use channel_sets::{
    AddChannelsRequest, BuildState, BuildStatus, Channel, ChannelSetDraft, ChannelsSet, ParseStatus, ParsingStatus,
    SetAnalyzeRequest,
};
pub use credits::{
    ActionCheck, CreditBalance, CreditCost, CreditPackage, CreditTransaction, PurchaseResponse, TransactionKind,
    TransactionPage,
};
pub use filters::{Filter, NewFilter};
pub use tasks::{AnalysisTask, ChannelScore, NewTask, TaskStatus};

/// Error returned by [`decode`] and [`decode_list`].
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// The body was not valid JSON for the expected shape.
    #[error("failed to decode response body: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decode a JSON response body into `T`.
///
/// # Errors
///
/// Returns [`WireError::Json`] if the body does not match `T`.
pub fn decode<T: DeserializeOwned>(body: &str) -> Result<T, WireError> {
    Ok(serde_json::from_str(body)?)
}

/// List envelope accepted by [`decode_list`].
///
/// Collection endpoints answer either with a bare array or with an object that
/// wraps the array under `items` (paged) or `data`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListEnvelope<T> {
    Bare(Vec<T>),
    Items { items: Vec<T> },
    Data { data: Vec<T> },
}

/// Decode a collection body that may be a bare array or a wrapped list.
///
/// # Errors
///
/// Returns [`WireError::Json`] if the body matches none of the accepted shapes.
pub fn decode_list<T: DeserializeOwned>(body: &str) -> Result<Vec<T>, WireError> {
    let envelope: ListEnvelope<T> = serde_json::from_str(body)?;
    Ok(match envelope {
        ListEnvelope::Bare(items) | ListEnvelope::Items { items } | ListEnvelope::Data { data: items } => items,
    })
}

/// Generic `{ "success": bool, "message": ... }` acknowledgement returned by
/// delete and cancel endpoints.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default = "default_true")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
