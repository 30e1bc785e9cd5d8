//! REST path builders.
//!
//! Paths are relative to the configured API base URL. Dynamic segments are
//! trimmed and stripped of slashes so a stray `/` in an id cannot address a
//! different resource.

pub const TASKS: &str = "/tasks";
pub const ANALYSE: &str = "/analysis/analyse";
pub const CHANNEL_SETS: &str = "/channel-sets";
pub const FILTERS: &str = "/filters";

pub const CREDITS_BALANCE: &str = "/credits/balance";
pub const CREDITS_TRANSACTIONS: &str = "/credits/transactions";
pub const CREDITS_PACKAGES: &str = "/credits/packages";
pub const CREDITS_COSTS: &str = "/credits/costs";

pub const AUTH_TELEGRAM_WEBAPP: &str = "/auth/telegram/webapp";
pub const AUTH_REFRESH: &str = "/auth/refresh";
pub const AUTH_CHECK_PERMISSION: &str = "/auth/check-permission";

/// Endpoints that must not trigger a token refresh before being called.
pub(crate) fn is_auth_endpoint(path: &str) -> bool {
    path == AUTH_TELEGRAM_WEBAPP || path == AUTH_REFRESH
}

fn segment(raw: &str) -> String {
    raw.trim().replace('/', "")
}

#[must_use]
pub fn task(id: &str) -> String {
    format!("{TASKS}/{}", segment(id))
}

#[must_use]
pub fn channel_set(id: &str) -> String {
    format!("{CHANNEL_SETS}/{}", segment(id))
}

#[must_use]
pub fn channel_set_channels(id: &str) -> String {
    format!("{}/channels", channel_set(id))
}

#[must_use]
pub fn channel_set_channel(id: &str, username: &str) -> String {
    format!("{}/{}", channel_set_channels(id), segment(username))
}

#[must_use]
pub fn channel_set_parsing_status(id: &str) -> String {
    format!("{}/parsing-status", channel_set(id))
}

#[must_use]
pub fn channel_set_analyze(id: &str) -> String {
    format!("{}/analyze", channel_set(id))
}

#[must_use]
pub fn channel_set_cancel_build(id: &str) -> String {
    format!("{}/cancel-build", channel_set(id))
}

#[must_use]
pub fn channel_set_build_status(id: &str) -> String {
    format!("{}/build-status", channel_set(id))
}

#[must_use]
pub fn purchase_package(package_id: &str) -> String {
    format!("{CREDITS_PACKAGES}/{}/purchase", segment(package_id))
}

#[must_use]
pub fn check_action(action_type: &str) -> String {
    format!("/credits/check-action/{}", segment(action_type))
}

#[must_use]
pub fn filter(id: &str) -> String {
    format!("{FILTERS}/{}", segment(id))
}

#[cfg(test)]
#[path = "endpoints_test.rs"]
mod tests;
