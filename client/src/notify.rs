//! UI event sink: transient toasts and navigation requests.
//!
//! SYSTEM CONTEXT
//! ==============
//! Stores never render anything. They emit [`UiEvent`]s through a
//! [`Notifier`], and the front end (a terminal, a browser shell, a test)
//! decides how to show them.

use tokio::sync::mpsc;

use crate::error::ApiError;

/// Route a 401 sends the user to.
pub const LOGIN_ROUTE: &str = "/login";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

/// A transient user-facing notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub title: String,
    pub description: Option<String>,
}

impl Toast {
    #[must_use]
    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self { level: ToastLevel::Error, title: title.into(), description: Some(description.into()) }
    }

    #[must_use]
    pub fn success(title: impl Into<String>) -> Self {
        Self { level: ToastLevel::Success, title: title.into(), description: None }
    }

    #[must_use]
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self { level: ToastLevel::Info, title: title.into(), description: Some(description.into()) }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UiEvent {
    Toast(Toast),
    /// Request client-side navigation to a route.
    Navigate(String),
}

/// Receiver of UI events. Implementations must not block.
pub trait Notifier: Send + Sync {
    fn notify(&self, event: UiEvent);

    fn toast(&self, toast: Toast) {
        self.notify(UiEvent::Toast(toast));
    }

    fn navigate(&self, route: &str) {
        self.notify(UiEvent::Navigate(route.to_owned()));
    }
}

impl Notifier for mpsc::UnboundedSender<UiEvent> {
    fn notify(&self, event: UiEvent) {
        // A dropped receiver means nobody is showing events any more.
        let _ = self.send(event);
    }
}

/// Notifier that only writes events to the tracing log.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, event: UiEvent) {
        match event {
            UiEvent::Toast(Toast { level: ToastLevel::Error, title, description }) => {
                tracing::warn!(%title, description = description.as_deref().unwrap_or(""), "toast");
            }
            UiEvent::Toast(Toast { title, description, .. }) => {
                tracing::info!(%title, description = description.as_deref().unwrap_or(""), "toast");
            }
            UiEvent::Navigate(route) => tracing::info!(%route, "navigate"),
        }
    }
}

/// Report a failed store operation.
///
/// 401s are skipped here: the API client has already cleared the token and
/// requested the login route, and a toast on top of the redirect is noise.
pub fn report_failure(notifier: &dyn Notifier, title: &str, err: &ApiError) {
    tracing::warn!(error = %err, code = err.code(), operation = title, "store operation failed");
    if matches!(err, ApiError::Unauthorized) {
        return;
    }
    notifier.toast(Toast::error(title, err.user_message()));
}

/// Report a request rejected before it reached the network.
pub fn report_validation(notifier: &dyn Notifier, title: &str, message: &str) {
    tracing::debug!(operation = title, %message, "validation rejected request");
    notifier.toast(Toast::error(title, message));
}

#[cfg(test)]
#[path = "notify_test.rs"]
mod tests;
