//! # client
//!
//! Typed REST client and client-side state for the channel-analysis dashboard.
//!
//! The crate is UI-agnostic: stores report through a [`notify::Notifier`]
//! (toasts and navigation requests) instead of touching any view layer, so the
//! same stores back the `cli` front end and tests alike.
//!
//! Layering, bottom-up:
//! - [`net`]: transport seam, bearer-token storage, and [`net::api::ApiClient`].
//! - [`state`]: the generic freshness cache and one store per backend resource,
//!   bundled by [`state::Dashboard`].
//! - [`util`]: pure helpers (set status labels, channel name normalization, clock).

pub mod config;
pub mod error;
pub mod net;
pub mod notify;
pub mod state;
pub mod util;

pub use config::{ClientConfig, Freshness};
pub use error::ApiError;
pub use notify::{Notifier, Toast, ToastLevel, UiEvent};
pub use state::Dashboard;
