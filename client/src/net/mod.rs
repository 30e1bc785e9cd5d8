//! Networking modules for the dashboard REST API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `transport` is the swappable HTTP seam, `token` persists the bearer token,
//! `endpoints` formats resource paths, and `api` combines them into the
//! authenticated [`api::ApiClient`] every store talks through.

pub mod api;
pub mod endpoints;
pub mod token;
pub mod transport;

#[cfg(test)]
pub(crate) mod mock;
