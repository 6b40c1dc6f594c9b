//! services/bot/src/adapters/notify.rs
//!
//! This module contains the adapter for session notices.
//! It implements the `SessionNotifier` port from the `core` crate.

use async_trait::async_trait;
use quizbot_core::ports::SessionNotifier;
use tracing::warn;

/// An adapter that delivers session notices through the tracing pipeline.
///
/// The HTTP command transport is request/response, so there is no push
/// channel to a chat surface here; a transport that has one (e.g. a gateway
/// connection) would provide its own `SessionNotifier` in its place.
#[derive(Clone, Default)]
pub struct TracingNotifier;

#[async_trait]
impl SessionNotifier for TracingNotifier {
    async fn notify(&self, message: &str) {
        warn!(notice = %message, "session notice");
    }
}
