//! services/bot/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::commands::CommandRouter;
use crate::config::Config;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all
/// handlers. The command router (and the quiz service behind it) is the only
/// stateful thing here; handlers themselves stay stateless.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub router: Arc<CommandRouter>,
}
