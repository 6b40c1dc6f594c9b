pub mod commands;
pub mod middleware;
pub mod state;

// Re-export the handlers to make them easily accessible
// to the binary that will build the web server router.
pub use commands::{command_handler, health_handler};
pub use middleware::require_bot_token;
