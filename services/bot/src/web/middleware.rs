//! services/bot/src/web/middleware.rs
//!
//! Credential middleware for the command endpoint.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::web::state::AppState;

/// Middleware that validates the bot credential on inbound command requests.
///
/// The chat-platform relay must present `Authorization: Bearer <BOT_TOKEN>`;
/// anything else is rejected with 401 before any session state is touched.
pub async fn require_bot_token(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let presented = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(StatusCode::UNAUTHORIZED)?;

    if presented != state.config.bot_token {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(next.run(req).await)
}
