//! services/bot/src/web/commands.rs
//!
//! Contains the Axum handler for the inbound command endpoint. This is the
//! transport adapter: it unpacks the multipart request, enforces the channel
//! restriction, and hands the parsed command to the transport-agnostic
//! router.

use crate::commands::{Attachment, Command};
use crate::web::state::AppState;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// The reply payload sent back to the chat-platform relay.
#[derive(Serialize)]
pub struct CommandReply {
    reply: String,
}

/// Execute one chat command.
///
/// Accepts a multipart/form-data request with `channel_id` and `command`
/// text parts, an optional `argument` part, and an optional `file` part for
/// `upload`.
pub async fn command_handler(
    State(app_state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let mut channel_id: Option<u64> = None;
    let mut command_name: Option<String> = None;
    let mut argument: Option<String> = None;
    let mut attachment: Option<Attachment> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            format!("Failed to read multipart data: {}", e),
        )
    })? {
        match field.name() {
            Some("channel_id") => {
                let raw = field.text().await.map_err(|e| {
                    (StatusCode::BAD_REQUEST, format!("Failed to read channel_id: {}", e))
                })?;
                let id = raw.trim().parse::<u64>().map_err(|_| {
                    (
                        StatusCode::BAD_REQUEST,
                        format!("'{}' is not a valid channel id", raw),
                    )
                })?;
                channel_id = Some(id);
            }
            Some("command") => {
                command_name = Some(field.text().await.map_err(|e| {
                    (StatusCode::BAD_REQUEST, format!("Failed to read command: {}", e))
                })?);
            }
            Some("argument") => {
                argument = Some(field.text().await.map_err(|e| {
                    (StatusCode::BAD_REQUEST, format!("Failed to read argument: {}", e))
                })?);
            }
            Some("file") => {
                let filename = field.file_name().unwrap_or("attachment").to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    (
                        StatusCode::BAD_REQUEST,
                        format!("Failed to read file bytes: {}", e),
                    )
                })?;
                attachment = Some(Attachment { filename, bytes });
            }
            _ => {}
        }
    }

    let command_name = command_name.ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            "Multipart form must include a command".to_string(),
        )
    })?;

    // The restricted channel, when configured, is enforced here so a command
    // from elsewhere never reaches the session.
    if let Some(allowed) = app_state.config.allowed_channel_id {
        if channel_id != Some(allowed) {
            debug!(?channel_id, allowed, "refusing command from outside the allowed channel");
            return Ok(Json(CommandReply {
                reply: "❌ This bot only answers in its configured channel.".to_string(),
            }));
        }
    }

    let Some(command) = Command::parse(&command_name, argument.as_deref()) else {
        return Ok(Json(CommandReply {
            reply: "❓ Unknown command or missing argument. Use `/help` to list commands."
                .to_string(),
        }));
    };

    let reply = app_state.router.dispatch(command, attachment).await;
    Ok(Json(CommandReply { reply }))
}

/// Liveness probe for the hosting platform. Carries no session information.
pub async fn health_handler() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{CommandDescriptions, CommandRouter};
    use crate::config::Config;
    use crate::quiz::QuizService;
    use crate::web::middleware::require_bot_token;
    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request},
        middleware as axum_middleware,
        response::Response,
        routing::{get, post},
        Router,
    };
    use quizbot_core::domain::{Choice, Question, Session};
    use quizbot_core::ports::{PortResult, QuizGenerationService, TextExtractionService};
    use std::path::PathBuf;
    use std::time::Duration;
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    const TOKEN: &str = "relay-credential";
    const BOUNDARY: &str = "quizbot-boundary";

    struct FakeExtractor;

    #[async_trait]
    impl TextExtractionService for FakeExtractor {
        async fn extract_text(&self, _file_bytes: &[u8]) -> PortResult<String> {
            Ok("document text".to_string())
        }
    }

    struct FakeGenerator;

    #[async_trait]
    impl QuizGenerationService for FakeGenerator {
        async fn generate_quiz(
            &self,
            _system_prompt: &str,
            _source_text: &str,
        ) -> PortResult<Vec<Question>> {
            Ok(vec![Question {
                prompt: "What color is the sky?".to_string(),
                choices: vec![Choice {
                    label: "A".to_string(),
                    text: "Blue".to_string(),
                }],
                correct_answer: "A".to_string(),
                explanation: "Rayleigh scattering.".to_string(),
            }])
        }
    }

    fn test_config(allowed_channel_id: Option<u64>) -> Config {
        Config {
            bind_address: "127.0.0.1:0".parse().expect("valid address"),
            log_level: tracing::Level::INFO,
            bot_token: TOKEN.to_string(),
            openai_api_key: None,
            quiz_model: "gpt-4o-mini".to_string(),
            allowed_channel_id,
            system_prompt: None,
            staging_path: PathBuf::from("./temp.pdf"),
            reaper_interval: Duration::from_secs(300),
            idle_timeout: Duration::from_secs(1800),
        }
    }

    /// Builds the same router shape the binary serves: a liveness route plus
    /// the credential-protected command endpoint.
    fn app(allowed_channel_id: Option<u64>) -> (Router, Arc<Mutex<Session>>) {
        let session = Arc::new(Mutex::new(Session::new()));
        let service = Arc::new(QuizService::new(
            session.clone(),
            Arc::new(FakeExtractor),
            Arc::new(FakeGenerator),
            "prompt".to_string(),
        ));
        let state = Arc::new(AppState {
            config: Arc::new(test_config(allowed_channel_id)),
            router: Arc::new(CommandRouter::new(service, CommandDescriptions::default())),
        });

        let protected = Router::new()
            .route("/commands", post(command_handler))
            .layer(axum_middleware::from_fn_with_state(
                state.clone(),
                require_bot_token,
            ));
        let router = Router::new()
            .route("/", get(health_handler))
            .merge(protected)
            .with_state(state);
        (router, session)
    }

    fn command_request(
        token: Option<&str>,
        fields: &[(&str, &str)],
        file: Option<(&str, &[u8])>,
    ) -> Request<Body> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((filename, bytes)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/pdf\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let mut builder = Request::builder()
            .method("POST")
            .uri("/commands")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            );
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body)).expect("valid request")
    }

    async fn reply_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        let value: serde_json::Value = serde_json::from_slice(&bytes).expect("json reply");
        value["reply"].as_str().expect("reply field").to_string()
    }

    #[tokio::test]
    async fn missing_credential_is_rejected_before_dispatch() {
        let (app, session) = app(None);
        let response = app
            .oneshot(command_request(None, &[("command", "help")], None))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(!session.lock().await.is_active());
    }

    #[tokio::test]
    async fn wrong_credential_is_rejected() {
        let (app, _session) = app(None);
        let response = app
            .oneshot(command_request(Some("wrong"), &[("command", "help")], None))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn liveness_probe_needs_no_credential() {
        let (app, _session) = app(None);
        let request = Request::builder()
            .uri("/")
            .body(Body::empty())
            .expect("valid request");
        let response = app.oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn command_from_another_channel_is_refused_without_touching_state() {
        let (app, session) = app(Some(42));
        let response = app
            .oneshot(command_request(
                Some(TOKEN),
                &[("channel_id", "7"), ("command", "upload")],
                Some(("doc.pdf", b"%PDF-1.4")),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            reply_text(response).await,
            "❌ This bot only answers in its configured channel."
        );
        assert!(!session.lock().await.is_active());
    }

    #[tokio::test]
    async fn command_without_channel_id_is_refused_when_restricted() {
        let (app, session) = app(Some(42));
        let response = app
            .oneshot(command_request(Some(TOKEN), &[("command", "help")], None))
            .await
            .expect("response");
        assert!(reply_text(response).await.contains("configured channel"));
        assert!(!session.lock().await.is_active());
    }

    #[tokio::test]
    async fn command_from_the_allowed_channel_is_dispatched() {
        let (app, session) = app(Some(42));
        let response = app
            .oneshot(command_request(
                Some(TOKEN),
                &[("channel_id", "42"), ("command", "upload")],
                Some(("doc.pdf", b"%PDF-1.4")),
            ))
            .await
            .expect("response");
        assert!(reply_text(response).await.contains("PDF loaded"));
        assert!(session.lock().await.is_active());
    }

    #[tokio::test]
    async fn unknown_command_points_at_help() {
        let (app, _session) = app(None);
        let response = app
            .oneshot(command_request(Some(TOKEN), &[("command", "frobnicate")], None))
            .await
            .expect("response");
        assert!(reply_text(response).await.contains("/help"));
    }
}
