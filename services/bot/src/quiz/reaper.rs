//! services/bot/src/quiz/reaper.rs
//!
//! The idle reaper: a periodic sweep that resets the session after too much
//! wall-clock inactivity. It is the only thing that mutates the session
//! without a command behind it.

use crate::quiz::service::QuizService;
use chrono::Utc;
use quizbot_core::ports::SessionNotifier;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Runs the sweep loop until the token is cancelled. Each tick checks the
/// session against `idle_timeout`; when a sweep actually resets the session,
/// a notice goes out through the notifier.
pub async fn run(
    service: Arc<QuizService>,
    notifier: Arc<dyn SessionNotifier>,
    sweep_interval: Duration,
    idle_timeout: Duration,
    cancel: CancellationToken,
) {
    let threshold = chrono::Duration::from_std(idle_timeout)
        .unwrap_or_else(|_| chrono::Duration::minutes(30));
    let mut interval = tokio::time::interval(sweep_interval);
    // The first tick fires immediately; skip it so startup never races a
    // command arriving in the same instant.
    interval.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("idle reaper stopping");
                return;
            }
            _ = interval.tick() => {
                if service.sweep_idle(Utc::now(), threshold).await {
                    notifier
                        .notify("The quiz session was ended after a period of inactivity. Upload a document to start again.")
                        .await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use quizbot_core::domain::Session;
    use quizbot_core::ports::{PortResult, QuizGenerationService, TextExtractionService};
    use quizbot_core::Question;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Mutex;

    struct NoopExtractor;

    #[async_trait]
    impl TextExtractionService for NoopExtractor {
        async fn extract_text(&self, _file_bytes: &[u8]) -> PortResult<String> {
            Ok("text".to_string())
        }
    }

    struct NoopGenerator;

    #[async_trait]
    impl QuizGenerationService for NoopGenerator {
        async fn generate_quiz(
            &self,
            _system_prompt: &str,
            _source_text: &str,
        ) -> PortResult<Vec<Question>> {
            Ok(Vec::new())
        }
    }

    #[derive(Default)]
    struct CountingNotifier {
        sent: AtomicUsize,
    }

    #[async_trait]
    impl SessionNotifier for CountingNotifier {
        async fn notify(&self, _message: &str) {
            self.sent.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn reaper_resets_an_idle_session_and_notifies() {
        let session = Arc::new(Mutex::new(Session::new()));
        let service = Arc::new(QuizService::new(
            session.clone(),
            Arc::new(NoopExtractor),
            Arc::new(NoopGenerator),
            "prompt".to_string(),
        ));
        service.ingest(b"bytes", "doc.pdf").await.unwrap();

        let notifier = Arc::new(CountingNotifier::default());
        let cancel = CancellationToken::new();
        let reaper = tokio::spawn(run(
            service.clone(),
            notifier.clone(),
            Duration::from_millis(10),
            // Zero timeout so the already-set activity timestamp counts as idle
            // on the first real tick.
            Duration::from_secs(0),
            cancel.clone(),
        ));

        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();
        reaper.await.unwrap();

        assert!(!session.lock().await.is_active());
        assert!(notifier.sent.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test(start_paused = true)]
    async fn reaper_leaves_a_fresh_session_alone() {
        let session = Arc::new(Mutex::new(Session::new()));
        let service = Arc::new(QuizService::new(
            session.clone(),
            Arc::new(NoopExtractor),
            Arc::new(NoopGenerator),
            "prompt".to_string(),
        ));
        service.ingest(b"bytes", "doc.pdf").await.unwrap();

        let notifier = Arc::new(CountingNotifier::default());
        let cancel = CancellationToken::new();
        let reaper = tokio::spawn(run(
            service.clone(),
            notifier.clone(),
            Duration::from_millis(10),
            Duration::from_secs(30 * 60),
            cancel.clone(),
        ));

        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();
        reaper.await.unwrap();

        assert!(session.lock().await.is_active());
        assert_eq!(notifier.sent.load(Ordering::SeqCst), 0);
    }
}
