//! services/api/src/web/chat_turn.rs
//!
//! This module contains the asynchronous worker function responsible for
//! handling a single tutoring chat turn against the shared transcript.

use crate::web::state::AppState;
use gurukul_core::chat::SendRejection;
use gurukul_core::domain::LearnerProfile;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Runs one chat turn: accept the input, issue the tutor request, and
/// resolve the transcript.
///
/// The transcript lock is released while the external call is in flight —
/// the `Sending` phase, not the mutex, is what rejects overlapping sends,
/// and other subsystems (analysis, speech) stay free to run. The call and
/// its resolution run in a spawned task the caller merely awaits: if the
/// caller is dropped mid-turn (a disconnected client), the task still runs
/// to completion and the transcript still ends the turn in `Idle` with
/// exactly one assistant message appended, never stuck in `Sending`.
pub async fn run_chat_turn(
    state: &Arc<AppState>,
    profile: &LearnerProfile,
    input: &str,
) -> Result<(), SendRejection> {
    let (turn, focus_topic) = {
        let mut chat = state.chat.lock().await;
        let turn = chat.begin_send(input)?;
        let focus_topic = chat.focus_topic().map(str::to_string);
        (turn, focus_topic)
    };

    let task_state = state.clone();
    let profile = profile.clone();
    let resolution = tokio::spawn(async move {
        let start_time = Instant::now();
        info!("Tutor turn started ({} prior messages).", turn.history.len());

        let result = task_state
            .tutor
            .ask(&turn.question, &turn.history, &profile, focus_topic.as_deref())
            .await;

        let mut chat = task_state.chat.lock().await;
        match result {
            Ok(reply) => {
                info!("Tutor turn completed in {:?}.", start_time.elapsed());
                chat.resolve_success(&reply);
            }
            Err(e) => {
                error!("Tutor call failed: {}", e);
                chat.resolve_failure();
            }
        }
    });

    // Keeps the caller's response in sync with the resolution; the task is
    // not cancelled when this await is abandoned.
    let _ = resolution.await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStore;
    use crate::config::Config;
    use crate::web::state::AppState;
    use async_trait::async_trait;
    use gurukul_core::catalog::LessonCatalog;
    use gurukul_core::chat::{ChatPhase, CONNECTION_FALLBACK, EMPTY_REPLY_FALLBACK};
    use gurukul_core::domain::{Board, ChatRole, ChatTurn, LessonRecord};
    use gurukul_core::ports::{
        PortError, PortResult, ProgressAnalysisService, SpeechService, TutorService,
    };
    use gurukul_core::progress::{create_profile, OnboardingForm};
    use std::sync::Arc;
    use tokio::sync::Notify;
    use tracing::Level;

    struct CannedTutor {
        reply: PortResult<String>,
    }

    #[async_trait]
    impl TutorService for CannedTutor {
        async fn ask(
            &self,
            _question: &str,
            _history: &[ChatTurn],
            _profile: &LearnerProfile,
            _focus_topic: Option<&str>,
        ) -> PortResult<String> {
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(PortError::Unexpected(msg)) => Err(PortError::Unexpected(msg.clone())),
                Err(PortError::NotFound(msg)) => Err(PortError::NotFound(msg.clone())),
            }
        }
    }

    /// A tutor that parks until released, to exercise the in-flight guard.
    struct BlockedTutor {
        release: Arc<Notify>,
    }

    #[async_trait]
    impl TutorService for BlockedTutor {
        async fn ask(
            &self,
            _question: &str,
            _history: &[ChatTurn],
            _profile: &LearnerProfile,
            _focus_topic: Option<&str>,
        ) -> PortResult<String> {
            self.release.notified().await;
            Ok("done".to_string())
        }
    }

    struct NoAnalysis;

    #[async_trait]
    impl ProgressAnalysisService for NoAnalysis {
        async fn analyze(
            &self,
            _profile: &LearnerProfile,
            _completed: &[&LessonRecord],
        ) -> Option<String> {
            None
        }
    }

    struct NoSpeech;

    #[async_trait]
    impl SpeechService for NoSpeech {
        async fn synthesize(&self, _text: &str, _voice: &str) -> Option<Vec<u8>> {
            None
        }
    }

    fn test_config() -> Config {
        Config {
            bind_address: "127.0.0.1:0".parse().unwrap(),
            database_url: "postgres://unused".to_string(),
            log_level: Level::INFO,
            openai_api_key: None,
            tutor_model: "test".to_string(),
            analysis_model: "test".to_string(),
            tts_voice: "alloy".to_string(),
        }
    }

    fn state_with_tutor(tutor: Arc<dyn TutorService>) -> Arc<AppState> {
        Arc::new(AppState::new(
            LessonCatalog::builtin(),
            Arc::new(MemoryStore::new()),
            tutor,
            Arc::new(NoAnalysis),
            Arc::new(NoSpeech),
            Arc::new(test_config()),
        ))
    }

    fn learner() -> LearnerProfile {
        create_profile(OnboardingForm {
            name: "Asha".to_string(),
            grade: "Class 8".to_string(),
            preferred_language: "hi".to_string(),
            board: Board::NcertCbse,
            region: "Maharashtra".to_string(),
        })
    }

    #[tokio::test]
    async fn successful_turn_grows_transcript_by_two() {
        let state = state_with_tutor(Arc::new(CannedTutor {
            reply: Ok("Shabash! 2x = 10, so x = 5.".to_string()),
        }));
        run_chat_turn(&state, &learner(), "Solve 2x = 10").await.unwrap();

        let chat = state.chat.lock().await;
        assert_eq!(chat.messages().len(), 2);
        assert_eq!(chat.messages()[1].role, ChatRole::Assistant);
        assert_eq!(chat.phase(), ChatPhase::Idle);
        assert!(!chat.has_connection_error());
    }

    #[tokio::test]
    async fn failed_turn_appends_fallback_and_sets_error() {
        let state = state_with_tutor(Arc::new(CannedTutor {
            reply: Err(PortError::Unexpected("network down".to_string())),
        }));
        run_chat_turn(&state, &learner(), "Why is the sky blue?")
            .await
            .unwrap();

        let chat = state.chat.lock().await;
        assert_eq!(chat.messages().len(), 2);
        assert_eq!(chat.messages()[1].text, CONNECTION_FALLBACK);
        assert!(chat.has_connection_error());
        assert_eq!(chat.phase(), ChatPhase::Idle);
    }

    #[tokio::test]
    async fn empty_reply_is_not_an_error() {
        let state = state_with_tutor(Arc::new(CannedTutor {
            reply: Ok(String::new()),
        }));
        run_chat_turn(&state, &learner(), "Hello?").await.unwrap();

        let chat = state.chat.lock().await;
        assert_eq!(chat.messages()[1].text, EMPTY_REPLY_FALLBACK);
        assert!(!chat.has_connection_error());
    }

    #[tokio::test]
    async fn empty_input_issues_no_call() {
        let state = state_with_tutor(Arc::new(CannedTutor {
            reply: Ok("unreachable".to_string()),
        }));
        let result = run_chat_turn(&state, &learner(), "   ").await;
        assert_eq!(result, Err(SendRejection::EmptyInput));
        assert!(state.chat.lock().await.messages().is_empty());
    }

    #[tokio::test]
    async fn overlapping_send_is_rejected() {
        let release = Arc::new(Notify::new());
        let state = state_with_tutor(Arc::new(BlockedTutor {
            release: release.clone(),
        }));

        let first = tokio::spawn({
            let state = state.clone();
            async move { run_chat_turn(&state, &learner(), "First").await }
        });
        // Wait until the first turn is in flight.
        while !state.chat.lock().await.is_sending() {
            tokio::task::yield_now().await;
        }

        let second = run_chat_turn(&state, &learner(), "Second").await;
        assert_eq!(second, Err(SendRejection::RequestInFlight));

        release.notify_one();
        first.await.unwrap().unwrap();

        let chat = state.chat.lock().await;
        // Only the first turn made it into the transcript.
        assert_eq!(chat.messages().len(), 2);
        assert_eq!(chat.messages()[0].text, "First");
    }

    #[tokio::test]
    async fn dropped_caller_still_resolves_the_turn() {
        let release = Arc::new(Notify::new());
        let state = state_with_tutor(Arc::new(BlockedTutor {
            release: release.clone(),
        }));

        // A disconnected client drops the caller's future mid-turn.
        let profile = learner();
        let caller = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            run_chat_turn(&state, &profile, "First"),
        );
        assert!(caller.await.is_err());

        // The detached task finishes the turn once the tutor replies.
        release.notify_one();
        loop {
            let chat = state.chat.lock().await;
            if !chat.is_sending() {
                assert_eq!(chat.messages().len(), 2);
                break;
            }
            drop(chat);
            tokio::task::yield_now().await;
        }

        // The transcript is not wedged: a later send is accepted.
        release.notify_one();
        run_chat_turn(&state, &learner(), "Second").await.unwrap();
        assert_eq!(state.chat.lock().await.messages().len(), 4);
    }
}
