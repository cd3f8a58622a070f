//! services/api/src/web/state.rs
//!
//! Defines the application's shared state: the catalog, the injected port
//! implementations, and the single learner session's in-memory pieces.

use crate::config::Config;
use gurukul_core::catalog::LessonCatalog;
use gurukul_core::chat::ChatTranscript;
use gurukul_core::ports::{ProfileStore, ProgressAnalysisService, SpeechService, TutorService};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

//=========================================================================================
// The In-Flight Gate
//=========================================================================================

/// A single-holder gate for a network-bound subsystem's "one outstanding
/// request" rule.
///
/// Acquisition hands back an RAII guard; the flag clears when the guard
/// drops, including when the holding future is abandoned mid-await. A
/// dropped request can therefore never wedge the gate shut.
#[derive(Default)]
pub struct InFlightGate(AtomicBool);

impl InFlightGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the gate, or `None` when a request is already outstanding.
    pub fn try_acquire(&self) -> Option<InFlightGuard<'_>> {
        if self.0.swap(true, Ordering::SeqCst) {
            None
        } else {
            Some(InFlightGuard(&self.0))
        }
    }

    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// The shared application state, created once at startup and passed to all
/// handlers.
///
/// The chat transcript and the analysis in-flight flag are the two
/// session-scoped resources. They are gated independently: a chat turn and
/// a progress analysis may be outstanding at the same time, but two of the
/// same kind may not.
pub struct AppState {
    pub catalog: LessonCatalog,
    pub store: Arc<dyn ProfileStore>,
    pub tutor: Arc<dyn TutorService>,
    pub analysis: Arc<dyn ProgressAnalysisService>,
    pub tts: Arc<dyn SpeechService>,
    pub config: Arc<Config>,
    /// The session-scoped chat transcript. Never persisted; cleared on
    /// explicit user action and gone on restart.
    pub chat: Mutex<ChatTranscript>,
    /// In-flight gate for the progress-analysis call ("Analyzing…").
    pub analysis_in_flight: InFlightGate,
}

impl AppState {
    pub fn new(
        catalog: LessonCatalog,
        store: Arc<dyn ProfileStore>,
        tutor: Arc<dyn TutorService>,
        analysis: Arc<dyn ProgressAnalysisService>,
        tts: Arc<dyn SpeechService>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            catalog,
            store,
            tutor,
            analysis,
            tts,
            config,
            chat: Mutex::new(ChatTranscript::new()),
            analysis_in_flight: InFlightGate::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn gate_admits_one_holder_at_a_time() {
        let gate = InFlightGate::new();
        let guard = gate.try_acquire().unwrap();
        assert!(gate.is_busy());
        assert!(gate.try_acquire().is_none());
        drop(guard);
        assert!(!gate.is_busy());
        assert!(gate.try_acquire().is_some());
    }

    #[tokio::test]
    async fn dropped_holder_future_releases_the_gate() {
        let gate = InFlightGate::new();
        // A disconnected client abandons the request future mid-await.
        let holder = async {
            let _guard = gate.try_acquire().unwrap();
            std::future::pending::<()>().await;
        };
        assert!(tokio::time::timeout(Duration::from_millis(10), holder)
            .await
            .is_err());

        assert!(!gate.is_busy());
        assert!(gate.try_acquire().is_some());
    }
}
