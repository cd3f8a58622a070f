//! crates/gurukul_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or
//! generative-AI providers.

use crate::domain::{ChatTurn, DownloadSet, LearnerProfile, LessonRecord};
use async_trait::async_trait;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// The Profile Store Port
//=========================================================================================

/// Durable key-value persistence for the single learner session: the
/// profile slot, the downloads slot, and the per-learner analysis cache.
///
/// Implementations must never surface malformed stored data as an error;
/// a corrupt slot reads as absent so the app falls back to onboarding.
/// Saving identical content twice has no observable effect.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn load_profile(&self) -> PortResult<Option<LearnerProfile>>;
    async fn save_profile(&self, profile: &LearnerProfile) -> PortResult<()>;

    async fn load_downloads(&self) -> PortResult<DownloadSet>;
    async fn save_downloads(&self, downloads: &DownloadSet) -> PortResult<()>;

    /// The warm-start cache of the last computed progress analysis,
    /// keyed by learner name.
    async fn load_analysis(&self, learner_name: &str) -> PortResult<Option<String>>;
    async fn save_analysis(&self, learner_name: &str, text: &str) -> PortResult<()>;

    /// Clears all durable state. Used by logout; forces a return to
    /// onboarding on next load.
    async fn clear(&self) -> PortResult<()>;
}

//=========================================================================================
// Generative-AI Collaborator Ports
//=========================================================================================

/// One conversational tutoring turn. A failed call must be signalled
/// distinctly (as an `Err`) from an empty-but-successful response
/// (an `Ok` with blank text); the transcript manager treats them
/// differently.
#[async_trait]
pub trait TutorService: Send + Sync {
    async fn ask(
        &self,
        question: &str,
        history: &[ChatTurn],
        profile: &LearnerProfile,
        focus_topic: Option<&str>,
    ) -> PortResult<String>;
}

/// Progress analysis over the learner's completed lessons. Absence is the
/// only failure signal; this port never errors to the caller.
#[async_trait]
pub trait ProgressAnalysisService: Send + Sync {
    async fn analyze(
        &self,
        profile: &LearnerProfile,
        completed: &[&LessonRecord],
    ) -> Option<String>;
}

/// Read-aloud speech synthesis. Returns playable audio bytes, or absence
/// when synthesis fails.
#[async_trait]
pub trait SpeechService: Send + Sync {
    async fn synthesize(&self, text: &str, voice: &str) -> Option<Vec<u8>>;
}
