//! services/api/src/web/protocol.rs
//!
//! Defines the request and response payloads exchanged between the client
//! and the API server. The DTOs use plain strings for subjects, boards and
//! grades; the handlers validate them at the input boundary and reject
//! unknown values with a 422 rather than accepting arbitrary shapes.

use chrono::{DateTime, Utc};
use gurukul_core::catalog::BADGES;
use gurukul_core::domain::{ChatMessage, LearnerProfile, LessonRecord, QuizQuestion};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

//=========================================================================================
// Onboarding and Profile
//=========================================================================================

/// The three-step onboarding flow's collected input.
#[derive(Deserialize, ToSchema)]
pub struct OnboardingRequest {
    pub name: String,
    /// Grade label, e.g. "Class 8".
    pub grade: String,
    /// Language code, e.g. "hi".
    pub preferred_language: String,
    /// Board display label, e.g. "NCERT/CBSE".
    pub board: String,
    pub region: String,
}

#[derive(Deserialize, ToSchema)]
pub struct ChangeLanguageRequest {
    /// Language code, e.g. "ta".
    pub language: String,
}

/// Guard payload for destructive actions (logout, clear-chat); the action
/// only proceeds when `confirm` is true.
#[derive(Deserialize, ToSchema)]
pub struct ConfirmRequest {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Serialize, ToSchema)]
pub struct ProfileResponse {
    pub name: String,
    pub grade: String,
    pub preferred_language: String,
    pub board: String,
    pub region: String,
    pub completed_lessons: Vec<String>,
    pub points: u32,
    pub badges: Vec<String>,
    pub streak: u32,
}

impl From<&LearnerProfile> for ProfileResponse {
    fn from(profile: &LearnerProfile) -> Self {
        Self {
            name: profile.name.clone(),
            grade: profile.grade.clone(),
            preferred_language: profile.preferred_language.clone(),
            board: profile.board.as_str().to_string(),
            region: profile.region.clone(),
            completed_lessons: profile.completed_lessons.clone(),
            points: profile.points,
            badges: profile.badges.iter().cloned().collect(),
            streak: profile.streak,
        }
    }
}

//=========================================================================================
// Lessons and the Library
//=========================================================================================

#[derive(Deserialize, IntoParams)]
pub struct LibraryQuery {
    /// Subject label or "All" (default).
    pub subject: Option<String>,
    /// Grade label or "All" (default).
    pub grade: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct LessonSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    pub subject: String,
    pub level: String,
    pub duration: String,
    pub board: String,
    pub video_url: Option<String>,
    pub has_quiz: bool,
    pub completed: bool,
    pub downloaded: bool,
}

impl LessonSummary {
    pub fn new(lesson: &LessonRecord, completed: bool, downloaded: bool) -> Self {
        Self {
            id: lesson.id.clone(),
            title: lesson.title.clone(),
            description: lesson.description.clone(),
            subject: lesson.subject.as_str().to_string(),
            level: lesson.level.clone(),
            duration: lesson.duration.clone(),
            board: lesson.board.as_str().to_string(),
            video_url: lesson.video_url.clone(),
            has_quiz: lesson.quiz.is_some(),
            completed,
            downloaded,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct LibraryResponse {
    pub lessons: Vec<LessonSummary>,
}

#[derive(Serialize, ToSchema)]
pub struct QuizQuestionDto {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
}

impl From<&QuizQuestion> for QuizQuestionDto {
    fn from(question: &QuizQuestion) -> Self {
        Self {
            question: question.question.clone(),
            options: question.options.clone(),
            correct_answer: question.correct_answer,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct LessonDetailResponse {
    #[serde(flatten)]
    pub summary: LessonSummary,
    pub content: String,
    pub quiz: Option<Vec<QuizQuestionDto>>,
}

#[derive(Deserialize, ToSchema, Default)]
pub struct CompleteLessonRequest {
    /// Option indexes picked for each quiz question, in order. Omitted for
    /// lessons without a quiz.
    pub answers: Option<Vec<usize>>,
}

#[derive(Serialize, ToSchema)]
pub struct CompleteLessonResponse {
    pub points: u32,
    /// False when the lesson was already complete (idempotent no-op).
    pub newly_completed: bool,
    pub quiz_score: Option<u32>,
    pub quiz_total: Option<u32>,
}

//=========================================================================================
// Dashboard
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct BadgeState {
    pub id: String,
    pub name: String,
    pub unlocked: bool,
}

impl BadgeState {
    /// The full badge registry rendered against one profile's unlocks.
    pub fn for_profile(profile: &LearnerProfile) -> Vec<BadgeState> {
        BADGES
            .iter()
            .map(|badge| BadgeState {
                id: badge.id.to_string(),
                name: badge.name.to_string(),
                unlocked: profile.badges.contains(badge.id),
            })
            .collect()
    }
}

#[derive(Serialize, ToSchema)]
pub struct DashboardResponse {
    pub points: u32,
    pub streak: u32,
    pub completed_count: usize,
    pub badges: Vec<BadgeState>,
    pub recommended: Vec<LessonSummary>,
    /// True when the whole catalog is completed: the recommendation panel
    /// shows a celebration state, not an error.
    pub all_caught_up: bool,
}

#[derive(Deserialize, IntoParams)]
pub struct AnalysisQuery {
    /// Forces a live call even when a cached analysis exists.
    pub refresh: Option<bool>,
}

#[derive(Serialize, ToSchema)]
pub struct AnalysisResponse {
    pub text: Option<String>,
    /// Whether the text came from the warm-start cache.
    pub cached: bool,
}

//=========================================================================================
// Downloads
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct DownloadsResponse {
    pub lessons: Vec<LessonSummary>,
}

#[derive(Serialize, ToSchema)]
pub struct ToggleDownloadResponse {
    /// Whether the lesson is downloaded after the toggle.
    pub downloaded: bool,
    pub downloads: Vec<String>,
}

//=========================================================================================
// Chat
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SendChatRequest {
    pub text: String,
}

#[derive(Deserialize, ToSchema)]
pub struct ChatFocusRequest {
    /// Lesson title carried from a lesson-detail screen; `null` clears it.
    pub topic: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ChatMessageDto {
    pub id: Uuid,
    pub role: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl From<&ChatMessage> for ChatMessageDto {
    fn from(message: &ChatMessage) -> Self {
        Self {
            id: message.id,
            role: match message.role {
                gurukul_core::domain::ChatRole::User => "user".to_string(),
                gurukul_core::domain::ChatRole::Assistant => "assistant".to_string(),
            },
            text: message.text.clone(),
            timestamp: message.timestamp,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ChatResponse {
    pub messages: Vec<ChatMessageDto>,
    pub sending: bool,
    /// The transient banner flag raised by a failed tutor call. Metadata,
    /// not a transcript entry.
    pub connection_error: Option<String>,
    pub focus_topic: Option<String>,
}

//=========================================================================================
// Read-aloud
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SpeechRequest {
    pub text: String,
    /// Voice id; the configured default is used when omitted.
    pub voice: Option<String>,
}

//=========================================================================================
// Onboarding Option Lists
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct LanguageOption {
    pub code: String,
    pub name: String,
}

#[derive(Serialize, ToSchema)]
pub struct BadgeOption {
    pub id: String,
    pub name: String,
}

#[derive(Serialize, ToSchema)]
pub struct MetaResponse {
    pub subjects: Vec<String>,
    pub boards: Vec<String>,
    pub languages: Vec<LanguageOption>,
    pub regions: Vec<String>,
    pub grades: Vec<String>,
    pub badges: Vec<BadgeOption>,
}
