//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::chat_turn::run_chat_turn;
use crate::web::protocol::*;
use crate::web::state::AppState;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use gurukul_core::catalog::{BADGES, GRADES, LANGUAGES, REGIONS};
use gurukul_core::chat::{ChatTranscript, SendRejection, CONNECTION_ERROR_BANNER};
use gurukul_core::domain::{Board, LearnerProfile, Subject};
use gurukul_core::ports::PortError;
use gurukul_core::progress::{
    change_language, complete_lesson as apply_completion, create_profile, score_quiz,
    OnboardingForm,
};
use gurukul_core::recommend::{filter_lessons, recommend_next, GradeFilter, LibraryFilter, SubjectFilter};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::OpenApi;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        get_meta,
        onboard_handler,
        get_profile_handler,
        change_language_handler,
        library_handler,
        lesson_detail_handler,
        complete_lesson_handler,
        dashboard_handler,
        analysis_handler,
        downloads_handler,
        toggle_download_handler,
        chat_handler,
        chat_send_handler,
        chat_focus_handler,
        chat_clear_handler,
        speech_handler,
        logout_handler,
    ),
    components(schemas(
        MetaResponse,
        LanguageOption,
        BadgeOption,
        OnboardingRequest,
        ChangeLanguageRequest,
        ConfirmRequest,
        ProfileResponse,
        LibraryResponse,
        LessonSummary,
        LessonDetailResponse,
        QuizQuestionDto,
        CompleteLessonRequest,
        CompleteLessonResponse,
        DashboardResponse,
        BadgeState,
        AnalysisResponse,
        DownloadsResponse,
        ToggleDownloadResponse,
        SendChatRequest,
        ChatFocusRequest,
        ChatMessageDto,
        ChatResponse,
        SpeechRequest,
    )),
    tags(
        (name = "Gurukul API", description = "API endpoints for the learning companion.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Shared Helpers
//=========================================================================================

type HandlerError = (StatusCode, String);

fn internal(context: &str, e: impl std::fmt::Debug) -> HandlerError {
    error!("{}: {:?}", context, e);
    (StatusCode::INTERNAL_SERVER_ERROR, context.to_string())
}

/// Loads the learner profile or reports that onboarding has not happened.
async fn require_profile(state: &AppState) -> Result<LearnerProfile, HandlerError> {
    match state.store.load_profile().await {
        Ok(Some(profile)) => Ok(profile),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            "No learner profile exists; complete onboarding first".to_string(),
        )),
        Err(e) => Err(internal("Failed to load profile", e)),
    }
}

fn chat_response(chat: &ChatTranscript) -> ChatResponse {
    ChatResponse {
        messages: chat.messages().iter().map(ChatMessageDto::from).collect(),
        sending: chat.is_sending(),
        connection_error: chat
            .has_connection_error()
            .then(|| CONNECTION_ERROR_BANNER.to_string()),
        focus_topic: chat.focus_topic().map(str::to_string),
    }
}

/// The confirmation guard for destructive actions.
fn require_confirmation(payload: &ConfirmRequest) -> Result<(), HandlerError> {
    if payload.confirm {
        Ok(())
    } else {
        Err((
            StatusCode::BAD_REQUEST,
            "This action is destructive; resend with \"confirm\": true".to_string(),
        ))
    }
}

//=========================================================================================
// Meta / Onboarding / Profile
//=========================================================================================

/// Option lists the onboarding flow and badge shelf render from.
#[utoipa::path(
    get,
    path = "/meta",
    responses((status = 200, description = "Option lists", body = MetaResponse))
)]
pub async fn get_meta() -> Json<MetaResponse> {
    Json(MetaResponse {
        subjects: Subject::ALL.iter().map(|s| s.as_str().to_string()).collect(),
        boards: Board::ALL.iter().map(|b| b.as_str().to_string()).collect(),
        languages: LANGUAGES
            .iter()
            .map(|l| LanguageOption {
                code: l.code.to_string(),
                name: l.name.to_string(),
            })
            .collect(),
        regions: REGIONS.iter().map(|r| r.to_string()).collect(),
        grades: GRADES.iter().map(|g| g.to_string()).collect(),
        badges: BADGES
            .iter()
            .map(|b| BadgeOption {
                id: b.id.to_string(),
                name: b.name.to_string(),
            })
            .collect(),
    })
}

/// Creates the learner profile from the onboarding flow's input.
///
/// Validation failures are input-boundary errors (422); they correspond to
/// disabled affordances in the UI rather than runtime errors.
#[utoipa::path(
    post,
    path = "/onboarding",
    request_body = OnboardingRequest,
    responses(
        (status = 201, description = "Profile created", body = ProfileResponse),
        (status = 422, description = "Missing or unknown field values")
    )
)]
pub async fn onboard_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<OnboardingRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let unprocessable = |message: &str| (StatusCode::UNPROCESSABLE_ENTITY, message.to_string());

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(unprocessable("name is required"));
    }
    if !GRADES.contains(&payload.grade.as_str()) {
        return Err(unprocessable("grade must be one of Class 1..Class 12"));
    }
    if !LANGUAGES.iter().any(|l| l.code == payload.preferred_language) {
        return Err(unprocessable("unknown preferred_language code"));
    }
    let board = Board::from_label(&payload.board)
        .ok_or_else(|| unprocessable("unknown board label"))?;
    let region = payload.region.trim();
    if region.is_empty() {
        return Err(unprocessable("region is required"));
    }

    let profile = create_profile(OnboardingForm {
        name: name.to_string(),
        grade: payload.grade.clone(),
        preferred_language: payload.preferred_language.clone(),
        board,
        region: region.to_string(),
    });

    state
        .store
        .save_profile(&profile)
        .await
        .map_err(|e| internal("Failed to save profile", e))?;
    info!("Onboarded learner '{}' ({}, {})", profile.name, profile.grade, profile.board);

    Ok((StatusCode::CREATED, Json(ProfileResponse::from(&profile))))
}

/// The learner profile, or 404 when onboarding hasn't run.
#[utoipa::path(
    get,
    path = "/profile",
    responses(
        (status = 200, description = "The learner profile", body = ProfileResponse),
        (status = 404, description = "No profile; onboarding required")
    )
)]
pub async fn get_profile_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ProfileResponse>, HandlerError> {
    let profile = require_profile(&state).await?;
    Ok(Json(ProfileResponse::from(&profile)))
}

/// Switches the preferred language. Identity field only; points, badges
/// and streak are untouched.
#[utoipa::path(
    post,
    path = "/profile/language",
    request_body = ChangeLanguageRequest,
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 422, description = "Unknown language code")
    )
)]
pub async fn change_language_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChangeLanguageRequest>,
) -> Result<Json<ProfileResponse>, HandlerError> {
    if !LANGUAGES.iter().any(|l| l.code == payload.language) {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "unknown language code".to_string(),
        ));
    }
    let profile = require_profile(&state).await?;
    let updated = change_language(&profile, &payload.language);
    state
        .store
        .save_profile(&updated)
        .await
        .map_err(|e| internal("Failed to save profile", e))?;
    Ok(Json(ProfileResponse::from(&updated)))
}

//=========================================================================================
// Library and Lessons
//=========================================================================================

fn parse_library_filter(query: &LibraryQuery) -> Result<LibraryFilter, HandlerError> {
    let subject = match query.subject.as_deref() {
        None | Some("All") => SubjectFilter::All,
        Some(label) => SubjectFilter::Only(Subject::from_label(label).ok_or((
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("unknown subject '{}'", label),
        ))?),
    };
    let grade = match query.grade.as_deref() {
        None | Some("All") => GradeFilter::All,
        Some(label) if GRADES.contains(&label) => GradeFilter::Only(label.to_string()),
        Some(label) => {
            return Err((
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("unknown grade '{}'", label),
            ))
        }
    };
    Ok(LibraryFilter { subject, grade })
}

/// The lesson library, filtered by subject and grade and scoped to the
/// learner's board. Catalog order, no pagination.
#[utoipa::path(
    get,
    path = "/library",
    params(LibraryQuery),
    responses(
        (status = 200, description = "Matching lessons", body = LibraryResponse),
        (status = 422, description = "Unknown subject or grade filter")
    )
)]
pub async fn library_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LibraryQuery>,
) -> Result<Json<LibraryResponse>, HandlerError> {
    let profile = require_profile(&state).await?;
    let filter = parse_library_filter(&query)?;
    let downloads = state
        .store
        .load_downloads()
        .await
        .map_err(|e| internal("Failed to load downloads", e))?;

    let lessons = filter_lessons(&state.catalog, &profile, &filter)
        .into_iter()
        .map(|lesson| {
            LessonSummary::new(
                lesson,
                profile.has_completed(&lesson.id),
                downloads.contains(&lesson.id),
            )
        })
        .collect();
    Ok(Json(LibraryResponse { lessons }))
}

/// One lesson in full, including its content body and quiz.
#[utoipa::path(
    get,
    path = "/lessons/{id}",
    params(("id" = String, Path, description = "The lesson id")),
    responses(
        (status = 200, description = "The lesson", body = LessonDetailResponse),
        (status = 404, description = "Unknown lesson id")
    )
)]
pub async fn lesson_detail_handler(
    State(state): State<Arc<AppState>>,
    Path(lesson_id): Path<String>,
) -> Result<Json<LessonDetailResponse>, HandlerError> {
    let profile = require_profile(&state).await?;
    let lesson = state.catalog.get(&lesson_id).ok_or((
        StatusCode::NOT_FOUND,
        format!("No lesson with id '{}'", lesson_id),
    ))?;
    let downloads = state
        .store
        .load_downloads()
        .await
        .map_err(|e| internal("Failed to load downloads", e))?;

    Ok(Json(LessonDetailResponse {
        summary: LessonSummary::new(
            lesson,
            profile.has_completed(&lesson.id),
            downloads.contains(&lesson.id),
        ),
        content: lesson.content.clone(),
        quiz: lesson
            .quiz
            .as_ref()
            .map(|quiz| quiz.iter().map(QuizQuestionDto::from).collect()),
    }))
}

/// Marks a lesson complete and awards its points.
///
/// Idempotent under retries: re-submitting a finished quiz changes nothing
/// and never inflates points. Ids missing from the catalog are tolerated
/// silently so local state stays consistent across catalog releases.
#[utoipa::path(
    post,
    path = "/lessons/{id}/complete",
    params(("id" = String, Path, description = "The lesson id")),
    request_body = CompleteLessonRequest,
    responses(
        (status = 200, description = "Completion applied", body = CompleteLessonResponse),
        (status = 404, description = "No profile; onboarding required")
    )
)]
pub async fn complete_lesson_handler(
    State(state): State<Arc<AppState>>,
    Path(lesson_id): Path<String>,
    payload: Option<Json<CompleteLessonRequest>>,
) -> Result<Json<CompleteLessonResponse>, HandlerError> {
    let profile = require_profile(&state).await?;
    let Json(payload) = payload.unwrap_or_default();

    let (quiz_score, quiz_total) = match state.catalog.get(&lesson_id).and_then(|l| l.quiz.as_ref())
    {
        Some(quiz) => {
            let answers = payload.answers.unwrap_or_default();
            (
                Some(score_quiz(quiz, &answers)),
                Some(quiz.len() as u32),
            )
        }
        None => (None, None),
    };

    let updated = apply_completion(&profile, &lesson_id);
    let newly_completed = updated.points > profile.points;
    if newly_completed {
        state
            .store
            .save_profile(&updated)
            .await
            .map_err(|e| internal("Failed to save profile", e))?;
        info!(
            "Lesson '{}' completed; points {} -> {}",
            lesson_id, profile.points, updated.points
        );
    }

    Ok(Json(CompleteLessonResponse {
        points: updated.points,
        newly_completed,
        quiz_score,
        quiz_total,
    }))
}

//=========================================================================================
// Dashboard
//=========================================================================================

/// Progress, gamification state, and the "study next" recommendations.
#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = 200, description = "Dashboard state", body = DashboardResponse),
        (status = 404, description = "No profile; onboarding required")
    )
)]
pub async fn dashboard_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardResponse>, HandlerError> {
    let profile = require_profile(&state).await?;
    let downloads = state
        .store
        .load_downloads()
        .await
        .map_err(|e| internal("Failed to load downloads", e))?;

    let recommended: Vec<LessonSummary> = recommend_next(&state.catalog, &profile)
        .into_iter()
        .map(|lesson| LessonSummary::new(lesson, false, downloads.contains(&lesson.id)))
        .collect();
    let all_caught_up = recommended.is_empty();

    Ok(Json(DashboardResponse {
        points: profile.points,
        streak: profile.streak,
        completed_count: profile.completed_lessons.len(),
        badges: BadgeState::for_profile(&profile),
        recommended,
        all_caught_up,
    }))
}

/// The AI progress analysis, served from the warm-start cache when
/// available. `refresh=true` always re-issues the live call and
/// overwrites the cache.
#[utoipa::path(
    get,
    path = "/dashboard/analysis",
    params(AnalysisQuery),
    responses(
        (status = 200, description = "Analysis text, or absent when the call failed", body = AnalysisResponse),
        (status = 404, description = "No profile; onboarding required"),
        (status = 409, description = "An analysis is already running")
    )
)]
pub async fn analysis_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AnalysisQuery>,
) -> Result<Json<AnalysisResponse>, HandlerError> {
    let profile = require_profile(&state).await?;
    let refresh = query.refresh.unwrap_or(false);

    if !refresh {
        match state.store.load_analysis(&profile.name).await {
            Ok(Some(cached)) => {
                return Ok(Json(AnalysisResponse {
                    text: Some(cached),
                    cached: true,
                }))
            }
            Ok(None) => {}
            Err(e) => return Err(internal("Failed to read analysis cache", e)),
        }
    }

    // Per-subsystem in-flight gate; independent of the chat gate. The
    // guard also releases when a disconnect drops this future mid-await.
    let _in_flight = state.analysis_in_flight.try_acquire().ok_or((
        StatusCode::CONFLICT,
        "A progress analysis is already running".to_string(),
    ))?;

    let completed: Vec<_> = state
        .catalog
        .lessons()
        .iter()
        .filter(|lesson| profile.has_completed(&lesson.id))
        .collect();
    let result = state.analysis.analyze(&profile, &completed).await;

    if let Some(text) = &result {
        if let Err(e) = state.store.save_analysis(&profile.name, text).await {
            // Cache write failure is not user-visible; next load re-issues
            // the call.
            error!("Failed to cache analysis: {:?}", e);
        }
    }

    Ok(Json(AnalysisResponse {
        text: result,
        cached: false,
    }))
}

//=========================================================================================
// Offline Downloads
//=========================================================================================

/// The lessons marked for offline availability, in catalog order.
#[utoipa::path(
    get,
    path = "/downloads",
    responses(
        (status = 200, description = "Downloaded lessons", body = DownloadsResponse),
        (status = 404, description = "No profile; onboarding required")
    )
)]
pub async fn downloads_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DownloadsResponse>, HandlerError> {
    let profile = require_profile(&state).await?;
    let downloads = state
        .store
        .load_downloads()
        .await
        .map_err(|e| internal("Failed to load downloads", e))?;

    let lessons = state
        .catalog
        .lessons()
        .iter()
        .filter(|lesson| downloads.contains(&lesson.id))
        .map(|lesson| LessonSummary::new(lesson, profile.has_completed(&lesson.id), true))
        .collect();
    Ok(Json(DownloadsResponse { lessons }))
}

/// Flips a lesson's offline availability: present removes, absent adds.
#[utoipa::path(
    post,
    path = "/downloads/{id}/toggle",
    params(("id" = String, Path, description = "The lesson id")),
    responses((status = 200, description = "New download state", body = ToggleDownloadResponse))
)]
pub async fn toggle_download_handler(
    State(state): State<Arc<AppState>>,
    Path(lesson_id): Path<String>,
) -> Result<Json<ToggleDownloadResponse>, HandlerError> {
    let mut downloads = state
        .store
        .load_downloads()
        .await
        .map_err(|e| internal("Failed to load downloads", e))?;
    let downloaded = downloads.toggle(&lesson_id);
    state
        .store
        .save_downloads(&downloads)
        .await
        .map_err(|e| internal("Failed to save downloads", e))?;

    Ok(Json(ToggleDownloadResponse {
        downloaded,
        downloads: downloads.ids().map(str::to_string).collect(),
    }))
}

//=========================================================================================
// Chat
//=========================================================================================

/// The current session transcript and its request state.
#[utoipa::path(
    get,
    path = "/chat",
    responses((status = 200, description = "The transcript", body = ChatResponse))
)]
pub async fn chat_handler(State(state): State<Arc<AppState>>) -> Json<ChatResponse> {
    let chat = state.chat.lock().await;
    Json(chat_response(&chat))
}

/// Runs one tutoring turn and returns the updated transcript.
///
/// Empty input and a turn already in flight are both rejected without
/// touching the transcript; a failed tutor call still completes the turn
/// with the fallback reply and the transient error banner.
#[utoipa::path(
    post,
    path = "/chat/send",
    request_body = SendChatRequest,
    responses(
        (status = 200, description = "Updated transcript", body = ChatResponse),
        (status = 404, description = "No profile; onboarding required"),
        (status = 409, description = "A tutor request is already in flight"),
        (status = 422, description = "Empty question text")
    )
)]
pub async fn chat_send_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SendChatRequest>,
) -> Result<Json<ChatResponse>, HandlerError> {
    let profile = require_profile(&state).await?;

    match run_chat_turn(&state, &profile, &payload.text).await {
        Ok(()) => {}
        Err(SendRejection::EmptyInput) => {
            return Err((
                StatusCode::UNPROCESSABLE_ENTITY,
                "question text is empty".to_string(),
            ))
        }
        Err(SendRejection::RequestInFlight) => {
            return Err((
                StatusCode::CONFLICT,
                "a tutor request is already in flight".to_string(),
            ))
        }
    }

    let chat = state.chat.lock().await;
    Ok(Json(chat_response(&chat)))
}

/// Sets or clears the focus topic carried from a lesson-detail screen.
#[utoipa::path(
    post,
    path = "/chat/focus",
    request_body = ChatFocusRequest,
    responses((status = 204, description = "Focus topic updated"))
)]
pub async fn chat_focus_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChatFocusRequest>,
) -> StatusCode {
    let mut chat = state.chat.lock().await;
    chat.set_focus_topic(payload.topic);
    StatusCode::NO_CONTENT
}

/// Discards the transcript. Destructive; requires confirmation.
#[utoipa::path(
    post,
    path = "/chat/clear",
    request_body = ConfirmRequest,
    responses(
        (status = 204, description = "Transcript cleared"),
        (status = 400, description = "Confirmation missing")
    )
)]
pub async fn chat_clear_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ConfirmRequest>,
) -> Result<StatusCode, HandlerError> {
    require_confirmation(&payload)?;
    let mut chat = state.chat.lock().await;
    chat.clear();
    Ok(StatusCode::NO_CONTENT)
}

//=========================================================================================
// Read-aloud
//=========================================================================================

/// Synthesizes speech for the read-aloud feature.
///
/// Failed synthesis reads as absence (204); the client simply stays
/// silent. Stopping playback is a client concern and does not cancel an
/// already-issued call.
#[utoipa::path(
    post,
    path = "/speech",
    request_body = SpeechRequest,
    responses(
        (status = 200, description = "Audio bytes", content_type = "audio/mpeg"),
        (status = 204, description = "Synthesis unavailable")
    )
)]
pub async fn speech_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SpeechRequest>,
) -> impl IntoResponse {
    let voice = payload
        .voice
        .unwrap_or_else(|| state.config.tts_voice.clone());
    match state.tts.synthesize(&payload.text, &voice).await {
        Some(audio) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "audio/mpeg")],
            Bytes::from(audio),
        )
            .into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

//=========================================================================================
// Logout
//=========================================================================================

/// Clears all durable state and forces a return to onboarding.
/// Destructive; requires confirmation.
#[utoipa::path(
    post,
    path = "/logout",
    request_body = ConfirmRequest,
    responses(
        (status = 204, description = "Durable state cleared"),
        (status = 400, description = "Confirmation missing")
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ConfirmRequest>,
) -> Result<StatusCode, HandlerError> {
    require_confirmation(&payload)?;
    state
        .store
        .clear()
        .await
        .map_err(|e: PortError| internal("Failed to clear durable state", e))?;
    // The chat transcript is session-scoped but a logout ends the session.
    state.chat.lock().await.clear();
    info!("Learner logged out; durable state cleared.");
    Ok(StatusCode::NO_CONTENT)
}
