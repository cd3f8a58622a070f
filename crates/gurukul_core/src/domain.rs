//! crates/gurukul_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or HTTP framework;
//! the serde derives exist because the learner profile and download
//! set are persisted as JSON by the profile store.

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

//=========================================================================================
// Subjects and Curriculum Boards
//=========================================================================================

/// The closed set of subjects a lesson can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Subject {
    Maths,
    Science,
    #[serde(rename = "EVS")]
    Evs,
    #[serde(rename = "Social Science")]
    SocialScience,
    English,
    Coding,
}

impl Subject {
    pub const ALL: [Subject; 6] = [
        Subject::Maths,
        Subject::Science,
        Subject::Evs,
        Subject::SocialScience,
        Subject::English,
        Subject::Coding,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Subject::Maths => "Maths",
            Subject::Science => "Science",
            Subject::Evs => "EVS",
            Subject::SocialScience => "Social Science",
            Subject::English => "English",
            Subject::Coding => "Coding",
        }
    }

    /// Parses a display label back into a `Subject`. Unknown labels are rejected.
    pub fn from_label(label: &str) -> Option<Subject> {
        Subject::ALL.iter().copied().find(|s| s.as_str() == label)
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A curriculum/syllabus authority that scopes lesson relevance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Board {
    #[serde(rename = "NCERT/CBSE")]
    NcertCbse,
    #[serde(rename = "Maharashtra State Board")]
    Maharashtra,
    #[serde(rename = "Bihar Board")]
    Bihar,
    #[serde(rename = "UP Board")]
    UttarPradesh,
    #[serde(rename = "Tamil Nadu Board")]
    TamilNadu,
}

impl Board {
    pub const ALL: [Board; 5] = [
        Board::NcertCbse,
        Board::Maharashtra,
        Board::Bihar,
        Board::UttarPradesh,
        Board::TamilNadu,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Board::NcertCbse => "NCERT/CBSE",
            Board::Maharashtra => "Maharashtra State Board",
            Board::Bihar => "Bihar Board",
            Board::UttarPradesh => "UP Board",
            Board::TamilNadu => "Tamil Nadu Board",
        }
    }

    /// Parses a display label back into a `Board`. Unknown labels are rejected.
    pub fn from_label(label: &str) -> Option<Board> {
        Board::ALL.iter().copied().find(|b| b.as_str() == label)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The board a lesson is scoped to: either one specific board, or the
/// `"All"` sentinel meaning the lesson applies to every board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoardScope {
    #[default]
    All,
    Only(Board),
}

impl BoardScope {
    /// Whether a learner on the given board should see this lesson.
    pub fn allows(&self, board: Board) -> bool {
        match self {
            BoardScope::All => true,
            BoardScope::Only(b) => *b == board,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BoardScope::All => "All",
            BoardScope::Only(board) => board.as_str(),
        }
    }
}

// `BoardScope` serializes as a plain string ("All" or a board label) so the
// persisted lesson JSON matches the catalog schema. Unknown labels are a
// deserialization error, not a silent fallback.
impl Serialize for BoardScope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BoardScope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        if label == "All" {
            return Ok(BoardScope::All);
        }
        Board::from_label(&label)
            .map(BoardScope::Only)
            .ok_or_else(|| de::Error::custom(format!("unknown board label '{}'", label)))
    }
}

//=========================================================================================
// Lessons and Quizzes
//=========================================================================================

/// A single multiple-choice question inside a lesson quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    /// Index into `options` of the correct choice.
    pub correct_answer: usize,
}

/// An immutable, catalog-owned lesson record.
///
/// `content`, `description`, `duration` and `video_url` are descriptive
/// display fields, opaque to the core logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub subject: Subject,
    /// Grade label, e.g. "Class 6".
    pub level: String,
    pub duration: String,
    pub content: String,
    #[serde(default)]
    pub board: BoardScope,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    /// When present, lesson completion goes through the quiz first.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz: Option<Vec<QuizQuestion>>,
}

//=========================================================================================
// The Learner Profile
//=========================================================================================

/// The single learner's durable profile: identity plus progress and
/// gamification state. One instance per user, owned by the profile store.
///
/// Serialized with the field names the browser app persisted, so an
/// existing `profile` slot remains readable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerProfile {
    pub name: String,
    /// Grade label, e.g. "Class 8".
    pub grade: String,
    /// Preferred language code, e.g. "hi".
    pub preferred_language: String,
    pub board: Board,
    pub region: String,
    /// Lesson ids the learner has completed. Membership is the only
    /// semantic; an id appears at most once.
    #[serde(default)]
    pub completed_lessons: Vec<String>,
    #[serde(default)]
    pub points: u32,
    /// Badge ids rendered as unlocked. Display-only in this core: no
    /// transition currently grants badges.
    #[serde(default)]
    pub badges: BTreeSet<String>,
    /// Consecutive-day engagement counter, display-only in this core.
    #[serde(default)]
    pub streak: u32,
}

impl LearnerProfile {
    pub fn has_completed(&self, lesson_id: &str) -> bool {
        self.completed_lessons.iter().any(|id| id == lesson_id)
    }
}

//=========================================================================================
// The Download Set
//=========================================================================================

/// The set of lesson ids marked for offline availability. Independent
/// lifecycle from the profile; persisted separately.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DownloadSet(BTreeSet<String>);

impl DownloadSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Symmetric add/remove. Returns `true` when the id is present
    /// after the toggle. Toggling twice restores the original set.
    pub fn toggle(&mut self, lesson_id: &str) -> bool {
        if self.0.remove(lesson_id) {
            false
        } else {
            self.0.insert(lesson_id.to_string());
            true
        }
    }

    pub fn contains(&self, lesson_id: &str) -> bool {
        self.0.contains(lesson_id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

//=========================================================================================
// Chat Messages
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One entry in the session-scoped chat transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: ChatRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: ChatRole, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// A role+text pair handed to the tutor service: a transcript entry with
/// its timestamp stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

impl From<&ChatMessage> for ChatTurn {
    fn from(message: &ChatMessage) -> Self {
        Self {
            role: message.role,
            text: message.text.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_labels_round_trip() {
        for subject in Subject::ALL {
            assert_eq!(Subject::from_label(subject.as_str()), Some(subject));
        }
        assert_eq!(Subject::from_label("Astrology"), None);
    }

    #[test]
    fn board_scope_serializes_as_plain_label() {
        let all = serde_json::to_string(&BoardScope::All).unwrap();
        assert_eq!(all, "\"All\"");
        let bihar = serde_json::to_string(&BoardScope::Only(Board::Bihar)).unwrap();
        assert_eq!(bihar, "\"Bihar Board\"");
    }

    #[test]
    fn board_scope_rejects_unknown_labels() {
        let parsed: Result<BoardScope, _> = serde_json::from_str("\"Hogwarts Board\"");
        assert!(parsed.is_err());
        let parsed: BoardScope = serde_json::from_str("\"All\"").unwrap();
        assert_eq!(parsed, BoardScope::All);
    }

    #[test]
    fn profile_json_uses_browser_field_names() {
        let profile = LearnerProfile {
            name: "Asha".to_string(),
            grade: "Class 8".to_string(),
            preferred_language: "hi".to_string(),
            board: Board::NcertCbse,
            region: "Maharashtra".to_string(),
            completed_lessons: vec!["n1".to_string()],
            points: 100,
            badges: BTreeSet::new(),
            streak: 3,
        };
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["preferredLanguage"], "hi");
        assert_eq!(json["completedLessons"][0], "n1");
        assert_eq!(json["board"], "NCERT/CBSE");
    }

    #[test]
    fn download_toggle_is_self_inverse() {
        let mut set = DownloadSet::new();
        set.toggle("m1");
        let before = set.clone();
        assert!(set.toggle("b2"));
        assert!(!set.toggle("b2"));
        assert_eq!(set, before);
    }
}
