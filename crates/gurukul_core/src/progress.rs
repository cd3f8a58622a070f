//! crates/gurukul_core/src/progress.rs
//!
//! The gamification transitions. There is no separate state machine
//! object: each operation is a pure function from a profile snapshot to a
//! new profile snapshot, and the caller persists the result.

use crate::domain::{Board, LearnerProfile, QuizQuestion};
use std::collections::BTreeSet;

/// Points granted when a profile is first created.
pub const WELCOME_POINTS: u32 = 50;
/// Points granted for completing a lesson for the first time.
pub const COMPLETION_POINTS: u32 = 50;
/// Streak value a fresh profile starts with.
pub const INITIAL_STREAK: u32 = 1;

//=========================================================================================
// Onboarding
//=========================================================================================

/// The explicit user input collected by the onboarding flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnboardingForm {
    pub name: String,
    pub grade: String,
    pub preferred_language: String,
    pub board: Board,
    pub region: String,
}

/// Creates a fresh profile from onboarding input: welcome bonus applied,
/// nothing completed, no badges.
pub fn create_profile(form: OnboardingForm) -> LearnerProfile {
    LearnerProfile {
        name: form.name,
        grade: form.grade,
        preferred_language: form.preferred_language,
        board: form.board,
        region: form.region,
        completed_lessons: Vec::new(),
        points: WELCOME_POINTS,
        badges: BTreeSet::new(),
        streak: INITIAL_STREAK,
    }
}

//=========================================================================================
// Transitions
//=========================================================================================

/// Marks a lesson complete and awards its points.
///
/// Idempotent: completing an already-completed lesson returns an unchanged
/// snapshot, so a re-submitted quiz or a double-fired event can never
/// inflate points. Ids that don't exist in the catalog are tolerated
/// silently; they are inserted like any other and never re-rewarded.
pub fn complete_lesson(profile: &LearnerProfile, lesson_id: &str) -> LearnerProfile {
    if profile.has_completed(lesson_id) {
        return profile.clone();
    }
    let mut next = profile.clone();
    next.completed_lessons.push(lesson_id.to_string());
    next.points += COMPLETION_POINTS;
    next
}

/// Replaces the preferred-language field only. Points, badges and streak
/// are untouched.
pub fn change_language(profile: &LearnerProfile, language_code: &str) -> LearnerProfile {
    let mut next = profile.clone();
    next.preferred_language = language_code.to_string();
    next
}

//=========================================================================================
// Quiz Scoring
//=========================================================================================

/// Counts correct picks. Completion does not depend on the score: finishing
/// the quiz is what "passes through" it, the score is feedback only.
/// Missing answers count as wrong.
pub fn score_quiz(questions: &[QuizQuestion], answers: &[usize]) -> u32 {
    questions
        .iter()
        .zip(answers.iter())
        .filter(|(question, answer)| **answer == question.correct_answer)
        .count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_profile() -> LearnerProfile {
        create_profile(OnboardingForm {
            name: "Ravi".to_string(),
            grade: "Class 8".to_string(),
            preferred_language: "hi".to_string(),
            board: Board::NcertCbse,
            region: "Bihar".to_string(),
        })
    }

    #[test]
    fn onboarding_applies_welcome_bonus() {
        let profile = fresh_profile();
        assert_eq!(profile.points, WELCOME_POINTS);
        assert_eq!(profile.streak, INITIAL_STREAK);
        assert!(profile.completed_lessons.is_empty());
        assert!(profile.badges.is_empty());
    }

    #[test]
    fn completing_a_new_lesson_awards_points_once() {
        let profile = fresh_profile();
        let after = complete_lesson(&profile, "n1");
        assert_eq!(after.points, profile.points + COMPLETION_POINTS);
        assert!(after.has_completed("n1"));
        assert_eq!(after.completed_lessons.len(), 1);
    }

    #[test]
    fn completion_is_idempotent() {
        let profile = fresh_profile();
        let once = complete_lesson(&profile, "n1");
        let twice = complete_lesson(&once, "n1");
        assert_eq!(twice, once);
    }

    #[test]
    fn double_completion_scenario_yields_100_points() {
        // Learner with 50 points completes the same new lesson twice in a row.
        let profile = fresh_profile();
        assert_eq!(profile.points, 50);
        let after = complete_lesson(&complete_lesson(&profile, "g1"), "g1");
        assert_eq!(after.points, 100);
    }

    #[test]
    fn unknown_lesson_id_is_tolerated() {
        let profile = fresh_profile();
        let after = complete_lesson(&profile, "no-such-lesson");
        assert_eq!(after.points, profile.points + COMPLETION_POINTS);
        // Dangling id is never re-rewarded.
        let again = complete_lesson(&after, "no-such-lesson");
        assert_eq!(again, after);
    }

    #[test]
    fn language_change_touches_identity_only() {
        let profile = complete_lesson(&fresh_profile(), "n1");
        let after = change_language(&profile, "ta");
        assert_eq!(after.preferred_language, "ta");
        assert_eq!(after.points, profile.points);
        assert_eq!(after.completed_lessons, profile.completed_lessons);
        assert_eq!(after.streak, profile.streak);
    }

    #[test]
    fn quiz_scoring_counts_correct_picks() {
        let questions = vec![
            QuizQuestion {
                question: "2 + 2?".to_string(),
                options: vec!["3".to_string(), "4".to_string()],
                correct_answer: 1,
            },
            QuizQuestion {
                question: "5 - 3?".to_string(),
                options: vec!["2".to_string(), "8".to_string()],
                correct_answer: 0,
            },
        ];
        assert_eq!(score_quiz(&questions, &[1, 0]), 2);
        assert_eq!(score_quiz(&questions, &[0, 0]), 1);
        // Unanswered questions count as wrong.
        assert_eq!(score_quiz(&questions, &[1]), 1);
        assert_eq!(score_quiz(&questions, &[]), 0);
    }
}
