//! crates/gurukul_core/src/recommend.rs
//!
//! The filtering/recommendation engine: pure functions that select which
//! catalog lessons a learner sees in the library, and which ones the
//! dashboard suggests next. No hidden state; identical inputs always
//! produce identical ordered output.

use crate::catalog::LessonCatalog;
use crate::domain::{LearnerProfile, LessonRecord, Subject};

/// How many lessons the primary recommendation tier returns.
pub const PRIMARY_RECOMMENDATIONS: usize = 3;
/// How many lessons the relaxed fallback tier returns.
pub const FALLBACK_RECOMMENDATIONS: usize = 2;

//=========================================================================================
// Library Filters
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubjectFilter {
    #[default]
    All,
    Only(Subject),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GradeFilter {
    #[default]
    All,
    /// A grade label such as "Class 8".
    Only(String),
}

/// The learner's current library filter selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryFilter {
    pub subject: SubjectFilter,
    pub grade: GradeFilter,
}

//=========================================================================================
// Grade Matching
//=========================================================================================

fn grade_numeral(grade: &str) -> &str {
    grade.strip_prefix("Class ").unwrap_or(grade)
}

/// Whether a lesson's `level` matches a grade label: exact match, or the
/// level textually contains the grade's numeral. The substring rule means
/// "Class 1" also matches "Class 10" through "Class 12"; that quirk is
/// carried over from the shipped behavior.
fn level_matches_grade(level: &str, grade: &str) -> bool {
    level == grade || level.contains(grade_numeral(grade))
}

//=========================================================================================
// Filtering
//=========================================================================================

/// Selects the ordered subsequence of the catalog matching the filter
/// selection and relevant to the learner's board. Catalog insertion order
/// is preserved; no pagination.
pub fn filter_lessons<'a>(
    catalog: &'a LessonCatalog,
    profile: &LearnerProfile,
    filter: &LibraryFilter,
) -> Vec<&'a LessonRecord> {
    catalog
        .lessons()
        .iter()
        .filter(|lesson| match filter.subject {
            SubjectFilter::All => true,
            SubjectFilter::Only(subject) => lesson.subject == subject,
        })
        .filter(|lesson| match &filter.grade {
            GradeFilter::All => true,
            GradeFilter::Only(grade) => level_matches_grade(&lesson.level, grade),
        })
        .filter(|lesson| lesson.board.allows(profile.board))
        .collect()
}

//=========================================================================================
// Recommendations
//=========================================================================================

/// Picks the lessons the learner should study next.
///
/// Primary tier: the first three catalog entries that are not completed,
/// match the learner's grade, and are relevant to their board. If that
/// yields nothing, the fallback tier relaxes to "not completed" only and
/// takes the first two. The result is empty only when the entire catalog
/// is completed, which the caller renders as a celebration state.
pub fn recommend_next<'a>(
    catalog: &'a LessonCatalog,
    profile: &LearnerProfile,
) -> Vec<&'a LessonRecord> {
    let primary: Vec<&LessonRecord> = catalog
        .lessons()
        .iter()
        .filter(|lesson| !profile.has_completed(&lesson.id))
        .filter(|lesson| level_matches_grade(&lesson.level, &profile.grade))
        .filter(|lesson| lesson.board.allows(profile.board))
        .take(PRIMARY_RECOMMENDATIONS)
        .collect();

    if !primary.is_empty() {
        return primary;
    }

    catalog
        .lessons()
        .iter()
        .filter(|lesson| !profile.has_completed(&lesson.id))
        .take(FALLBACK_RECOMMENDATIONS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Board;
    use std::collections::BTreeSet;

    fn profile(grade: &str, board: Board) -> LearnerProfile {
        LearnerProfile {
            name: "Asha".to_string(),
            grade: grade.to_string(),
            preferred_language: "hi".to_string(),
            board,
            region: "Maharashtra".to_string(),
            completed_lessons: vec![],
            points: 50,
            badges: BTreeSet::new(),
            streak: 1,
        }
    }

    fn ids(lessons: &[&LessonRecord]) -> Vec<String> {
        lessons.iter().map(|l| l.id.clone()).collect()
    }

    #[test]
    fn maths_class_8_on_cbse_returns_n1() {
        let catalog = LessonCatalog::builtin();
        let learner = profile("Class 8", Board::NcertCbse);
        let filter = LibraryFilter {
            subject: SubjectFilter::Only(Subject::Maths),
            grade: GradeFilter::Only("Class 8".to_string()),
        };
        assert_eq!(ids(&filter_lessons(&catalog, &learner, &filter)), vec!["n1"]);
    }

    #[test]
    fn filtering_preserves_catalog_order() {
        let catalog = LessonCatalog::builtin();
        let learner = profile("Class 8", Board::NcertCbse);
        let all = filter_lessons(&catalog, &learner, &LibraryFilter::default());
        // All-boards lessons stay visible alongside the learner's own board.
        assert_eq!(ids(&all), vec!["n1", "n2", "g1", "g2"]);
    }

    #[test]
    fn filtering_is_pure() {
        let catalog = LessonCatalog::builtin();
        let learner = profile("Class 9", Board::Maharashtra);
        let filter = LibraryFilter::default();
        let first = ids(&filter_lessons(&catalog, &learner, &filter));
        let second = ids(&filter_lessons(&catalog, &learner, &filter));
        assert_eq!(first, second);
    }

    #[test]
    fn grade_numeral_substring_rule_is_preserved() {
        // "Class 1" matches every level containing "1", as shipped.
        assert!(level_matches_grade("Class 10", "Class 1"));
        assert!(level_matches_grade("Class 8", "Class 8"));
        assert!(!level_matches_grade("Class 9", "Class 8"));
    }

    #[test]
    fn primary_recommendations_respect_grade_and_board() {
        let catalog = LessonCatalog::builtin();
        let learner = profile("Class 8", Board::NcertCbse);
        let recommended = recommend_next(&catalog, &learner);
        assert_eq!(ids(&recommended), vec!["n1"]);
    }

    #[test]
    fn fallback_ignores_grade_and_board() {
        let catalog = LessonCatalog::builtin();
        // Class 3 has no matching lessons on any board.
        let mut learner = profile("Class 3", Board::Bihar);
        learner.completed_lessons = vec!["n1".to_string()];
        let recommended = recommend_next(&catalog, &learner);
        assert_eq!(recommended.len(), FALLBACK_RECOMMENDATIONS);
        assert_eq!(ids(&recommended), vec!["n2", "m1"]);
    }

    #[test]
    fn fallback_is_non_empty_while_lessons_remain() {
        let catalog = LessonCatalog::builtin();
        let mut learner = profile("Class 3", Board::Bihar);
        // Complete everything except one lesson.
        learner.completed_lessons = catalog
            .lessons()
            .iter()
            .map(|l| l.id.clone())
            .filter(|id| id != "t2")
            .collect();
        assert_eq!(ids(&recommend_next(&catalog, &learner)), vec!["t2"]);
    }

    #[test]
    fn fully_completed_catalog_yields_empty_recommendations() {
        let catalog = LessonCatalog::builtin();
        let mut learner = profile("Class 8", Board::NcertCbse);
        learner.completed_lessons = catalog.lessons().iter().map(|l| l.id.clone()).collect();
        assert!(recommend_next(&catalog, &learner).is_empty());
    }
}
