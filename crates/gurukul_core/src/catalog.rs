//! crates/gurukul_core/src/catalog.rs
//!
//! The static, read-only lesson catalog plus the option lists
//! (badges, languages, regions, grade labels) the onboarding and
//! dashboard surfaces render from.

use crate::domain::{Board, BoardScope, LessonRecord, QuizQuestion, Subject};

//=========================================================================================
// Catalog Validation Errors
//=========================================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Duplicate lesson id '{0}' in catalog")]
    DuplicateId(String),
    #[error("Lesson '{0}' has a quiz with no questions")]
    EmptyQuiz(String),
    #[error("Lesson '{lesson}' question {question} has a correct-answer index outside its options")]
    AnswerOutOfRange { lesson: String, question: usize },
}

//=========================================================================================
// The Lesson Catalog
//=========================================================================================

/// An ordered, validated collection of lesson records. Iteration order is
/// insertion order; the filtering engine relies on that.
#[derive(Debug, Clone)]
pub struct LessonCatalog {
    records: Vec<LessonRecord>,
}

impl LessonCatalog {
    /// Builds a catalog, rejecting records that break the catalog
    /// invariants: ids must be unique, and a quiz (when present) must be
    /// non-empty with every correct-answer index in range.
    pub fn new(records: Vec<LessonRecord>) -> Result<Self, CatalogError> {
        for (i, lesson) in records.iter().enumerate() {
            if records[..i].iter().any(|other| other.id == lesson.id) {
                return Err(CatalogError::DuplicateId(lesson.id.clone()));
            }
            if let Some(quiz) = &lesson.quiz {
                if quiz.is_empty() {
                    return Err(CatalogError::EmptyQuiz(lesson.id.clone()));
                }
                for (q_index, question) in quiz.iter().enumerate() {
                    if question.correct_answer >= question.options.len() {
                        return Err(CatalogError::AnswerOutOfRange {
                            lesson: lesson.id.clone(),
                            question: q_index,
                        });
                    }
                }
            }
        }
        Ok(Self { records })
    }

    /// The built-in catalog shipped with the app.
    pub fn builtin() -> Self {
        // Validated by the `builtin_catalog_is_valid` test; constructed
        // directly so callers don't handle an impossible error.
        Self {
            records: builtin_records(),
        }
    }

    pub fn get(&self, lesson_id: &str) -> Option<&LessonRecord> {
        self.records.iter().find(|lesson| lesson.id == lesson_id)
    }

    pub fn lessons(&self) -> &[LessonRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

//=========================================================================================
// Option Lists for the Onboarding / Dashboard Surfaces
//=========================================================================================

/// A badge the dashboard can render as locked or unlocked. Which badges a
/// learner holds lives in `LearnerProfile::badges`; nothing in this core
/// grants them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeSpec {
    pub id: &'static str,
    pub name: &'static str,
}

pub const BADGES: [BadgeSpec; 4] = [
    BadgeSpec { id: "aryabhata", name: "Aryabhata Award" },
    BadgeSpec { id: "chanakya", name: "Chanakya Brain" },
    BadgeSpec { id: "bose", name: "Science Pioneer" },
    BadgeSpec { id: "gandhi", name: "Peace Learner" },
];

/// A language the learner can pick during onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
}

pub const LANGUAGES: [Language; 6] = [
    Language { code: "hi", name: "Hindi" },
    Language { code: "mr", name: "Marathi" },
    Language { code: "bn", name: "Bengali" },
    Language { code: "ta", name: "Tamil" },
    Language { code: "te", name: "Telugu" },
    Language { code: "en", name: "English" },
];

pub const REGIONS: [&str; 9] = [
    "Maharashtra",
    "Uttar Pradesh",
    "Bihar",
    "West Bengal",
    "Rajasthan",
    "Madhya Pradesh",
    "Tamil Nadu",
    "Karnataka",
    "Gujarat",
];

pub const GRADES: [&str; 12] = [
    "Class 1", "Class 2", "Class 3", "Class 4", "Class 5", "Class 6", "Class 7", "Class 8",
    "Class 9", "Class 10", "Class 11", "Class 12",
];

//=========================================================================================
// The Built-in Lessons
//=========================================================================================

fn lesson(
    id: &str,
    title: &str,
    description: &str,
    subject: Subject,
    level: &str,
    duration: &str,
    board: BoardScope,
    content: &str,
    video_seed: &str,
) -> LessonRecord {
    LessonRecord {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        subject,
        level: level.to_string(),
        duration: duration.to_string(),
        content: content.to_string(),
        board,
        video_url: Some(format!("https://picsum.photos/seed/{}/800/450", video_seed)),
        quiz: None,
    }
}

fn builtin_records() -> Vec<LessonRecord> {
    let mut linear_equations = lesson(
        "n1",
        "Linear Equations in One Variable",
        "Master the basics of solving equations where the highest power of the variable is 1.",
        Subject::Maths,
        "Class 8",
        "20 min",
        BoardScope::Only(Board::NcertCbse),
        "A linear equation in one variable is an equation which can be written in the form \
         ax + b = 0, where a and b are real numbers. For example, 2x + 5 = 15. To solve, we \
         subtract 5 from both sides (2x = 10) and then divide by 2 (x = 5).",
        "mathn1",
    );
    linear_equations.quiz = Some(vec![QuizQuestion {
        question: "Solve for x: 3x - 9 = 0".to_string(),
        options: vec![
            "x=2".to_string(),
            "x=3".to_string(),
            "x=1".to_string(),
            "x=0".to_string(),
        ],
        correct_answer: 1,
    }]);

    vec![
        linear_equations,
        lesson(
            "n2",
            "Periodic Classification of Elements",
            "Learn how Mendeleev and Modern Periodic Table organize the 118 known elements.",
            Subject::Science,
            "Class 10",
            "25 min",
            BoardScope::Only(Board::NcertCbse),
            "The Modern Periodic Table is based on the Atomic Number of elements. Elements are \
             arranged in 18 vertical columns called Groups and 7 horizontal rows called Periods. \
             Elements in the same group have the same number of valence electrons.",
            "scin2",
        ),
        lesson(
            "m1",
            "Management of Shivaji Maharaj",
            "The administrative and military brilliance of the founder of the Maratha Empire.",
            Subject::SocialScience,
            "Class 7",
            "18 min",
            BoardScope::Only(Board::Maharashtra),
            "Chhatrapati Shivaji Maharaj was known for his \"Ashta Pradhan\" (Council of Eight \
             Ministers). He pioneered \"Ganimi Kava\" or Guerrilla Warfare. His water management \
             in forts like Raigad and Pratapgad is still studied today for its efficiency.",
            "mah1",
        ),
        lesson(
            "m2",
            "The Sahyadri Range: Our Pride",
            "Physical geography of the Western Ghats in Maharashtra.",
            Subject::SocialScience,
            "Class 9",
            "15 min",
            BoardScope::Only(Board::Maharashtra),
            "The Western Ghats, known as Sahyadri in Maharashtra, run parallel to the coast. \
             Kalsubai is the highest peak. These mountains are responsible for the heavy rainfall \
             in the Konkan region and act as a water source for major rivers like Godavari and \
             Krishna.",
            "mah2",
        ),
        lesson(
            "b1",
            "Magadha: The Seat of Empires",
            "Explore the rise of the Mauryan and Gupta empires in Ancient Bihar.",
            Subject::SocialScience,
            "Class 6",
            "22 min",
            BoardScope::Only(Board::Bihar),
            "Bihar was once the center of power and learning in the world. Pataliputra (modern \
             Patna) was the capital of the Mauryan Empire under Ashoka the Great. Nalanda \
             University was the first residential university in the world, attracting students \
             from across Asia.",
            "bih1",
        ),
        lesson(
            "b2",
            "Agriculture and Water in the Ganga Plains",
            "Understanding the Kharif and Rabi cycles in the fertile plains of Bihar.",
            Subject::Science,
            "Class 8",
            "15 min",
            BoardScope::Only(Board::Bihar),
            "Bihar has rich alluvial soil. Farmers grow Paddy (Rice) during the monsoon (Kharif) \
             and Wheat/Maize during winter (Rabi). The Gandak and Kosi rivers provide irrigation, \
             though management of floods remains a key challenge for local farmers.",
            "bih2",
        ),
        lesson(
            "u1",
            "The Great Plains of North India",
            "Formation and significance of the Indo-Gangetic plains.",
            Subject::Evs,
            "Class 5",
            "12 min",
            BoardScope::Only(Board::UttarPradesh),
            "Uttar Pradesh lies entirely in the Ganga-Yamuna Doab. This region is formed by the \
             silt brought down by Himalayan rivers. It is one of the most densely populated and \
             agriculturally productive regions in the world.",
            "up1",
        ),
        lesson(
            "u2",
            "Industrial Belts: Noida to Kanpur",
            "Economic geography and the role of leather and tech industries in UP.",
            Subject::SocialScience,
            "Class 10",
            "20 min",
            BoardScope::Only(Board::UttarPradesh),
            "Kanpur is traditionally known as the \"Manchester of the East\" for its textile and \
             leather industries. In contrast, Noida and Greater Noida have emerged as major \
             electronics and IT hubs, contributing significantly to the state's GDP.",
            "up2",
        ),
        lesson(
            "t1",
            "The Chola Navy: Masters of the Seas",
            "How the Cholas established maritime trade across South East Asia.",
            Subject::SocialScience,
            "Class 9",
            "25 min",
            BoardScope::Only(Board::TamilNadu),
            "The Chola Empire under Rajaraja I and Rajendra I possessed the most powerful navy of \
             its time. They used teak wood for ships and advanced mapping to navigate the Bay of \
             Bengal, which was often called the \"Chola Lake\". They traded spices and textiles \
             with China and Srivijaya.",
            "tn1",
        ),
        lesson(
            "t2",
            "Ethics in Thirukkural",
            "A study of the world-famous Tamil moral code.",
            Subject::English,
            "Class 8",
            "18 min",
            BoardScope::Only(Board::TamilNadu),
            "Thirukkural, written by Thiruvalluvar, consists of 1330 couplets (kurals). It is \
             divided into three sections: Aram (Virtue), Porul (Wealth), and Inbam (Love). It \
             remains a universal guide for ethical living regardless of religion or time.",
            "tn2",
        ),
        lesson(
            "g1",
            "Vedic Maths: Multiplication Hacks",
            "Solving large calculations in seconds using ancient Indian sutras.",
            Subject::Maths,
            "Class 6",
            "12 min",
            BoardScope::All,
            "Using the \"Ekadhikena Purvena\" sutra, we can square numbers ending in 5 instantly. \
             For 35^2: (3 x 4) = 12, then append 25. Answer is 1225! These tricks reduce exam \
             pressure and build confidence.",
            "gen1",
        ),
        lesson(
            "g2",
            "Intro to Scratch: Making a Game",
            "Build your first simple game with block coding.",
            Subject::Coding,
            "Class 7",
            "30 min",
            BoardScope::All,
            "Scratch uses blocks like \"When Flag Clicked\" and \"Move 10 steps\". By combining \
             these, you can create animations or games. Coding is about logic - once you \
             understand the \"if-then\" rule, you can build anything!",
            "gen2",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_is_valid() {
        let catalog = LessonCatalog::new(builtin_records()).unwrap();
        assert_eq!(catalog.len(), 12);
        assert!(catalog.get("n1").is_some());
        assert!(catalog.get("zz").is_none());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut records = builtin_records();
        let dup = records[0].clone();
        records.push(dup);
        assert_eq!(
            LessonCatalog::new(records).unwrap_err(),
            CatalogError::DuplicateId("n1".to_string())
        );
    }

    #[test]
    fn empty_quiz_is_rejected() {
        let mut records = builtin_records();
        records[1].quiz = Some(vec![]);
        assert_eq!(
            LessonCatalog::new(records).unwrap_err(),
            CatalogError::EmptyQuiz("n2".to_string())
        );
    }

    #[test]
    fn out_of_range_answer_is_rejected() {
        let mut records = builtin_records();
        if let Some(quiz) = records[0].quiz.as_mut() {
            quiz[0].correct_answer = 99;
        }
        assert_eq!(
            LessonCatalog::new(records).unwrap_err(),
            CatalogError::AnswerOutOfRange {
                lesson: "n1".to_string(),
                question: 0,
            }
        );
    }
}
