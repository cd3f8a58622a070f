//! services/api/src/adapters/analysis_llm.rs
//!
//! This module contains the adapter for the progress-analysis LLM.
//! It implements the `ProgressAnalysisService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use gurukul_core::domain::{LearnerProfile, LessonRecord};
use gurukul_core::ports::ProgressAnalysisService;
use tracing::warn;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ProgressAnalysisService` using an
/// OpenAI-compatible LLM. Per the port contract it never errors: every
/// failure is logged and surfaced as absence.
#[derive(Clone)]
pub struct OpenAiAnalysisAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiAnalysisAdapter {
    /// Creates a new `OpenAiAnalysisAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }

    fn build_instructions(profile: &LearnerProfile, completed: &[&LessonRecord]) -> String {
        let recent_topics: Vec<&str> = completed.iter().map(|l| l.title.as_str()).collect();
        // The prompt body contains `"#` sequences, so the raw string needs
        // wider delimiters.
        format!(
            r####"You are "Tutorbot Guru Analysis Module". Analyze the student's progress and provide 3 highly personalized improvement tips.

Student Data:
- Name: {name}
- XP: {points}
- Streak: {streak} days
- Completed Lessons: {completed_count}
- Recent Topics: {topics}
- Language: {language}

Requirements:
1. Respond in {language}.
2. Use "### Aapki Shakti (Strength)" for what they are doing well.
3. Use "### Sudhar ke Kshetra (Improvement Area)" for what needs work.
4. Use "### Guru ka Challenge (Guru's Challenge)" for a specific next step.
5. Keep it motivational and concise."####,
            name = profile.name,
            points = profile.points,
            streak = profile.streak,
            completed_count = profile.completed_lessons.len(),
            topics = recent_topics.join(", "),
            language = profile.preferred_language,
        )
    }
}

//=========================================================================================
// `ProgressAnalysisService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ProgressAnalysisService for OpenAiAnalysisAdapter {
    async fn analyze(
        &self,
        profile: &LearnerProfile,
        completed: &[&LessonRecord],
    ) -> Option<String> {
        let system = ChatCompletionRequestSystemMessageArgs::default()
            .content(Self::build_instructions(profile, completed))
            .build()
            .ok()?;
        let user = ChatCompletionRequestUserMessageArgs::default()
            .content("Analyze my progress and give me advice.")
            .build()
            .ok()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![system.into(), user.into()])
            .temperature(0.8)
            .build()
            .ok()?;

        let response = match self.client.chat().create(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Progress analysis call failed: {}", e);
                return None;
            }
        };

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .filter(|text| !text.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gurukul_core::domain::Board;
    use std::collections::BTreeSet;

    #[test]
    fn instructions_carry_student_data_and_quoted_section_headings() {
        let profile = LearnerProfile {
            name: "Asha".to_string(),
            grade: "Class 8".to_string(),
            preferred_language: "hi".to_string(),
            board: Board::NcertCbse,
            region: "Maharashtra".to_string(),
            completed_lessons: vec!["n1".to_string()],
            points: 100,
            badges: BTreeSet::new(),
            streak: 2,
        };
        let text = OpenAiAnalysisAdapter::build_instructions(&profile, &[]);
        assert!(text.contains("- Name: Asha"));
        assert!(text.contains("- XP: 100"));
        assert!(text.contains("\"### Aapki Shakti (Strength)\""));
        assert!(text.contains("\"### Sudhar ke Kshetra (Improvement Area)\""));
        assert!(text.contains("\"### Guru ka Challenge (Guru's Challenge)\""));
    }
}
