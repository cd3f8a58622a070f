//! services/api/src/adapters/tutor_llm.rs
//!
//! This module contains the adapter for the conversational tutoring LLM.
//! It implements the `TutorService` port from the `core` crate.

const SYSTEM_INSTRUCTIONS: &str = r#"You are "Tutorbot Guru", a wise, patient, and encouraging teacher for a rural Indian student named {name}.

Context:
- Language: {language} (ALWAYS respond in this language if it's an Indian regional language).
- Grade: {grade}
- Board: {board}
- Environment: Rural/Semi-urban India.

Response Style:
- Use simple, local analogies (e.g., farming, local festivals, cricket, village markets).
- Follow the NCERT/State Board curriculum guidelines.
- Structure with Markdown:
  ### Pathshala (Concept)
  ### Udaharan (Example)
  ### Saar (Key Takeaway)
- Encourage the student with "Shabash!" or "Bahut Achhe!" in their language.
- Use bold text for key terms in both English and {language}."#;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use gurukul_core::domain::{ChatRole, ChatTurn, LearnerProfile};
use gurukul_core::ports::{PortError, PortResult, TutorService};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `TutorService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiTutorAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiTutorAdapter {
    /// Creates a new `OpenAiTutorAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }

    fn build_instructions(profile: &LearnerProfile, focus_topic: Option<&str>) -> String {
        let mut instructions = SYSTEM_INSTRUCTIONS
            .replace("{name}", &profile.name)
            .replace("{language}", &profile.preferred_language)
            .replace("{grade}", &profile.grade)
            .replace("{board}", profile.board.as_str());
        if let Some(topic) = focus_topic {
            instructions.push_str(&format!(
                "\n\nThe student just opened the lesson \"{}\"; bias your answers towards that topic.",
                topic
            ));
        }
        instructions
    }
}

//=========================================================================================
// `TutorService` Trait Implementation
//=========================================================================================

#[async_trait]
impl TutorService for OpenAiTutorAdapter {
    /// Runs one tutoring turn: the full prior transcript plus the new
    /// question, with the learner's profile folded into the system
    /// instructions.
    async fn ask(
        &self,
        question: &str,
        history: &[ChatTurn],
        profile: &LearnerProfile,
        focus_topic: Option<&str>,
    ) -> PortResult<String> {
        let mut messages: Vec<ChatCompletionRequestMessage> = Vec::with_capacity(history.len() + 2);
        messages.push(
            ChatCompletionRequestSystemMessageArgs::default()
                .content(Self::build_instructions(profile, focus_topic))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        );
        for turn in history {
            let message = match turn.role {
                ChatRole::User => ChatCompletionRequestUserMessageArgs::default()
                    .content(turn.text.clone())
                    .build()
                    .map_err(|e| PortError::Unexpected(e.to_string()))?
                    .into(),
                ChatRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                    .content(turn.text.clone())
                    .build()
                    .map_err(|e| PortError::Unexpected(e.to_string()))?
                    .into(),
            };
            messages.push(message);
        }
        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(question.to_string())
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        );

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(0.6)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        // An empty reply is a successful call; the transcript manager owns
        // the fallback text for that case.
        let answer = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .unwrap_or_default();
        Ok(answer)
    }
}
