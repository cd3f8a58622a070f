//! services/api/src/adapters/tts.rs
//!
//! This module contains the adapter for OpenAI's Text-to-Speech (TTS) service.
//! It implements the `SpeechService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    types::{CreateSpeechRequest, SpeechModel, Voice},
    Client,
};
use async_trait::async_trait;
use gurukul_core::ports::SpeechService;
use tracing::warn;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `SpeechService` port using the OpenAI TTS API.
/// Per the port contract it never errors: synthesis failure reads as absence
/// and the read-aloud surface simply stays silent.
#[derive(Clone)]
pub struct OpenAiTtsAdapter {
    client: Client<OpenAIConfig>,
    model: SpeechModel,
    default_voice: Voice,
}

impl OpenAiTtsAdapter {
    /// Creates a new `OpenAiTtsAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: SpeechModel, default_voice: Voice) -> Self {
        Self {
            client,
            model,
            default_voice,
        }
    }

    /// Maps a voice id to the provider's voice set.
    pub fn parse_voice(name: &str) -> Option<Voice> {
        match name.to_lowercase().as_str() {
            "alloy" => Some(Voice::Alloy),
            "echo" => Some(Voice::Echo),
            "fable" => Some(Voice::Fable),
            "onyx" => Some(Voice::Onyx),
            "nova" => Some(Voice::Nova),
            "shimmer" => Some(Voice::Shimmer),
            _ => None,
        }
    }
}

//=========================================================================================
// `SpeechService` Trait Implementation
//=========================================================================================

#[async_trait]
impl SpeechService for OpenAiTtsAdapter {
    /// Generates audio bytes from the given text. An unknown voice id
    /// falls back to the configured default rather than failing the call.
    async fn synthesize(&self, text: &str, voice: &str) -> Option<Vec<u8>> {
        let voice = Self::parse_voice(voice).unwrap_or_else(|| {
            warn!("Unknown TTS voice '{}', using default", voice);
            self.default_voice.clone()
        });

        let request = CreateSpeechRequest {
            model: self.model.clone(),
            input: text.to_string(),
            voice,
            ..Default::default()
        };

        match self.client.audio().speech(request).await {
            Ok(response) => Some(response.bytes.to_vec()),
            Err(e) => {
                warn!("Speech synthesis failed: {}", e);
                None
            }
        }
    }
}
