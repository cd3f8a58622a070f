//! crates/gurukul_core/src/chat.rs
//!
//! The chat transcript manager: an ordered, append-only sequence of
//! question/answer turns with an explicit request-in-flight phase and a
//! connection-error banner flag. Session-scoped only; never persisted.

use crate::domain::{ChatMessage, ChatRole, ChatTurn};

/// Appended when the tutor call succeeded but returned no usable text.
pub const EMPTY_REPLY_FALLBACK: &str = "I'm sorry, I couldn't process that.";
/// Appended when the tutor call itself failed.
pub const CONNECTION_FALLBACK: &str =
    "I'm having trouble connecting right now. Could you try asking again?";
/// The transient banner text shown alongside a failed turn.
pub const CONNECTION_ERROR_BANNER: &str = "Connection issue. Please try again.";

//=========================================================================================
// Phases and Rejections
//=========================================================================================

/// The transcript's request phase. At most one tutor request may be in
/// flight at a time; `Sending` is what enforces that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatPhase {
    #[default]
    Idle,
    Sending,
}

/// Why a `begin_send` was refused. Both cases are no-ops on the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SendRejection {
    #[error("question text is empty")]
    EmptyInput,
    #[error("a tutor request is already in flight")]
    RequestInFlight,
}

/// Everything the caller needs to issue the external tutor request for an
/// accepted turn: the question plus the prior transcript with timestamps
/// stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundTurn {
    pub question: String,
    pub history: Vec<ChatTurn>,
}

//=========================================================================================
// The Transcript
//=========================================================================================

/// One learner's chat session. Messages are strictly append-only and
/// chronologically ordered: one user message followed by exactly one
/// assistant message per completed turn. The error banner is metadata,
/// not a transcript entry.
#[derive(Debug, Default)]
pub struct ChatTranscript {
    messages: Vec<ChatMessage>,
    phase: ChatPhase,
    connection_error: bool,
    focus_topic: Option<String>,
}

impl ChatTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts or rejects a user turn.
    ///
    /// Empty/whitespace input and an in-flight request are both rejected
    /// without touching the transcript. On acceptance the error banner is
    /// cleared, the user message is appended, the phase moves to
    /// `Sending`, and the caller receives the outbound payload.
    pub fn begin_send(&mut self, input: &str) -> Result<OutboundTurn, SendRejection> {
        let question = input.trim();
        if question.is_empty() {
            return Err(SendRejection::EmptyInput);
        }
        if self.phase == ChatPhase::Sending {
            return Err(SendRejection::RequestInFlight);
        }

        self.connection_error = false;
        let history: Vec<ChatTurn> = self.messages.iter().map(ChatTurn::from).collect();
        self.messages
            .push(ChatMessage::new(ChatRole::User, question));
        self.phase = ChatPhase::Sending;

        Ok(OutboundTurn {
            question: question.to_string(),
            history,
        })
    }

    /// Records a successful tutor reply. An empty reply still appends the
    /// apology fallback so every completed turn gains exactly one
    /// assistant message.
    pub fn resolve_success(&mut self, reply: &str) {
        let text = if reply.trim().is_empty() {
            EMPTY_REPLY_FALLBACK
        } else {
            reply
        };
        self.messages.push(ChatMessage::new(ChatRole::Assistant, text));
        self.phase = ChatPhase::Idle;
    }

    /// Records a failed tutor call: the distinct connection fallback is
    /// appended and the banner flag raised. The phase always returns to
    /// `Idle`, never stuck in `Sending`.
    pub fn resolve_failure(&mut self) {
        self.messages
            .push(ChatMessage::new(ChatRole::Assistant, CONNECTION_FALLBACK));
        self.connection_error = true;
        self.phase = ChatPhase::Idle;
    }

    /// Discards the transcript and any error flag. The user-confirmation
    /// guard for this destructive action lives at the API boundary.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.connection_error = false;
        self.phase = ChatPhase::Idle;
    }

    /// The focus topic carried from a lesson-detail screen, biasing the
    /// tutor context.
    pub fn set_focus_topic(&mut self, topic: Option<String>) {
        self.focus_topic = topic;
    }

    pub fn focus_topic(&self) -> Option<&str> {
        self.focus_topic.as_deref()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn phase(&self) -> ChatPhase {
        self.phase
    }

    pub fn is_sending(&self) -> bool {
        self.phase == ChatPhase::Sending
    }

    pub fn has_connection_error(&self) -> bool {
        self.connection_error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_send_is_a_no_op() {
        let mut transcript = ChatTranscript::new();
        assert_eq!(transcript.begin_send(""), Err(SendRejection::EmptyInput));
        assert_eq!(
            transcript.begin_send("   \t "),
            Err(SendRejection::EmptyInput)
        );
        assert!(transcript.messages().is_empty());
        assert_eq!(transcript.phase(), ChatPhase::Idle);
    }

    #[test]
    fn successful_turn_appends_exactly_two_messages() {
        let mut transcript = ChatTranscript::new();
        let turn = transcript.begin_send("What is photosynthesis?").unwrap();
        assert_eq!(turn.question, "What is photosynthesis?");
        assert!(turn.history.is_empty());
        assert!(transcript.is_sending());

        transcript.resolve_success("Plants make food from sunlight.");
        assert_eq!(transcript.messages().len(), 2);
        assert_eq!(transcript.messages()[0].role, ChatRole::User);
        assert_eq!(transcript.messages()[1].role, ChatRole::Assistant);
        assert!(!transcript.is_sending());
        assert!(!transcript.has_connection_error());
    }

    #[test]
    fn failed_turn_appends_fallback_and_raises_banner() {
        let mut transcript = ChatTranscript::new();
        transcript.begin_send("Why is the sky blue?").unwrap();
        transcript.resolve_failure();

        assert_eq!(transcript.messages().len(), 2);
        assert_eq!(transcript.messages()[1].text, CONNECTION_FALLBACK);
        assert!(transcript.has_connection_error());
        assert_eq!(transcript.phase(), ChatPhase::Idle);
    }

    #[test]
    fn empty_reply_gets_the_apology_fallback() {
        let mut transcript = ChatTranscript::new();
        transcript.begin_send("Hello?").unwrap();
        transcript.resolve_success("   ");
        assert_eq!(transcript.messages()[1].text, EMPTY_REPLY_FALLBACK);
        // Distinct from a failed call: no banner.
        assert!(!transcript.has_connection_error());
    }

    #[test]
    fn only_one_request_may_be_in_flight() {
        let mut transcript = ChatTranscript::new();
        transcript.begin_send("First question").unwrap();
        assert_eq!(
            transcript.begin_send("Second question"),
            Err(SendRejection::RequestInFlight)
        );
        // The rejected send left no trace.
        assert_eq!(transcript.messages().len(), 1);
    }

    #[test]
    fn history_carries_prior_turns_without_the_new_question() {
        let mut transcript = ChatTranscript::new();
        transcript.begin_send("One").unwrap();
        transcript.resolve_success("Answer one");
        let turn = transcript.begin_send("Two").unwrap();

        assert_eq!(turn.history.len(), 2);
        assert_eq!(turn.history[0].text, "One");
        assert_eq!(turn.history[1].text, "Answer one");
    }

    #[test]
    fn a_new_send_clears_the_error_banner() {
        let mut transcript = ChatTranscript::new();
        transcript.begin_send("One").unwrap();
        transcript.resolve_failure();
        assert!(transcript.has_connection_error());

        transcript.begin_send("Two").unwrap();
        assert!(!transcript.has_connection_error());
    }

    #[test]
    fn clear_discards_messages_and_error_flag() {
        let mut transcript = ChatTranscript::new();
        transcript.begin_send("One").unwrap();
        transcript.resolve_failure();
        transcript.clear();

        assert!(transcript.messages().is_empty());
        assert!(!transcript.has_connection_error());
        assert_eq!(transcript.phase(), ChatPhase::Idle);
    }
}
