//! The per-message interaction pipeline.
//!
//! One inbound utterance flows through: freeze check, alias resolution,
//! self-reference substitution, prompt assembly, the completion call, the
//! history commit, and the optional speech side channel.

use crate::providers::{CompletionError, Provider};
use crate::session::{Session, Turn};
use crate::tts::SpeechSideChannel;
use regex::Regex;
use std::sync::Arc;
use std::sync::LazyLock;

/// Stand-alone first-person token, case-sensitive. Word boundaries keep
/// "Island" from matching.
static SELF_REFERENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bI\b").unwrap());

/// Replace every stand-alone "I" with the speaker's canonical identity and
/// trim surrounding whitespace.
pub fn substitute_self_references(text: &str, canonical: &str) -> String {
    SELF_REFERENCE
        .replace_all(text, regex::NoExpand(canonical))
        .trim()
        .to_string()
}

/// Drives one interaction from raw utterance to reply.
pub struct InteractionPipeline {
    provider: Arc<dyn Provider>,
    speech: Option<Arc<SpeechSideChannel>>,
    model: String,
    temperature: f64,
}

impl InteractionPipeline {
    pub fn new(
        provider: Arc<dyn Provider>,
        speech: Option<Arc<SpeechSideChannel>>,
        model: String,
        temperature: f64,
    ) -> Self {
        Self {
            provider,
            speech,
            model,
            temperature,
        }
    }

    /// Process one utterance from `speaker`.
    ///
    /// Returns `Ok(Some(reply))` on success, `Ok(None)` when the session is
    /// frozen (suppressed: no reply, no observable state change), and a
    /// [`CompletionError`] when the completion call fails - in which case
    /// the history is left exactly as it was.
    ///
    /// The user/assistant pair is committed and trimmed under one lock, so
    /// a concurrent `save` or `reset` never observes a half-updated buffer.
    /// Mute gates only the speech side channel; the textual reply is always
    /// returned.
    pub async fn interact(
        &self,
        session: &Session,
        speaker: &str,
        utterance: &str,
    ) -> Result<Option<String>, CompletionError> {
        if session.flags.frozen() {
            tracing::debug!(speaker, "session frozen, interaction suppressed");
            return Ok(None);
        }

        // Assemble the request under a short lock; the network call happens
        // with the lock released so admin commands stay responsive.
        let (messages, user_turn) = {
            let state = session.state().await;
            let canonical = state.aliases.resolve(speaker);
            let substituted = substitute_self_references(utterance, canonical);
            let user_turn = Turn::user(substituted);

            let mut messages = Vec::with_capacity(state.history.len() + 2);
            messages.push(state.persona.clone());
            messages.extend(state.history.snapshot().iter().cloned());
            messages.push(user_turn.clone());
            (messages, user_turn)
        };

        if session.flags.debug() {
            tracing::info!(
                speaker,
                turns = messages.len(),
                request = %user_turn.content,
                "assembled completion request"
            );
        }

        let reply = self
            .provider
            .complete(&messages, &self.model, self.temperature)
            .await?;

        // Commit the pair and trim, indivisible with respect to save/reset.
        {
            let mut state = session.state().await;
            state.history.append(user_turn);
            state.history.append(Turn::assistant(reply.clone()));
            let max_memory = state.max_memory;
            state.history.trim(max_memory);
        }

        if !session.flags.muted() {
            if let Some(speech) = &self.speech {
                if let Err(e) = speech.speak(&reply).await {
                    tracing::warn!("speech side channel failed: {e}");
                }
            }
        }

        Ok(Some(reply))
    }
}
