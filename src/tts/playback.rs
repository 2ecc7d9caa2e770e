//! Transient audio lifecycle and the speech side channel.
//!
//! Synthesized audio lives in a temp file only long enough to be played
//! once; the file is deleted on every exit path, including failures during
//! write or playback start.

use super::traits::{SynthesisError, TextToSpeech};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

/// Scoped temporary audio file. Deleted on drop, whatever happened to it.
pub struct TransientAudio {
    path: PathBuf,
}

impl TransientAudio {
    /// Write synthesized bytes to a fresh temp file.
    pub fn write(bytes: &[u8], extension: &str) -> std::io::Result<Self> {
        let path = std::env::temp_dir().join(format!("familiar-{}.{extension}", Uuid::new_v4()));
        std::fs::write(&path, bytes)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TransientAudio {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::debug!(path = %self.path.display(), "could not remove transient audio: {e}");
            }
        }
    }
}

/// Playback boundary: plays one audio file exactly once on the associated
/// voice output.
#[async_trait]
pub trait VoiceSink: Send + Sync {
    async fn play(&self, audio: &Path) -> Result<(), SynthesisError>;
}

/// Plays audio by spawning a local player command (e.g. `mpv`).
pub struct PlayerCommandSink {
    player: String,
}

impl PlayerCommandSink {
    pub fn new(player: String) -> Self {
        Self { player }
    }
}

#[async_trait]
impl VoiceSink for PlayerCommandSink {
    async fn play(&self, audio: &Path) -> Result<(), SynthesisError> {
        let status = tokio::process::Command::new(&self.player)
            .arg(audio)
            .status()
            .await
            .map_err(|e| SynthesisError::Playback(format!("{}: {e}", self.player)))?;
        if !status.success() {
            return Err(SynthesisError::Playback(format!(
                "{} exited with {status}",
                self.player
            )));
        }
        Ok(())
    }
}

/// The optional speech side channel: synthesize, play once, delete.
///
/// Every failure here is isolated; the caller logs it and the textual reply
/// path continues untouched.
pub struct SpeechSideChannel {
    tts: Arc<dyn TextToSpeech>,
    sink: Arc<dyn VoiceSink>,
}

impl SpeechSideChannel {
    pub fn new(tts: Arc<dyn TextToSpeech>, sink: Arc<dyn VoiceSink>) -> Self {
        Self { tts, sink }
    }

    /// Voice one reply. The transient file is removed whether or not
    /// playback succeeds.
    pub async fn speak(&self, text: &str) -> Result<(), SynthesisError> {
        let bytes = self.tts.synthesize(text, None).await?;
        let audio = TransientAudio::write(&bytes, self.tts.audio_format().extension())?;
        self.sink.play(audio.path()).await
    }
}
