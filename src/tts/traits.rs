//! Text-to-speech trait definition.

use async_trait::async_trait;
use thiserror::Error;

/// Typed synthesis/playback failures.
///
/// All of these are non-fatal for the interaction: the side channel is
/// failure-isolated and the textual reply is delivered regardless.
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("synthesis request failed: {0}")]
    Request(String),

    #[error("synthesis credentials rejected: {0}")]
    Credentials(String),

    #[error("audio I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("playback failed: {0}")]
    Playback(String),
}

/// Output audio format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AudioFormat {
    /// MP3 audio (most compatible)
    #[default]
    Mp3,
    /// WAV audio (uncompressed)
    Wav,
    /// OGG Vorbis
    Ogg,
}

impl AudioFormat {
    /// Get the file extension for this format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
            Self::Ogg => "ogg",
        }
    }
}

/// Text-to-speech trait for converting text to audio.
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    /// Synthesize text to raw audio bytes.
    ///
    /// `voice` overrides the provider's default voice when set.
    async fn synthesize(&self, text: &str, voice: Option<&str>)
        -> Result<Vec<u8>, SynthesisError>;

    /// Format of the bytes returned by [`TextToSpeech::synthesize`].
    fn audio_format(&self) -> AudioFormat {
        AudioFormat::Mp3
    }

    /// Get the default voice ID for this provider.
    fn default_voice(&self) -> &str;

    /// Get the provider name.
    fn provider_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_format_extension() {
        assert_eq!(AudioFormat::Mp3.extension(), "mp3");
        assert_eq!(AudioFormat::Wav.extension(), "wav");
        assert_eq!(AudioFormat::Ogg.extension(), "ogg");
    }

    #[test]
    fn default_format_is_mp3() {
        assert_eq!(AudioFormat::default(), AudioFormat::Mp3);
    }
}
