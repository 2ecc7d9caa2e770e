//! Speech synthesis side channel.

pub mod azure;
pub mod playback;
pub mod traits;

pub use azure::AzureTts;
pub use playback::{PlayerCommandSink, SpeechSideChannel, TransientAudio, VoiceSink};
pub use traits::{AudioFormat, SynthesisError, TextToSpeech};
