//! Azure Cognitive Services TTS implementation.
//!
//! Uses the Azure speech REST endpoint with an SSML request body. The
//! subscription key and region come from configuration or the
//! `AZURE_SPEECH_KEY`/`AZURE_SPEECH_REGION` environment variables.

use super::traits::{AudioFormat, SynthesisError, TextToSpeech};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};

/// Azure speech REST API client.
pub struct AzureTts {
    key: String,
    region: String,
    default_voice: String,
    client: Client,
}

impl AzureTts {
    /// Create a new Azure TTS client.
    ///
    /// # Arguments
    /// * `key` - Azure speech subscription key
    /// * `region` - Azure region, e.g. "eastus"
    /// * `voice` - Default voice name (default: `en-US-JennyNeural`)
    pub fn new(key: String, region: String, voice: Option<String>) -> Self {
        Self {
            key,
            region,
            default_voice: voice.unwrap_or_else(|| "en-US-JennyNeural".to_string()),
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .connect_timeout(std::time::Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "https://{}.tts.speech.microsoft.com/cognitiveservices/v1",
            self.region
        )
    }

    fn ssml_body(voice: &str, text: &str) -> String {
        format!(
            "<speak version='1.0' xml:lang='en-US'><voice name='{voice}'>{}</voice></speak>",
            escape_xml(text)
        )
    }
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[async_trait]
impl TextToSpeech for AzureTts {
    async fn synthesize(
        &self,
        text: &str,
        voice: Option<&str>,
    ) -> Result<Vec<u8>, SynthesisError> {
        let voice = voice.unwrap_or(&self.default_voice);
        let body = Self::ssml_body(voice, text);

        let response = self
            .client
            .post(self.endpoint())
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .header("Content-Type", "application/ssml+xml")
            .header("X-Microsoft-OutputFormat", "audio-16khz-128kbitrate-mono-mp3")
            .header("User-Agent", "familiar-bot")
            .body(body)
            .send()
            .await
            .map_err(|e| SynthesisError::Request(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SynthesisError::Credentials(format!(
                "{status}: {error_text}"
            )));
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SynthesisError::Request(format!("{status}: {error_text}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SynthesisError::Request(e.to_string()))?;
        tracing::debug!(
            chars = text.len(),
            bytes = bytes.len(),
            voice,
            "azure synthesis succeeded"
        );
        Ok(bytes.to_vec())
    }

    fn audio_format(&self) -> AudioFormat {
        AudioFormat::Mp3
    }

    fn default_voice(&self) -> &str {
        &self.default_voice
    }

    fn provider_name(&self) -> &str {
        "azure"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_with_default_voice() {
        let tts = AzureTts::new("key".to_string(), "eastus".to_string(), None);
        assert_eq!(tts.default_voice(), "en-US-JennyNeural");
        assert_eq!(tts.provider_name(), "azure");
    }

    #[test]
    fn endpoint_includes_region() {
        let tts = AzureTts::new("key".to_string(), "westeurope".to_string(), None);
        assert_eq!(
            tts.endpoint(),
            "https://westeurope.tts.speech.microsoft.com/cognitiveservices/v1"
        );
    }

    #[test]
    fn ssml_escapes_reserved_characters() {
        let body = AzureTts::ssml_body("en-US-JennyNeural", "claws & <hisses>");
        assert!(body.contains("claws &amp; &lt;hisses&gt;"));
        assert!(body.starts_with("<speak"));
        assert!(body.contains("name='en-US-JennyNeural'"));
    }

    #[tokio::test]
    async fn synthesize_fails_with_invalid_key() {
        let tts = AzureTts::new("invalid".to_string(), "eastus".to_string(), None);
        let result = tts.synthesize("Hello", None).await;
        assert!(result.is_err());
    }
}
