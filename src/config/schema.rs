//! Configuration schema and loading.
//!
//! Configuration lives in a single TOML file (default `familiar.toml`).
//!
//! # Priority
//!
//! 1. Explicit config file values
//! 2. Environment variables (secrets only: `OPENAI_API_KEY`,
//!    `AZURE_SPEECH_KEY`, `AZURE_SPEECH_REGION`)
//! 3. Default values

use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Default memory bound when the configured value is absent or unparsable.
pub const DEFAULT_MAX_MEMORY: usize = 10;

/// Default history filename when the configured path is absent or empty.
pub const DEFAULT_HISTORY_FILE: &str = "chat_history.json";

/// Fatal startup configuration errors. The process aborts before any
/// session exists.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: Box<toml::de::Error>,
    },

    #[error("missing required config field: {0}")]
    MissingField(&'static str),
}

/// Identity of the familiar persona. All fields are required; the persona
/// prompt cannot be assembled without them.
#[derive(Debug, Clone, Deserialize)]
pub struct FamiliarConfig {
    /// Character name, e.g. "Tinder"
    pub name: String,
    /// Creature type, e.g. "cat"
    #[serde(rename = "type")]
    pub kind: String,
    /// Party member the familiar is bound to
    pub owner: String,
    /// Third-person pronoun used in the persona prompt, e.g. "she"
    pub pronoun: String,
    /// Free-text personality appended to the persona prompt
    #[serde(default)]
    pub personality: String,
}

/// One party member known to the persona.
#[derive(Debug, Clone, Deserialize)]
pub struct PartyMember {
    pub name: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub species: String,
    #[serde(default)]
    pub profession: String,
    /// Free-text facts about this member, concatenated into the persona
    #[serde(default)]
    pub facts: Vec<String>,
}

/// Session behavior settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionSettings {
    /// Memory bound, kept textual so a bad value degrades to the default
    /// with a warning instead of failing the whole config load
    #[serde(default)]
    pub max_memory: Option<String>,
    /// Path of the persisted history file; `~` is expanded
    #[serde(default)]
    pub history_file: Option<String>,
    /// Start with debug diagnostics enabled
    #[serde(default)]
    pub debug: bool,
    /// Disable the speech side channel entirely
    #[serde(default)]
    pub quiet: bool,
}

/// OpenAI completion settings.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            temperature: default_temperature(),
        }
    }
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f64 {
    1.0
}

/// Azure speech synthesis settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SpeechConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub region: String,
    #[serde(default = "default_voice")]
    pub voice: String,
    /// Local audio player invoked with the synthesized file
    #[serde(default = "default_player")]
    pub player: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            key: String::new(),
            region: String::new(),
            voice: default_voice(),
            player: default_player(),
        }
    }
}

fn default_voice() -> String {
    "en-US-JennyNeural".to_string()
}

fn default_player() -> String {
    "mpv".to_string()
}

/// Validated top-level configuration, immutable after load.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub familiar: FamiliarConfig,
    #[serde(default)]
    pub party: Vec<PartyMember>,
    /// Raw alias table; parsed leniently by [`AliasTable::from_toml`]
    ///
    /// [`AliasTable::from_toml`]: crate::session::AliasTable::from_toml
    #[serde(default)]
    pub aliases: Option<toml::Table>,
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
}

impl Config {
    /// Read, parse and validate the config file at `path`.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        let mut config: Self = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source: Box::new(source),
        })?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate from an in-memory TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: "<inline>".to_string(),
            source: Box::new(source),
        })?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if !key.is_empty() {
                self.openai.api_key = key;
            }
        }
        if let Ok(key) = std::env::var("AZURE_SPEECH_KEY") {
            if !key.is_empty() {
                self.speech.key = key;
            }
        }
        if let Ok(region) = std::env::var("AZURE_SPEECH_REGION") {
            if !region.is_empty() {
                self.speech.region = region;
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.familiar.name.trim().is_empty() {
            return Err(ConfigError::MissingField("familiar.name"));
        }
        if self.familiar.kind.trim().is_empty() {
            return Err(ConfigError::MissingField("familiar.type"));
        }
        if self.familiar.owner.trim().is_empty() {
            return Err(ConfigError::MissingField("familiar.owner"));
        }
        if self.familiar.pronoun.trim().is_empty() {
            return Err(ConfigError::MissingField("familiar.pronoun"));
        }
        Ok(())
    }

    /// Resolved memory bound.
    ///
    /// An unparsable configured value defaults to [`DEFAULT_MAX_MEMORY`]
    /// with a recorded warning.
    pub fn max_memory(&self) -> usize {
        match self.session.max_memory.as_deref() {
            None => DEFAULT_MAX_MEMORY,
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(
                    "max_memory '{raw}' is not a number, defaulting to {DEFAULT_MAX_MEMORY} turns"
                );
                DEFAULT_MAX_MEMORY
            }),
        }
    }

    /// Resolved history file path with `~` expansion.
    pub fn history_path(&self) -> PathBuf {
        let raw = self
            .session
            .history_file
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or(DEFAULT_HISTORY_FILE);
        PathBuf::from(shellexpand::tilde(raw).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[familiar]
name = "Tinder"
type = "cat"
owner = "Ebenezer"
pronoun = "she"
"#;

    #[test]
    fn minimal_config_parses_with_defaults() {
        let config = Config::from_toml_str(MINIMAL).unwrap();
        assert_eq!(config.familiar.name, "Tinder");
        assert_eq!(config.familiar.kind, "cat");
        assert!(config.party.is_empty());
        assert_eq!(config.max_memory(), DEFAULT_MAX_MEMORY);
        assert_eq!(config.history_path(), PathBuf::from(DEFAULT_HISTORY_FILE));
        assert!(!config.session.quiet);
        assert!(!config.speech.enabled);
        assert_eq!(config.openai.model, "gpt-4o-mini");
    }

    #[test]
    fn missing_identity_field_is_fatal() {
        let raw = r#"
[familiar]
name = "Tinder"
type = "cat"
owner = ""
pronoun = "she"
"#;
        let err = Config::from_toml_str(raw).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("familiar.owner")));
    }

    #[test]
    fn max_memory_parses_textual_value() {
        let raw = format!("{MINIMAL}\n[session]\nmax_memory = \"4\"\n");
        let config = Config::from_toml_str(&raw).unwrap();
        assert_eq!(config.max_memory(), 4);
    }

    #[test]
    fn unparsable_max_memory_defaults() {
        let raw = format!("{MINIMAL}\n[session]\nmax_memory = \"lots\"\n");
        let config = Config::from_toml_str(&raw).unwrap();
        assert_eq!(config.max_memory(), DEFAULT_MAX_MEMORY);
    }

    #[test]
    fn empty_history_file_falls_back_to_default() {
        let raw = format!("{MINIMAL}\n[session]\nhistory_file = \"\"\n");
        let config = Config::from_toml_str(&raw).unwrap();
        assert_eq!(config.history_path(), PathBuf::from(DEFAULT_HISTORY_FILE));
    }

    #[test]
    fn party_members_parse() {
        let raw = format!(
            "{MINIMAL}\n\
             [[party]]\n\
             name = \"Ebenezer\"\n\
             nickname = \"Eb\"\n\
             gender = \"male\"\n\
             species = \"tiefling\"\n\
             profession = \"wizard\"\n\
             facts = [\"He can cast Fire Bolt.\"]\n"
        );
        let config = Config::from_toml_str(&raw).unwrap();
        assert_eq!(config.party.len(), 1);
        assert_eq!(config.party[0].nickname.as_deref(), Some("Eb"));
        assert_eq!(config.party[0].facts.len(), 1);
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = Config::from_toml_str("[familiar\nname =").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
