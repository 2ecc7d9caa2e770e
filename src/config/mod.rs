pub mod schema;

pub use schema::{
    Config, ConfigError, FamiliarConfig, OpenAiConfig, PartyMember, SessionSettings,
    SpeechConfig, DEFAULT_HISTORY_FILE, DEFAULT_MAX_MEMORY,
};
