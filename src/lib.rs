//! Familiar Bot - a single-persona conversational agent for tabletop sessions.
//!
//! The bot plays one character (a familiar) in a two-party dialogue. It keeps
//! a bounded rolling memory of the conversation, rewrites the speaker's
//! self-references into their canonical party name before forwarding to the
//! LLM, and can optionally voice its replies through a speech side channel.

pub mod agent;
pub mod channels;
pub mod commands;
pub mod config;
pub mod providers;
pub mod session;
pub mod tts;
