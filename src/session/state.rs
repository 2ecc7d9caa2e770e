//! Session state and its load/reset/save lifecycle.

use super::aliases::AliasTable;
use super::history::HistoryBuffer;
use super::persona;
use super::types::Turn;
use crate::config::{Config, ConfigError};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, MutexGuard};

/// Operator switches, independent of the conversation state.
///
/// Flags are atomics so the administrative command path never blocks, even
/// while a completion call is outstanding. They deliberately survive
/// `reset`: a muted or frozen familiar stays that way until the operator
/// says otherwise.
#[derive(Debug)]
pub struct SessionFlags {
    muted: AtomicBool,
    frozen: AtomicBool,
    debug: AtomicBool,
}

impl SessionFlags {
    pub fn new(debug: bool) -> Self {
        Self {
            muted: AtomicBool::new(false),
            frozen: AtomicBool::new(false),
            debug: AtomicBool::new(debug),
        }
    }

    pub fn muted(&self) -> bool {
        self.muted.load(Ordering::Relaxed)
    }

    pub fn set_muted(&self, value: bool) {
        self.muted.store(value, Ordering::Relaxed);
    }

    pub fn frozen(&self) -> bool {
        self.frozen.load(Ordering::Relaxed)
    }

    pub fn set_frozen(&self, value: bool) {
        self.frozen.store(value, Ordering::Relaxed);
    }

    pub fn debug(&self) -> bool {
        self.debug.load(Ordering::Relaxed)
    }

    /// Flip the debug flag, returning the new value.
    pub fn toggle_debug(&self) -> bool {
        !self.debug.fetch_xor(true, Ordering::Relaxed)
    }
}

/// Everything `reset` rebuilds: config snapshot, alias table, persona
/// prompt, rolling history and the resolved memory bound.
#[derive(Debug)]
pub struct SessionState {
    pub config: Config,
    pub aliases: AliasTable,
    pub persona: Turn,
    pub history: HistoryBuffer,
    pub history_path: PathBuf,
    pub max_memory: usize,
}

impl SessionState {
    /// Build session state from a validated config, reading the persisted
    /// history from disk. A missing or malformed history file leaves the
    /// buffer empty and is never fatal.
    pub fn load(config: Config) -> Self {
        let aliases = AliasTable::from_toml(config.aliases.as_ref());
        let persona = persona::build_persona(&config);
        let history_path = config.history_path();
        let max_memory = config.max_memory();

        let history = match std::fs::read(&history_path) {
            Ok(bytes) => {
                let history = HistoryBuffer::load(&bytes);
                tracing::debug!(
                    turns = history.len(),
                    path = %history_path.display(),
                    "chat history loaded"
                );
                history
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %history_path.display(), "no saved chat history, starting fresh");
                HistoryBuffer::new()
            }
            Err(e) => {
                tracing::warn!(path = %history_path.display(), "could not read chat history: {e}");
                HistoryBuffer::new()
            }
        };

        Self {
            config,
            aliases,
            persona,
            history,
            history_path,
            max_memory,
        }
    }

    /// Serialize the history to the configured path, overwriting it
    /// unconditionally. Touches nothing else.
    pub fn save(&self) -> anyhow::Result<()> {
        let bytes = self.history.serialize()?;
        std::fs::write(&self.history_path, bytes)?;
        tracing::debug!(
            turns = self.history.len(),
            path = %self.history_path.display(),
            "chat history saved"
        );
        Ok(())
    }
}

/// One long-lived conversation session.
///
/// Flags live outside the mutex so they stay toggleable while an
/// interaction is in flight; everything `reset` rebuilds sits behind a
/// single mutex so an interaction commit, `save` and `reset` serialize
/// against each other and a save never observes a half-updated buffer.
pub struct Session {
    pub flags: SessionFlags,
    state: Mutex<SessionState>,
    config_path: String,
}

impl Session {
    /// Create the session at process start. Configuration errors here are
    /// fatal; the caller is expected to abort.
    pub fn load(config_path: &str) -> Result<Self, ConfigError> {
        let config = Config::load(config_path)?;
        Ok(Self::from_config(config, config_path))
    }

    /// Build from an already-validated config. Used by [`Session::load`]
    /// and by tests that construct configs in memory.
    pub fn from_config(config: Config, config_path: impl Into<String>) -> Self {
        let debug = config.session.debug;
        Self {
            flags: SessionFlags::new(debug),
            state: Mutex::new(SessionState::load(config)),
            config_path: config_path.into(),
        }
    }

    /// Reload configuration and on-disk history, discarding all in-memory
    /// mutations since the last save. Flags are preserved on purpose; see
    /// [`SessionFlags`].
    pub async fn reset(&self) -> Result<(), ConfigError> {
        let config = Config::load(&self.config_path)?;
        let fresh = SessionState::load(config);
        *self.state.lock().await = fresh;
        tracing::info!("session reset from saved state");
        Ok(())
    }

    /// Persist the rolling history.
    pub async fn save(&self) -> anyhow::Result<()> {
        self.state.lock().await.save()
    }

    /// Lock the mutable session state.
    pub async fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().await
    }

    /// The familiar's display name, for acknowledgements and help text.
    pub async fn familiar_name(&self) -> String {
        self.state.lock().await.config.familiar.name.clone()
    }

    /// Diagnostic dump of the current session fields.
    pub async fn status_report(&self) -> String {
        let state = self.state.lock().await;
        format!(
            "muted: {}\nfrozen: {}\ndebug: {}\nmax_memory: {}\nhistory: {} turns\naliases: {} entries\nhistory_file: {}",
            self.flags.muted(),
            self.flags.frozen(),
            self.flags.debug(),
            state.max_memory,
            state.history.len(),
            state.aliases.len(),
            state.history_path.display(),
        )
    }
}
