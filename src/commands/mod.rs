//! Chat command surface and dispatch.
//!
//! Administrative commands mutate session state directly and acknowledge
//! with a fixed string; anything unrecognized is free text routed into the
//! interaction pipeline.

use crate::agent::InteractionPipeline;
use crate::channels::Channel;
use crate::session::Session;

/// The closed set of chat commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Reset,
    Save,
    Mute,
    Unmute,
    Freeze,
    Unfreeze,
    Debug,
    State,
    /// Free-text interaction, the default arm
    Interact(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "help" => Self::Help,
            "reset" => Self::Reset,
            "save" => Self::Save,
            "mute" => Self::Mute,
            "unmute" => Self::Unmute,
            "freeze" => Self::Freeze,
            "unfreeze" => Self::Unfreeze,
            "debug" => Self::Debug,
            "state" => Self::State,
            other => Self::Interact(other.to_string()),
        }
    }
}

/// Help text enumerating the command surface, with interaction examples.
pub fn help_text(name: &str) -> String {
    format!(
        "Commands:\n\
         \x20   help: show this message\n\
         \x20   save: save all interactions currently made with {name}. Useful when ending a session.\n\
         \x20   reset: reset {name} to the last saved state. Useful when starting a session or to undo negative interactions.\n\
         \x20   mute: keep {name} from speaking replies aloud\n\
         \x20   unmute: let {name} speak replies aloud again\n\
         \x20   freeze: suspend {name}; interactions are ignored until unfrozen\n\
         \x20   unfreeze: wake {name} up again\n\
         \x20   debug: toggle debugging diagnostics\n\
         \x20   state: show the current session state\n\
         \x20   <interaction>: interact with {name}\n\
         \n\
         Interaction examples:\n\
         \x20   I pet {name}\n\
         \x20   I give {name} some cheese\n"
    )
}

/// Route one raw line to the matching operation and deliver the outcome on
/// the channel. Suppressed interactions yield no message at all.
pub async fn dispatch(
    raw: &str,
    sender: &str,
    session: &Session,
    pipeline: &InteractionPipeline,
    channel: &dyn Channel,
) -> anyhow::Result<()> {
    let name = session.familiar_name().await;
    match Command::parse(raw) {
        Command::Help => channel.send(&help_text(&name)).await?,
        Command::Reset => {
            session.reset().await?;
            channel
                .send(&format!("{name} essence revived from the latest bottle."))
                .await?;
        }
        Command::Save => {
            session.save().await?;
            channel
                .send(&format!("{name} essence has been distilled and bottled."))
                .await?;
        }
        Command::Mute => {
            session.flags.set_muted(true);
            channel
                .send(&format!("{name} will now remain quiet :("))
                .await?;
        }
        Command::Unmute => {
            session.flags.set_muted(false);
            channel
                .send(&format!("{name} is now free to speak. :)"))
                .await?;
        }
        Command::Freeze => {
            session.flags.set_frozen(true);
            channel
                .send(&format!("{name} curls up, frozen in time."))
                .await?;
        }
        Command::Unfreeze => {
            session.flags.set_frozen(false);
            channel.send(&format!("{name} stirs back to life.")).await?;
        }
        Command::Debug => {
            let enabled = session.flags.toggle_debug();
            let message = if enabled {
                format!("{name} will now output debugging information.")
            } else {
                format!("{name} will no longer output debugging information.")
            };
            channel.send(&message).await?;
        }
        Command::State => channel.send(&session.status_report().await).await?,
        Command::Interact(text) => {
            let _ = channel.indicate_busy().await;
            match pipeline.interact(session, sender, &text).await {
                Ok(Some(reply)) => channel.send(&reply).await?,
                // Suppressed: frozen sessions stay silent.
                Ok(None) => {}
                Err(e) => {
                    tracing::error!("completion failed: {e}");
                    channel
                        .send(&format!("{name} stares blankly into the distance."))
                        .await?;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::ChannelMessage;
    use crate::config::Config;
    use crate::providers::{CompletionError, Provider};
    use crate::session::Turn;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use tokio::sync::mpsc;

    #[test]
    fn parse_covers_the_closed_set() {
        assert_eq!(Command::parse("help"), Command::Help);
        assert_eq!(Command::parse(" reset "), Command::Reset);
        assert_eq!(Command::parse("save"), Command::Save);
        assert_eq!(Command::parse("mute"), Command::Mute);
        assert_eq!(Command::parse("unmute"), Command::Unmute);
        assert_eq!(Command::parse("freeze"), Command::Freeze);
        assert_eq!(Command::parse("unfreeze"), Command::Unfreeze);
        assert_eq!(Command::parse("debug"), Command::Debug);
        assert_eq!(Command::parse("state"), Command::State);
    }

    #[test]
    fn free_text_falls_through_to_interact() {
        assert_eq!(
            Command::parse("I pet the cat"),
            Command::Interact("I pet the cat".to_string())
        );
        // A command word inside a sentence is still free text.
        assert_eq!(
            Command::parse("please save the cat"),
            Command::Interact("please save the cat".to_string())
        );
    }

    #[test]
    fn help_text_names_every_command() {
        let text = help_text("Tinder");
        for command in [
            "help", "save", "reset", "mute", "unmute", "freeze", "unfreeze", "debug", "state",
        ] {
            assert!(text.contains(command), "help text missing '{command}'");
        }
        assert!(text.contains("I pet Tinder"));
    }

    struct EchoProvider;

    #[async_trait]
    impl Provider for EchoProvider {
        fn name(&self) -> &str {
            "echo"
        }

        async fn complete(
            &self,
            messages: &[Turn],
            _model: &str,
            _temperature: f64,
        ) -> Result<String, CompletionError> {
            Ok(format!("echo: {}", messages.last().unwrap().content))
        }
    }

    #[derive(Default)]
    struct RecordingChannel {
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Channel for RecordingChannel {
        fn name(&self) -> &str {
            "recording"
        }

        async fn send(&self, message: &str) -> anyhow::Result<()> {
            self.sent.lock().unwrap().push(message.to_string());
            Ok(())
        }

        async fn listen(&self, _tx: mpsc::Sender<ChannelMessage>) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn fixture() -> (Session, InteractionPipeline, RecordingChannel) {
        let config = Config::from_toml_str(
            r#"
[familiar]
name = "Tinder"
type = "cat"
owner = "Ebenezer"
pronoun = "she"

[session]
history_file = "/nonexistent/never-read.json"
"#,
        )
        .unwrap();
        let session = Session::from_config(config, "unused.toml");
        let pipeline =
            InteractionPipeline::new(Arc::new(EchoProvider), None, "mock".to_string(), 1.0);
        (session, pipeline, RecordingChannel::default())
    }

    #[tokio::test]
    async fn mute_sets_flag_and_acknowledges() {
        let (session, pipeline, channel) = fixture();
        dispatch("mute", "Eb", &session, &pipeline, &channel)
            .await
            .unwrap();
        assert!(session.flags.muted());
        assert_eq!(
            channel.sent.lock().unwrap().as_slice(),
            ["Tinder will now remain quiet :("]
        );

        dispatch("unmute", "Eb", &session, &pipeline, &channel)
            .await
            .unwrap();
        assert!(!session.flags.muted());
    }

    #[tokio::test]
    async fn freeze_then_interaction_stays_silent() {
        let (session, pipeline, channel) = fixture();
        dispatch("freeze", "Eb", &session, &pipeline, &channel)
            .await
            .unwrap();
        assert!(session.flags.frozen());

        dispatch("I knock on the door", "Eb", &session, &pipeline, &channel)
            .await
            .unwrap();
        // Only the freeze acknowledgement went out; the interaction was
        // suppressed without a reply.
        assert_eq!(channel.sent.lock().unwrap().len(), 1);
        assert!(session.state().await.history.is_empty());
    }

    #[tokio::test]
    async fn free_text_reaches_the_pipeline() {
        let (session, pipeline, channel) = fixture();
        dispatch("I wave", "Eb", &session, &pipeline, &channel)
            .await
            .unwrap();
        let sent = channel.sent.lock().unwrap();
        assert_eq!(sent.as_slice(), ["echo: Eb wave"]);
    }

    #[tokio::test]
    async fn completion_failure_reports_instead_of_replying() {
        struct FailingProvider;

        #[async_trait]
        impl Provider for FailingProvider {
            fn name(&self) -> &str {
                "failing"
            }

            async fn complete(
                &self,
                _messages: &[Turn],
                _model: &str,
                _temperature: f64,
            ) -> Result<String, CompletionError> {
                Err(CompletionError::Network("connection refused".to_string()))
            }
        }

        let (session, _, channel) = fixture();
        let pipeline =
            InteractionPipeline::new(Arc::new(FailingProvider), None, "mock".to_string(), 1.0);
        dispatch("I wave", "Eb", &session, &pipeline, &channel)
            .await
            .unwrap();
        let sent = channel.sent.lock().unwrap();
        assert_eq!(sent.as_slice(), ["Tinder stares blankly into the distance."]);
        assert!(session.state().await.history.is_empty());
    }

    #[tokio::test]
    async fn debug_toggles_both_ways() {
        let (session, pipeline, channel) = fixture();
        dispatch("debug", "Eb", &session, &pipeline, &channel)
            .await
            .unwrap();
        assert!(session.flags.debug());
        dispatch("debug", "Eb", &session, &pipeline, &channel)
            .await
            .unwrap();
        assert!(!session.flags.debug());
        let sent = channel.sent.lock().unwrap();
        assert!(sent[0].contains("will now output"));
        assert!(sent[1].contains("will no longer output"));
    }

    #[tokio::test]
    async fn state_dumps_session_fields() {
        let (session, pipeline, channel) = fixture();
        dispatch("state", "Eb", &session, &pipeline, &channel)
            .await
            .unwrap();
        let sent = channel.sent.lock().unwrap();
        assert!(sent[0].contains("muted: false"));
        assert!(sent[0].contains("history: 0 turns"));
    }
}
