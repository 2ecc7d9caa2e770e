use clap::Parser;
use familiar_bot::agent::InteractionPipeline;
use familiar_bot::channels::{Channel, ConsoleChannel};
use familiar_bot::commands;
use familiar_bot::providers::{OpenAiProvider, Provider};
use familiar_bot::session::Session;
use familiar_bot::tts::{AzureTts, PlayerCommandSink, SpeechSideChannel};
use std::sync::Arc;
use tokio::sync::mpsc;

/// A single-persona tabletop familiar chatbot.
#[derive(Debug, Parser)]
#[command(name = "familiar-bot", version, about)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "familiar.toml")]
    config: String,

    /// Display identity the console speaker goes by
    #[arg(long, default_value = "player")]
    speaker: String,
}

fn init_logging(debug: bool) {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Configuration errors are fatal before any session exists.
    let session = match Session::load(&args.config) {
        Ok(session) => Arc::new(session),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    init_logging(session.flags.debug());

    let (name, openai, speech_config, quiet) = {
        let state = session.state().await;
        (
            state.config.familiar.name.clone(),
            state.config.openai.clone(),
            state.config.speech.clone(),
            state.config.session.quiet,
        )
    };

    let provider: Arc<dyn Provider> = Arc::new(OpenAiProvider::new(openai.api_key.clone()));
    let speech = if speech_config.enabled && !quiet {
        let tts = Arc::new(AzureTts::new(
            speech_config.key.clone(),
            speech_config.region.clone(),
            Some(speech_config.voice.clone()),
        ));
        let sink = Arc::new(PlayerCommandSink::new(speech_config.player.clone()));
        Some(Arc::new(SpeechSideChannel::new(tts, sink)))
    } else {
        None
    };
    let pipeline = InteractionPipeline::new(provider, speech, openai.model, openai.temperature);

    let channel = Arc::new(ConsoleChannel::new(args.speaker));
    channel
        .send(&format!(
            "{name} has entered the chat! (type 'help' for more info)"
        ))
        .await?;

    let (tx, mut rx) = mpsc::channel(16);
    let listener = channel.clone();
    tokio::spawn(async move {
        if let Err(e) = listener.listen(tx).await {
            tracing::error!("channel listener stopped: {e}");
        }
    });

    loop {
        tokio::select! {
            message = rx.recv() => {
                let Some(message) = message else { break };
                if let Err(e) = commands::dispatch(
                    &message.content,
                    &message.sender,
                    &session,
                    &pipeline,
                    channel.as_ref(),
                )
                .await
                {
                    tracing::error!("command dispatch failed: {e}");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                break;
            }
        }
    }

    Ok(())
}
