use async_trait::async_trait;

/// A message received from the chat transport.
#[derive(Debug, Clone)]
pub struct ChannelMessage {
    /// Display identity of the speaker, resolved through the alias table
    /// by the pipeline
    pub sender: String,
    /// Raw command line or free-text utterance
    pub content: String,
}

/// Core channel trait - implement for any messaging platform
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name
    fn name(&self) -> &str;

    /// Send a message through this channel
    async fn send(&self, message: &str) -> anyhow::Result<()>;

    /// Show a "working" indicator while a long-running operation is in
    /// flight. Best-effort; the default does nothing.
    async fn indicate_busy(&self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Start listening for incoming messages (long-running)
    async fn listen(&self, tx: tokio::sync::mpsc::Sender<ChannelMessage>) -> anyhow::Result<()>;
}
