//! Console channel - reads lines from stdin, prints replies to stdout.
//!
//! The demo transport for local play. Every line typed is attributed to the
//! configured speaker identity.

use super::traits::{Channel, ChannelMessage};
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

pub struct ConsoleChannel {
    speaker: String,
}

impl ConsoleChannel {
    pub fn new(speaker: String) -> Self {
        Self { speaker }
    }
}

#[async_trait]
impl Channel for ConsoleChannel {
    fn name(&self) -> &str {
        "console"
    }

    async fn send(&self, message: &str) -> anyhow::Result<()> {
        println!("{message}");
        Ok(())
    }

    async fn indicate_busy(&self) -> anyhow::Result<()> {
        println!("...");
        Ok(())
    }

    async fn listen(&self, tx: mpsc::Sender<ChannelMessage>) -> anyhow::Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            tx.send(ChannelMessage {
                sender: self.speaker.clone(),
                content: line,
            })
            .await?;
        }
        Ok(())
    }
}
