//! In-memory backplane for single-instance deployments.

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc};

use recipehub_core::result::AppResult;

use super::{Backplane, BackplaneFrame};

/// In-memory backplane implementation over a broadcast channel.
///
/// Functionally a loopback: the only subscribers are in this process. Slow
/// subscribers that lag drop frames, consistent with best-effort delivery.
#[derive(Debug)]
pub struct MemoryPubSub {
    /// Frame fan-out channel.
    sender: broadcast::Sender<BackplaneFrame>,
    /// Buffer size for subscriber forwarding channels.
    buffer_size: usize,
}

impl MemoryPubSub {
    /// Create a new in-memory backplane.
    pub fn new(buffer_size: usize) -> Self {
        let (sender, _) = broadcast::channel(buffer_size.max(1));
        Self {
            sender,
            buffer_size: buffer_size.max(1),
        }
    }
}

#[async_trait]
impl Backplane for MemoryPubSub {
    async fn publish(&self, frame: BackplaneFrame) -> AppResult<()> {
        // send() errs only when there are no subscribers, which is fine.
        let _ = self.sender.send(frame);
        Ok(())
    }

    fn subscribe(&self) -> mpsc::Receiver<BackplaneFrame> {
        let mut broadcast_rx = self.sender.subscribe();
        let (tx, rx) = mpsc::channel(self.buffer_size);
        tokio::spawn(async move {
            loop {
                match broadcast_rx.recv().await {
                    Ok(frame) => {
                        if tx.send(frame).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Backplane subscriber lagged, frames dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        rx
    }
}
