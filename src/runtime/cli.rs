use super::{PageRuntime, RuntimeError, RuntimeEvent};
use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::mpsc;

pub struct CliRuntime {
    event_tx: RwLock<Option<mpsc::UnboundedSender<RuntimeEvent>>>,
}

impl CliRuntime {
    pub fn new(event_tx: mpsc::UnboundedSender<RuntimeEvent>) -> Self {
        Self {
            event_tx: RwLock::new(Some(event_tx)),
        }
    }
}

#[async_trait]
impl PageRuntime for CliRuntime {
    fn emit(&self, event: RuntimeEvent) -> Result<(), RuntimeError> {
        // Send to channel for CLI event handler to process
        self.event_tx
            .read()
            .as_ref()
            .ok_or(RuntimeError::ReceiverClosed)?
            .send(event)
            .map_err(|_| RuntimeError::ReceiverClosed)?;
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), RuntimeError> {
        // Dropping the sender lets the output loop drain and exit
        self.event_tx.write().take();
        Ok(())
    }
}
