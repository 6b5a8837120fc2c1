use adapter::{CommandEnvelope, Outcome, PostStore};
use domain::{AppCommand, ThreadEvent};
use std::{sync::Arc, time::Duration};
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    /// Read side. All writes go through `sender`.
    pub store: Arc<dyn PostStore>,
    pub sender: mpsc::Sender<CommandEnvelope>,
    pub tx_events: broadcast::Sender<ThreadEvent>,
    pub session_secret: Arc<str>,
    pub reply_timeout: Duration,
}

impl AppState {
    /// Hands `cmd` to the worker and waits for its verdict.
    pub async fn dispatch(&self, cmd: AppCommand) -> Result<Outcome, ApiError> {
        let (tx, rx) = oneshot::channel();
        let envelope = CommandEnvelope { cmd, resp: tx };

        self.sender
            .send(envelope)
            .await
            .map_err(|_| ApiError::WorkerClosed)?;

        match tokio::time::timeout(self.reply_timeout, rx).await {
            Ok(Ok(result)) => result.map_err(ApiError::from),
            Ok(Err(_)) => Err(ApiError::WorkerClosed),
            Err(_) => Err(ApiError::Timeout),
        }
    }
}
