use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::warn;

/// Kind of status notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressKind {
    /// Step progress for a long running tool.
    Progress,
}

/// One-way status notification for an observing UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Event kind.
    pub kind: ProgressKind,
    /// Human readable status line.
    pub message: String,
}

impl ProgressEvent {
    /// Creates a [`ProgressKind::Progress`] event.
    pub fn progress<T: Into<String>>(message: T) -> Self {
        Self {
            kind: ProgressKind::Progress,
            message: message.into(),
        }
    }
}

/// Fire-and-forget receiver of progress events.
pub trait ProgressSink: Send + Sync {
    /// Emits an event. Never blocks and never fails.
    fn emit(&self, event: ProgressEvent);
}

/// Channel for streaming progress events
#[derive(Clone)]
pub struct ProgressChannel {
    sender: mpsc::UnboundedSender<ProgressEvent>,
}

impl ProgressChannel {
    /// Creates a channel and its receiving half.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl ProgressSink for ProgressChannel {
    fn emit(&self, event: ProgressEvent) {
        if let Err(error) = self.sender.send(event) {
            warn!("Failed to send progress event: {}", error);
        }
    }
}

/// Sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn emit(&self, _event: ProgressEvent) {}
}
