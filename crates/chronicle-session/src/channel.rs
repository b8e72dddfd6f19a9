//! Channel handles.

use tokio::sync::mpsc;
use uuid::Uuid;

use chronicle_core::ServerFrame;

/// Handle to one bidirectional client channel, used for sending outbound
/// frames. The receiving half lives with the connection's writer task.
#[derive(Debug, Clone)]
pub struct ChannelHandle {
    id: Uuid,
    sender: mpsc::UnboundedSender<ServerFrame>,
}

impl ChannelHandle {
    pub fn new(sender: mpsc::UnboundedSender<ServerFrame>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Queue a frame for delivery. A closed channel means the client is
    /// gone; callers detach it and carry on.
    pub fn send(&self, frame: ServerFrame) -> Result<(), SessionError> {
        self.sender
            .send(frame)
            .map_err(|_| SessionError::ChannelGone(self.id))
    }
}

/// Session-layer errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("channel {0} is gone")]
    ChannelGone(Uuid),
}
