//! Boundary to the collaboration channel: state, events and sends.

use shared::{
    domain::ConnectionState,
    protocol::{ExtendedMessage, OutboundMessage},
};
use tokio::sync::broadcast;

use crate::error::ChannelError;

/// Notifications from the channel's changeset synchronisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalAction {
    CommitPerformed,
    NewlyIdle,
    Other(String),
}

impl From<&str> for InternalAction {
    fn from(value: &str) -> Self {
        match value {
            "commitPerformed" => InternalAction::CommitPerformed,
            "newlyIdle" => InternalAction::NewlyIdle,
            other => InternalAction::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ChannelEvent {
    StateChanged(ConnectionState),
    Message(ExtendedMessage),
    InternalAction(InternalAction),
}

/// The collaboration channel as seen by the editor client.
///
/// Implementations own reconnection and transport; sends are fire-and-forget
/// and must not block the caller.
pub trait ChannelClient: Send + Sync {
    fn channel_state(&self) -> ConnectionState;
    fn send_extended_message(&self, message: OutboundMessage) -> Result<(), ChannelError>;
    fn subscribe_events(&self) -> broadcast::Receiver<ChannelEvent>;
}
