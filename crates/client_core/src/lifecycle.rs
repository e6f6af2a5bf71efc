//! Reacts to channel connection-state transitions.

use std::sync::Arc;

use shared::{domain::ConnectionState, protocol::OutboundMessage};
use tokio::{runtime::Handle, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{
    channel::ChannelClient,
    ui::{Affordance, UiAffordances},
};

/// Requests sent after every (re)connection so the client catches up on
/// state it may have missed. Order among them does not matter.
pub fn catch_up_requests() -> [OutboundMessage; 3] {
    [
        OutboundMessage::AnnotationsRequest,
        OutboundMessage::tests_state(),
        OutboundMessage::outsource_state(),
    ]
}

pub struct ConnectionLifecycle {
    channel: Arc<dyn ChannelClient>,
    ui: Arc<dyn UiAffordances>,
    runtime: Handle,
}

impl ConnectionLifecycle {
    pub fn new(
        channel: Arc<dyn ChannelClient>,
        ui: Arc<dyn UiAffordances>,
        runtime: Handle,
    ) -> Self {
        Self {
            channel,
            ui,
            runtime,
        }
    }

    /// Updates the connection indicators for `state`. On `Connected` the
    /// catch-up burst is spawned onto `runtime`, after the indicators are
    /// updated, and its handle returned.
    pub fn on_state_change(&self, state: ConnectionState) -> Option<JoinHandle<()>> {
        info!(%state, "collaboration channel state changed");
        match state {
            ConnectionState::Connected => {
                self.ui.hide(Affordance::Connecting);
                self.ui.hide(Affordance::Disconnected);
                let channel = Arc::clone(&self.channel);
                Some(self.runtime.spawn(async move {
                    for request in catch_up_requests() {
                        let kind = request.kind();
                        match channel.send_extended_message(request) {
                            Ok(()) => debug!(kind, "sent catch-up request"),
                            Err(err) => warn!(kind, error = %err, "failed to send catch-up request"),
                        }
                    }
                }))
            }
            ConnectionState::Disconnected => {
                self.ui.hide(Affordance::Connecting);
                self.ui.show(Affordance::Disconnected);
                None
            }
            ConnectionState::Connecting => {
                self.ui.hide(Affordance::Disconnected);
                self.ui.show(Affordance::Connecting);
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/lifecycle_tests.rs"]
mod tests;
