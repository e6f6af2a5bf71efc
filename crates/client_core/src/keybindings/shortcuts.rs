//! The editor's channel shortcuts.

use std::sync::Arc;

use shared::protocol::OutboundMessage;
use tracing::{debug, warn};

use super::{
    arbiter::{ClaimToken, KeyInterceptor},
    types::{KeyEvent, Keystroke},
};
use crate::{channel::ChannelClient, ui::SyncStatus};

/// Cmd-S. Sends nothing; shows the sync warning when the channel is not
/// connected.
pub struct SyncShortcut {
    channel: Arc<dyn ChannelClient>,
    status: Arc<SyncStatus>,
}

impl SyncShortcut {
    pub fn new(channel: Arc<dyn ChannelClient>, status: Arc<SyncStatus>) -> Self {
        Self { channel, status }
    }

    fn matches(keystroke: &Keystroke) -> bool {
        keystroke.key == 's' && keystroke.modifiers.has_cmd()
    }
}

impl KeyInterceptor for SyncShortcut {
    fn name(&self) -> &'static str {
        "sync"
    }

    fn intercept(&self, event: &mut KeyEvent, claim: &mut ClaimToken) {
        if claim.is_claimed() || !Self::matches(&event.keystroke) {
            return;
        }
        event.prevent_default();
        let state = self.channel.channel_state();
        if !state.is_connected() {
            debug!(%state, "sync requested while not connected");
            self.status.warn_not_connected();
        }
        claim.claim(self.name());
    }
}

/// Cmd-Shift-<key> that sends a fixed request.
pub struct RequestShortcut {
    name: &'static str,
    key: char,
    message: OutboundMessage,
    channel: Arc<dyn ChannelClient>,
}

impl RequestShortcut {
    pub fn new(
        name: &'static str,
        key: char,
        message: OutboundMessage,
        channel: Arc<dyn ChannelClient>,
    ) -> Self {
        Self {
            name,
            key: Keystroke::char(key).key,
            message,
            channel,
        }
    }

    pub fn format(channel: Arc<dyn ChannelClient>) -> Self {
        Self::new("format", 'f', OutboundMessage::FormatRequest, channel)
    }

    pub fn organize_imports(channel: Arc<dyn ChannelClient>) -> Self {
        Self::new(
            "organize-imports",
            'o',
            OutboundMessage::OrgImportsRequest,
            channel,
        )
    }

    fn matches(&self, keystroke: &Keystroke) -> bool {
        keystroke.key == self.key && keystroke.modifiers.has_cmd() && keystroke.modifiers.shift()
    }
}

impl KeyInterceptor for RequestShortcut {
    fn name(&self) -> &'static str {
        self.name
    }

    fn intercept(&self, event: &mut KeyEvent, claim: &mut ClaimToken) {
        if claim.is_claimed() || !self.matches(&event.keystroke) {
            return;
        }
        event.prevent_default();
        if let Err(err) = self.channel.send_extended_message(self.message.clone()) {
            warn!(
                shortcut = self.name,
                kind = self.message.kind(),
                error = %err,
                "failed to send shortcut request"
            );
        }
        claim.claim(self.name);
    }
}

/// Sync, format and organize-imports, in that priority order.
pub fn default_interceptors(
    channel: Arc<dyn ChannelClient>,
    status: Arc<SyncStatus>,
) -> Vec<Box<dyn KeyInterceptor>> {
    vec![
        Box::new(SyncShortcut::new(Arc::clone(&channel), status)),
        Box::new(RequestShortcut::format(Arc::clone(&channel))),
        Box::new(RequestShortcut::organize_imports(channel)),
    ]
}
