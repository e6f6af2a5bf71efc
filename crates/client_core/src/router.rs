//! Dispatch table from inbound message tag to handler.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use shared::protocol::{ExtendedMessage, InboundKind};
use tracing::{trace, warn};

use crate::error::RouterError;

pub type MessageHandler = Box<dyn Fn(&ExtendedMessage) + Send + Sync>;

/// One handler per message tag; registering a tag again replaces the old
/// handler. Messages with no handler are dropped.
#[derive(Default)]
pub struct MessageRouter {
    handlers: HashMap<String, MessageHandler>,
}

impl MessageRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `kind`, returning `true` if it replaced an
    /// earlier handler.
    pub fn register<F>(&mut self, kind: impl Into<String>, handler: F) -> bool
    where
        F: Fn(&ExtendedMessage) + Send + Sync + 'static,
    {
        let kind = kind.into();
        let replaced = self.handlers.insert(kind.clone(), Box::new(handler)).is_some();
        if replaced {
            warn!(kind = %kind, "replaced existing message handler");
        }
        replaced
    }

    /// Like [`register`](Self::register) but refuses to replace.
    pub fn register_unique<F>(
        &mut self,
        kind: impl Into<String>,
        handler: F,
    ) -> Result<(), RouterError>
    where
        F: Fn(&ExtendedMessage) + Send + Sync + 'static,
    {
        let kind = kind.into();
        if self.handlers.contains_key(&kind) {
            return Err(RouterError::DuplicateHandler(kind));
        }
        self.handlers.insert(kind, Box::new(handler));
        Ok(())
    }

    /// Registers a handler that receives the decoded payload. Payloads that
    /// fail to decode are logged and skipped.
    pub fn register_typed<P, F>(
        &mut self,
        kind: InboundKind,
        handler: F,
    ) -> Result<(), RouterError>
    where
        P: DeserializeOwned,
        F: Fn(P) + Send + Sync + 'static,
    {
        self.register_unique(kind.as_str(), move |message| match message.decode::<P>() {
            Ok(payload) => handler(payload),
            Err(err) => warn!(kind = %message.kind, error = %err, "dropping malformed message"),
        })
    }

    pub fn is_registered(&self, kind: &str) -> bool {
        self.handlers.contains_key(kind)
    }

    /// Runs the handler for `message.kind`, if any. Returns whether one ran.
    pub fn dispatch(&self, message: &ExtendedMessage) -> bool {
        match self.handlers.get(&message.kind) {
            Some(handler) => {
                handler(message);
                true
            }
            None => {
                trace!(kind = %message.kind, "no handler for message type");
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/router_tests.rs"]
mod tests;
