//! Client-side orchestration for the collaborative editor.
//!
//! [`EditorSession`] sits between a [`ChannelClient`] and the editor UI:
//! it routes inbound channel messages to the editor and side panels, keeps
//! the connection indicators in step with the channel state, arbitrates the
//! channel keyboard shortcuts, and exposes the toolbar actions as sends.

pub mod channel;
pub mod config;
pub mod editor;
pub mod error;
pub mod keybindings;
pub mod lifecycle;
pub mod router;
pub mod session;
pub mod transport;
pub mod ui;

pub use channel::{ChannelClient, ChannelEvent, InternalAction};
pub use config::SessionTimings;
pub use editor::{EditorAdapter, OrgImportsPrompt, OutsourcePanel, TestRunnerPanel};
pub use error::{ChannelError, RouterError, SessionError};
pub use keybindings::{ClaimToken, KeyEvent, KeyInterceptor, KeybindingArbiter, Keystroke, Modifiers};
pub use lifecycle::ConnectionLifecycle;
pub use router::MessageRouter;
pub use session::{Collaborators, EditorSession};
pub use transport::{TransportOptions, WsChannelClient};
pub use ui::{Affordance, SyncStatus, UiAffordances};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
