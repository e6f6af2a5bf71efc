//! Keyboard shortcuts that talk to the collaboration channel.
//!
//! Key events flow through an ordered chain of interceptors. The first
//! interceptor whose pattern matches claims the keystroke, and every later
//! interceptor sees the claim and stays out of it:
//!
//! ```text
//! KeyEvent → [sync] → [format] → [organize imports] → ClaimToken
//! ```

mod arbiter;
mod shortcuts;
mod types;

pub use arbiter::{ClaimToken, KeyInterceptor, KeybindingArbiter};
pub use shortcuts::{default_interceptors, RequestShortcut, SyncShortcut};
pub use types::{KeyEvent, Keystroke, KeystrokeParseError, Modifiers};

#[cfg(test)]
#[path = "../tests/keybindings_tests.rs"]
mod tests;
