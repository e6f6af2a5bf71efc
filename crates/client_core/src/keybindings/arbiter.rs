//! Ordered interceptor chain with single-claim semantics.

use tracing::debug;

use super::types::KeyEvent;

/// Per-keystroke claim. Once set, later interceptors must leave the event alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClaimToken {
    claimed_by: Option<&'static str>,
}

impl ClaimToken {
    pub fn is_claimed(&self) -> bool {
        self.claimed_by.is_some()
    }

    pub fn claimed_by(&self) -> Option<&'static str> {
        self.claimed_by
    }

    pub fn claim(&mut self, interceptor: &'static str) {
        if self.claimed_by.is_none() {
            self.claimed_by = Some(interceptor);
        }
    }
}

pub trait KeyInterceptor: Send + Sync {
    fn name(&self) -> &'static str;

    /// Handles `event` if it matches this interceptor's pattern. Must return
    /// without doing anything when `claim` is already set.
    fn intercept(&self, event: &mut KeyEvent, claim: &mut ClaimToken);
}

/// Interceptors in priority order; the first registered runs first.
#[derive(Default)]
pub struct KeybindingArbiter {
    interceptors: Vec<Box<dyn KeyInterceptor>>,
}

impl KeybindingArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_interceptors(interceptors: Vec<Box<dyn KeyInterceptor>>) -> Self {
        Self { interceptors }
    }

    pub fn add_interceptor(&mut self, interceptor: Box<dyn KeyInterceptor>) {
        self.interceptors.push(interceptor);
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Passes `event` through every interceptor in order and returns the
    /// resulting claim.
    pub fn handle_key(&self, event: &mut KeyEvent) -> ClaimToken {
        let mut claim = ClaimToken::default();
        for interceptor in &self.interceptors {
            interceptor.intercept(event, &mut claim);
        }
        if let Some(name) = claim.claimed_by() {
            debug!(keystroke = %event.keystroke, interceptor = name, "keystroke claimed");
        }
        claim
    }
}
