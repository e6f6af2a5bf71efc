//! Visibility targets the session toggles, and the timers behind the
//! transient sync indicators.

use std::{
    fmt,
    sync::{Arc, Mutex},
    time::Duration,
};

use tokio::{runtime::Handle, task::JoinHandle};
use tracing::debug;

use crate::{channel::InternalAction, config::SessionTimings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Affordance {
    SyncInProgress,
    SyncDone,
    SyncWarning,
    Connecting,
    Disconnected,
}

impl Affordance {
    pub fn element_id(self) -> &'static str {
        match self {
            Affordance::SyncInProgress => "syncstatussyncing",
            Affordance::SyncDone => "syncstatusdone",
            Affordance::SyncWarning => "syncstatuswarning",
            Affordance::Connecting => "connstatusconnecting",
            Affordance::Disconnected => "connstatusdisconnected",
        }
    }
}

impl fmt::Display for Affordance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.element_id())
    }
}

/// Show/hide capability over the page's status elements.
pub trait UiAffordances: Send + Sync {
    fn show(&self, affordance: Affordance);
    fn hide(&self, affordance: Affordance);
    /// Starts a fade animation. The element is hidden explicitly once the
    /// duration has elapsed.
    fn fade_out(&self, _affordance: Affordance, _duration: Duration) {}
}

/// Drives the sync-warning banner and the "syncing" indicator. Timers run
/// on `runtime`, so the triggers may be called from any thread.
pub struct SyncStatus {
    ui: Arc<dyn UiAffordances>,
    timings: SessionTimings,
    runtime: Handle,
    warning_timer: Mutex<Option<JoinHandle<()>>>,
    syncing_timer: Mutex<Option<JoinHandle<()>>>,
}

impl SyncStatus {
    pub fn new(ui: Arc<dyn UiAffordances>, timings: SessionTimings, runtime: Handle) -> Self {
        Self {
            ui,
            timings,
            runtime,
            warning_timer: Mutex::new(None),
            syncing_timer: Mutex::new(None),
        }
    }

    /// Shows the "not connected" banner, then fades and hides it.
    /// A repeat while the banner is up restarts the full period.
    pub fn warn_not_connected(&self) {
        self.ui.show(Affordance::SyncWarning);
        let handle = spawn_fade(
            &self.runtime,
            Arc::clone(&self.ui),
            Affordance::SyncWarning,
            self.timings.sync_warning_visible,
            self.timings.sync_warning_fade,
        );
        replace_timer(&self.warning_timer, Some(handle));
    }

    pub fn on_internal_action(&self, action: &InternalAction) {
        match action {
            InternalAction::CommitPerformed => {
                replace_timer(&self.syncing_timer, None);
                self.ui.hide(Affordance::SyncDone);
                self.ui.show(Affordance::SyncInProgress);
            }
            InternalAction::NewlyIdle => {
                let handle = spawn_fade(
                    &self.runtime,
                    Arc::clone(&self.ui),
                    Affordance::SyncInProgress,
                    Duration::ZERO,
                    self.timings.syncing_fade,
                );
                replace_timer(&self.syncing_timer, Some(handle));
            }
            InternalAction::Other(name) => {
                debug!(action = %name, "ignoring unrecognised internal action");
            }
        }
    }
}

impl Drop for SyncStatus {
    fn drop(&mut self) {
        replace_timer(&self.warning_timer, None);
        replace_timer(&self.syncing_timer, None);
    }
}

fn spawn_fade(
    runtime: &Handle,
    ui: Arc<dyn UiAffordances>,
    affordance: Affordance,
    delay: Duration,
    fade: Duration,
) -> JoinHandle<()> {
    runtime.spawn(async move {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        ui.fade_out(affordance, fade);
        tokio::time::sleep(fade).await;
        ui.hide(affordance);
    })
}

fn replace_timer(slot: &Mutex<Option<JoinHandle<()>>>, next: Option<JoinHandle<()>>) {
    let previous = match slot.lock() {
        Ok(mut guard) => std::mem::replace(&mut *guard, next),
        Err(poisoned) => std::mem::replace(&mut *poisoned.into_inner(), next),
    };
    if let Some(previous) = previous {
        previous.abort();
    }
}

#[cfg(test)]
#[path = "tests/ui_tests.rs"]
mod tests;
