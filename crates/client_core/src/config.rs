use std::time::Duration;

const SYNC_WARNING_VISIBLE: Duration = Duration::from_millis(2000);
const SYNC_WARNING_FADE: Duration = Duration::from_millis(1000);
const SYNCING_FADE: Duration = Duration::from_millis(1000);

/// Timers for the transient sync indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimings {
    /// How long the "not connected" banner stays fully visible.
    pub sync_warning_visible: Duration,
    pub sync_warning_fade: Duration,
    /// Fade applied to the "syncing" indicator once the channel goes idle.
    pub syncing_fade: Duration,
}

impl Default for SessionTimings {
    fn default() -> Self {
        Self {
            sync_warning_visible: SYNC_WARNING_VISIBLE,
            sync_warning_fade: SYNC_WARNING_FADE,
            syncing_fade: SYNCING_FADE,
        }
    }
}
