use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context};
use client_core::{SessionTimings, TransportOptions};
use serde::Deserialize;
use shared::domain::{UserId, UserIdentity};

const DEFAULT_CONFIG_FILE: &str = "collab.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub user_id: String,
    pub user_name: String,
    pub color_id: u32,
    pub sync_warning_visible_ms: u64,
    pub sync_warning_fade_ms: u64,
    pub syncing_fade_ms: u64,
    /// Zero disables reconnection.
    pub reconnect_delay_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        let timings = SessionTimings::default();
        Self {
            server_url: "ws://127.0.0.1:8080/channel".into(),
            user_id: "local".into(),
            user_name: "anonymous".into(),
            color_id: 0,
            sync_warning_visible_ms: millis(timings.sync_warning_visible),
            sync_warning_fade_ms: millis(timings.sync_warning_fade),
            syncing_fade_ms: millis(timings.syncing_fade),
            reconnect_delay_ms: TransportOptions::default()
                .reconnect_delay
                .map(millis)
                .unwrap_or_default(),
        }
    }
}

impl Settings {
    pub fn identity(&self) -> UserIdentity {
        UserIdentity {
            user_id: UserId::new(self.user_id.clone()),
            name: self.user_name.clone(),
            color_id: self.color_id,
        }
    }

    pub fn session_timings(&self) -> SessionTimings {
        SessionTimings {
            sync_warning_visible: Duration::from_millis(self.sync_warning_visible_ms),
            sync_warning_fade: Duration::from_millis(self.sync_warning_fade_ms),
            syncing_fade: Duration::from_millis(self.syncing_fade_ms),
        }
    }

    pub fn transport_options(&self) -> TransportOptions {
        TransportOptions {
            reconnect_delay: (self.reconnect_delay_ms > 0)
                .then(|| Duration::from_millis(self.reconnect_delay_ms)),
            ..TransportOptions::default()
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    server_url: Option<String>,
    user_id: Option<String>,
    user_name: Option<String>,
    color_id: Option<u32>,
    sync_warning_visible_ms: Option<u64>,
    sync_warning_fade_ms: Option<u64>,
    syncing_fade_ms: Option<u64>,
    reconnect_delay_ms: Option<u64>,
}

/// Defaults, then the TOML file, then environment variables. An explicit
/// `config_path` must exist; the default `collab.toml` is optional.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let (path, required) = match config_path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    match fs::read_to_string(&path) {
        Ok(raw) => {
            let file_cfg: FileSettings = toml::from_str(&raw)
                .with_context(|| format!("failed to parse config file '{}'", path.display()))?;
            apply_file(&mut settings, file_cfg);
        }
        Err(err) if required => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()));
        }
        Err(_) => {}
    }

    apply_env(&mut settings, |key| std::env::var(key).ok())?;
    Ok(settings)
}

fn apply_file(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.server_url {
        settings.server_url = v;
    }
    if let Some(v) = file_cfg.user_id {
        settings.user_id = v;
    }
    if let Some(v) = file_cfg.user_name {
        settings.user_name = v;
    }
    if let Some(v) = file_cfg.color_id {
        settings.color_id = v;
    }
    if let Some(v) = file_cfg.sync_warning_visible_ms {
        settings.sync_warning_visible_ms = v;
    }
    if let Some(v) = file_cfg.sync_warning_fade_ms {
        settings.sync_warning_fade_ms = v;
    }
    if let Some(v) = file_cfg.syncing_fade_ms {
        settings.syncing_fade_ms = v;
    }
    if let Some(v) = file_cfg.reconnect_delay_ms {
        settings.reconnect_delay_ms = v;
    }
}

fn apply_env(
    settings: &mut Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<()> {
    if let Some(v) = lookup("COLLAB_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = lookup("APP__SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = lookup("APP__USER_ID") {
        settings.user_id = v;
    }
    if let Some(v) = lookup("APP__USER_NAME") {
        settings.user_name = v;
    }
    if let Some(v) = lookup("APP__COLOR_ID") {
        settings.color_id = parse_number("APP__COLOR_ID", &v)?;
    }
    if let Some(v) = lookup("APP__SYNC_WARNING_VISIBLE_MS") {
        settings.sync_warning_visible_ms = parse_number("APP__SYNC_WARNING_VISIBLE_MS", &v)?;
    }
    if let Some(v) = lookup("APP__SYNC_WARNING_FADE_MS") {
        settings.sync_warning_fade_ms = parse_number("APP__SYNC_WARNING_FADE_MS", &v)?;
    }
    if let Some(v) = lookup("APP__SYNCING_FADE_MS") {
        settings.syncing_fade_ms = parse_number("APP__SYNCING_FADE_MS", &v)?;
    }
    if let Some(v) = lookup("APP__RECONNECT_DELAY_MS") {
        settings.reconnect_delay_ms = parse_number("APP__RECONNECT_DELAY_MS", &v)?;
    }
    Ok(())
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> anyhow::Result<T> {
    match raw.trim().parse() {
        Ok(value) => Ok(value),
        Err(_) => bail!("{key} must be a non-negative integer, got {raw:?}"),
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        env,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_match_session_timings() {
        let settings = Settings::default();
        assert_eq!(settings.session_timings(), SessionTimings::default());
        assert_eq!(
            settings.transport_options().reconnect_delay,
            TransportOptions::default().reconnect_delay
        );
    }

    #[test]
    fn file_values_override_defaults() {
        let file_cfg: FileSettings = toml::from_str(
            r#"
            server_url = "ws://collab.example:9000/ws"
            user_name = "Grace"
            color_id = 7
            syncing_fade_ms = 250
            "#,
        )
        .expect("parse");
        let mut settings = Settings::default();
        apply_file(&mut settings, file_cfg);

        assert_eq!(settings.server_url, "ws://collab.example:9000/ws");
        assert_eq!(settings.user_name, "Grace");
        assert_eq!(settings.color_id, 7);
        assert_eq!(
            settings.session_timings().syncing_fade,
            Duration::from_millis(250)
        );
        assert_eq!(settings.user_id, "local");
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        assert!(toml::from_str::<FileSettings>("bind_addr = \"0.0.0.0\"").is_err());
    }

    #[test]
    fn prefixed_env_wins_over_plain_name() {
        let mut settings = Settings::default();
        apply_env(
            &mut settings,
            env_of(&[
                ("COLLAB_SERVER_URL", "ws://plain/ws"),
                ("APP__SERVER_URL", "ws://prefixed/ws"),
                ("APP__USER_ID", "g.hopper"),
                ("APP__COLOR_ID", "4"),
            ]),
        )
        .expect("env");

        assert_eq!(settings.server_url, "ws://prefixed/ws");
        assert_eq!(settings.identity().user_id, UserId::new("g.hopper"));
        assert_eq!(settings.identity().color_id, 4);
    }

    #[test]
    fn zero_reconnect_delay_disables_reconnection() {
        let mut settings = Settings::default();
        apply_env(&mut settings, env_of(&[("APP__RECONNECT_DELAY_MS", "0")])).expect("env");
        assert_eq!(settings.transport_options().reconnect_delay, None);
    }

    #[test]
    fn malformed_numbers_are_reported() {
        let mut settings = Settings::default();
        let err = apply_env(&mut settings, env_of(&[("APP__SYNCING_FADE_MS", "soon")]))
            .expect_err("should reject");
        assert!(err.to_string().contains("APP__SYNCING_FADE_MS"));
    }

    #[test]
    fn explicit_config_path_must_exist() {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let missing = env::temp_dir().join(format!("collab_console_missing_{suffix}.toml"));

        let err = load_settings(Some(&missing)).expect_err("missing file");
        assert!(format!("{err:#}").contains("failed to read config file"));
    }

    #[test]
    fn explicit_config_file_is_loaded() {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let path = env::temp_dir().join(format!("collab_console_test_{suffix}.toml"));
        fs::write(&path, "user_name = \"Lin\"\n").expect("write config");

        let settings = load_settings(Some(&path)).expect("load");
        fs::remove_file(&path).expect("cleanup");

        // APP__USER_NAME in the test environment would win; only assert when unset.
        if env::var("APP__USER_NAME").is_err() {
            assert_eq!(settings.user_name, "Lin");
        }
    }
}
