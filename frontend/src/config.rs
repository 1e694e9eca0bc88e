//! Build-time configuration, read from the environment `trunk build` runs in.

use log::{Level, LevelFilter};

use crate::session::SessionScope;

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8011";

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub api_base: String,
    pub session_scope: SessionScope,
    pub log_level: LevelFilter,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            session_scope: SessionScope::TabScoped,
            log_level: LevelFilter::Info,
        }
    }
}

impl AppConfig {
    /// `FINEASE_API_BASE`, `FINEASE_SESSION_SCOPE` and `FINEASE_LOG_LEVEL`.
    pub fn from_env() -> Self {
        Self::from_values(
            option_env!("FINEASE_API_BASE"),
            option_env!("FINEASE_SESSION_SCOPE"),
            option_env!("FINEASE_LOG_LEVEL"),
        )
    }

    /// Unset or unparsable values keep their defaults.
    pub fn from_values(api_base: Option<&str>, scope: Option<&str>, level: Option<&str>) -> Self {
        let mut config = AppConfig::default();
        if let Some(base) = api_base.map(str::trim).filter(|b| !b.is_empty()) {
            config.api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(scope) = scope.and_then(|s| s.parse().ok()) {
            config.session_scope = scope;
        }
        if let Some(level) = level.and_then(|l| l.parse().ok()) {
            config.log_level = level;
        }
        config
    }

    /// Level for the console logger, or `None` when logging is off.
    pub fn console_level(&self) -> Option<Level> {
        self.log_level.to_level()
    }
}
