//! Storefront configuration
//!
//! Every field has a default, so an empty JSON object is a valid config:
//!
//! ```
//! use shopbus::config::ShopConfig;
//!
//! let config = ShopConfig::from_json(r#"{ "notifications": { "maxVisible": 3 } }"#).unwrap();
//! assert_eq!(config.notifications.max_visible, 3);
//! assert_eq!(config.notifications.default_duration_ms, 4000);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::events::EventName;
use crate::logging::{ActionLogConfig, LogFilter};
use crate::{EventKind, UnknownEvent};

/// Errors raised while loading a [`ShopConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("event filter pattern `{pattern}` matches no event")]
    UnknownEventPattern {
        pattern: String,
        #[source]
        source: UnknownEvent,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NotificationSettings {
    /// Used when a show request has no duration or a zero duration
    pub default_duration_ms: u64,
    /// Oldest notifications are dropped beyond this many
    pub max_visible: usize,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            default_duration_ms: 4000,
            max_visible: 5,
        }
    }
}

impl NotificationSettings {
    pub fn default_duration(&self) -> Duration {
        match self.default_duration_ms {
            0 => Duration::from_millis(4000),
            ms => Duration::from_millis(ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoggingSettings {
    /// Cart actions kept in memory and written to the log
    pub actions: ActionLogConfig,
    /// Bus events written to the log
    pub events: LogFilter,
    /// Whether the event tracer is attached at all
    pub trace_events: bool,
    /// Analytics log entries kept in memory
    pub analytics_capacity: usize,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            actions: ActionLogConfig::default(),
            events: LogFilter::default(),
            trace_events: true,
            analytics_capacity: crate::analytics::DEFAULT_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShopConfig {
    pub notifications: NotificationSettings,
    pub logging: LoggingSettings,
    /// Attached to analytics events published through `Analytics::track`
    pub user_id: Option<String>,
}

impl ShopConfig {
    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ShopConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Check that every literal event filter pattern names a real event
    ///
    /// Patterns containing `*` or `?` are globs and are accepted as long as
    /// they match at least one event.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for pattern in self.logging.events.patterns() {
            let known = if pattern.contains(['*', '?']) {
                EventName::all()
                    .iter()
                    .any(|kind| crate::logging::glob_match(pattern, kind.name()))
            } else {
                EventName::from_name(pattern).is_some()
            };
            if !known {
                return Err(ConfigError::UnknownEventPattern {
                    pattern: pattern.to_string(),
                    source: UnknownEvent::new(pattern),
                });
            }
        }
        Ok(())
    }
}
