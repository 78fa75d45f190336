//! View configuration.
//!
//! Hosts read the configuration file themselves and hand the text to
//! [`ViewConfig::from_toml_str`]. Every key is optional; unknown keys are ignored.
//!
//! ```toml
//! [viewport]
//! min_overscan = 10
//! overscan_ratio = 0.75
//! pad_lines = 20
//!
//! [diff]
//! debounce_ms = 500
//! inline = false
//! ```

use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::viewport::ViewportConfig;

/// Default diff debounce, in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Diff synchronisation and display settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// Quiet period after the last edit before a diff is requested.
    pub debounce_ms: u64,
    /// Start with inline-diff (unified) display turned on.
    pub inline: bool,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            inline: false,
        }
    }
}

impl DiffConfig {
    /// The debounce interval as a [`Duration`].
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Top-level configuration of an [`EditorSession`](crate::EditorSession).
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Virtualization tunables.
    pub viewport: ViewportConfig,
    /// Diff settings.
    pub diff: DiffConfig,
}

impl ViewConfig {
    /// Parse and validate TOML configuration text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the virtualizer cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ratio = self.viewport.overscan_ratio;
        if !ratio.is_finite() || ratio < 0.0 {
            return Err(ConfigError::Invalid {
                field: "viewport.overscan_ratio",
                reason: format!("expected a finite, non-negative number, got {ratio}"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::{DEFAULT_MIN_OVERSCAN, DEFAULT_OVERSCAN_RATIO, DEFAULT_PAD_LINES};

    #[test]
    fn test_empty_text_gives_defaults() {
        let config = ViewConfig::from_toml_str("").unwrap();
        assert_eq!(config, ViewConfig::default());
        assert_eq!(config.viewport.min_overscan, DEFAULT_MIN_OVERSCAN);
        assert_eq!(config.viewport.overscan_ratio, DEFAULT_OVERSCAN_RATIO);
        assert_eq!(config.viewport.pad_lines, DEFAULT_PAD_LINES);
        assert_eq!(config.diff.debounce(), Duration::from_millis(500));
        assert!(!config.diff.inline);
    }

    #[test]
    fn test_partial_tables_keep_other_defaults() {
        let config = ViewConfig::from_toml_str(
            "[viewport]\noverscan_ratio = 1.5\n\n[diff]\ninline = true\nunknown = 1\n",
        )
        .unwrap();
        assert_eq!(config.viewport.overscan_ratio, 1.5);
        assert_eq!(config.viewport.min_overscan, DEFAULT_MIN_OVERSCAN);
        assert!(config.diff.inline);
        assert_eq!(config.diff.debounce_ms, DEFAULT_DEBOUNCE_MS);
    }

    #[test]
    fn test_parse_error() {
        let err = ViewConfig::from_toml_str("[viewport]\nmin_overscan = \"many\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_negative_ratio_is_invalid() {
        let err = ViewConfig::from_toml_str("[viewport]\noverscan_ratio = -0.5\n").unwrap_err();
        match err {
            ConfigError::Invalid { field, .. } => assert_eq!(field, "viewport.overscan_ratio"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
