//! Journal configuration (from the host's `journal.toml` section).

use serde::Deserialize;

use compass_types::Result;

/// Tunables for history presentation and state capture.
#[derive(Debug, Clone, Deserialize)]
pub struct JournalConfig {
    /// Entries shown per direction in history menus.
    #[serde(default = "default_menu_cap")]
    pub menu_cap: usize,

    /// Capture host-chrome state (e.g. scroll position) into departure
    /// snapshots.
    #[serde(default = "default_capture_viewer_state")]
    pub capture_viewer_state: bool,

    /// Maximum menu label width in characters before truncation.
    #[serde(default = "default_max_menu_label")]
    pub max_menu_label: usize,
}

fn default_menu_cap() -> usize {
    crate::view::DEFAULT_MENU_CAP
}
fn default_capture_viewer_state() -> bool {
    true
}
fn default_max_menu_label() -> usize {
    40
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            menu_cap: default_menu_cap(),
            capture_viewer_state: default_capture_viewer_state(),
            max_menu_label: default_max_menu_label(),
        }
    }
}

impl JournalConfig {
    /// Parse from TOML, filling missing keys with defaults.
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = JournalConfig::default();
        assert_eq!(config.menu_cap, 9);
        assert!(config.capture_viewer_state);
        assert_eq!(config.max_menu_label, 40);
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let config = JournalConfig::from_toml("").unwrap();
        assert_eq!(config.menu_cap, 9);
    }

    #[test]
    fn partial_toml_overrides() {
        let config = JournalConfig::from_toml("menu_cap = 5").unwrap();
        assert_eq!(config.menu_cap, 5);
        assert!(config.capture_viewer_state);
    }

    #[test]
    fn full_toml() {
        let config = JournalConfig::from_toml(
            r#"
            menu_cap = 12
            capture_viewer_state = false
            max_menu_label = 24
            "#,
        )
        .unwrap();
        assert_eq!(config.menu_cap, 12);
        assert!(!config.capture_viewer_state);
        assert_eq!(config.max_menu_label, 24);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(JournalConfig::from_toml("menu_cap = [[[").is_err());
    }
}
