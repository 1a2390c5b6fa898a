use serde::{Deserialize, Serialize};

/// Placeholder written into a freshly created config file
pub const API_KEY_PLACEHOLDER: &str = "YOUR_TMDB_API_KEY";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// TMDB v3 API key (overridden by `TMDB_API_KEY` when set)
    #[serde(default)]
    pub api_key: String,

    /// Optional custom API root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,

    /// Root of the public site used to build result links
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_base: Option<String>,

    /// Term searched when the search bar is empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_query: Option<String>,

    /// Delay before a keystroke's request goes out; newer keystrokes cancel it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throttle_ms: Option<u64>,

    /// Enable debug logging to a file
    #[serde(default)]
    pub debug: bool,

    /// Log file or directory (defaults next to the config file)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_log_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_log_rotation: Option<DebugLogRotation>,

    /// Number of rotated log files to keep
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_log_keep: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: API_KEY_PLACEHOLDER.to_string(),
            api_base: Some("https://api.themoviedb.org".to_string()),
            site_base: Some("https://www.themoviedb.org".to_string()),
            default_query: Some(crate::search::DEFAULT_QUERY.to_string()),
            throttle_ms: Some(150),
            debug: false,
            debug_log_path: None,
            debug_log_rotation: None,
            debug_log_keep: None,
        }
    }
}

impl Config {
    /// Replace the file's API key when an override is present and non-empty
    pub fn with_api_key_override(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.api_key = key.trim().to_string();
        }
        self
    }

    pub fn has_api_key(&self) -> bool {
        let key = self.api_key.trim();
        !key.is_empty() && key != API_KEY_PLACEHOLDER
    }
}

/// How debug log files are rotated
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DebugLogRotation {
    /// Append to a single file
    None,
    /// One file per day
    Daily,
    /// One file per run
    Session,
}
