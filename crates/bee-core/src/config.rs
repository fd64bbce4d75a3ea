//! Panel configuration: where the agent lives and how patient to be with it.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Default agent address; matches the backend's own default bind.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
/// Per-request timeout, seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 20;
/// Results requested per memory search.
pub const DEFAULT_SEARCH_RESULT_LIMIT: u32 = 6;

/// Hive Manager configuration.
///
/// | Env | Default | Description |
/// |-----|---------|-------------|
/// | BEE_BASE_URL | http://localhost:8080 | Agent backend base URL. |
/// | BEE_REQUEST_TIMEOUT_SECS | 20 | Timeout for every backend request. |
/// | BEE_SEARCH_RESULT_LIMIT | 6 | `result_limit` sent with memory searches. |
/// | BEE_WINDOW_WIDTH / BEE_WINDOW_HEIGHT | 560 / 760 | Control panel window size. |
#[derive(Debug, Clone, Deserialize)]
pub struct PanelConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub search_result_limit: u32,
    #[serde(default = "default_window_width")]
    pub window_width: f32,
    #[serde(default = "default_window_height")]
    pub window_height: f32,
}

fn default_window_width() -> f32 {
    560.0
}

fn default_window_height() -> f32 {
    760.0
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            search_result_limit: DEFAULT_SEARCH_RESULT_LIMIT,
            window_width: default_window_width(),
            window_height: default_window_height(),
        }
    }
}

impl PanelConfig {
    /// Load config from file and environment. Precedence: `BEE_*` env > file at `BEE_CONFIG`
    /// (or `config/bee.toml`) > defaults.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path = std::env::var("BEE_CONFIG").unwrap_or_else(|_| "config/bee.toml".to_string());
        Self::load_from(Path::new(&config_path))
    }

    /// Same as `load` with an explicit file path; a missing file is not an error.
    pub fn load_from(path: &Path) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .set_default("base_url", DEFAULT_BASE_URL)?
            .set_default("request_timeout_secs", DEFAULT_REQUEST_TIMEOUT_SECS as i64)?
            .set_default("search_result_limit", i64::from(DEFAULT_SEARCH_RESULT_LIMIT))?;

        let builder = if path.exists() {
            builder.add_source(config::File::from(path))
        } else {
            builder
        };

        let built = builder
            .add_source(
                config::Environment::with_prefix("BEE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let mut cfg: PanelConfig = built.try_deserialize()?;
        cfg.base_url = cfg.base_url.trim().trim_end_matches('/').to_string();
        cfg.search_result_limit = cfg.search_result_limit.max(1);
        Ok(cfg)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = PanelConfig::load_from(Path::new("does/not/exist.toml")).unwrap();
        // BEE_* may be set in a developer shell; only check what env cannot blank out.
        assert!(!cfg.base_url.ends_with('/'));
        assert!(cfg.search_result_limit >= 1);
        assert!(cfg.request_timeout() >= Duration::from_secs(1));
    }

    #[test]
    fn file_values_are_normalized() {
        let path = std::env::temp_dir().join(format!("bee-config-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            "base_url = \" http://hive:9000/ \"\nsearch_result_limit = 0\nwindow_width = 800.0\n",
        )
        .unwrap();
        let cfg = PanelConfig::load_from(&path).unwrap();
        std::fs::remove_file(&path).ok();

        if std::env::var("BEE_BASE_URL").is_err() {
            assert_eq!(cfg.base_url, "http://hive:9000");
        }
        if std::env::var("BEE_SEARCH_RESULT_LIMIT").is_err() {
            assert_eq!(cfg.search_result_limit, 1);
        }
        if std::env::var("BEE_WINDOW_WIDTH").is_err() {
            assert_eq!(cfg.window_width, 800.0);
        }
    }

    #[test]
    fn default_matches_documented_values() {
        let cfg = PanelConfig::default();
        assert_eq!(cfg.base_url, "http://localhost:8080");
        assert_eq!(cfg.request_timeout_secs, 20);
        assert_eq!(cfg.search_result_limit, 6);
    }
}
