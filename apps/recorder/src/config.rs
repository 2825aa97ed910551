//! Application configuration.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use streamprobe_feeds::SessionConfig;

/// Recorder configuration, optionally loaded from a JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Session settings. Defaults come from the environment.
    pub session: SessionConfig,
    /// Directory fixtures are written to.
    pub fixtures_dir: String,
    /// Per-receive wait while watching for silence (ms).
    pub silence_poll_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::from_env(),
            fixtures_dir: "fixtures".to_string(),
            silence_poll_ms: 1000,
        }
    }
}

impl AppConfig {
    /// Load from `path`, or use defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&text).map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn silence_poll(&self) -> Duration {
        Duration::from_millis(self.silence_poll_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_load_without_file() {
        let config = AppConfig::load(None).unwrap();
        assert_eq!(config.fixtures_dir, "fixtures");
        assert_eq!(config.silence_poll(), Duration::from_secs(1));
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"session": {{"ws_url": "ws://127.0.0.1:9000"}}, "fixtures_dir": "out"}}"#
        )
        .unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.session.ws_url, "ws://127.0.0.1:9000");
        assert_eq!(config.session.timeout_ms, 30_000);
        assert_eq!(config.fixtures_dir, "out");
        assert_eq!(config.silence_poll_ms, 1000);
    }

    #[test]
    fn test_load_missing_file() {
        let result = AppConfig::load(Some(Path::new("/nonexistent/streamprobe.json")));
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
