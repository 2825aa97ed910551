//! JSON fixture files recorded from live streams.

use crate::{MemoryTransport, SessionError};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Directory of pretty-printed JSON fixtures.
#[derive(Debug, Clone)]
pub struct FixtureStore {
    root: PathBuf,
}

impl FixtureStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// `{channel}_{SYMBOL}_{kind}_{YYYYmmdd_HHMMSS}.json`, with `/` in the
    /// symbol replaced by `_`.
    pub fn fixture_name(channel: &str, symbol: &str, kind: &str, at: DateTime<Utc>) -> String {
        format!(
            "{}_{}_{}_{}.json",
            channel,
            symbol.replace('/', "_"),
            kind,
            at.format("%Y%m%d_%H%M%S")
        )
    }

    /// Write `value` as pretty JSON, creating the directory on demand.
    pub fn save<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<PathBuf, SessionError> {
        fs::create_dir_all(&self.root)?;
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| SessionError::Fixture(format!("{}: {}", name, e)))?;

        let path = self.path(name);
        fs::write(&path, json)?;
        info!("Saved fixture {}", path.display());
        Ok(path)
    }

    pub fn load<T: DeserializeOwned>(&self, name: &str) -> Result<T, SessionError> {
        let path = self.path(name);
        let text = fs::read_to_string(&path)
            .map_err(|e| SessionError::Fixture(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&text)
            .map_err(|e| SessionError::Fixture(format!("{}: {}", path.display(), e)))
    }

    /// Load a recorded fixture into a transport that replays it frame by frame.
    /// An array yields one frame per element; any other value is one frame.
    pub fn replay(&self, name: &str) -> Result<MemoryTransport, SessionError> {
        let frames: Vec<String> = match self.load::<Value>(name)? {
            Value::Array(items) => items.iter().map(Value::to_string).collect(),
            other => vec![other.to_string()],
        };
        Ok(MemoryTransport::replay(frames))
    }
}
