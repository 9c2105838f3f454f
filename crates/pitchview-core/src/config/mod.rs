// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Persisted viewer configuration.
//!
//! The configuration is a single RON document. Every section and field is
//! optional; anything missing falls back to the defaults below.

use crate::renderer::GraphicsSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file '{path}': {source}")]
    Io {
        /// The file that was requested.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The document is not valid RON for [`ViewerConfig`].
    #[error("invalid config: {0}")]
    Parse(String),
}

/// Settings that are not graphics related.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// The log file replayed in [`RunMode::Replay`](crate::RunMode::Replay).
    pub log_replay_file: Option<PathBuf>,
    /// How long `init` waits for a replay source to signal readiness.
    pub replay_ready_timeout_ms: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_replay_file: None,
            replay_ready_timeout_ms: 500,
        }
    }
}

/// The simulation server a live feed connects to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host name or address.
    pub host: String,
    /// TCP port of the monitor interface.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_owned(),
            port: 3200,
        }
    }
}

impl ServerConfig {
    /// `host:port`, suitable for socket address resolution.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// The complete persisted configuration of the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Data source settings.
    pub general: GeneralConfig,
    /// Live feed target.
    pub server: ServerConfig,
    /// Graphics toggles.
    pub graphics: GraphicsSettings,
}

impl ViewerConfig {
    /// Reads and parses a RON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_ron_str(&text)?;
        log::info!("Loaded viewer configuration from {}", path.display());
        Ok(config)
    }

    /// Parses a configuration from a RON string.
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        ron::de::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serializes the configuration back to pretty RON.
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        let pretty = ron::ser::PrettyConfig::default().indentor("  ".to_string());
        ron::ser::to_string_pretty(self, pretty).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}
