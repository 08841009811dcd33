/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

use std::path::Path;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::common::Credit;
use crate::stream::StreamPriority;

/// Name of the configuration file looked up in the XDG config directories.
const CONFIG_FILE: &str = "stream.toml";

/// Configuration for Acton streams
///
/// This struct contains the defaults applied to new inbound paths and the
/// limits used when creating actor mailboxes, loaded from TOML files in
/// XDG-compliant directories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Default values for new paths
    pub defaults: DefaultsConfig,
    /// Limits and capacity configuration
    pub limits: LimitsConfig,
}

/// Default values applied when a path is constructed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Batch size hint echoed to sources until the manager picks another one
    pub desired_batch_size: Credit,
    /// Priority of a new path
    pub priority: StreamPriority,
}

/// Limits and capacity configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// MPSC channel size for actor mailboxes created with `ActorHandle::with_name`
    pub mailbox_capacity: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            desired_batch_size: 50,
            priority: StreamPriority::Normal,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: 255,
        }
    }
}

impl StreamConfig {
    /// Parse a configuration from TOML text.
    ///
    /// Missing sections and keys fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML or a value has the wrong type.
    pub fn from_toml_str(config_str: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(config_str)?;
        Ok(config.sanitized())
    }

    /// Read and parse a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let config_str = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&config_str)
    }

    /// Load configuration from XDG-compliant locations
    ///
    /// Looks for `$XDG_CONFIG_HOME/acton/stream.toml` (falling back to
    /// `~/.config/acton/stream.toml`). If no configuration file is found,
    /// returns the default configuration. If a configuration file exists but is
    /// malformed, logs an error and uses defaults.
    pub fn load() -> Self {
        let xdg_dirs = match xdg::BaseDirectories::with_prefix("acton") {
            Ok(dirs) => dirs,
            Err(e) => {
                error!("Failed to initialize XDG directories: {}", e);
                return Self::default();
            }
        };

        if let Some(path) = xdg_dirs.find_config_file(CONFIG_FILE) {
            info!("Loading stream configuration from: {}", path.display());
            match Self::load_from(&path) {
                Ok(config) => config,
                Err(e) => {
                    error!("Failed to load configuration file {}: {}", path.display(), e);
                    Self::default()
                }
            }
        } else {
            info!("No stream configuration file found, using defaults");
            Self::default()
        }
    }

    /// Replaces values that can never be valid with their defaults.
    fn sanitized(mut self) -> Self {
        if self.defaults.desired_batch_size < 0 {
            error!(
                desired_batch_size = self.defaults.desired_batch_size,
                "Negative desired_batch_size in configuration, using default"
            );
            self.defaults.desired_batch_size = DefaultsConfig::default().desired_batch_size;
        }
        // tokio rejects zero-capacity channels
        if self.limits.mailbox_capacity == 0 {
            error!("Zero mailbox_capacity in configuration, using default");
            self.limits.mailbox_capacity = LimitsConfig::default().mailbox_capacity;
        }
        self
    }
}

lazy_static! {
    /// Global configuration instance loaded from XDG-compliant locations
    pub static ref CONFIG: StreamConfig = StreamConfig::load();
}
