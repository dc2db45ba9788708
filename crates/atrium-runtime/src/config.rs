// Copyright 2026 the atrium project authors
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

//! Preference documents.
//!
//! Preferences are one JSON file; every field has a default, so a partial
//! (or absent) document always yields a usable configuration.

use atrium_core::platform::WindowSettings;
use atrium_core::render::ContextSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read preferences at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("preferences at {path} are not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A single path entry in a plugin or script list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathEntry {
    pub path: PathBuf,
}

impl PathEntry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Launcher preferences: window setup, context setup, and the plugin and
/// startup-script lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub window: WindowSettings,
    pub context: ContextSettings,
    pub plugins: Vec<PathEntry>,
    pub scripts: Vec<PathEntry>,
}

impl Preferences {
    /// Reads preferences from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Writes preferences as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, text).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads preferences, falling back to defaults on any failure. A missing
    /// file is seeded with the defaults so the next run finds one; a broken
    /// file is left alone and reported.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(prefs) => prefs,
            Err(ConfigError::Io { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                log::info!("no preferences at {}, writing defaults", path.display());
                let prefs = Self::default();
                if let Err(err) = prefs.save(path) {
                    log::warn!("default preferences could not be written: {err}");
                }
                prefs
            }
            Err(err) => {
                log::warn!("preferences ignored: {err}");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("atrium-config-{}-{name}.json", std::process::id()));
        path
    }

    #[test]
    fn partial_document_fills_in_defaults() {
        let prefs: Preferences = serde_json::from_str(
            r#"{
                "window": { "title": "atrium" },
                "plugins": [ { "path": "sandbox" } ]
            }"#,
        )
        .unwrap();
        assert_eq!(prefs.window.title, "atrium");
        assert_eq!(prefs.window.video.size, [1280, 720]);
        assert_eq!(prefs.context.major, 4);
        assert_eq!(prefs.plugins, vec![PathEntry::new("sandbox")]);
        assert!(prefs.scripts.is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let path = scratch_path("roundtrip");
        let mut prefs = Preferences::default();
        prefs.window.title = "editor".to_string();
        prefs.scripts.push(PathEntry::new("startup.ms"));
        prefs.save(&path).unwrap();
        assert_eq!(Preferences::load(&path).unwrap(), prefs);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_file_is_seeded_with_defaults() {
        let path = scratch_path("seeded");
        std::fs::remove_file(&path).ok();
        let prefs = Preferences::load_or_default(&path);
        assert_eq!(prefs, Preferences::default());
        assert!(path.exists());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn broken_json_falls_back_without_overwriting() {
        let path = scratch_path("broken");
        std::fs::write(&path, "{ not json").unwrap();
        let prefs = Preferences::load_or_default(&path);
        assert_eq!(prefs, Preferences::default());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
        std::fs::remove_file(&path).ok();
    }
}
