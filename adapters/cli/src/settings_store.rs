//! TOML file backing the persisted settings and daily totals.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use log::info;
use vision_drill_core::{Setting, Settings};
use vision_drill_session::{Store, StoreError};

/// Settings store that rewrites a TOML file on every save.
#[derive(Debug)]
pub(crate) struct TomlFileStore {
    path: PathBuf,
    settings: Settings,
}

impl TomlFileStore {
    /// Loads the settings at `path`, starting from defaults when the file is missing.
    pub(crate) fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let settings = match fs::read_to_string(&path) {
            Ok(contents) => toml::from_str(&contents)
                .with_context(|| format!("failed to parse settings at {}", path.display()))?,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                info!("no settings at {}; using defaults", path.display());
                Settings::default()
            }
            Err(error) => {
                return Err(error)
                    .with_context(|| format!("failed to read settings at {}", path.display()))
            }
        };
        Ok(Self { path, settings })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl Store for TomlFileStore {
    fn settings(&self) -> &Settings {
        &self.settings
    }

    fn set(&mut self, setting: Setting) {
        self.settings.set(setting);
    }

    fn save(&mut self, patch: &[Setting]) -> Result<(), StoreError> {
        for setting in patch {
            self.settings.set(*setting);
        }
        let contents = toml::to_string_pretty(&self.settings)
            .map_err(|error| StoreError::Encode(error.to_string()))?;
        fs::write(&self.path, contents).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}
