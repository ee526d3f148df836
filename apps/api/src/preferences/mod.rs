//! UI preferences (theme and language), read once at startup and written back
//! on every change. The only state that outlives the process.

pub mod handlers;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("could not write preferences to {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not encode preferences: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ar,
}

impl Language {
    /// Text direction for the language: `"rtl"` for Arabic, `"ltr"` otherwise.
    pub fn direction(self) -> &'static str {
        match self {
            Language::En => "ltr",
            Language::Ar => "rtl",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default)]
    pub dark_mode: bool,
    #[serde(default)]
    pub language: Language,
}

/// Partial update; absent fields keep their value.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesUpdate {
    pub dark_mode: Option<bool>,
    pub language: Option<Language>,
}

impl Preferences {
    pub fn apply(self, update: PreferencesUpdate) -> Self {
        Self {
            dark_mode: update.dark_mode.unwrap_or(self.dark_mode),
            language: update.language.unwrap_or(self.language),
        }
    }
}

#[derive(Clone)]
pub struct PreferenceStore {
    path: PathBuf,
    current: Arc<RwLock<Preferences>>,
}

impl PreferenceStore {
    /// Reads the preference file. A missing or unreadable file yields defaults.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("Ignoring malformed preferences in {}: {e}", path.display());
                Preferences::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Preferences::default(),
            Err(e) => {
                warn!("Could not read preferences from {}: {e}", path.display());
                Preferences::default()
            }
        };
        info!("Preferences loaded: {current:?}");
        Self {
            path,
            current: Arc::new(RwLock::new(current)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn get(&self) -> Preferences {
        *self.current.read().await
    }

    /// Applies the update and persists the result. The in-memory value changes
    /// only if the write succeeds.
    pub async fn update(&self, update: PreferencesUpdate) -> Result<Preferences, PreferencesError> {
        let mut current = self.current.write().await;
        let next = current.apply(update);
        let encoded = serde_json::to_string_pretty(&next)?;
        tokio::fs::write(&self.path, encoded)
            .await
            .map_err(|source| PreferencesError::Write {
                path: self.path.display().to_string(),
                source,
            })?;
        *current = next;
        Ok(next)
    }
}
