//! Settings model.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use mailsuggest_core::DEFAULT_MAX_RESULTS;
use serde::{Deserialize, Serialize};

/// Where the recipient history is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// `SQLite` database.
    #[default]
    Sqlite,
    /// XML history document.
    Xml,
}

impl StoreBackend {
    /// File name used when no explicit path is configured.
    pub const fn default_file_name(self) -> &'static str {
        match self {
            Self::Sqlite => "history.db",
            Self::Xml => "history.xml",
        }
    }
}

/// Application settings that persist across sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Maximum number of suggestions per lookup.
    pub max_results: usize,
    /// History backend.
    pub backend: StoreBackend,
    /// Explicit history location; defaults to the data directory.
    pub history_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            backend: StoreBackend::default(),
            history_path: None,
        }
    }
}

impl Settings {
    /// Default location of the settings file.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mailsuggest")
            .join("settings.json")
    }

    /// Load settings from `path`, falling back to defaults when it does not exist.
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading settings from {}", path.display()))?;
        let settings: Self = serde_json::from_str(&contents)
            .with_context(|| format!("parsing settings in {}", path.display()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to `path`.
    pub async fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, contents)
            .await
            .with_context(|| format!("writing settings to {}", path.display()))?;

        tracing::info!("Settings saved to {:?}", path);
        Ok(())
    }

    /// Reject settings that cannot produce suggestions.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_results == 0 {
            bail!("max_results must be at least 1");
        }
        Ok(())
    }

    /// Resolved history location for the configured backend.
    pub fn history_path(&self) -> PathBuf {
        self.history_path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("mailsuggest")
                .join(self.backend.default_file_name())
        })
    }
}
