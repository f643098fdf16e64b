//! Configuration loading and database URL resolution
//!
//! Settings resolution follows a fixed priority order:
//! 1. Command-line argument (highest priority)
//! 2. `VINOS_CONFIG` environment variable
//! 3. `./vinos.toml`
//! 4. `<config dir>/vinos/vinos.toml`
//! 5. Compiled defaults (fallback)
//!
//! A missing settings file is never fatal; a malformed one is.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::schema::DecimalStyle;
use crate::{Error, Result};

/// Environment variable naming the settings file
pub const CONFIG_ENV: &str = "VINOS_CONFIG";

/// Environment variable holding the database connection string
pub const DATABASE_URL_ENV: &str = "VINOS_DATABASE_URL";

/// Default location of the secret store
pub const DEFAULT_SECRETS_PATH: &str = ".vinos/secrets.toml";

/// Dashboard settings (`vinos.toml`)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Listen address of the dashboard
    pub bind_addr: String,
    /// Directory holding model artifacts and metrics files
    pub models_dir: PathBuf,
    /// Row limit of the sample-data query; 0 loads the whole table
    pub sample_limit: Option<u32>,
    /// Seconds before cached sample data is reloaded
    pub sample_ttl_secs: u64,
    /// Decimal convention assumed for uploaded files
    pub decimal: DecimalStyle,
    /// Secret store holding `database_url`
    pub secrets_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5780".to_string(),
            models_dir: PathBuf::from("models"),
            sample_limit: Some(100),
            sample_ttl_secs: 600,
            decimal: DecimalStyle::Comma,
            secrets_file: PathBuf::from(DEFAULT_SECRETS_PATH),
        }
    }
}

impl Settings {
    /// Parse settings from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Configuration(format!("Parse settings failed: {}", e)))
    }

    /// Resolve and load the settings file, falling back to defaults
    pub fn load(cli_path: Option<&Path>) -> Result<Self> {
        let Some(path) = resolve_settings_path(cli_path) else {
            info!("No settings file found, using defaults");
            return Ok(Self::default());
        };

        if !path.exists() {
            warn!("Settings file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(&path)?;
        let settings = Self::from_toml(&text)?;
        info!("Loaded settings from {}", path.display());
        Ok(settings)
    }
}

/// Pick the settings file by priority; `None` when nothing applies
pub fn resolve_settings_path(cli_path: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_path {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Working directory
    let local = PathBuf::from("vinos.toml");
    if local.exists() {
        return Some(local);
    }

    // Priority 4: Platform config directory
    dirs::config_dir()
        .map(|d| d.join("vinos").join("vinos.toml"))
        .filter(|p| p.exists())
}

#[derive(Debug, Default, Deserialize)]
struct Secrets {
    database_url: Option<String>,
}

/// Strip whitespace and one layer of surrounding quotes
fn clean_url(raw: &str) -> Option<String> {
    let cleaned = raw.trim().trim_matches(|c| c == '\'' || c == '"').trim();
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

/// Find the database connection string
///
/// **Priority:** `VINOS_DATABASE_URL` → `database_url` in the secret store.
/// Absence of both is a [`Error::Configuration`]; callers are expected to
/// degrade the features that need the database, not to exit.
pub fn resolve_database_url(secrets_path: &Path) -> Result<String> {
    if let Some(url) = std::env::var(DATABASE_URL_ENV).ok().as_deref().and_then(clean_url) {
        info!("Database URL loaded from environment variable");
        return Ok(url);
    }

    if secrets_path.exists() {
        let text = std::fs::read_to_string(secrets_path)?;
        let secrets: Secrets = toml::from_str(&text).map_err(|e| {
            Error::Configuration(format!(
                "Parse secret store {} failed: {}",
                secrets_path.display(),
                e
            ))
        })?;
        if let Some(url) = secrets.database_url.as_deref().and_then(clean_url) {
            info!("Database URL loaded from {}", secrets_path.display());
            return Ok(url);
        }
    }

    Err(Error::Configuration(format!(
        "Database connection not configured. Set {} or database_url in {}",
        DATABASE_URL_ENV,
        secrets_path.display()
    )))
}
