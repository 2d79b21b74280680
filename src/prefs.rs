//! Consent preference storage
//!
//! Persists the two user-consent flags (analytics, advertising) in an
//! XDG-compliant config directory as a small JSON file. Each flag carries an
//! expiry roughly one year out; expired or missing entries read as `false`.
//! Entirely independent of the image workflow.

use crate::error::{BgRemovalError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

/// How long a stored consent stays valid
const CONSENT_EXPIRY_DAYS: i64 = 365;

/// The named boolean consent flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentFlag {
    /// Consent to analytics cookies
    Analytics,
    /// Consent to advertising cookies
    Advertising,
}

impl ConsentFlag {
    /// Storage key for this flag
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Analytics => "analytics_consent",
            Self::Advertising => "advertising_consent",
        }
    }

    /// All known flags
    #[must_use]
    pub fn all() -> [Self; 2] {
        [Self::Analytics, Self::Advertising]
    }
}

/// A stored consent value with its expiry
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredConsent {
    value: bool,
    expires_at: DateTime<Utc>,
}

/// On-disk shape of the preferences file
#[derive(Debug, Default, Serialize, Deserialize)]
struct PreferencesFile {
    #[serde(default)]
    consents: BTreeMap<String, StoredConsent>,
}

/// File-backed store for consent preferences
#[derive(Debug, Clone)]
pub struct ConsentStore {
    path: PathBuf,
}

impl ConsentStore {
    /// Create a store in the default config location
    ///
    /// Uses `ERASEEASE_CONFIG_DIR` when set, otherwise the XDG config
    /// directory:
    /// - Linux/macOS: `~/.config/eraseease/preferences.json`
    /// - Windows: `%APPDATA%/eraseease/preferences.json`
    ///
    /// # Errors
    /// - Failed to determine the config directory
    /// - Failed to create the config directory
    pub fn new() -> Result<Self> {
        let dir = Self::config_dir()?;
        if !dir.exists() {
            fs::create_dir_all(&dir)
                .map_err(|e| BgRemovalError::file_io_error("create config directory", &dir, &e))?;
        }
        Ok(Self {
            path: dir.join("preferences.json"),
        })
    }

    /// Create a store backed by an explicit file path
    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    fn config_dir() -> Result<PathBuf> {
        if let Ok(dir_override) = std::env::var("ERASEEASE_CONFIG_DIR") {
            return Ok(PathBuf::from(dir_override));
        }

        Ok(dirs::config_dir()
            .ok_or_else(|| {
                BgRemovalError::invalid_config(
                    "Failed to determine config directory. Set the ERASEEASE_CONFIG_DIR environment variable.",
                )
            })?
            .join("eraseease"))
    }

    /// Persist a consent flag with a fresh ~1 year expiry
    ///
    /// # Errors
    /// - File system errors while writing the preferences file
    pub fn set(&self, flag: ConsentFlag, value: bool) -> Result<()> {
        let mut prefs = self.load();
        prefs.consents.insert(
            flag.key().to_string(),
            StoredConsent {
                value,
                expires_at: Utc::now() + Duration::days(CONSENT_EXPIRY_DAYS),
            },
        );
        self.store(&prefs)
    }

    /// Read a consent flag
    ///
    /// Missing, expired, or unreadable entries read as `false`.
    #[must_use]
    pub fn get(&self, flag: ConsentFlag) -> bool {
        let prefs = self.load();
        prefs
            .consents
            .get(flag.key())
            .filter(|stored| stored.expires_at > Utc::now())
            .map_or(false, |stored| stored.value)
    }

    /// Remove every stored flag
    ///
    /// # Errors
    /// - File system errors while removing the preferences file
    pub fn clear_all(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BgRemovalError::file_io_error(
                "remove preferences file",
                &self.path,
                &e,
            )),
        }
    }

    fn load(&self) -> PreferencesFile {
        match fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                log::warn!(
                    "Unreadable preferences file '{}': {e}. Treating as empty.",
                    self.path.display()
                );
                PreferencesFile::default()
            }),
            Err(_) => PreferencesFile::default(),
        }
    }

    /// Write the preferences file atomically (temp file, then rename)
    fn store(&self, prefs: &PreferencesFile) -> Result<()> {
        let json = serde_json::to_vec_pretty(prefs).map_err(|e| {
            BgRemovalError::invalid_config(format!("Failed to serialize preferences: {e}"))
        })?;

        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, &json)
            .map_err(|e| BgRemovalError::file_io_error("write preferences file", &temp_path, &e))?;
        fs::rename(&temp_path, &self.path).map_err(|e| {
            BgRemovalError::file_io_error("move preferences file into place", &self.path, &e)
        })
    }
}
