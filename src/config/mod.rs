//! Gate configuration store.
//!
//! The configuration is a small JSON document edited out of band:
//!
//! ```json
//! { "passwordProtected": true, "password": "...", "adminPassword": "..." }
//! ```
//!
//! It is re-read on every call so edits apply to the next request. Each field
//! falls back to its default on its own, so a file that only sets
//! `passwordProtected` still yields usable passwords.

use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};
use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Process-relative location of the configuration file.
pub const DEFAULT_CONFIG_FILE: &str = "app/admin/config/site-config.json";

// Placeholder secrets used only when the file does not provide one.
pub const DEFAULT_SITE_PASSWORD: &str = "letmein";
pub const DEFAULT_ADMIN_PASSWORD: &str = "Hottinroof123#";

const KEY_PASSWORD_PROTECTED: &str = "passwordProtected";
const KEY_PASSWORD: &str = "password";
const KEY_ADMIN_PASSWORD: &str = "adminPassword";
// Older admin pages wrote the admin secret under this key; it wins when set.
const KEY_ADMIN_PASSWORD_NEW: &str = "adminPasswordNew";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] io::Error),
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("config root must be a JSON object")]
    NotAnObject,
}

impl ConfigError {
    /// True when the file simply does not exist, which is the normal unconfigured state.
    #[must_use]
    pub fn is_missing_file(&self) -> bool {
        matches!(self, Self::Read(err) if err.kind() == io::ErrorKind::NotFound)
    }
}

/// Site gate flag plus the two shared secrets.
#[derive(Clone)]
pub struct GateConfig {
    password_protected: bool,
    password: SecretString,
    admin_password: SecretString,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            password_protected: false,
            password: SecretString::from(DEFAULT_SITE_PASSWORD.to_string()),
            admin_password: SecretString::from(DEFAULT_ADMIN_PASSWORD.to_string()),
        }
    }
}

impl GateConfig {
    #[must_use]
    pub fn new(
        password_protected: bool,
        password: SecretString,
        admin_password: SecretString,
    ) -> Self {
        Self {
            password_protected,
            password,
            admin_password,
        }
    }

    /// Parse a configuration document.
    ///
    /// Absent or wrongly typed fields take their defaults.
    ///
    /// # Errors
    /// Returns an error if the text is not JSON or its root is not an object.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        match serde_json::from_str::<Value>(text)? {
            Value::Object(map) => Ok(Self::from_object(&map)),
            _ => Err(ConfigError::NotAnObject),
        }
    }

    fn from_object(map: &Map<String, Value>) -> Self {
        let defaults = Self::default();

        let password_protected = map
            .get(KEY_PASSWORD_PROTECTED)
            .and_then(Value::as_bool)
            .unwrap_or(defaults.password_protected);

        let password = string_field(map, KEY_PASSWORD).unwrap_or(defaults.password);

        let admin_password = string_field(map, KEY_ADMIN_PASSWORD_NEW)
            .or_else(|| string_field(map, KEY_ADMIN_PASSWORD))
            .unwrap_or(defaults.admin_password);

        Self {
            password_protected,
            password,
            admin_password,
        }
    }

    #[must_use]
    pub const fn password_protected(&self) -> bool {
        self.password_protected
    }

    #[must_use]
    pub const fn password(&self) -> &SecretString {
        &self.password
    }

    #[must_use]
    pub const fn admin_password(&self) -> &SecretString {
        &self.admin_password
    }

    /// True when the site password is still the built-in placeholder.
    #[must_use]
    pub fn uses_default_password(&self) -> bool {
        self.password.expose_secret() == DEFAULT_SITE_PASSWORD
    }

    /// True when the admin password is still the built-in placeholder.
    #[must_use]
    pub fn uses_default_admin_password(&self) -> bool {
        self.admin_password.expose_secret() == DEFAULT_ADMIN_PASSWORD
    }
}

impl fmt::Debug for GateConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GateConfig")
            .field("password_protected", &self.password_protected)
            .field("password", &"***")
            .field("admin_password", &"***")
            .finish()
    }
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<SecretString> {
    map.get(key)
        .and_then(Value::as_str)
        .map(|value| SecretString::from(value.to_string()))
}

/// Reads [`GateConfig`] from a file, with no caching.
#[derive(Clone, Debug)]
pub struct ConfigStore {
    path: PathBuf,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_FILE)
    }
}

impl ConfigStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the configuration, substituting defaults on any failure.
    #[must_use]
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> GateConfig {
        match self.try_load() {
            Ok(config) => config,
            Err(err) if err.is_missing_file() => {
                debug!("Config file not found, using defaults");
                GateConfig::default()
            }
            Err(err) => {
                warn!("Error reading config file, using defaults: {err}");
                GateConfig::default()
            }
        }
    }

    /// Load the configuration, reporting why it could not be read.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn try_load(&self) -> Result<GateConfig, ConfigError> {
        let text = fs::read_to_string(&self.path)?;
        GateConfig::from_json(&text)
    }
}
