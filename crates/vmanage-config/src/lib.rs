//! Configuration for the vmanage CLI.
//!
//! TOML profiles, the credential resolution chain (flags, profile secrets,
//! keyring, ansible-vault store) and controller URL parsing. The CLI layers
//! its `GlobalOpts` on top and hands the result to `vmanage_core`.

pub mod vault;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

use vmanage_core::Credentials;

pub use vault::{AnsibleVault, VaultCredentials, VaultLocation, VaultReader};

/// Keyring service name; entries are keyed `{profile}/password`.
pub const KEYRING_SERVICE: &str = "vmanage";

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "VMANAGE_CONFIG";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no {missing} configured for profile '{profile}'")]
    NoCredentials { profile: String, missing: String },

    #[error("cannot read credential vault {}: {reason}", path.display())]
    Vault { path: PathBuf, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Vault used by profiles that don't name their own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vault_file: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vault_password_file: Option<PathBuf>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
            vault_file: None,
            vault_password_file: None,
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named controller profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Controller URL (e.g. "https://vmanage.example.net:8443").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Plaintext password. Prefer the keyring or `password_env`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Name of an environment variable holding the password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_env: Option<String>,

    /// ansible-vault encrypted YAML with `vmanage_url`, `username`, `password`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vault_file: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vault_password_file: Option<PathBuf>,

    /// PEM file with an additional trusted CA.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `VMANAGE_CONFIG`, else the platform
/// config directory.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("com", "vmanage", "vmanage").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("vmanage");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load defaults, then the TOML file at `path` (if present), then
/// `VMANAGE_`-prefixed environment variables (`__` separates nesting,
/// e.g. `VMANAGE_DEFAULTS__TIMEOUT=60`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("VMANAGE_").split("__"));

    Ok(figment.extract()?)
}

/// Load config, returning a default if the file is missing or broken.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_else(|e| {
        debug!(error = %e, "falling back to default config");
        Config::default()
    })
}

// ── Config saving ───────────────────────────────────────────────────

pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Controller URL ──────────────────────────────────────────────────

/// Parse a controller address. A bare hostname gets `https://`.
pub fn parse_controller_url(raw: &str) -> Result<Url, ConfigError> {
    let raw = raw.trim();
    let invalid = |reason: String| ConfigError::Validation {
        field: "host".into(),
        reason,
    };

    if raw.is_empty() {
        return Err(invalid("controller address is empty".into()));
    }

    let candidate = if raw.contains("://") {
        raw.to_owned()
    } else {
        format!("https://{raw}")
    };

    let url = Url::parse(&candidate).map_err(|e| invalid(format!("'{raw}': {e}")))?;
    match url.scheme() {
        "https" | "http" if url.host().is_some() => Ok(url),
        "https" | "http" => Err(invalid(format!("'{raw}' has no host"))),
        other => Err(invalid(format!("unsupported scheme '{other}'"))),
    }
}

// ── Keyring ─────────────────────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(
        KEYRING_SERVICE,
        &format!("{profile_name}/password"),
    )?)
}

/// Store a profile password in the system keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(password)?;
    Ok(())
}

fn keyring_password(profile_name: &str) -> Option<SecretString> {
    match keyring_entry(profile_name).and_then(|e| e.get_password().map_err(ConfigError::from)) {
        Ok(pw) => Some(SecretString::from(pw)),
        Err(e) => {
            debug!(profile = profile_name, error = %e, "no keyring password");
            None
        }
    }
}

// ── Credential resolution ───────────────────────────────────────────

/// Values supplied on the command line or through `VMANAGE_*` variables.
#[derive(Debug, Clone, Default)]
pub struct CredentialOverrides {
    pub host: Option<String>,
    pub username: Option<String>,
    pub password: Option<SecretString>,
}

/// Connection triple handed to the core.
#[derive(Debug, Clone)]
pub struct ResolvedCredentials {
    pub url: Url,
    pub credentials: Credentials,
}

/// Password from the profile alone: `password_env`, keyring, plaintext.
pub fn profile_password(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    if let Some(ref env_name) = profile.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Some(SecretString::from(val));
        }
        debug!(env = %env_name, "password_env is not set");
    }

    if let Some(pw) = keyring_password(profile_name) {
        return Some(pw);
    }

    profile.password.clone().map(SecretString::from)
}

/// Vault file for a profile, falling back to the global default.
pub fn vault_location(profile: Option<&Profile>, defaults: &Defaults) -> Option<VaultLocation> {
    let file = profile
        .and_then(|p| p.vault_file.clone())
        .or_else(|| defaults.vault_file.clone())?;
    let password_file = profile
        .and_then(|p| p.vault_password_file.clone())
        .or_else(|| defaults.vault_password_file.clone());
    Some(VaultLocation {
        file,
        password_file,
    })
}

/// Resolve host, username and password, each independently.
///
/// First match wins per field: overrides, then the profile, then the
/// vault. The vault is decrypted at most once and only when a field is
/// still missing.
pub fn resolve_credentials(
    overrides: &CredentialOverrides,
    profile: Option<&Profile>,
    profile_name: &str,
    defaults: &Defaults,
    vault: &dyn VaultReader,
) -> Result<ResolvedCredentials, ConfigError> {
    let mut host = overrides
        .host
        .clone()
        .or_else(|| profile.and_then(|p| p.host.clone()));
    let mut username = overrides
        .username
        .clone()
        .or_else(|| profile.and_then(|p| p.username.clone()));
    let mut password = overrides
        .password
        .clone()
        .or_else(|| profile.and_then(|p| profile_password(p, profile_name)));

    if host.is_none() || username.is_none() || password.is_none() {
        if let Some(location) = vault_location(profile, defaults) {
            let stored = vault.read(&location)?;
            host.get_or_insert(stored.host);
            username.get_or_insert(stored.username);
            password.get_or_insert(stored.password);
        }
    }

    let missing = |what: &str| ConfigError::NoCredentials {
        profile: profile_name.into(),
        missing: what.into(),
    };
    let host = host.ok_or_else(|| missing("controller host"))?;
    let username = username.ok_or_else(|| missing("username"))?;
    let password = password.ok_or_else(|| missing("password"))?;

    Ok(ResolvedCredentials {
        url: parse_controller_url(&host)?,
        credentials: Credentials { username, password },
    })
}
