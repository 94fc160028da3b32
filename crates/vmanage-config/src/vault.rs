//! Ansible-vault encrypted credential store.
//!
//! The vault is a YAML document with `vmanage_url`, `username` and
//! `password` keys, encrypted with `ansible-vault`. It is decrypted by
//! running `ansible-vault view` and never written back.

use std::path::{Path, PathBuf};
use std::process::Command;

use secrecy::SecretString;
use serde::Deserialize;
use tracing::debug;

use crate::ConfigError;

/// Where an encrypted credential file lives and how to unlock it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultLocation {
    pub file: PathBuf,
    /// Passed as `--vault-password-file` when present on disk.
    pub password_file: Option<PathBuf>,
}

/// Decrypted vault contents.
#[derive(Debug, Clone)]
pub struct VaultCredentials {
    pub host: String,
    pub username: String,
    pub password: SecretString,
}

/// Something that can decrypt a vault file.
pub trait VaultReader {
    fn read(&self, location: &VaultLocation) -> Result<VaultCredentials, ConfigError>;
}

/// Decrypts by shelling out to `ansible-vault view`.
#[derive(Debug, Clone)]
pub struct AnsibleVault {
    program: PathBuf,
}

impl Default for AnsibleVault {
    fn default() -> Self {
        Self {
            program: PathBuf::from("ansible-vault"),
        }
    }
}

impl AnsibleVault {
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl VaultReader for AnsibleVault {
    fn read(&self, location: &VaultLocation) -> Result<VaultCredentials, ConfigError> {
        let mut cmd = Command::new(&self.program);
        cmd.arg("view").arg(&location.file);
        if let Some(pw_file) = location.password_file.as_deref().filter(|p| p.is_file()) {
            cmd.arg("--vault-password-file").arg(pw_file);
        }

        debug!(file = %location.file.display(), "decrypting credential vault");
        let output = cmd.output().map_err(|e| vault_error(&location.file, e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(vault_error(&location.file, stderr.trim().to_owned()));
        }

        let plaintext = String::from_utf8_lossy(&output.stdout);
        parse_vault_yaml(&plaintext).map_err(|e| match e {
            ConfigError::Vault { reason, .. } => vault_error(&location.file, reason),
            other => other,
        })
    }
}

#[derive(Deserialize)]
struct VaultDocument {
    vmanage_url: String,
    username: String,
    password: String,
}

/// Parse a decrypted vault document.
pub fn parse_vault_yaml(text: &str) -> Result<VaultCredentials, ConfigError> {
    let doc: VaultDocument = serde_yaml::from_str(text).map_err(|e| ConfigError::Vault {
        path: PathBuf::new(),
        reason: format!("invalid vault document: {e}"),
    })?;
    Ok(VaultCredentials {
        host: doc.vmanage_url,
        username: doc.username,
        password: SecretString::from(doc.password),
    })
}

fn vault_error(path: &Path, reason: String) -> ConfigError {
    ConfigError::Vault {
        path: path.to_path_buf(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn parses_the_three_keys() {
        let creds = parse_vault_yaml(
            "vmanage_url: https://vmanage.example.net\nusername: netops\npassword: hunter2\nextra: ignored\n",
        )
        .expect("valid vault");
        assert_eq!(creds.host, "https://vmanage.example.net");
        assert_eq!(creds.username, "netops");
        assert_eq!(creds.password.expose_secret(), "hunter2");
    }

    #[test]
    fn missing_key_is_a_vault_error() {
        let err = parse_vault_yaml("vmanage_url: x\nusername: y\n").expect_err("missing password");
        assert!(matches!(err, ConfigError::Vault { .. }));
        assert!(err.to_string().contains("password"));
    }

    #[test]
    fn missing_program_is_a_vault_error() {
        let vault = AnsibleVault::with_program("/nonexistent/ansible-vault");
        let err = vault
            .read(&VaultLocation {
                file: "creds.yml".into(),
                password_file: None,
            })
            .expect_err("program does not exist");
        assert!(matches!(err, ConfigError::Vault { ref path, .. } if path == Path::new("creds.yml")));
    }
}
