//! CLI configuration: a thin layer over `vmanage_config`.
//!
//! Adds the `GlobalOpts` flag overrides on top of the shared profile and
//! credential resolution.

use std::time::Duration;

use secrecy::SecretString;

use vmanage_config::{AnsibleVault, CredentialOverrides, VaultReader};
use vmanage_core::{ControllerConfig, TlsMode};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use vmanage_config::{
    Config, Profile, config_path, load_config_or_default, save_config, store_password,
};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build a `ControllerConfig` from the config file, active profile and flags.
pub fn build_controller_config(global: &GlobalOpts) -> Result<ControllerConfig, CliError> {
    let cfg = load_config_or_default();
    build_from(global, &cfg, &AnsibleVault::default())
}

pub(crate) fn build_from(
    global: &GlobalOpts,
    cfg: &Config,
    vault: &dyn VaultReader,
) -> Result<ControllerConfig, CliError> {
    let profile_name = active_profile_name(global, cfg);
    let profile = cfg.profiles.get(&profile_name);

    // An explicit --profile must exist; a missing default profile just
    // means "flags and vault only".
    if profile.is_none() && global.profile.is_some() {
        return Err(CliError::ProfileNotFound {
            name: profile_name,
            available: available_profiles(cfg),
        });
    }

    let overrides = CredentialOverrides {
        host: global.host.clone(),
        username: global.username.clone(),
        password: global.password.clone().map(SecretString::from),
    };
    let resolved = vmanage_config::resolve_credentials(
        &overrides,
        profile,
        &profile_name,
        &cfg.defaults,
        vault,
    )?;

    let insecure =
        global.insecure || profile.and_then(|p| p.insecure).unwrap_or(cfg.defaults.insecure);
    let ca_cert = global
        .ca_cert
        .clone()
        .or_else(|| profile.and_then(|p| p.ca_cert.clone()));
    let tls = if insecure {
        TlsMode::InsecureSkipVerify
    } else if let Some(path) = ca_cert {
        TlsMode::CustomCa(path)
    } else {
        TlsMode::Verify
    };

    let timeout = global
        .timeout
        .or_else(|| profile.and_then(|p| p.timeout))
        .unwrap_or(cfg.defaults.timeout);

    tracing::debug!(profile = %profile_name, url = %resolved.url, ?tls, "resolved controller");

    Ok(ControllerConfig::new(resolved.url, resolved.credentials)
        .with_tls(tls)
        .with_timeout(Duration::from_secs(timeout)))
}

pub(crate) fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        "(none)".into()
    } else {
        cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use secrecy::ExposeSecret;

    use vmanage_config::{ConfigError, VaultCredentials, VaultLocation};

    use super::*;
    use crate::cli::Cli;

    struct NoVault;

    impl VaultReader for NoVault {
        fn read(&self, location: &VaultLocation) -> Result<VaultCredentials, ConfigError> {
            Err(ConfigError::Vault {
                path: location.file.clone(),
                reason: "not available in tests".into(),
            })
        }
    }

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["vmanage"];
        argv.extend_from_slice(args);
        argv.extend_from_slice(&["devices", "list"]);
        Cli::try_parse_from(argv).expect("parses").global
    }

    fn lab_config() -> Config {
        let mut cfg = Config::default();
        cfg.default_profile = Some("lab".into());
        cfg.profiles.insert(
            "lab".into(),
            Profile {
                host: Some("vmanage.lab:8443".into()),
                username: Some("netops".into()),
                password: Some("from-file".into()),
                insecure: Some(true),
                timeout: Some(12),
                ..Profile::default()
            },
        );
        cfg
    }

    #[test]
    fn profile_supplies_everything() {
        let built = build_from(&global(&[]), &lab_config(), &NoVault).expect("builds");
        assert_eq!(built.url.as_str(), "https://vmanage.lab:8443/");
        assert_eq!(built.credentials.username, "netops");
        assert_eq!(built.tls, TlsMode::InsecureSkipVerify);
        assert_eq!(built.timeout, Duration::from_secs(12));
    }

    #[test]
    fn flags_override_profile_fields() {
        let built = build_from(
            &global(&[
                "--host",
                "https://other:9443",
                "--password",
                "flag-pw",
                "--timeout",
                "5",
            ]),
            &lab_config(),
            &NoVault,
        )
        .expect("builds");
        assert_eq!(built.url.as_str(), "https://other:9443/");
        assert_eq!(built.credentials.username, "netops");
        assert_eq!(built.credentials.password.expose_secret(), "flag-pw");
        assert_eq!(built.timeout, Duration::from_secs(5));
    }

    #[test]
    fn explicit_unknown_profile_is_an_error() {
        let err = build_from(&global(&["--profile", "prod"]), &lab_config(), &NoVault)
            .expect_err("unknown profile");
        assert!(matches!(err, CliError::ProfileNotFound { ref available, .. } if available == "lab"));
    }

    #[test]
    fn flags_alone_work_without_a_profile() {
        let built = build_from(
            &global(&["--host", "10.0.0.5", "-u", "admin", "--password", "pw", "--ca-cert", "/tmp/ca.pem"]),
            &Config::default(),
            &NoVault,
        )
        .expect("builds");
        assert_eq!(built.url.as_str(), "https://10.0.0.5/");
        assert_eq!(built.tls, TlsMode::CustomCa("/tmp/ca.pem".into()));
        assert_eq!(built.timeout, Duration::from_secs(30));
    }

    #[test]
    fn nothing_configured_reports_the_missing_field() {
        let err = build_from(&global(&[]), &Config::default(), &NoVault).expect_err("no creds");
        assert!(matches!(err, CliError::NoCredentials { .. }));
    }
}
