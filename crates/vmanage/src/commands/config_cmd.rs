//! Config subcommand handlers.

use std::fmt::Write as _;
use std::path::PathBuf;

use dialoguer::{Confirm, Input, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

const SET_KEYS: &str = "host, username, password_env, vault_file, vault_password_file, \
                        ca_cert, insecure, timeout";

// ── Helpers ─────────────────────────────────────────────────────────

/// Copy of the config with plaintext secrets masked.
fn redacted(cfg: &Config) -> Config {
    let mut out = cfg.clone();
    for profile in out.profiles.values_mut() {
        if profile.password.is_some() {
            profile.password = Some("****".into());
        }
    }
    out
}

/// TOML-ish rendering for table mode. Expects an already redacted config.
fn format_config(cfg: &Config) -> String {
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    if let Some(ref v) = cfg.defaults.vault_file {
        let _ = writeln!(out, "vault_file = \"{}\"", v.display());
    }
    if let Some(ref v) = cfg.defaults.vault_password_file {
        let _ = writeln!(out, "vault_password_file = \"{}\"", v.display());
    }

    for (name, p) in &cfg.profiles {
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let text = [
            ("host", p.host.as_deref()),
            ("username", p.username.as_deref()),
            ("password", p.password.as_deref()),
            ("password_env", p.password_env.as_deref()),
        ];
        for (key, value) in text {
            if let Some(v) = value {
                let _ = writeln!(out, "{key} = \"{v}\"");
            }
        }
        let paths = [
            ("vault_file", &p.vault_file),
            ("vault_password_file", &p.vault_password_file),
            ("ca_cert", &p.ca_cert),
        ];
        for (key, value) in paths {
            if let Some(v) = value {
                let _ = writeln!(out, "{key} = \"{}\"", v.display());
            }
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
    }

    out
}

fn save_config(cfg: &Config) -> Result<(), CliError> {
    config::save_config(cfg)?;
    Ok(())
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn profile_not_found(cfg: &Config, name: String) -> CliError {
    CliError::ProfileNotFound {
        name,
        available: config::available_profiles(cfg),
    }
}

fn parse_flag<T: std::str::FromStr>(field: &str, value: &str, expected: &str) -> Result<T, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: format!("must be {expected}"),
    })
}

/// Apply `key = value` to a profile.
fn set_profile_key(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "host" => {
            vmanage_config::parse_controller_url(&value)?;
            profile.host = Some(value);
        }
        "username" => profile.username = Some(value),
        "password_env" | "password-env" => profile.password_env = Some(value),
        "vault_file" | "vault-file" => profile.vault_file = Some(PathBuf::from(value)),
        "vault_password_file" | "vault-password-file" => {
            profile.vault_password_file = Some(PathBuf::from(value));
        }
        "ca_cert" | "ca-cert" => profile.ca_cert = Some(PathBuf::from(value)),
        "insecure" => profile.insecure = Some(parse_flag("insecure", &value, "'true' or 'false'")?),
        "timeout" => {
            profile.timeout = Some(parse_flag("timeout", &value, "a number (seconds)")?);
        }
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!("unknown config key '{other}'. Valid keys: {SET_KEYS}"),
            });
        }
    }
    Ok(())
}

/// Prompt for a password and store it in the keyring or return it for the
/// config file. `None` means it went to the keyring.
fn prompt_password_storage(profile_name: &str) -> Result<Option<String>, CliError> {
    let pass = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
    if pass.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "password cannot be empty".into(),
        });
    }

    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where to store the password?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        config::store_password(profile_name, &pass)?;
        eprintln!("   ✓ Password stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(pass))
    }
}

// ── Init wizard ─────────────────────────────────────────────────────

fn init() -> Result<(), CliError> {
    let config_path = config::config_path();
    eprintln!("vmanage configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    let source = Select::new()
        .with_prompt("Credential source")
        .items(&[
            "Username/password",
            "Ansible-vault encrypted file (vmanage_url, username, password)",
        ])
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    let mut profile = Profile::default();
    if source == 0 {
        let host: String = Input::new()
            .with_prompt("Controller URL")
            .interact_text()
            .map_err(prompt_err)?;
        vmanage_config::parse_controller_url(&host)?;
        profile.host = Some(host);

        let user: String = Input::new()
            .with_prompt("Username")
            .interact_text()
            .map_err(prompt_err)?;
        profile.username = Some(user);
        profile.password = prompt_password_storage(&profile_name)?;
    } else {
        let vault: String = Input::new()
            .with_prompt("Vault file")
            .interact_text()
            .map_err(prompt_err)?;
        profile.vault_file = Some(vault.into());

        let pw_file: String = Input::new()
            .with_prompt("Vault password file (blank to be prompted by ansible-vault)")
            .allow_empty(true)
            .interact_text()
            .map_err(prompt_err)?;
        if !pw_file.trim().is_empty() {
            profile.vault_password_file = Some(pw_file.trim().into());
        }
    }

    let insecure = Confirm::new()
        .with_prompt("Skip TLS certificate verification (internally-signed controller)?")
        .default(false)
        .interact()
        .map_err(prompt_err)?;
    if insecure {
        profile.insecure = Some(true);
    }

    let mut cfg = config::load_config_or_default();
    cfg.profiles.insert(profile_name.clone(), profile);
    cfg.default_profile = Some(profile_name.clone());
    save_config(&cfg)?;

    eprintln!("\n✓ Configuration written to {}", config_path.display());
    eprintln!("  Active profile: {profile_name}");
    eprintln!("\n  Test it: vmanage devices list");
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(),

        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config_or_default());
            let out = output::render_single(&global.output, &cfg, format_config, |_| {
                config::config_path().display().to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(profile_name.clone()).or_default();
            set_profile_key(profile, &key, value)?;

            save_config(&cfg)?;
            output::success(&format!("Set {key} on profile '{profile_name}'"), global.quiet);
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                output::warn("No profiles configured. Run: vmanage config init");
            } else {
                for name in cfg.profiles.keys() {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(profile_not_found(&cfg, name));
            }
            cfg.default_profile = Some(name.clone());
            save_config(&cfg)?;
            output::success(&format!("Default profile set to '{name}'"), global.quiet);
            Ok(())
        }

        ConfigCommand::SetPassword { profile } => {
            let cfg = config::load_config_or_default();
            let profile_name =
                profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));
            if !cfg.profiles.contains_key(&profile_name) {
                return Err(profile_not_found(&cfg, profile_name));
            }

            let secret = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
            if secret.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "value cannot be empty".into(),
                });
            }
            config::store_password(&profile_name, &secret)?;
            output::success(
                &format!("Password stored in system keyring for profile '{profile_name}'"),
                global.quiet,
            );
            Ok(())
        }
    }
}
