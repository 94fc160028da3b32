//! Clap derive structures for the `vmanage` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// vmanage -- inspect and edit a Cisco vManage SD-WAN controller
#[derive(Debug, Parser)]
#[command(
    name = "vmanage",
    version,
    about = "Inspect SD-WAN controller inventory and policy, and edit data-prefix lists",
    long_about = "Command-line access to a vManage SD-WAN controller.\n\n\
        Lists devices, policy groups, application-aware routing and NGFW\n\
        policies, and maintains security data-prefix lists.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Controller profile to use
    #[arg(long, short = 'p', env = "VMANAGE_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Controller URL or hostname (overrides profile and vault)
    #[arg(long, short = 'H', env = "VMANAGE_HOST", global = true)]
    pub host: Option<String>,

    /// Login username (overrides profile and vault)
    #[arg(long, short = 'u', env = "VMANAGE_USERNAME", global = true)]
    pub username: Option<String>,

    /// Login password (prefer the keyring: `vmanage config set-password`)
    #[arg(long, env = "VMANAGE_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "VMANAGE_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Skip TLS certificate verification (internally-signed controllers)
    #[arg(long, short = 'k', env = "VMANAGE_INSECURE", global = true)]
    pub insecure: bool,

    /// Additional trusted CA certificate (PEM)
    #[arg(long, env = "VMANAGE_CA_CERT", value_name = "FILE", global = true)]
    pub ca_cert: Option<PathBuf>,

    /// Request timeout in seconds [default: 30]
    #[arg(long, env = "VMANAGE_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Device inventory, control status and health
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Policy groups and their associated devices
    #[command(alias = "pg")]
    PolicyGroups(PolicyGroupsArgs),

    /// Application-aware routing (application-priority) policies
    Aar(AarArgs),

    /// Embedded-security NGFW policies
    Ngfw(NgfwArgs),

    /// Security data-prefix lists
    #[command(alias = "pfx")]
    Prefixes(PrefixesArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DEVICES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// Device inventory (model, version, site)
    #[command(alias = "ls")]
    List,

    /// Control-plane status (reachability, control connections, OMP peers)
    Status,

    /// Health summary with uptime
    Health,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  POLICY GROUPS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct PolicyGroupsArgs {
    #[command(subcommand)]
    pub command: PolicyGroupsCommand,
}

#[derive(Debug, Subcommand)]
pub enum PolicyGroupsCommand {
    /// List policy groups with associated devices
    #[command(alias = "ls")]
    List,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  AAR
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AarArgs {
    #[command(subcommand)]
    pub command: AarCommand,
}

#[derive(Debug, Subcommand)]
pub enum AarCommand {
    /// List application-priority profiles
    #[command(alias = "ls")]
    List,

    /// Show a profile's parcels and sub-parcels
    Show {
        /// Profile number from `aar list` (prompts when omitted)
        number: Option<usize>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  NGFW
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct NgfwArgs {
    #[command(subcommand)]
    pub command: NgfwCommand,
}

#[derive(Debug, Subcommand)]
pub enum NgfwCommand {
    /// List embedded-security profiles
    #[command(alias = "ls")]
    List,

    /// Show a profile's firewall rules
    Show {
        /// Profile number from `ngfw list` (prompts when omitted)
        number: Option<usize>,

        /// Also write the rule table to this CSV file
        #[arg(long, value_name = "FILE")]
        csv: Option<PathBuf>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PREFIXES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct PrefixesArgs {
    #[command(subcommand)]
    pub command: PrefixesCommand,
}

#[derive(Debug, Subcommand)]
pub enum PrefixesCommand {
    /// List data-prefix objects across all policy-object profiles
    #[command(alias = "ls")]
    List,

    /// Show the entries of a data-prefix object
    Show {
        /// Object number from `prefixes list` (prompts when omitted)
        number: Option<usize>,
    },

    /// Add entries to a data-prefix object (duplicates are skipped)
    Add {
        /// Object number from `prefixes list` (prompts when omitted)
        number: Option<usize>,

        /// Prefix to add, optionally with an option type (repeatable)
        #[arg(long = "prefix", value_name = "CIDR[=TYPE]")]
        prefixes: Vec<String>,
    },

    /// Delete entries from a data-prefix object by position
    #[command(alias = "rm")]
    Delete {
        /// Object number from `prefixes list` (prompts when omitted)
        number: Option<usize>,

        /// Comma-separated 1-based entry positions (prompts when omitted)
        #[arg(long, value_name = "LIST")]
        positions: Option<String>,
    },

    /// Expand /16 networks into their .1.10/32 and .1.11/32 hosts and merge
    /// them into a named object
    Expand {
        /// Name of the data-prefix object to update
        #[arg(long)]
        name: String,

        /// Networks to expand; anything other than a /16 is skipped
        #[arg(required = true, value_name = "CIDR")]
        cidrs: Vec<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration (secrets masked)
    Show,

    /// Set a value on the active profile
    Set {
        /// Profile key (host, username, password_env, vault_file, ...)
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store a password in the system keyring
    SetPassword {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
