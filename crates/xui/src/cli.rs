//! Clap derive structures for the `xui` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// xui -- manage x-ui / 3x-ui panel clients from the command line
#[derive(Debug, Parser)]
#[command(
    name = "xui",
    version,
    about = "Manage x-ui panel clients from the command line",
    long_about = "Create, update, delete and inspect proxy clients on an x-ui / 3x-ui panel,\n\
        and mirror application users into it with `xui sync`.",
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
    /// Panel profile to use
    #[arg(long, short = 'p', env = "XUI_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Panel host (overrides profile)
    #[arg(long, short = 'H', env = "XUI_HOST", global = true)]
    pub host: Option<String>,

    /// Panel port (overrides profile)
    #[arg(long, env = "XUI_PORT", global = true)]
    pub port: Option<u16>,

    /// Panel web base path (overrides profile)
    #[arg(long, env = "XUI_PATH", global = true)]
    pub path: Option<String>,

    /// URL scheme, https or http (overrides profile)
    #[arg(long, env = "XUI_SCHEME", global = true)]
    pub scheme: Option<String>,

    /// Panel username (overrides profile); the password is read from XUI_PASSWORD
    #[arg(long, short = 'u', env = "XUI_USERNAME", global = true)]
    pub username: Option<String>,

    /// Inbound to operate on (overrides the profile's default inbound)
    #[arg(long, short = 'i', env = "XUI_INBOUND_ID", global = true)]
    pub inbound: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "XUI_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "XUI_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "XUI_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output Enum ──────────────────────────────────────────────────────

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

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in to the panel and verify the configured credentials
    Login,

    /// Manage inbound clients
    #[command(alias = "cl")]
    Clients(ClientsArgs),

    /// Create or update a panel client from an application user record
    Sync(SyncArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CLIENTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ClientsArgs {
    #[command(subcommand)]
    pub command: ClientsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ClientsCommand {
    /// List clients of the inbound
    #[command(alias = "ls")]
    List,

    /// Find a client by its Telegram id
    Get {
        /// Telegram id stored in the client's tgId field
        #[arg(long)]
        tg_id: i64,
    },

    /// Show traffic counters for a client
    Traffic {
        /// Client UUID
        uuid: String,
    },

    /// Add a client (unset fields get panel defaults)
    Add(ClientFields),

    /// Update a client (only the given fields are sent)
    Update(ClientFields),

    /// Delete a client
    #[command(alias = "rm")]
    Delete {
        /// Client UUID
        uuid: String,
    },
}

/// Client fields shared by `add` and `update`.
#[derive(Debug, Args)]
pub struct ClientFields {
    /// Client UUID (proxy identity)
    pub uuid: String,

    /// Display label; must be unique on the panel
    #[arg(long)]
    pub email: Option<String>,

    /// Protocol flow (add default: xtls-rprx-vision)
    #[arg(long)]
    pub flow: Option<String>,

    /// Telegram id used for lookups
    #[arg(long)]
    pub tg_id: Option<i64>,

    /// Maximum concurrent IPs (add default: 1)
    #[arg(long)]
    pub limit_ip: Option<i64>,

    /// Traffic quota in bytes, 0 = unlimited
    #[arg(long)]
    pub total_bytes: Option<i64>,

    /// Expiry as epoch milliseconds, 0 = never
    #[arg(long)]
    pub expiry_time: Option<i64>,

    /// Enable or disable the client (add default: false)
    #[arg(long)]
    pub enable: Option<bool>,

    /// Subscription id (add default: random UUID)
    #[arg(long)]
    pub sub_id: Option<String>,

    /// Traffic reset counter
    #[arg(long)]
    pub reset: Option<i64>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SYNC
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// JSON file holding one user object or an array of them
    #[arg(long, short = 'F')]
    pub from_file: PathBuf,
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

    /// Print the config file location
    Path,

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
