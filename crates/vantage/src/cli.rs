//! Clap derive structures for the `vantage` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// vantage -- inspect monitoring data from the command line
#[derive(Debug, Parser)]
#[command(
    name = "vantage",
    version,
    about = "Inspect organizations, projects, releases and attachments from a monitoring backend",
    long_about = "Fetches data through the vantage store layer: every command mounts an\n\
        adapter, lets it fetch what is missing, and renders the settled props.",
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
    /// Configuration profile to use
    #[arg(long, short = 'p', env = "VANTAGE_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API root URL (overrides profile)
    #[arg(long, env = "VANTAGE_URL", global = true)]
    pub url: Option<String>,

    /// Organization slug (overrides profile)
    #[arg(long = "org", short = 'O', env = "VANTAGE_ORG", global = true)]
    pub organization: Option<String>,

    /// Auth token
    #[arg(long, env = "VANTAGE_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "VANTAGE_OUTPUT",
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

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "VANTAGE_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "VANTAGE_TIMEOUT", global = true)]
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
    /// Show the active organization
    Org,

    /// List the organization's projects
    #[command(alias = "proj")]
    Projects,

    /// List the organization's teams
    Teams,

    /// Show a release and its deploys
    #[command(alias = "rel", disable_version_flag = true)]
    Release(ReleaseArgs),

    /// List attachments of an event
    Attachments(AttachmentsArgs),

    /// Inspect and persist the global selection
    #[command(alias = "sel")]
    Selection(SelectionArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Data commands ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ReleaseArgs {
    /// Project slug
    pub project: String,

    /// Release version
    pub version: String,
}

#[derive(Debug, Args)]
pub struct AttachmentsArgs {
    /// Project slug
    pub project: String,

    /// Event id
    pub event_id: String,
}

// ── Selection ───────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SelectionArgs {
    #[command(subcommand)]
    pub command: SelectionCommand,
}

#[derive(Debug, Subcommand)]
pub enum SelectionCommand {
    /// Resolve a URL or query string into a selection
    Parse {
        /// Full URL or raw query (e.g. "project=1&statsPeriod=24h")
        query: String,

        /// Ignore the last-used selection stored for the organization
        #[arg(long)]
        skip_last_used: bool,
    },

    /// Show the selection restored for the organization
    Show,

    /// Persist projects and environments as the last-used selection
    Save {
        /// Project ids (repeatable)
        #[arg(long = "project", value_name = "ID")]
        projects: Vec<i64>,

        /// Environment names (repeatable)
        #[arg(long = "environment", short = 'e', value_name = "NAME")]
        environments: Vec<String>,
    },
}

// ── Config ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive profile setup
    Init,

    /// Show the loaded configuration
    Show,

    /// Print the config file path
    Path,

    /// Set a key on the active profile
    Set {
        /// Key (url, organization, token_env, insecure, timeout, ca_cert,
        /// stale_after_secs, selection_dir)
        key: String,
        /// Value
        value: String,
    },

    /// List profiles
    Profiles,

    /// Make a profile the default
    Use {
        /// Profile name
        name: String,
    },

    /// Store the active profile's token in the system keyring
    SetToken,
}

// ── Completions ─────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: clap_complete::Shell,
}
