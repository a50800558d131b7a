//! Clap derive structures for the `starmap` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use starmap_core::{ApiVersion, Workflow};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// starmap -- query StArMap marketplace mappings
#[derive(Debug, Parser)]
#[command(
    name = "starmap",
    version,
    about = "Query StArMap marketplace mappings from the command line",
    long_about = "Resolve image names and NVRs into the marketplace destinations they\n\
        publish to, and browse the policies, mappings and destinations stored\n\
        in a StArMap server. Local mapping files can answer queries offline.",
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
    /// Server profile to use
    #[arg(long, short = 'p', env = "STARMAP_PROFILE", global = true)]
    pub profile: Option<String>,

    /// StArMap server URL (overrides profile)
    #[arg(long, short = 'u', env = "STARMAP_URL", global = true)]
    pub url: Option<String>,

    /// StArMap API version: v1 or v2 (overrides profile)
    #[arg(long, env = "STARMAP_API_VERSION", global = true)]
    pub api_version: Option<ApiVersion>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "STARMAP_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// JSON mappings file answered locally before the server
    #[arg(long, short = 'm', env = "STARMAP_MAPPINGS", global = true)]
    pub mappings: Option<PathBuf>,

    /// Never contact the server; answer from the mappings file only
    #[arg(long, global = true)]
    pub offline: bool,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "STARMAP_OUTPUT",
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

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "STARMAP_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "STARMAP_TIMEOUT", global = true)]
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
    /// Resolve an image into its marketplace destinations
    #[command(alias = "q")]
    Query(QueryArgs),

    /// List every policy on the server
    Policies,

    /// Show one policy
    Policy(PolicyArgs),

    /// Show one marketplace mapping
    Mapping(MappingArgs),

    /// Show one destination
    Destination {
        /// Destination ID
        id: String,
    },

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  QUERY
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct QueryArgs {
    /// Image NVR or archive name (e.g. "product-8.0-1.raw.xz")
    #[arg(required_unless_present = "name", conflicts_with = "name")]
    pub image: Option<String>,

    /// Query by image name instead of NVR
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// Image version (with --name)
    #[arg(long = "image-version", id = "image_version", requires = "name")]
    pub image_version: Option<String>,

    /// Publishing workflow: stratosphere or community
    #[arg(long, short = 'w')]
    pub workflow: Option<Workflow>,

    /// Cloud name (APIv2 only)
    #[arg(long)]
    pub cloud: Option<String>,

    /// Render APIv2 results in the flat APIv1 shape
    #[arg(long)]
    pub classic: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  POLICY / MAPPING
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct PolicyArgs {
    /// Policy ID
    pub id: String,

    /// List the policy's mappings instead
    #[arg(long = "list-mappings")]
    pub list_mappings: bool,
}

#[derive(Debug, Args)]
pub struct MappingArgs {
    /// Mapping ID
    pub id: String,

    /// List the mapping's destinations instead
    #[arg(long = "list-destinations")]
    pub list_destinations: bool,
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
    /// Display current resolved configuration
    Show,

    /// Print the config file location
    Path,

    /// Set a value on the active profile
    Set {
        /// Profile key (url, api_version, timeout, retries, backoff_factor,
        /// insecure, ca_cert, offline_mappings)
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
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
