//! Clap derive structures for the `iobuilt` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use iobuilt_core::Role;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// iobuilt -- command-line client for IoBuilt building management
#[derive(Debug, Parser)]
#[command(
    name = "iobuilt",
    version,
    about = "Manage IoBuilt projects, devices and subscriptions from the command line",
    long_about = "A command-line client for the IoBuilt IoT building-management platform.\n\n\
        Builders manage projects, clients, devices and their subscription;\n\
        owners monitor the devices in their units.",
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
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "IOBUILT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL (overrides config)
    #[arg(long, short = 'u', global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "IOBUILT_OUTPUT",
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
    /// Sign in, sign out and manage accounts
    Auth(AuthArgs),

    /// View and edit the signed-in user's profile
    Profile(ProfileArgs),

    /// Manage a builder's projects
    #[command(alias = "proj", alias = "p")]
    Projects(ProjectsArgs),

    /// Manage a builder's clients
    #[command(alias = "cl")]
    Clients(ClientsArgs),

    /// Manage IoT devices
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// View and change the builder subscription
    #[command(alias = "sub")]
    Subscription(SubscriptionArgs),

    /// Role-aware monitoring of devices and projects
    #[command(alias = "mon")]
    Monitoring(MonitoringArgs),

    /// Dashboards and historical series
    Analytics(AnalyticsArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  AUTH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Sign in and persist the session
    Login {
        /// Account email (prompted when omitted)
        #[arg(long, short = 'e')]
        email: Option<String>,

        /// Store the password in the system keyring
        #[arg(long)]
        remember: bool,
    },

    /// Clear the persisted session
    Logout {
        /// Also forget the keyring password of the signed-in user
        #[arg(long)]
        forget: bool,
    },

    /// Register a new account
    Signup {
        #[arg(long, short = 'e')]
        email: String,

        /// builder or owner
        #[arg(long, default_value = "owner")]
        role: Role,
    },

    /// Show the signed-in user
    Whoami,

    /// Change the signed-in user's password
    Passwd,

    /// List registered users
    Users,

    /// Show one user
    User {
        /// User ID
        id: u64,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PROFILE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub command: ProfileCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// Show a profile (the signed-in user's by default)
    Show {
        /// User ID whose profile to show
        #[arg(long)]
        user: Option<u64>,
    },

    /// Create the signed-in user's profile
    Create(ProfileFields),

    /// Update the signed-in user's profile
    Update(ProfileFields),

    /// Set the secondary contact email
    SecondEmail {
        email: String,
    },
}

#[derive(Debug, Args)]
pub struct ProfileFields {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub username: Option<String>,

    #[arg(long)]
    pub address: Option<String>,

    #[arg(long)]
    pub age: Option<u32>,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub photo_url: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PROJECTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ProjectsArgs {
    #[command(subcommand)]
    pub command: ProjectsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProjectsCommand {
    /// List the builder's projects
    #[command(alias = "ls")]
    List,

    /// Get project details
    Get {
        /// Project ID
        id: u64,
    },

    /// Create a project
    Create {
        #[command(flatten)]
        fields: ProjectFields,

        /// Read the project from a JSON file instead of flags
        #[arg(long, short = 'F', conflicts_with = "name")]
        from_file: Option<PathBuf>,
    },

    /// Update a project
    Update {
        /// Project ID
        id: u64,

        #[command(flatten)]
        fields: ProjectFields,
    },

    /// Delete a project
    #[command(alias = "rm")]
    Delete {
        /// Project ID
        id: u64,
    },
}

#[derive(Debug, Args)]
pub struct ProjectFields {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub location: Option<String>,

    #[arg(long)]
    pub total_units: Option<u32>,

    #[arg(long)]
    pub occupied_units: Option<u32>,

    /// Free-form status; new projects default to "active"
    #[arg(long)]
    pub status: Option<String>,

    #[arg(long)]
    pub image_url: Option<String>,
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
    /// List clients
    #[command(alias = "ls")]
    List {
        /// Only clients of this project
        #[arg(long)]
        project: Option<u64>,
    },

    /// Get client details
    Get {
        /// Client ID
        id: u64,
    },

    /// Create a client
    Create {
        #[command(flatten)]
        fields: ClientFields,

        /// Read the client from a JSON file instead of flags
        #[arg(long, short = 'F', conflicts_with = "full_name")]
        from_file: Option<PathBuf>,
    },

    /// Update a client
    Update {
        /// Client ID
        id: u64,

        #[command(flatten)]
        fields: ClientFields,
    },

    /// Delete a client
    #[command(alias = "rm")]
    Delete {
        /// Client ID
        id: u64,
    },
}

#[derive(Debug, Args)]
pub struct ClientFields {
    #[arg(long)]
    pub full_name: Option<String>,

    #[arg(long)]
    pub project: Option<u64>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub address: Option<String>,

    #[arg(long)]
    pub account_statement: Option<String>,
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
    /// List devices
    #[command(alias = "ls")]
    List {
        /// Only online devices
        #[arg(long, conflicts_with = "offline")]
        online: bool,

        /// Only devices that are not online
        #[arg(long)]
        offline: bool,
    },

    /// Get device details
    Get {
        /// Device ID
        id: u64,
    },

    /// Register a device
    Create {
        #[command(flatten)]
        fields: DeviceFields,

        /// Read the device from a JSON file instead of flags
        #[arg(long, short = 'F', conflicts_with = "name")]
        from_file: Option<PathBuf>,
    },

    /// Update a device
    Update {
        /// Device ID
        id: u64,

        #[command(flatten)]
        fields: DeviceFields,
    },

    /// Flip a device between online and offline
    Toggle {
        /// Device ID
        id: u64,
    },

    /// Delete a device
    #[command(alias = "rm")]
    Delete {
        /// Device ID
        id: u64,
    },

    /// Device counts per type
    Types,
}

#[derive(Debug, Args)]
pub struct DeviceFields {
    #[arg(long)]
    pub name: Option<String>,

    /// e.g. "sensor", "thermostat", "camera"
    #[arg(long = "type")]
    pub device_type: Option<String>,

    #[arg(long)]
    pub location: Option<String>,

    #[arg(long)]
    pub project: Option<u64>,

    #[arg(long)]
    pub mac: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SUBSCRIPTION
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SubscriptionArgs {
    #[command(subcommand)]
    pub command: SubscriptionCommand,
}

#[derive(Debug, Subcommand)]
pub enum SubscriptionCommand {
    /// Show the current subscription
    Show,

    /// List available plans
    Plans,

    /// List invoices of the current subscription
    Invoices,

    /// Extend the current subscription by a year
    Renew,

    /// Cancel the current subscription
    Cancel,

    /// Switch the current subscription to another plan
    ChangePlan {
        /// Plan ID or name
        plan: String,
    },

    /// Start a hosted checkout for a plan
    Checkout {
        /// Plan ID or name
        plan: String,
    },

    /// Confirm a completed checkout
    Confirm {
        /// Checkout session ID
        session_id: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  MONITORING
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct MonitoringArgs {
    #[command(subcommand)]
    pub command: MonitoringCommand,
}

#[derive(Debug, Subcommand)]
pub enum MonitoringCommand {
    /// Device and project totals for the acting user
    Overview,

    /// Devices visible to the acting user, with live readings
    Devices,

    /// The builder's projects
    Projects,

    /// Raw analytics records
    Analytics {
        /// Records of one device
        #[arg(long, conflicts_with = "filter")]
        device: Option<u64>,

        /// Time range for --device (e.g. 24h, 7d)
        #[arg(long, requires = "device")]
        range: Option<String>,

        /// key=value filters
        #[arg(long, short = 'f', value_parser = parse_key_value)]
        filter: Vec<(String, String)>,
    },

    /// Aggregate statistics
    Stats {
        /// Statistics of one project instead of the acting owner
        #[arg(long)]
        project: Option<u64>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ANALYTICS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AnalyticsArgs {
    #[command(subcommand)]
    pub command: AnalyticsCommand,
}

#[derive(Debug, Subcommand)]
pub enum AnalyticsCommand {
    /// Dashboard metrics for the acting user's role
    Dashboard {
        /// Dashboard of another user
        #[arg(long)]
        user: Option<u64>,

        /// Role of the dashboard (defaults to the acting user's)
        #[arg(long)]
        role: Option<Role>,
    },

    /// Historical series of one metric
    History {
        #[arg(long)]
        project: u64,

        /// e.g. temperature, energy, water
        #[arg(long)]
        metric: String,

        /// RFC 3339 start timestamp
        #[arg(long)]
        start: Option<DateTime<Utc>>,

        /// RFC 3339 end timestamp
        #[arg(long)]
        end: Option<DateTime<Utc>>,
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
    /// Interactive setup wizard
    Init,

    /// Show the effective configuration
    Show,

    /// Print the config file path
    Path,

    /// Set a configuration value (dotted keys, e.g. endpoints.clients)
    Set {
        key: String,
        value: String,
    },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .filter(|(k, _)| !k.is_empty())
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))
}
