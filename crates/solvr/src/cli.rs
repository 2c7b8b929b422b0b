//! Clap derive structures for the `solvr` CLI.
//!
//! Also compiled by `build.rs` for man page generation, so this file may
//! only depend on `clap` and `clap_complete`.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// solvr -- sign in to Solvr and vote from the terminal
#[derive(Debug, Parser)]
#[command(
    name = "solvr",
    version,
    about = "Sign in to Solvr and vote on posts from the command line",
    long_about = "Command-line client for the Solvr knowledge platform.\n\n\
        Keeps a persistent session (token stored in the data directory or the\n\
        OS keyring) and casts votes with immediate local feedback.",
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
    /// Solvr API base URL (overrides config)
    #[arg(long, env = "SOLVR_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Route the session treats as the current page (affects login prompts)
    #[arg(long, default_value = "/", global = true)]
    pub route: String,

    /// Where the session token is kept (overrides config)
    #[arg(long, value_enum, env = "SOLVR_STORAGE", global = true)]
    pub storage: Option<StorageArg>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "SOLVR_OUTPUT",
        default_value = "plain",
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
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides config)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

// ── Shared Enums ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text (default)
    Plain,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageArg {
    /// JSON file in the data directory
    File,
    /// OS credential store
    Keyring,
    /// Nothing persists between runs
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProviderArg {
    Github,
    Google,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DirectionArg {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CurrentVoteArg {
    Up,
    Down,
    /// Known not to have voted
    None,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the signed-in identity
    #[command(alias = "me")]
    Whoami,

    /// Sign in with email and password
    Login(LoginArgs),

    /// Create an account and sign in
    #[command(alias = "join")]
    Register(RegisterArgs),

    /// Forget the stored session
    Logout,

    /// Start a sign-in with an identity provider
    Auth(AuthArgs),

    /// Finish a provider sign-in with the token from the callback URL
    Callback(CallbackArgs),

    /// Vote on a post
    Vote(VoteArgs),

    /// Show your current vote on a post
    MyVote(MyVoteArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Account email
    #[arg(long, short = 'e')]
    pub email: String,

    /// Password (prompted when omitted)
    #[arg(long, env = "SOLVR_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    #[arg(long, short = 'e')]
    pub email: String,

    /// Public handle
    #[arg(long, short = 'u')]
    pub username: String,

    /// Name shown on posts
    #[arg(long)]
    pub display_name: String,

    /// Password (prompted when omitted)
    #[arg(long, env = "SOLVR_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Debug, Args)]
pub struct AuthArgs {
    /// Identity provider
    #[arg(value_enum)]
    pub provider: ProviderArg,

    /// Page to return to after signing in
    #[arg(long)]
    pub next: Option<String>,
}

#[derive(Debug, Args)]
pub struct CallbackArgs {
    /// Token from the `?token=` parameter of the callback URL
    #[arg(long, env = "SOLVR_TOKEN", hide_env_values = true)]
    pub token: String,
}

#[derive(Debug, Args)]
pub struct VoteArgs {
    /// Post ID
    pub post_id: String,

    #[arg(value_enum)]
    pub direction: DirectionArg,

    /// Score currently displayed for the post
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub score: i64,

    /// Your existing vote, if known; looked up when omitted
    #[arg(long, value_enum)]
    pub current: Option<CurrentVoteArg>,
}

#[derive(Debug, Args)]
pub struct MyVoteArgs {
    /// Post ID
    pub post_id: String,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
