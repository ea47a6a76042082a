//! Atelier — upgrade scaffolded design projects to the running release.
//!
//! # Usage
//!
//! ```text
//! atelier upgrade [--root <dir>] [--dry-run] [--json]
//! atelier doctor  [--root <dir>] [--json]
//! atelier status  [--root <dir>] [--json]
//! ```
//!
//! Logs go to stderr and honour `RUST_LOG`; `--json` output goes to stdout.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{doctor::DoctorArgs, status::StatusArgs, upgrade::UpgradeArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "atelier",
    version,
    about = "Bring an atelier design project up to date with this release",
    long_about = None,
)]
struct Cli {
    /// Emit log lines as JSON objects.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run every migration and advance the version marker on success.
    Upgrade(UpgradeArgs),

    /// Same as upgrade, logging every migration check.
    Doctor(DoctorArgs),

    /// Show which migrations would apply, without changing anything.
    Status(StatusArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_level = match cli.command {
        Commands::Doctor(_) => "debug",
        _ => "info",
    };
    init_tracing(default_level, cli.log_json);

    match cli.command {
        Commands::Upgrade(args) => args.run(),
        Commands::Doctor(args) => args.run(),
        Commands::Status(args) => args.run(),
    }
}

fn init_tracing(default_level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
