pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "loadbridge",
    about = "LoadBridge operator CLI",
    long_about = "Inspect configuration, check readiness, apply migrations, and reset the call log.",
    after_help = "Examples:\n  loadbridge doctor --json\n  loadbridge config\n  loadbridge reset --backup-dir backups"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, keys, load catalog, and DB connectivity")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Clear the persisted call log")]
    Reset {
        #[arg(long, help = "Write a JSON backup of the call log into this directory first")]
        backup_dir: Option<PathBuf>,
    },
    #[command(about = "Generate a random API key")]
    Keygen,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Reset { backup_dir } => commands::reset::run(backup_dir.as_deref()),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::Keygen => commands::CommandResult { exit_code: 0, output: commands::keygen::run() },
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
