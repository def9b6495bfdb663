//! gitmirror CLI - Command line interface for gitmirror
//!
//! Keeps a local mirror of every repository owned by a GitHub account.

mod commands;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use gitmirror_core::{CliOverrides, Config};

use commands::RunArgs;

/// gitmirror: keep a local clone of every repository you own
#[derive(Parser, Debug)]
#[command(name = "gitmirror")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ~/.config/gitmirror/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// File with GitHub token (overrides GITHUB_TOKEN and secrets file)
    #[arg(long, global = true)]
    token_file: Option<PathBuf>,

    /// Delay between git checks, in seconds
    #[arg(long, global = true, allow_negative_numbers = true)]
    update_delay: Option<i64>,

    /// File name of log file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Directory to store data in
    #[arg(long, global = true)]
    work_dir: Option<PathBuf>,

    /// Path to git executable
    #[arg(long = "git", global = true)]
    git_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Mirror repositories, polling until interrupted (default)
    #[command(visible_alias = "r")]
    Run(RunArgs),

    /// Show current configuration
    Config,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            update_delay: self.update_delay,
            work_dir: self.work_dir.clone(),
            git_path: self.git_path.clone(),
            log_file: self.log_file.clone(),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration with overrides
    let config = match Config::load_with_overrides(cli.config.as_deref(), cli.overrides()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let _log_guard = match logging::init(cli.verbose, config.log.file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    if cli.verbose {
        tracing::info!(
            update_delay = ?config.sync.update_delay,
            work_dir = ?config.sync.work_dir,
            git = %config.git.path,
            "Configuration loaded"
        );
    }

    let result = match cli.command {
        Some(Commands::Version) => {
            println!("gitmirror {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Some(Commands::Run(args)) => args.execute(&config, cli.token_file).await,
        None => RunArgs::default().execute(&config, cli.token_file).await,
        Some(Commands::Config) => {
            print_config(&config);
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Unhandled error during work: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_config(config: &Config) {
    println!("gitmirror Configuration");
    println!("=======================");
    println!();
    println!("Sync Settings:");
    println!("  update_delay: {}s", config.sync.update_delay.as_secs());
    match config.repos_dir() {
        Ok(dir) => println!("  repos_dir: {}", dir.display()),
        Err(e) => println!("  repos_dir: (unavailable: {})", e),
    }
    println!();
    println!("Git Settings:");
    println!("  path: {}", config.git.path);
    println!();
    println!("Log Settings:");
    println!(
        "  file: {}",
        config
            .log
            .file
            .as_ref()
            .map(|f| f.display().to_string())
            .unwrap_or_else(|| "(stderr only)".to_string())
    );
    println!();
    if let Some(path) = Config::default_config_path() {
        println!("Config file: {}", path.display());
        if path.exists() {
            println!("  (exists)");
        } else {
            println!("  (not found - using defaults)");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults_to_run() {
        let cli = Cli::try_parse_from(["gitmirror"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.token_file.is_none());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from([
            "gitmirror",
            "run",
            "--once",
            "--token-file",
            "/etc/gitmirror/token",
            "--update-delay",
            "60",
            "--work-dir",
            "/srv",
        ])
        .unwrap();

        assert!(matches!(cli.command, Some(Commands::Run(RunArgs { once: true }))));
        assert_eq!(cli.token_file, Some(PathBuf::from("/etc/gitmirror/token")));
        assert_eq!(cli.overrides().update_delay, Some(60));
        assert_eq!(cli.overrides().work_dir, Some(PathBuf::from("/srv")));
    }

    #[test]
    fn test_negative_delay_reaches_validation() {
        let cli = Cli::try_parse_from(["gitmirror", "--update-delay", "-5"]).unwrap();
        assert_eq!(cli.update_delay, Some(-5));

        let result = Config::default().with_cli_overrides(cli.overrides());
        assert!(result.is_err());
    }
}
