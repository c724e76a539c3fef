//! Application startup and utilities.
//!
//! This module contains exit codes, tracing setup, and error hints
//! that support the main entry point.

use ethcfg::config::ConfigError;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::run::RunError;

/// Application exit codes.
pub mod exit_code {
    use std::process::ExitCode;

    /// Success (exit code 0).
    pub const SUCCESS: ExitCode = ExitCode::SUCCESS;

    /// Configuration error (exit code 1) - invalid args, unreadable config file, etc.
    pub const CONFIG_ERROR: ExitCode = ExitCode::FAILURE;

    /// Runtime error (exit code 2) - configuration service failure, invalid form, etc.
    ///
    /// Note: This is a function rather than a constant because `ExitCode::from()` is not `const fn`.
    pub fn runtime_error() -> ExitCode {
        ExitCode::from(2)
    }

    /// Internet unreachable (exit code 3) - returned by the `probe` command.
    pub fn unreachable() -> ExitCode {
        ExitCode::from(3)
    }
}

/// Prints helpful hints for common configuration errors.
pub fn print_config_hint(error: &ConfigError) {
    match error {
        ConfigError::FileRead { .. } => {
            eprintln!("\nRun 'ethcfg init' to generate a configuration template.");
        }
        ConfigError::InvalidAddressing { .. } => {
            eprintln!("\nSet gateway.addressing to \"per-interface\" or \"legacy\".");
        }
        _ => {}
    }
}

/// Prints helpful hints for common runtime errors.
pub fn print_run_hint(error: &RunError) {
    match error {
        RunError::Unavailable(_) => {
            eprintln!("\nUse --store to choose a profile store this user can read and write.");
        }
        RunError::NoInterface => {
            eprintln!("\nUse --manage <NAME> to name the interfaces to configure.");
        }
        _ => {}
    }
}

/// Maps a runtime error to its exit code.
pub fn run_exit_code(error: &RunError) -> std::process::ExitCode {
    match error {
        RunError::Unreachable { .. } => exit_code::unreachable(),
        _ => exit_code::runtime_error(),
    }
}

/// Sets up the tracing subscriber for logging.
pub fn setup_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
