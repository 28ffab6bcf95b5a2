//! Core library for the `bbs-audit` CLI.
//!
//! Probes every endpoint in a BBS registry, moves unreachable entries and
//! their advert files to the dead side, and keeps enough backup state to
//! undo the most recent run.

pub mod adapters;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod endpoint;
pub mod ledger;
pub mod logging;
pub mod ports;
pub mod reconcile;
pub mod registry;
pub mod undo;

use clap::Parser;

/// Run the CLI with the provided arguments.
///
/// `--help` and `--version` print to stdout and succeed.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match cli::Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => {
            print!("{err}");
            return Ok(());
        }
        Err(err) => return Err(err.to_string()),
    };
    commands::dispatch(&cli)
}
