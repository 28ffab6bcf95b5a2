//! Command dispatch and handlers.

pub mod audit;
pub mod undo;

use crate::cli::{Cli, Mode};
use crate::config::{AuditConfig, AuditPaths};
use crate::context::ServiceContext;
use crate::logging;

/// Dispatch parsed arguments to the audit or undo handler.
///
/// Configuration problems are reported before the log file is opened or
/// anything else is written.
///
/// # Errors
///
/// Returns an error string if configuration is invalid or the handler fails.
pub fn dispatch(cli: &Cli) -> Result<(), String> {
    let ctx = ServiceContext::live();
    let dir = cli.directory();
    if !ctx.fs.exists(&dir) {
        return Err(format!("Audit directory not found: {}", dir.display()));
    }
    let paths = AuditConfig::load(&*ctx.fs, &dir)?.resolve(&dir);
    preflight(&ctx, &paths, cli.mode())?;

    logging::init(&paths.log_file)?;
    dispatch_with_context(cli.mode(), &ctx, &paths)
}

/// Dispatch a mode with the given service context and layout.
///
/// # Errors
///
/// Returns an error string if the selected handler fails.
pub fn dispatch_with_context(
    mode: Mode,
    ctx: &ServiceContext,
    paths: &AuditPaths,
) -> Result<(), String> {
    match mode {
        Mode::Audit { dry_run } => audit::run(ctx, paths, dry_run),
        Mode::Undo => undo::run(ctx, paths),
    }
}

fn preflight(ctx: &ServiceContext, paths: &AuditPaths, mode: Mode) -> Result<(), String> {
    if matches!(mode, Mode::Audit { .. }) && !ctx.fs.exists(&paths.adverts_file) {
        return Err(format!("Live registry not found: {}", paths.adverts_file.display()));
    }
    Ok(())
}
