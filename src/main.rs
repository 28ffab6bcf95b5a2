//! Binary entrypoint for the `bbs-audit` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    // A missing .env is fine; the environment and defaults still apply.
    let _ = dotenvy::dotenv();
    match bbs_audit::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
