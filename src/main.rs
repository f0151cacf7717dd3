//! ArchSync
//!
//! Schema evolution engine: diffs entity specifications and generates
//! dialect-specific SQL migrations.

use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = archsync_cli::parse();

    // RUST_LOG wins over -v
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match archsync_cli::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            archsync_cli::report_error(&err);
            ExitCode::FAILURE
        }
    }
}
