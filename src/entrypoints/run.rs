use crate::app::{self, settings::Settings};
use crate::entrypoints::cli::parse_args;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Native entry point
pub fn native_main() -> ExitCode {
    // Setup logging; RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::debug!(
        "{} {} starting",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let settings = match parse_args::<Settings>() {
        Ok(settings) => settings,
        Err(e) => e.exit(),
    };

    match app::run(&settings) {
        Ok(summary) => {
            tracing::info!(
                features = summary.features,
                updated = summary.updated,
                skipped = summary.skipped,
                output = %settings.output.display(),
                "resynchronization finished"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!("Resynchronization failed: {err}");
            ExitCode::FAILURE
        }
    }
}
