use anyhow::Result;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the logging system
///
/// Logs go to stderr so stdout only carries rendered output. `RUST_LOG`
/// overrides `level`; `debug` forces the debug level for this crate family.
pub fn init_logging(level: &str, debug: bool) -> Result<()> {
    let filter = if debug {
        EnvFilter::new(debug_directive(level))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(true),
        )
        .try_init()?;

    Ok(())
}

/// Base level for third-party crates, debug for ours (targets match by prefix)
fn debug_directive(level: &str) -> String {
    format!("{level},last30days=debug")
}
