use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs the global subscriber. `RUST_LOG` wins over `default_directive`.
pub fn init_logging(default_directive: &str) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_thread_ids(true).with_target(false))
        .try_init()?;

    tracing::debug!("Tracing initialized.");
    Ok(())
}
