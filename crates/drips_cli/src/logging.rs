use drips_core::error::AppError;
use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

/// Installs the stderr subscriber. `RUST_LOG` wins over the flag-derived
/// default level.
pub fn init_tracing(verbose: u8, quiet: u8) -> Result<(), AppError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level(verbose, quiet)))
        .map_err(|err| AppError::invalid_input(format!("invalid RUST_LOG / log filter: {err}")))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    // A subscriber may already be installed when running inside tests.
    if let Err(err) = init_result {
        tracing::debug!("tracing already initialized: {err}");
    }
    Ok(())
}

fn default_level(verbose: u8, quiet: u8) -> &'static str {
    if quiet >= 1 {
        "error"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    }
}
