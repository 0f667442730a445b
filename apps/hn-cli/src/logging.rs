use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry};

use crate::error::{CliError, CliResult};

/// Install a stderr subscriber. `RUST_LOG` wins over the verbosity flag.
pub fn setup_tracing(verbose: bool) -> CliResult<()> {
    let level = if verbose { "hn_cli=debug" } else { "hn_cli=info" };
    let directive = level
        .parse()
        .map_err(|e: tracing_subscriber::filter::ParseError| CliError::Logging(e.to_string()))?;
    let filter = EnvFilter::builder()
        .with_default_directive(directive)
        .from_env_lossy();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    Registry::default()
        .with(stderr_layer)
        .with(filter)
        .try_init()
        .map_err(|e| CliError::Logging(e.to_string()))
}
