//! Tracing and logging setup module.
//!
//! This module provides:
//! - Structured logging configuration
//! - Tracing span creation utilities

use anyhow::Result;
use tracing_subscriber::prelude::*;

use crate::observability_config::ObservabilityConfig;

/// Initialize structured logging with tracing and configuration
///
/// `RUST_LOG` directives are honoured; the configured level applies to this
/// crate's targets.
pub fn init_tracing_with_config(config: &ObservabilityConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(format!("ingredient_amounts={}", config.log_level).parse()?);

    // Logs go to stderr so stdout stays machine-readable
    if config.use_pretty_format() {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_thread_names(false),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true),
            )
            .try_init()?;
    }

    tracing::info!(
        environment = %config.environment,
        log_level = %config.log_level,
        pretty = config.use_pretty_format(),
        "Tracing initialized with structured logging"
    );
    Ok(())
}

/// Create a span for one parse operation
pub fn parse_span(operation: &str, sentence_length: usize) -> tracing::Span {
    tracing::info_span!(
        "parse_operation",
        operation = operation,
        sentence_length = sentence_length,
        component = "parser"
    )
}
