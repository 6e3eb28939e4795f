//! Observability module for logging and metrics setup.
//!
//! This module provides:
//! - Structured logging with configurable levels and formats
//! - Parse metrics recorded through the `metrics` facade
//!
//! No exporter is installed here; an embedding application installs its own
//! `metrics` recorder and every counter and histogram below flows into it.

pub mod metrics;
pub mod tracing_mod;

use anyhow::Result;

use crate::observability_config::ObservabilityConfig;

pub use self::metrics::{record_fallback_metrics, record_parse_metrics};
pub use self::tracing_mod::{init_tracing_with_config, parse_span};

/// Initialize observability with custom configuration
pub fn init_observability_with_config(config: &ObservabilityConfig) -> Result<()> {
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid observability configuration: {}", e))?;

    init_tracing_with_config(config)?;

    tracing::info!(
        environment = %config.environment,
        log_level = %config.log_level,
        "Observability initialized"
    );
    Ok(())
}
