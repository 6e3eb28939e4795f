//! # Unified Application Configuration
//!
//! This module provides the configuration consumed by the parser and the
//! command-line driver. Settings are loaded from environment variables,
//! validated, and handed to the components that need them.

use crate::errors::{ParseError, ParseResult};
use crate::observability_config::ObservabilityConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use tracing::debug;

/// How an amount's confidence is derived from its tokens' confidences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceAggregation {
    /// Lowest token confidence
    #[default]
    Min,
    /// Arithmetic mean of token confidences
    Mean,
}

impl ConfidenceAggregation {
    /// Aggregate a set of confidences; an empty set aggregates to 0
    pub fn aggregate(&self, confidences: &[f64]) -> f64 {
        if confidences.is_empty() {
            return 0.0;
        }
        match self {
            ConfidenceAggregation::Min => confidences.iter().copied().fold(f64::INFINITY, f64::min),
            ConfidenceAggregation::Mean => {
                confidences.iter().sum::<f64>() / confidences.len() as f64
            }
        }
    }
}

impl FromStr for ConfidenceAggregation {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "min" | "minimum" => Ok(ConfidenceAggregation::Min),
            "mean" | "average" => Ok(ConfidenceAggregation::Mean),
            other => Err(ParseError::Config(format!(
                "Unknown confidence aggregation '{}'. Expected 'min' or 'mean'",
                other
            ))),
        }
    }
}

/// Parser configuration settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Always report units as plain strings, never as physical-unit handles
    pub string_units: bool,
    /// Prefer imperial variants of ambiguous volume units ("cup")
    pub imperial_units: bool,
    /// How token confidences combine into an amount's confidence
    pub confidence_aggregation: ConfidenceAggregation,
    /// Run the rule-based fallback pass when the labeled pass finds no amounts
    pub enable_fallback: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            string_units: false,
            imperial_units: false,
            confidence_aggregation: ConfidenceAggregation::Min,
            enable_fallback: true,
        }
    }
}

impl ParserConfig {
    /// Load parser configuration from environment variables
    pub fn from_env() -> ParseResult<Self> {
        let defaults = Self::default();
        Ok(Self {
            string_units: parse_bool_var("INGREDIENT_STRING_UNITS", defaults.string_units)?,
            imperial_units: parse_bool_var("INGREDIENT_IMPERIAL_UNITS", defaults.imperial_units)?,
            confidence_aggregation: match env::var("INGREDIENT_CONFIDENCE_AGGREGATION") {
                Ok(value) => value.parse()?,
                Err(_) => defaults.confidence_aggregation,
            },
            enable_fallback: parse_bool_var(
                "INGREDIENT_ENABLE_FALLBACK",
                defaults.enable_fallback,
            )?,
        })
    }

    /// Validate parser configuration.
    ///
    /// Both unit flags may be set; string units win and `imperial_units` is ignored.
    pub fn validate(&self) -> ParseResult<()> {
        if self.string_units && self.imperial_units {
            debug!("imperial_units ignored while string_units is enabled");
        }
        Ok(())
    }
}

fn parse_bool_var(name: &str, default: bool) -> ParseResult<bool> {
    match env::var(name) {
        Ok(value) => parse_bool(&value)
            .ok_or_else(|| ParseError::Config(format!("{} must be 'true' or 'false'", name))),
        Err(_) => Ok(default),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// Main application configuration combining all sub-configurations
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Parser configuration
    pub parser: ParserConfig,
    /// Logging configuration
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> ParseResult<Self> {
        Ok(Self {
            parser: ParserConfig::from_env()?,
            observability: ObservabilityConfig::from_env(),
        })
    }

    /// Validate all configuration sections
    pub fn validate(&self) -> ParseResult<()> {
        self.parser.validate()?;
        self.observability
            .validate()
            .map_err(ParseError::Config)?;
        Ok(())
    }

    /// Get a summary of the current configuration for logging
    pub fn summary(&self) -> String {
        format!(
            "Configuration: string_units={}, imperial_units={}, confidence={:?}, fallback={}, environment={}, log_level={}",
            self.parser.string_units,
            self.parser.imperial_units,
            self.parser.confidence_aggregation,
            self.parser.enable_fallback,
            self.observability.environment,
            self.observability.log_level
        )
    }
}
