//! # Parser Error Types
//!
//! This module defines the error and warning types used throughout the parser.
//!
//! Natural-language input never produces an `Err`: a malformed quantity drops
//! only the affected amount and is reported as a [`ParseWarning`], an unknown
//! unit falls back to its raw text, and empty input yields no amounts.
//! `Err` is reserved for configuration mistakes and for a labeler that breaks
//! its contract.

use serde::{Deserialize, Serialize};
use std::fmt;

/// General parser error type for consistent error handling
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Configuration validation errors
    Config(String),
    /// Sequence labeler returned output that does not match its input
    Labeling(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Config(msg) => write!(f, "[CONFIG] {}", msg),
            ParseError::Labeling(msg) => write!(f, "[LABELING] {}", msg),
        }
    }
}

impl std::error::Error for ParseError {}

/// Result type alias for convenience
pub type ParseResult<T> = Result<T, ParseError>;

/// Non-fatal diagnostic attached to a parse result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseWarning {
    /// An amount was dropped because its quantity could not be parsed
    QuantityDropped {
        /// The offending quantity text
        quantity: String,
        /// Index of the amount's first token
        starting_index: usize,
        /// Why parsing failed
        reason: String,
    },
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseWarning::QuantityDropped {
                quantity,
                starting_index,
                reason,
            } => write!(
                f,
                "[QUANTITY] dropped amount '{}' at token {}: {}",
                quantity, starting_index, reason
            ),
        }
    }
}
