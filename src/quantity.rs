//! # Quantity Coercion
//!
//! Turns quantity text into numbers while the caller keeps the original text.
//!
//! Accepted forms:
//!
//! - integers and decimals: `2`, `1.5`, `.5`
//! - simple fractions: `3/4`
//! - mixed numbers: `1 1/2`
//! - quantity words: `a`, `half`, `dozen`, and a number followed by one (`2 dozen`)
//! - ranges: `1-2`, `1 1/2-2`
//! - multipliers: `2x`, `0.5X`

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::tables;

lazy_static! {
    static ref DECIMAL_PATTERN: Regex =
        Regex::new(r"^(?:\d+(?:\.\d*)?|\.\d+)$").expect("Invalid decimal regex pattern");
    static ref FRACTION_PATTERN: Regex =
        Regex::new(r"^(\d+)/(\d+)$").expect("Invalid fraction regex pattern");
    static ref RANGE_PATTERN: Regex =
        Regex::new(r"^([\d./ ]*\d)\s*-\s*([\d./ ]*\d)$").expect("Invalid range regex pattern");
    static ref MULTIPLIER_PATTERN: Regex =
        Regex::new(r"^([\d./ ]*\d)\s*[xX]$").expect("Invalid multiplier regex pattern");
}

/// Why a quantity could not be coerced to a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuantityParseError {
    /// Nothing to parse.
    Empty,
    /// A fraction with a zero denominator, e.g. `1/0`.
    ZeroDenominator(String),
    /// Text that is not a number in any accepted form.
    NotNumeric(String),
}

impl fmt::Display for QuantityParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuantityParseError::Empty => write!(f, "quantity text is empty"),
            QuantityParseError::ZeroDenominator(text) => {
                write!(f, "fraction '{}' has a zero denominator", text)
            }
            QuantityParseError::NotNumeric(text) => write!(f, "'{}' is not a number", text),
        }
    }
}

impl std::error::Error for QuantityParseError {}

/// Whether `text` is purely numeric: digits with optional `.`, `/`, `-`,
/// inner spaces and a trailing multiplier `x`.
pub fn is_numeric(text: &str) -> bool {
    let body = text.trim().trim_end_matches(['x', 'X']);
    body.chars().any(|c| c.is_ascii_digit())
        && body
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '/' | '-' | ' '))
}

/// Parse a single number: integer, decimal, fraction or mixed number.
pub fn parse_number(text: &str) -> Result<f64, QuantityParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(QuantityParseError::Empty);
    }

    let parts: Vec<&str> = text.split_whitespace().collect();
    match parts.as_slice() {
        [single] => parse_simple(single),
        [whole, fraction]
            if DECIMAL_PATTERN.is_match(whole) && FRACTION_PATTERN.is_match(fraction) =>
        {
            Ok(parse_simple(whole)? + parse_simple(fraction)?)
        }
        _ => Err(QuantityParseError::NotNumeric(text.to_string())),
    }
}

fn parse_simple(text: &str) -> Result<f64, QuantityParseError> {
    if DECIMAL_PATTERN.is_match(text) {
        return text
            .parse::<f64>()
            .map_err(|_| QuantityParseError::NotNumeric(text.to_string()));
    }

    if let Some(caps) = FRACTION_PATTERN.captures(text) {
        let numerator: f64 = caps[1]
            .parse()
            .map_err(|_| QuantityParseError::NotNumeric(text.to_string()))?;
        let denominator: f64 = caps[2]
            .parse()
            .map_err(|_| QuantityParseError::NotNumeric(text.to_string()))?;
        if denominator == 0.0 {
            return Err(QuantityParseError::ZeroDenominator(text.to_string()));
        }
        return Ok(numerator / denominator);
    }

    if let Some(value) = tables::word_quantity(text) {
        return Ok(value);
    }

    Err(QuantityParseError::NotNumeric(text.to_string()))
}

/// Split an embedded numeric range ("1-2", "1 1/2-2") into its two bounds.
pub fn split_range(text: &str) -> Option<(&str, &str)> {
    let caps = RANGE_PATTERN.captures(text.trim())?;
    let (low, high) = (caps.get(1)?, caps.get(2)?);
    Some((low.as_str().trim(), high.as_str().trim()))
}

/// Strip a multiplier suffix ("2x" → "2").
pub fn strip_multiplier(text: &str) -> Option<&str> {
    let caps = MULTIPLIER_PATTERN.captures(text.trim())?;
    caps.get(1).map(|m| m.as_str().trim())
}

/// A fully coerced quantity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedQuantity {
    pub value: f64,
    pub max: Option<f64>,
    pub is_range: bool,
    pub is_multiplier: bool,
}

/// Parse any quantity text the Amount Builder can produce.
///
/// A trailing quantity word scales the numeric part ("2 dozen" = 24,
/// "1-2 dozen" = 12-24). Range bounds are ordered so that `max >= value`.
pub fn parse_quantity(text: &str) -> Result<ParsedQuantity, QuantityParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(QuantityParseError::Empty);
    }

    let (numeric, scale) = match text.rsplit_once(' ') {
        Some((head, word)) if is_numeric(head) && !is_numeric(word) => {
            let scale = tables::word_quantity(word)
                .ok_or_else(|| QuantityParseError::NotNumeric(text.to_string()))?;
            (head, scale)
        }
        _ => (text, 1.0),
    };

    if let Some(base) = strip_multiplier(numeric) {
        return Ok(ParsedQuantity {
            value: parse_number(base)? * scale,
            max: None,
            is_range: false,
            is_multiplier: true,
        });
    }

    if let Some((low, high)) = split_range(numeric) {
        let low = parse_number(low)? * scale;
        let high = parse_number(high)? * scale;
        return Ok(ParsedQuantity {
            value: low.min(high),
            max: Some(low.max(high)),
            is_range: true,
            is_multiplier: false,
        });
    }

    Ok(ParsedQuantity {
        value: parse_number(numeric)? * scale,
        max: None,
        is_range: false,
        is_multiplier: false,
    })
}
