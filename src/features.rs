//! # Token Features
//!
//! Per-token feature descriptors handed to the sequence labeler. Every feature
//! is a pure function of the token and its immediate neighbours.

use serde::{Deserialize, Serialize};

use crate::quantity;
use crate::tables;
use crate::text_processing::{is_punctuation, Token};

/// Capitalisation pattern of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capitalization {
    Lower,
    Upper,
    Title,
    Mixed,
    /// No alphabetic characters
    None,
}

impl Capitalization {
    pub fn of(text: &str) -> Self {
        let letters: Vec<char> = text.chars().filter(|c| c.is_alphabetic()).collect();
        let Some(first) = letters.first() else {
            return Capitalization::None;
        };
        if letters.iter().all(|c| c.is_lowercase()) {
            Capitalization::Lower
        } else if letters.iter().all(|c| c.is_uppercase()) {
            Capitalization::Upper
        } else if first.is_uppercase() && letters[1..].iter().all(|c| c.is_lowercase()) {
            Capitalization::Title
        } else {
            Capitalization::Mixed
        }
    }
}

/// Feature descriptor for one token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenFeatures {
    pub lowercase: String,
    pub word_shape: String,
    pub is_numeric: bool,
    pub has_digit: bool,
    pub capitalization: Capitalization,
    pub is_stop_word: bool,
    pub is_unit: bool,
    pub is_ambiguous_unit: bool,
    pub is_unit_modifier: bool,
    pub is_punctuation: bool,
    pub is_approximate_marker: bool,
    pub prev_word: Option<String>,
    pub next_word: Option<String>,
    pub prev_is_numeric: bool,
    pub next_is_unit: bool,
}

/// Compressed shape of a token: "Cups" → "Xx", "1/2" → "d/d", "250ml" → "dx".
pub fn word_shape(text: &str) -> String {
    let mut shape = String::new();
    for c in text.chars() {
        let class = if c.is_uppercase() {
            'X'
        } else if c.is_alphabetic() {
            'x'
        } else if c.is_ascii_digit() {
            'd'
        } else {
            c
        };
        if !shape.ends_with(class) {
            shape.push(class);
        }
    }
    shape
}

fn features_for(tokens: &[Token], index: usize) -> TokenFeatures {
    let text = tokens[index].text.as_str();
    let prev = index.checked_sub(1).and_then(|i| tokens.get(i));
    let next = tokens.get(index + 1);

    TokenFeatures {
        lowercase: text.to_lowercase(),
        word_shape: word_shape(text),
        is_numeric: quantity::is_numeric(text),
        has_digit: text.chars().any(|c| c.is_ascii_digit()),
        capitalization: Capitalization::of(text),
        is_stop_word: tables::is_stop_word(text),
        is_unit: tables::is_unit(text),
        is_ambiguous_unit: tables::is_ambiguous_unit(text),
        is_unit_modifier: tables::is_unit_modifier(text),
        is_punctuation: is_punctuation(text),
        is_approximate_marker: tables::is_approximate_marker(text),
        prev_word: prev.map(|t| t.text.to_lowercase()),
        next_word: next.map(|t| t.text.to_lowercase()),
        prev_is_numeric: prev.is_some_and(|t| quantity::is_numeric(&t.text)),
        next_is_unit: next.is_some_and(|t| tables::is_unit(&t.text)),
    }
}

/// Compute the feature descriptor for every token, in order.
pub fn extract_features(tokens: &[Token]) -> Vec<TokenFeatures> {
    (0..tokens.len()).map(|i| features_for(tokens, i)).collect()
}
