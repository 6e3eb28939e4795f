//! # Text Processing Module
//!
//! This module turns a raw ingredient sentence into an ordered token sequence
//! plus per-token feature descriptors.
//!
//! ## Rewrite pipeline
//!
//! The sentence passes through [`REWRITE_STEPS`] in order. The order is part of
//! the contract: later steps match on text produced by earlier ones.
//!
//! 1. Unicode vulgar fractions → ASCII fractions ("1½" → "1 1/2", "1-½" → "1-1/2")
//! 2. Spelled-out numbers → digits ("two" → "2")
//! 3. Separate quantities from adjacent units ("250ml" → "250 ml", "cup-2" → "cup - 2")
//! 4. Textual and spaced ranges → hyphenated form ("1 to 2" → "1-2", "1 - 2" → "1-2")
//! 5. "<int> and <fraction>" → mixed number ("1 and 1/2" → "1 1/2")
//! 6. Duplicate-unit ranges → single range ("100 g - 200 g" → "100-200 g")
//! 7. Multipliers → trailing "x" ("2 x" → "2x")
//!
//! Tokenization then splits on whitespace, keeps punctuation as standalone
//! tokens, and keeps mixed numbers ("1 1/2") together as one token.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::features::{extract_features, TokenFeatures};
use crate::tables;

/// A token produced by the normalizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The token text
    pub text: String,
    /// Position of the token in the sentence's token sequence
    pub original_index: usize,
    /// Byte offset of the token in the normalized sentence
    pub offset: usize,
}

impl Token {
    pub fn new(text: impl Into<String>, original_index: usize) -> Self {
        Self {
            text: text.into(),
            original_index,
            offset: 0,
        }
    }
}

/// Result of normalizing one sentence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedSentence {
    /// The raw input sentence
    pub sentence: String,
    /// The sentence after every rewrite step
    pub normalized: String,
    /// Tokens of the normalized sentence, in order
    pub tokens: Vec<Token>,
    /// One feature descriptor per token
    pub features: Vec<TokenFeatures>,
}

impl NormalizedSentence {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn token_texts(&self) -> Vec<&str> {
        self.tokens.iter().map(|t| t.text.as_str()).collect()
    }
}

/// One step of the rewrite pipeline
#[derive(Clone, Copy)]
pub struct RewriteStep {
    pub name: &'static str,
    pub apply: fn(&str) -> String,
}

impl std::fmt::Debug for RewriteStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RewriteStep").field("name", &self.name).finish()
    }
}

/// Upper bound on full pipeline passes per sentence
pub const MAX_REWRITE_PASSES: usize = 8;

/// The rewrite pipeline, in application order
pub const REWRITE_STEPS: &[RewriteStep] = &[
    RewriteStep {
        name: "clean_dashes_and_spaces",
        apply: clean_dashes_and_spaces,
    },
    RewriteStep {
        name: "replace_unicode_fractions",
        apply: replace_unicode_fractions,
    },
    RewriteStep {
        name: "replace_string_numbers",
        apply: replace_string_numbers,
    },
    RewriteStep {
        name: "split_quantity_and_units",
        apply: split_quantity_and_units,
    },
    RewriteStep {
        name: "replace_string_ranges",
        apply: replace_string_ranges,
    },
    RewriteStep {
        name: "combine_quantities_split_by_and",
        apply: combine_quantities_split_by_and,
    },
    RewriteStep {
        name: "replace_dupe_unit_ranges",
        apply: replace_dupe_unit_ranges,
    },
    RewriteStep {
        name: "merge_quantity_x",
        apply: merge_quantity_x,
    },
];

/// Build the unit alternation used by the quantity/unit splitting patterns.
///
/// Units are sorted longest first so that "inches" is preferred over "in", and
/// "in" and "x" are included so "2in" and "2x" are split like units.
fn build_unit_alternation() -> String {
    let mut units: Vec<&str> = tables::UNIT_SPELLINGS_LONGEST_FIRST.clone();
    units.extend(["in", "x"]);
    units.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    units.dedup();
    units
        .into_iter()
        .map(regex::escape)
        .collect::<Vec<String>>()
        .join("|")
}

lazy_static! {
    static ref UNIT_ALTERNATION: String = build_unit_alternation();

    static ref STRING_NUMBER_PATTERNS: Vec<(Regex, &'static str)> = tables::STRING_NUMBERS
        .iter()
        .map(|(word, digits)| {
            let pattern = Regex::new(&format!(r"(?i)\b{}\b", word))
                .expect("String number pattern should be valid");
            (pattern, *digits)
        })
        .collect();

    static ref QUANTITY_UNITS_PATTERN: Regex =
        Regex::new(&format!(r"(\d)-?({})", *UNIT_ALTERNATION))
            .expect("Quantity-unit pattern should be valid");

    static ref UNITS_QUANTITY_PATTERN: Regex =
        Regex::new(&format!(r"({})(\d)", *UNIT_ALTERNATION))
            .expect("Unit-quantity pattern should be valid");

    static ref UNITS_HYPHEN_QUANTITY_PATTERN: Regex =
        Regex::new(&format!(r"({})-(\d)", *UNIT_ALTERNATION))
            .expect("Unit-hyphen-quantity pattern should be valid");

    static ref UNIT_TRAILING_PERIOD_PATTERN: Regex =
        Regex::new(&format!(r"\b({})\.(\s|$)", *UNIT_ALTERNATION))
            .expect("Unit trailing period pattern should be valid");

    // A number with a leading zero only qualifies when followed by a decimal point.
    static ref STRING_RANGE_PATTERN: Regex = Regex::new(
        r"(0\.[0-9]|[1-9][\d.]*?)\s*(-)?\s*(to|or)\s*(-)*\s*((0\.[0-9]+|[1-9][\d.]*?)(-)?)"
    )
    .expect("String range pattern should be valid");

    static ref EXPANDED_RANGE_PATTERN: Regex =
        Regex::new(r"(\d)\s*-\s*(\d)").expect("Expanded range pattern should be valid");

    static ref FRACTION_SPLIT_AND_PATTERN: Regex =
        Regex::new(r"(\d+)\s+and\s+(\d+/\d+)").expect("Fraction split pattern should be valid");

    static ref DUPE_UNIT_RANGES_PATTERN: Regex = Regex::new(
        r"(?i)([\d.]+)\s([a-z]+)\s(?:-|to|or)\s([\d.]+)\s([a-z]+)"
    )
    .expect("Duplicate unit range pattern should be valid");

    // Follow set tracks PUNCTUATION so "2 x(" and "2 x (" tokenize alike
    static ref QUANTITY_X_PATTERN: Regex = Regex::new(&format!(
        r"(\d)\s*[xX](\s|$|[{}])",
        regex::escape(&PUNCTUATION.iter().collect::<String>())
    ))
    .expect("Quantity x pattern should be valid");

    static ref WHITESPACE_PATTERN: Regex =
        Regex::new(r"\s+").expect("Whitespace pattern should be valid");

    static ref CHUNK_PATTERN: Regex = Regex::new(r"\S+").expect("Chunk pattern should be valid");

    static ref MIXED_WHOLE_PATTERN: Regex =
        Regex::new(r"^(?:[\d./]+-)?\d+$").expect("Mixed whole pattern should be valid");

    static ref MIXED_FRACTION_PATTERN: Regex =
        Regex::new(r"^\d+/\d+(?:-[\d./]+|[xX])?$").expect("Mixed fraction pattern should be valid");
}

/// Characters that always form a token of their own
const PUNCTUATION: &[char] = &[',', ';', ':', '(', ')', '[', ']', '{', '}', '"', '!', '?'];

pub fn is_punctuation(text: &str) -> bool {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => PUNCTUATION.contains(&c) || c == '-' || c == '.',
        _ => false,
    }
}

fn clean_dashes_and_spaces(text: &str) -> String {
    let replaced: String = text
        .chars()
        .map(|c| match c {
            '–' | '—' | '‒' | '−' => '-',
            other => other,
        })
        .collect();
    WHITESPACE_PATTERN.replace_all(replaced.trim(), " ").into_owned()
}

/// Replace unicode vulgar fractions with ASCII fractions.
///
/// A space is inserted before the replacement so "1½" becomes "1 1/2", except
/// after a hyphen so "1-½" stays a range ("1-1/2"), or after existing whitespace.
fn replace_unicode_fractions(text: &str) -> String {
    let mut result = String::with_capacity(text.len() + 8);
    let mut previous: Option<char> = None;
    for c in text.chars() {
        match tables::unicode_fraction(c) {
            Some(ascii) => {
                if previous.is_some_and(|p| p != '-' && !p.is_whitespace()) {
                    result.push(' ');
                }
                result.push_str(ascii);
            }
            None if c == '⁄' => result.push('/'),
            None => result.push(c),
        }
        previous = Some(c);
    }
    result
}

fn replace_string_numbers(text: &str) -> String {
    let mut result = text.to_string();
    for (pattern, digits) in STRING_NUMBER_PATTERNS.iter() {
        if pattern.is_match(&result) {
            result = pattern.replace_all(&result, *digits).into_owned();
        }
    }
    result
}

fn split_quantity_and_units(text: &str) -> String {
    let result = QUANTITY_UNITS_PATTERN.replace_all(text, "$1 $2");
    let result = UNITS_QUANTITY_PATTERN.replace_all(&result, "$1 $2");
    let result = UNITS_HYPHEN_QUANTITY_PATTERN.replace_all(&result, "$1 - $2");
    UNIT_TRAILING_PERIOD_PATTERN
        .replace_all(&result, "$1$2")
        .into_owned()
}

fn replace_string_ranges(text: &str) -> String {
    let result = STRING_RANGE_PATTERN.replace_all(text, "${1}-${5}");
    EXPANDED_RANGE_PATTERN
        .replace_all(&result, "${1}-${2}")
        .into_owned()
}

fn combine_quantities_split_by_and(text: &str) -> String {
    FRACTION_SPLIT_AND_PATTERN
        .replace_all(text, "$1 $2")
        .into_owned()
}

/// Collapse "<num> <unit> - <num> <unit>" into "<num>-<num> <unit>" when both
/// unit words name the same unit.
fn replace_dupe_unit_ranges(text: &str) -> String {
    DUPE_UNIT_RANGES_PATTERN
        .replace_all(text, |caps: &Captures| {
            let first_unit = tables::singularize_unit(&caps[2].to_lowercase());
            let second_unit = tables::singularize_unit(&caps[4].to_lowercase());
            if first_unit == second_unit {
                format!("{}-{} {}", &caps[1], &caps[3], &caps[4])
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

fn merge_quantity_x(text: &str) -> String {
    QUANTITY_X_PATTERN
        .replace_all(text, "${1}x${2}")
        .into_owned()
}

/// Split a normalized sentence into tokens.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut pieces: Vec<(String, usize)> = Vec::new();
    for chunk in CHUNK_PATTERN.find_iter(text) {
        let mut current = String::new();
        let mut current_start = chunk.start();
        for (i, c) in chunk.as_str().char_indices() {
            if PUNCTUATION.contains(&c) {
                if !current.is_empty() {
                    pieces.push((std::mem::take(&mut current), current_start));
                }
                pieces.push((c.to_string(), chunk.start() + i));
                current_start = chunk.start() + i + c.len_utf8();
            } else {
                if current.is_empty() {
                    current_start = chunk.start() + i;
                }
                current.push(c);
            }
        }
        if !current.is_empty() {
            pieces.push((current, current_start));
        }
    }

    // Keep mixed numbers ("1 1/2", "1-1 1/2") as a single token
    let mut merged: Vec<(String, usize)> = Vec::with_capacity(pieces.len());
    for (text, offset) in pieces {
        if let Some((previous, _)) = merged.last_mut() {
            if MIXED_WHOLE_PATTERN.is_match(previous) && MIXED_FRACTION_PATTERN.is_match(&text) {
                previous.push(' ');
                previous.push_str(&text);
                continue;
            }
        }
        merged.push((text, offset));
    }

    merged
        .into_iter()
        .enumerate()
        .map(|(original_index, (text, offset))| Token {
            text,
            original_index,
            offset,
        })
        .collect()
}

/// Deterministic sentence normalizer
#[derive(Debug, Clone, Default)]
pub struct Normalizer;

impl Normalizer {
    /// Create a new normalizer
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ingredient_amounts::text_processing::Normalizer;
    ///
    /// let normalizer = Normalizer::new();
    /// let normalized = normalizer.normalize("2 14 ounce cans coconut milk");
    /// assert_eq!(
    ///     normalized.token_texts(),
    ///     vec!["2", "14", "ounce", "cans", "coconut", "milk"]
    /// );
    /// ```
    pub fn new() -> Self {
        info!("Creating new Normalizer with {} rewrite steps", REWRITE_STEPS.len());
        Self
    }

    /// Apply every rewrite step, in order, until the text stops changing.
    ///
    /// Chained constructs ("1 to 2 to 3") need more than one pass; the pass
    /// count is capped at [`MAX_REWRITE_PASSES`].
    pub fn rewrite(&self, sentence: &str) -> String {
        let mut text = sentence.to_string();
        for pass in 0..MAX_REWRITE_PASSES {
            let rewritten = REWRITE_STEPS.iter().fold(text.clone(), |text, step| {
                let rewritten = (step.apply)(&text);
                if rewritten != text {
                    trace!(
                        pass,
                        step = step.name,
                        before = %text,
                        after = %rewritten,
                        "Rewrite step applied"
                    );
                }
                rewritten
            });
            if rewritten == text {
                break;
            }
            text = rewritten;
        }
        text
    }

    /// Normalize a sentence into tokens and feature descriptors
    ///
    /// Empty or whitespace-only input yields no tokens.
    pub fn normalize(&self, sentence: &str) -> NormalizedSentence {
        let normalized = self.rewrite(sentence).trim().to_string();
        let tokens = tokenize(&normalized);
        let features = extract_features(&tokens);

        debug!(
            sentence = %sentence,
            normalized = %normalized,
            token_count = tokens.len(),
            "Normalized sentence"
        );

        NormalizedSentence {
            sentence: sentence.to_string(),
            normalized,
            tokens,
            features,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_unicode_fraction_spacing() {
        assert_eq!(replace_unicode_fractions("1½ cups"), "1 1/2 cups");
        assert_eq!(replace_unicode_fractions("1-½ cups"), "1-1/2 cups");
        assert_eq!(replace_unicode_fractions("½ cup"), "1/2 cup");
        assert_eq!(replace_unicode_fractions("1½-2"), "1 1/2-2");
        assert_eq!(replace_unicode_fractions("1 1⁄2"), "1 1/2");
        assert_eq!(replace_unicode_fractions("1 ½"), "1 1/2");
    }

    #[test]
    fn test_string_numbers_respect_word_boundaries() {
        assert_eq!(replace_string_numbers("Two eggs"), "2 eggs");
        assert_eq!(replace_string_numbers("one or two"), "1 or 2");
        assert_eq!(replace_string_numbers("someone"), "someone");
        assert_eq!(replace_string_numbers("tender"), "tender");
        assert_eq!(replace_string_numbers("twelve eggs"), "12 eggs");
    }

    #[test]
    fn test_split_quantity_and_units() {
        assert_eq!(split_quantity_and_units("250ml milk"), "250 ml milk");
        assert_eq!(split_quantity_and_units("14-ounce can"), "14 ounce can");
        assert_eq!(split_quantity_and_units("2inches"), "2 inches");
        assert_eq!(split_quantity_and_units("cup2"), "cup 2");
        assert_eq!(split_quantity_and_units("cup-2"), "cup - 2");
        assert_eq!(split_quantity_and_units("2 tbsp. sugar"), "2 tbsp sugar");
    }

    #[test]
    fn test_string_ranges() {
        assert_eq!(replace_string_ranges("1 to 2 cups"), "1-2 cups");
        assert_eq!(replace_string_ranges("8.5 or 12"), "8.5-12");
        assert_eq!(replace_string_ranges("10 to 12"), "10-12");
        assert_eq!(replace_string_ranges("0.5 to 1"), "0.5-1");
        assert_eq!(replace_string_ranges("1 - 2"), "1-2");
        assert_eq!(replace_string_ranges("2 tomatoes"), "2 tomatoes");
        assert_eq!(replace_string_ranges("2 organic eggs"), "2 organic eggs");
    }

    #[test]
    fn test_leading_zero_requires_decimal_point() {
        assert_eq!(replace_string_ranges("0 to 1"), "0 to 1");
    }

    #[test]
    fn test_and_fraction() {
        assert_eq!(combine_quantities_split_by_and("1 and 1/2 cups"), "1 1/2 cups");
        assert_eq!(combine_quantities_split_by_and("salt and pepper"), "salt and pepper");
    }

    #[test]
    fn test_dupe_unit_ranges() {
        assert_eq!(replace_dupe_unit_ranges("100 g - 200 g flour"), "100-200 g flour");
        assert_eq!(replace_dupe_unit_ranges("1 cup to 2 cups"), "1-2 cups");
        assert_eq!(replace_dupe_unit_ranges("1 cup or 2 tbsp"), "1 cup or 2 tbsp");
    }

    #[test]
    fn test_merge_quantity_x() {
        assert_eq!(merge_quantity_x("2 x 400 g cans"), "2x 400 g cans");
        assert_eq!(merge_quantity_x("2X tins"), "2x tins");
        assert_eq!(merge_quantity_x("2 xanthan"), "2 xanthan");
        assert_eq!(merge_quantity_x("2 x-large eggs"), "2 x-large eggs");
        assert_eq!(merge_quantity_x("eggs (2 x)"), "eggs (2x)");
        assert_eq!(merge_quantity_x("2 x(beans)"), "2x(beans)");
        assert_eq!(merge_quantity_x("2 x[beans]"), "2x[beans]");
        assert_eq!(merge_quantity_x("3 X{"), "3x{");
    }

    #[test]
    fn test_tokenize_punctuation_and_offsets() {
        let tokens = tokenize("1 green, large pepper (optional)");
        assert_eq!(
            texts(&tokens),
            vec!["1", "green", ",", "large", "pepper", "(", "optional", ")"]
        );
        assert_eq!(tokens[2].offset, 7);
        assert_eq!(tokens[3].offset, 9);
        assert_eq!(tokens[5].original_index, 5);
    }

    #[test]
    fn test_tokenize_keeps_mixed_numbers() {
        let tokens = tokenize("1 1/2 cups and 2 14 ounce cans");
        assert_eq!(
            texts(&tokens),
            vec!["1 1/2", "cups", "and", "2", "14", "ounce", "cans"]
        );
        assert_eq!(texts(&tokenize("1 1/2-2 cups")), vec!["1 1/2-2", "cups"]);
    }

    #[test]
    fn test_normalize_empty() {
        let normalizer = Normalizer::new();
        assert!(normalizer.normalize("").is_empty());
        assert!(normalizer.normalize("   \t ").is_empty());
    }

    #[test]
    fn test_chained_ranges_reach_a_fixed_point() {
        let normalizer = Normalizer::new();
        let once = normalizer.rewrite("1 to 2 to 3 cups");
        assert_eq!(once, "1-2-3 cups");
        assert_eq!(normalizer.rewrite(&once), once);
    }

    #[test]
    fn test_pipeline_order() {
        let names: Vec<&str> = REWRITE_STEPS.iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec![
                "clean_dashes_and_spaces",
                "replace_unicode_fractions",
                "replace_string_numbers",
                "split_quantity_and_units",
                "replace_string_ranges",
                "combine_quantities_split_by_and",
                "replace_dupe_unit_ranges",
                "merge_quantity_x",
            ]
        );
    }
}
