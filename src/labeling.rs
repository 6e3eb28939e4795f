//! # Sequence Labeling
//!
//! The statistical classifier that assigns a [`Label`] to every token lives
//! outside this crate. Anything implementing [`SequenceLabeler`] can play that
//! role. Two labelers ship here: [`CommentLabeler`], a stub that labels every
//! token COMMENT, and [`RuleBasedLabeler`], which labels from the lookup tables
//! and drives the fallback pass.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::errors::{ParseError, ParseResult};
use crate::features::TokenFeatures;
use crate::quantity;
use crate::tables;
use crate::text_processing::{is_punctuation, Token};

/// Token label categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Label {
    Qty,
    Unit,
    Size,
    Name,
    Prep,
    Purpose,
    Comment,
    Punc,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Label::Qty => "QTY",
            Label::Unit => "UNIT",
            Label::Size => "SIZE",
            Label::Name => "NAME",
            Label::Prep => "PREP",
            Label::Purpose => "PURPOSE",
            Label::Comment => "COMMENT",
            Label::Punc => "PUNC",
        };
        f.write_str(name)
    }
}

/// A token with its label and the labeler's confidence in that label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledToken {
    pub token: Token,
    pub label: Label,
    pub confidence: f64,
}

impl LabeledToken {
    pub fn new(token: Token, label: Label, confidence: f64) -> Self {
        Self {
            token,
            label,
            confidence,
        }
    }

    pub fn text(&self) -> &str {
        &self.token.text
    }
}

/// Assigns a label and a confidence in `[0, 1]` to every token.
///
/// Implementations must return exactly one entry per token, in order.
pub trait SequenceLabeler: Send + Sync {
    fn label(&self, tokens: &[Token], features: &[TokenFeatures]) -> Vec<(Label, f64)>;
}

/// Run `labeler` and pair its output with the tokens.
///
/// Fails when the labeler breaks its contract: wrong number of labels or a
/// confidence outside `[0, 1]`.
pub fn label_tokens(
    labeler: &dyn SequenceLabeler,
    tokens: &[Token],
    features: &[TokenFeatures],
) -> ParseResult<Vec<LabeledToken>> {
    let labels = labeler.label(tokens, features);
    if labels.len() != tokens.len() {
        return Err(ParseError::Labeling(format!(
            "labeler returned {} labels for {} tokens",
            labels.len(),
            tokens.len()
        )));
    }

    tokens
        .iter()
        .zip(labels)
        .map(|(token, (label, confidence))| {
            if !(0.0..=1.0).contains(&confidence) {
                return Err(ParseError::Labeling(format!(
                    "confidence {} for token '{}' is outside [0, 1]",
                    confidence, token.text
                )));
            }
            Ok(LabeledToken::new(token.clone(), label, confidence))
        })
        .collect()
}

/// Labels every token COMMENT with zero confidence.
#[derive(Debug, Default, Clone, Copy)]
pub struct CommentLabeler;

impl SequenceLabeler for CommentLabeler {
    fn label(&self, tokens: &[Token], _features: &[TokenFeatures]) -> Vec<(Label, f64)> {
        vec![(Label::Comment, 0.0); tokens.len()]
    }
}

/// Labels tokens from the lookup tables alone.
///
/// Every label carries zero confidence since no classifier is involved.
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleBasedLabeler;

impl RuleBasedLabeler {
    fn is_unit_at(tokens: &[Token], index: usize) -> bool {
        let Some(token) = tokens.get(index) else {
            return false;
        };
        if !tables::is_unit(&token.text) {
            return false;
        }
        // "can" is also a verb
        !tables::is_stop_word(&token.text)
            || index
                .checked_sub(1)
                .is_some_and(|i| quantity::is_numeric(&tokens[i].text))
    }

    /// Whether the token at `index` starts a run of unit modifiers ending in a unit.
    fn leads_to_unit(tokens: &[Token], index: usize) -> bool {
        let mut i = index;
        while i < tokens.len() && tables::is_unit_modifier(&tokens[i].text) {
            i += 1;
        }
        i > index && Self::is_unit_at(tokens, i)
    }

    fn label_at(tokens: &[Token], index: usize) -> Label {
        let text = tokens[index].text.as_str();
        let lower = text.to_lowercase();

        if is_punctuation(text) {
            return Label::Punc;
        }
        if quantity::is_numeric(text) {
            return Label::Qty;
        }
        if tables::word_quantity(&lower).is_some() {
            let is_article = lower == "a" || lower == "an";
            if !is_article
                || Self::is_unit_at(tokens, index + 1)
                || Self::leads_to_unit(tokens, index + 1)
            {
                return Label::Qty;
            }
        }
        if Self::is_unit_at(tokens, index) || Self::leads_to_unit(tokens, index) {
            return Label::Unit;
        }
        if tables::is_stop_word(text) || tables::is_approximate_marker(text) || lower == "x" {
            return Label::Comment;
        }
        Label::Name
    }
}

impl SequenceLabeler for RuleBasedLabeler {
    fn label(&self, tokens: &[Token], _features: &[TokenFeatures]) -> Vec<(Label, f64)> {
        let labels: Vec<(Label, f64)> = (0..tokens.len())
            .map(|i| (Self::label_at(tokens, i), 0.0))
            .collect();
        debug!(token_count = tokens.len(), "Rule-based labeling complete");
        labels
    }
}
