//! # Amount Builder
//!
//! Reconstructs ordered [`IngredientAmount`] records from a labeled token
//! sequence. The builder scans unconsumed token positions with an explicit
//! state machine:
//!
//! ```text
//! Scanning ──QTY──▶ InQty ──▶ InRange ──▶ InUnit ──▶ Scanning
//!     │                └──multiplier──────▲
//!     └──no QTY left──▶ Done
//! ```
//!
//! The set of consumed positions is passed in and handed back by the caller,
//! so a primary pass and a fallback pass can share one sentence without
//! counting any token twice.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, trace, warn};

use crate::config::{ConfidenceAggregation, ParserConfig};
use crate::errors::ParseWarning;
use crate::labeling::{Label, LabeledToken};
use crate::quantity::{self, ParsedQuantity};
use crate::tables;
use crate::units::{should_pluralize, UnitResolver, UnitValue};

/// Qualifiers attached to an amount
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountFlags {
    /// Spans two quantities ("1-2")
    pub range: bool,
    /// Quantity is a repetition count ("2x")
    pub multiplier: bool,
    /// Per-item size of a previously stated count
    pub singular: bool,
    /// Quantity qualified as inexact ("about")
    pub approximate: bool,
}

/// One amount found in an ingredient sentence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientAmount {
    /// Quantity as written: the lower bound of a range, the count of a
    /// multiplier, or empty when only a unit was found
    pub quantity: String,
    /// Numeric value of `quantity`, scaled by any quantity word ("2 dozen" = 24)
    pub quantity_value: Option<f64>,
    /// Upper bound; present only for ranges
    pub quantity_max: Option<f64>,
    pub unit: UnitValue,
    /// Consumed tokens joined by single spaces
    pub text: String,
    pub confidence: f64,
    /// `original_index` of the first consumed token
    pub starting_index: usize,
    pub flags: AmountFlags,
    /// Positions of the consumed tokens in the labeled sequence
    pub token_indices: Vec<usize>,
}

/// Amounts and warnings produced by one builder pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AmountsResult {
    pub amounts: Vec<IngredientAmount>,
    pub warnings: Vec<ParseWarning>,
}

impl AmountsResult {
    pub fn extend(&mut self, other: AmountsResult) {
        self.amounts.extend(other.amounts);
        self.warnings.extend(other.warnings);
        self.amounts.sort_by_key(|a| a.starting_index);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfidenceSource {
    Labels(ConfidenceAggregation),
    Fallback,
}

/// An amount under construction
#[derive(Debug, Default)]
struct Draft {
    quantity_positions: Vec<usize>,
    expression: String,
    unit_positions: Vec<usize>,
    flags: AmountFlags,
    /// Set when the amount opens a ", <comment>* <qty>" clause after a bare count
    per_item_clause: bool,
}

#[derive(Debug)]
enum BuilderState {
    Scanning { from: usize },
    InQty { draft: Draft, next: usize },
    InRange { draft: Draft, next: usize },
    InUnit { draft: Draft, next: usize },
    Done,
}

/// Builds [`IngredientAmount`] records from labeled tokens
#[derive(Debug, Clone)]
pub struct AmountBuilder {
    units: UnitResolver,
    aggregation: ConfidenceAggregation,
}

impl AmountBuilder {
    pub fn new(units: UnitResolver, aggregation: ConfidenceAggregation) -> Self {
        Self { units, aggregation }
    }

    pub fn from_config(config: &ParserConfig) -> Self {
        Self::new(UnitResolver::new(config), config.confidence_aggregation)
    }

    /// Build amounts from classifier labels.
    ///
    /// Confidence is aggregated from the consumed tokens' confidences.
    pub fn build(&self, tokens: &[LabeledToken], consumed: &mut BTreeSet<usize>) -> AmountsResult {
        self.run(tokens, consumed, ConfidenceSource::Labels(self.aggregation))
    }

    /// Build amounts as the rule-based fallback; every amount reports confidence 0.
    pub fn build_fallback(
        &self,
        tokens: &[LabeledToken],
        consumed: &mut BTreeSet<usize>,
    ) -> AmountsResult {
        self.run(tokens, consumed, ConfidenceSource::Fallback)
    }

    fn run(
        &self,
        tokens: &[LabeledToken],
        consumed: &mut BTreeSet<usize>,
        source: ConfidenceSource,
    ) -> AmountsResult {
        let mut scan = Scan {
            builder: self,
            tokens,
            consumed,
            source,
            result: AmountsResult::default(),
            bare_count_seen: false,
        };
        scan.run();

        let mut result = scan.result;
        result.amounts.sort_by_key(|a| a.starting_index);
        debug!(
            token_count = tokens.len(),
            amounts = result.amounts.len(),
            warnings = result.warnings.len(),
            fallback = matches!(source, ConfidenceSource::Fallback),
            "Amount builder pass complete"
        );
        result
    }
}

struct Scan<'a> {
    builder: &'a AmountBuilder,
    tokens: &'a [LabeledToken],
    consumed: &'a mut BTreeSet<usize>,
    source: ConfidenceSource,
    result: AmountsResult,
    bare_count_seen: bool,
}

impl Scan<'_> {
    fn run(&mut self) {
        let mut state = BuilderState::Scanning { from: 0 };
        loop {
            trace!(?state, "Amount builder state");
            state = match state {
                BuilderState::Scanning { from } => match self.next_open_quantity(from) {
                    Some(position) => BuilderState::InQty {
                        draft: self.open_amount(position),
                        next: position + 1,
                    },
                    None => BuilderState::Done,
                },
                BuilderState::InQty { mut draft, next } => {
                    if self.sizable_pattern(&draft, next) {
                        BuilderState::Scanning { from: next }
                    } else {
                        let next = self.absorb_quantity_word(&mut draft, next);
                        let next = self.absorb_multiplier(&mut draft, next);
                        if draft.flags.multiplier {
                            BuilderState::InUnit { draft, next }
                        } else {
                            BuilderState::InRange { draft, next }
                        }
                    }
                }
                BuilderState::InRange { mut draft, next } => {
                    let next = self.absorb_range(&mut draft, next);
                    BuilderState::InUnit { draft, next }
                }
                BuilderState::InUnit { mut draft, next } => {
                    self.absorb_unit(&mut draft, next);
                    let from = draft.quantity_positions[0] + 1;
                    self.finish(draft);
                    BuilderState::Scanning { from }
                }
                BuilderState::Done => break,
            };
        }

        // Consumed quantities count too, so a later pass never invents a bare unit
        if !self.tokens.iter().any(|t| t.label == Label::Qty) {
            self.bare_unit();
        }
    }

    fn is_open(&self, position: usize) -> bool {
        position < self.tokens.len() && !self.consumed.contains(&position)
    }

    fn text(&self, position: usize) -> &str {
        self.tokens[position].text()
    }

    fn label(&self, position: usize) -> Label {
        self.tokens[position].label
    }

    fn is_open_with(&self, position: usize, label: Label) -> bool {
        self.is_open(position) && self.label(position) == label
    }

    fn next_open_quantity(&self, from: usize) -> Option<usize> {
        (from..self.tokens.len()).find(|&p| self.is_open_with(p, Label::Qty))
    }

    fn open_amount(&self, position: usize) -> Draft {
        let mut draft = Draft {
            quantity_positions: vec![position],
            expression: self.text(position).to_string(),
            ..Default::default()
        };

        if let Some(previous) = position.checked_sub(1) {
            if self.label(previous) != Label::Qty
                && tables::is_approximate_marker(self.text(previous))
            {
                draft.flags.approximate = true;
            }
        }

        if self.bare_count_seen {
            // Walk back over the clause's comments to the comma that opens it
            let mut k = position;
            let mut approximate = false;
            while let Some(previous) = k.checked_sub(1) {
                if self.label(previous) != Label::Comment {
                    break;
                }
                approximate |= tables::is_approximate_marker(self.text(previous));
                k = previous;
            }
            if let Some(comma) = k.checked_sub(1) {
                if self.text(comma) == "," {
                    draft.per_item_clause = true;
                    draft.flags.approximate |= approximate;
                }
            }
        }

        draft
    }

    /// "2 14 ounce cans": a count with the outer unit plus a per-item size.
    fn sizable_pattern(&mut self, draft: &Draft, next: usize) -> bool {
        let count = draft.quantity_positions[0];
        let (size, inner_unit, outer_unit) = (next, next + 1, next + 2);
        let matches = quantity::is_numeric(self.text(count))
            && self.is_open_with(size, Label::Qty)
            && quantity::is_numeric(self.text(size))
            && self.is_open_with(inner_unit, Label::Unit)
            && tables::is_unit(self.text(inner_unit))
            && self.is_open_with(outer_unit, Label::Unit);
        if !matches {
            return false;
        }

        trace!(position = count, "Sizable unit pattern");
        self.finish(Draft {
            quantity_positions: vec![count],
            expression: self.text(count).to_string(),
            unit_positions: vec![outer_unit],
            flags: draft.flags,
            per_item_clause: false,
        });
        self.finish(Draft {
            quantity_positions: vec![size],
            expression: self.text(size).to_string(),
            unit_positions: vec![inner_unit],
            flags: AmountFlags {
                singular: true,
                ..Default::default()
            },
            per_item_clause: false,
        });
        true
    }

    /// "2 dozen": a numeric quantity followed by a quantity word is one quantity.
    fn absorb_quantity_word(&self, draft: &mut Draft, next: usize) -> usize {
        if quantity::is_numeric(&draft.expression)
            && self.is_open_with(next, Label::Qty)
            && !quantity::is_numeric(self.text(next))
        {
            draft.expression = format!("{} {}", draft.expression, self.text(next));
            draft.quantity_positions.push(next);
            return next + 1;
        }
        next
    }

    fn absorb_multiplier(&self, draft: &mut Draft, next: usize) -> usize {
        if quantity::strip_multiplier(&draft.expression).is_some() {
            draft.flags.multiplier = true;
            return next;
        }
        if quantity::is_numeric(&draft.expression)
            && self.is_open(next)
            && self.text(next).eq_ignore_ascii_case("x")
        {
            draft.expression.push('x');
            draft.quantity_positions.push(next);
            draft.flags.multiplier = true;
            return next + 1;
        }
        next
    }

    fn is_range_connector(&self, position: usize) -> bool {
        self.label(position) != Label::Qty
            && matches!(self.text(position).to_lowercase().as_str(), "-" | "to" | "or")
    }

    fn skip_punctuation(&self, mut position: usize) -> usize {
        while self.is_open_with(position, Label::Punc)
            && self.text(position) != ","
            && !self.is_range_connector(position)
        {
            position += 1;
        }
        position
    }

    /// "1 to 2", "1 - 2": a connector and a second quantity close a range.
    fn absorb_range(&self, draft: &mut Draft, next: usize) -> usize {
        if quantity::split_range(&draft.expression).is_some()
            || !quantity::is_numeric(&draft.expression)
        {
            return next;
        }

        let connector = self.skip_punctuation(next);
        if !(self.is_open(connector) && self.is_range_connector(connector)) {
            return next;
        }
        let mut upper = connector + 1;
        while self.is_open_with(upper, Label::Punc) && self.text(upper) != "," {
            upper += 1;
        }
        if !(self.is_open_with(upper, Label::Qty) && quantity::is_numeric(self.text(upper))) {
            return next;
        }

        draft.expression = format!("{}-{}", draft.expression, self.text(upper));
        draft.quantity_positions.extend(next..=upper);
        upper + 1
    }

    /// Whether the modifier at `position` is followed, through more modifiers,
    /// by a UNIT token.
    fn modifier_leads_to_unit(&self, position: usize) -> bool {
        let mut p = position;
        while self.is_open(p)
            && self.label(p) != Label::Unit
            && self.label(p) != Label::Qty
            && tables::is_unit_modifier(self.text(p))
        {
            p += 1;
        }
        p > position && self.is_open_with(p, Label::Unit)
    }

    /// Collect the unit phrase starting at `start`: modifiers, then unit words.
    /// A unit from the lookup tables closes the phrase.
    fn unit_phrase(&self, start: usize) -> Vec<usize> {
        let mut phrase: Vec<usize> = Vec::new();
        let mut p = start;
        while self.is_open(p) {
            let text = self.text(p);
            if self.label(p) == Label::Unit {
                let only_modifiers_so_far = phrase
                    .iter()
                    .all(|&q| tables::is_unit_modifier(self.text(q)));
                if tables::is_ambiguous_unit(text) && !only_modifiers_so_far {
                    break;
                }
                phrase.push(p);
                p += 1;
                if tables::is_unit(text) {
                    break;
                }
            } else if self.modifier_leads_to_unit(p) {
                phrase.push(p);
                p += 1;
            } else {
                break;
            }
        }
        phrase
    }

    fn absorb_unit(&self, draft: &mut Draft, next: usize) {
        let phrase = self.unit_phrase(next);
        if !phrase.is_empty() {
            draft.unit_positions = phrase;
            return;
        }

        // "1 green, large pepper": NAME+ "," UNIT still belongs to this amount
        let mut p = next;
        while self.is_open_with(p, Label::Name) {
            p += 1;
        }
        if p > next
            && self.is_open(p)
            && self.text(p) == ","
            && self.is_open_with(p + 1, Label::Unit)
            && !tables::is_ambiguous_unit(self.text(p + 1))
        {
            trace!(position = p + 1, "Unit after comma merged into amount");
            draft.unit_positions = self.unit_phrase(p + 1);
        }
    }

    fn confidence(&self, positions: &[usize]) -> f64 {
        match self.source {
            ConfidenceSource::Fallback => 0.0,
            ConfidenceSource::Labels(aggregation) => {
                let confidences: Vec<f64> = positions
                    .iter()
                    .map(|&p| self.tokens[p].confidence)
                    .collect();
                aggregation.aggregate(&confidences)
            }
        }
    }

    fn consume(&mut self, positions: &[usize]) -> Vec<usize> {
        let mut positions = positions.to_vec();
        positions.sort_unstable();
        positions.dedup();
        self.consumed.extend(positions.iter().copied());
        positions
    }

    fn joined_text(&self, positions: &[usize]) -> String {
        positions
            .iter()
            .map(|&p| self.text(p))
            .collect::<Vec<&str>>()
            .join(" ")
    }

    fn finish(&mut self, draft: Draft) {
        let all_positions: Vec<usize> = draft
            .quantity_positions
            .iter()
            .chain(draft.unit_positions.iter())
            .copied()
            .collect();
        let positions = self.consume(&all_positions);
        let starting_index = self.tokens[positions[0]].token.original_index;

        let parsed = match quantity::parse_quantity(&draft.expression) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(
                    quantity = %draft.expression,
                    starting_index,
                    error = %err,
                    "Dropping amount with unparsable quantity"
                );
                self.result.warnings.push(ParseWarning::QuantityDropped {
                    quantity: draft.expression,
                    starting_index,
                    reason: err.to_string(),
                });
                return;
            }
        };

        let mut flags = draft.flags;
        flags.range = parsed.is_range;
        flags.multiplier = parsed.is_multiplier;

        let unit_words: Vec<&str> = draft.unit_positions.iter().map(|&p| self.text(p)).collect();
        let plural = should_pluralize(Some(parsed.value), parsed.is_range, parsed.is_multiplier);
        let unit = self.builder.units.resolve(&unit_words, plural);

        if unit.is_empty() {
            self.bare_count_seen = true;
        } else if draft.per_item_clause {
            flags.singular = true;
        }

        let amount = IngredientAmount {
            quantity: display_quantity(&draft.expression, &parsed),
            quantity_value: Some(parsed.value),
            quantity_max: parsed.max,
            unit,
            text: self.joined_text(&positions),
            confidence: self.confidence(&positions),
            starting_index,
            flags,
            token_indices: positions,
        };
        debug!(
            quantity = %amount.quantity,
            unit = %amount.unit,
            text = %amount.text,
            starting_index = amount.starting_index,
            "Built ingredient amount"
        );
        self.result.amounts.push(amount);
    }

    /// No quantity anywhere: the first unit phrase becomes an amount on its own.
    fn bare_unit(&mut self) {
        let start = (0..self.tokens.len()).find(|&p| {
            self.is_open(p)
                && ((self.label(p) == Label::Unit && !tables::is_ambiguous_unit(self.text(p)))
                    || self.modifier_leads_to_unit(p))
        });
        let Some(start) = start else {
            return;
        };
        let phrase = self.unit_phrase(start);
        if phrase.is_empty() {
            return;
        }

        let positions = self.consume(&phrase);
        let words: Vec<&str> = positions.iter().map(|&p| self.text(p)).collect();
        let unit = self.builder.units.resolve(&words, false);
        let amount = IngredientAmount {
            quantity: String::new(),
            quantity_value: None,
            quantity_max: None,
            unit,
            text: self.joined_text(&positions),
            confidence: self.confidence(&positions),
            starting_index: self.tokens[positions[0]].token.original_index,
            flags: AmountFlags::default(),
            token_indices: positions,
        };
        debug!(unit = %amount.unit, "Built unit-only amount");
        self.result.amounts.push(amount);
    }
}

/// The quantity as reported on the amount: the lower bound of a range or the
/// count of a multiplier, keeping any trailing quantity word.
fn display_quantity(expression: &str, parsed: &ParsedQuantity) -> String {
    let (numeric, word) = match expression.rsplit_once(' ') {
        Some((head, word)) if quantity::is_numeric(head) && !quantity::is_numeric(word) => {
            (head, Some(word))
        }
        _ => (expression, None),
    };

    let base = if parsed.is_multiplier {
        quantity::strip_multiplier(numeric).unwrap_or(numeric)
    } else if parsed.is_range {
        match quantity::split_range(numeric) {
            Some((low, high)) => {
                if quantity::parse_number(low).ok() <= quantity::parse_number(high).ok() {
                    low
                } else {
                    high
                }
            }
            None => numeric,
        }
    } else {
        numeric
    };

    match word {
        Some(word) => format!("{} {}", base, word),
        None => base.to_string(),
    }
}
