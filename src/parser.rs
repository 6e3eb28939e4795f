//! # Ingredient Parser
//!
//! Ties the pipeline together: normalize, label, build amounts, and fall back
//! to the rule-based grammar when the labeler's output yields nothing.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::amounts::{AmountBuilder, AmountsResult, IngredientAmount};
use crate::config::ParserConfig;
use crate::errors::{ParseResult, ParseWarning};
use crate::labeling::{label_tokens, RuleBasedLabeler, SequenceLabeler};
use crate::observability::{parse_span, record_fallback_metrics, record_parse_metrics};
use crate::text_processing::{Normalizer, Token};
use crate::units::{PhysicalUnits, UnitResolver};

/// Everything learned about one ingredient sentence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedIngredient {
    /// The raw input
    pub sentence: String,
    /// The sentence after normalization
    pub normalized: String,
    pub tokens: Vec<Token>,
    /// Amounts ordered by `starting_index`
    pub amounts: Vec<IngredientAmount>,
    pub warnings: Vec<ParseWarning>,
}

/// Parses ingredient sentences into amounts
#[derive(Clone)]
pub struct IngredientParser {
    config: ParserConfig,
    normalizer: Normalizer,
    labeler: Arc<dyn SequenceLabeler>,
    fallback: RuleBasedLabeler,
    builder: AmountBuilder,
}

impl std::fmt::Debug for IngredientParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngredientParser")
            .field("config", &self.config)
            .field("builder", &self.builder)
            .finish()
    }
}

impl IngredientParser {
    /// Create a parser that labels with [`RuleBasedLabeler`]
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ingredient_amounts::{IngredientParser, ParserConfig};
    ///
    /// let parser = IngredientParser::new(ParserConfig::default()).unwrap();
    /// let parsed = parser.parse("2 cups flour").unwrap();
    /// assert_eq!(parsed.amounts.len(), 1);
    /// assert_eq!(parsed.amounts[0].quantity, "2");
    /// assert_eq!(parsed.amounts[0].unit.to_string(), "cups");
    /// ```
    pub fn new(config: ParserConfig) -> ParseResult<Self> {
        Self::with_labeler(config, Arc::new(RuleBasedLabeler))
    }

    /// Create a parser around an external sequence labeler
    pub fn with_labeler(
        config: ParserConfig,
        labeler: Arc<dyn SequenceLabeler>,
    ) -> ParseResult<Self> {
        let units = UnitResolver::new(&config);
        Self::build(config, labeler, units)
    }

    /// Create a parser with an explicit physical-unit library, or none for plain units
    pub fn with_units(
        config: ParserConfig,
        labeler: Arc<dyn SequenceLabeler>,
        physical: Option<Arc<dyn PhysicalUnits>>,
    ) -> ParseResult<Self> {
        let units = UnitResolver::with_physical_units(&config, physical);
        Self::build(config, labeler, units)
    }

    fn build(
        config: ParserConfig,
        labeler: Arc<dyn SequenceLabeler>,
        units: UnitResolver,
    ) -> ParseResult<Self> {
        config.validate()?;
        info!(
            unit_mode = ?units.mode(),
            imperial = config.imperial_units,
            fallback = config.enable_fallback,
            "Creating IngredientParser"
        );
        Ok(Self {
            builder: AmountBuilder::new(units, config.confidence_aggregation),
            config,
            normalizer: Normalizer::new(),
            labeler,
            fallback: RuleBasedLabeler,
        })
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse one ingredient sentence.
    ///
    /// Natural-language input never fails; an `Err` means the labeler broke
    /// its contract.
    pub fn parse(&self, sentence: &str) -> ParseResult<ParsedIngredient> {
        let span = parse_span("parse", sentence.len());
        let _guard = span.enter();
        let start = Instant::now();

        let normalized = self.normalizer.normalize(sentence);
        if normalized.is_empty() {
            debug!("Sentence normalized to zero tokens");
            record_parse_metrics("parse", start.elapsed(), 0, 0, 0);
            return Ok(ParsedIngredient {
                sentence: normalized.sentence,
                normalized: normalized.normalized,
                tokens: Vec::new(),
                amounts: Vec::new(),
                warnings: Vec::new(),
            });
        }

        let labeled = label_tokens(
            self.labeler.as_ref(),
            &normalized.tokens,
            &normalized.features,
        )?;
        let mut consumed: BTreeSet<usize> = BTreeSet::new();
        let mut result: AmountsResult = self.builder.build(&labeled, &mut consumed);

        if result.amounts.is_empty() && self.config.enable_fallback {
            let relabeled = label_tokens(&self.fallback, &normalized.tokens, &normalized.features)?;
            let fallback = self.builder.build_fallback(&relabeled, &mut consumed);
            debug!(
                amounts = fallback.amounts.len(),
                consumed = consumed.len(),
                "Fallback pass complete"
            );
            record_fallback_metrics(fallback.amounts.len());
            result.extend(fallback);
        }

        record_parse_metrics(
            "parse",
            start.elapsed(),
            normalized.tokens.len(),
            result.amounts.len(),
            result.warnings.len(),
        );

        Ok(ParsedIngredient {
            sentence: normalized.sentence,
            normalized: normalized.normalized,
            tokens: normalized.tokens,
            amounts: result.amounts,
            warnings: result.warnings,
        })
    }

    /// Parse many sentences in parallel; results keep the input order.
    pub fn parse_batch<S: AsRef<str> + Sync>(
        &self,
        sentences: &[S],
    ) -> Vec<ParseResult<ParsedIngredient>> {
        let start = Instant::now();
        let results: Vec<ParseResult<ParsedIngredient>> = sentences
            .par_iter()
            .map(|sentence| self.parse(sentence.as_ref()))
            .collect();
        info!(
            sentences = sentences.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Parsed batch"
        );
        results
    }
}
