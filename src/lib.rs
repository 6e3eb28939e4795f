//! # Ingredient Amounts
//!
//! Turns free-form ingredient lines ("2 14 ounce cans coconut milk") into
//! structured amount records: quantity, unit, flags and the tokens they came
//! from.
//!
//! The pipeline runs in four stages:
//! 1. [`text_processing::Normalizer`] rewrites the sentence and tokenizes it
//! 2. a [`labeling::SequenceLabeler`] labels every token
//! 3. [`amounts::AmountBuilder`] reconstructs amounts from the labels
//! 4. [`units::UnitResolver`] renders each unit phrase

pub mod amounts;
pub mod config;
pub mod errors;
pub mod features;
pub mod labeling;
pub mod observability;
pub mod observability_config;
pub mod parser;
pub mod quantity;
pub mod tables;
pub mod text_processing;
pub mod units;

// Re-export types for easier access
pub use amounts::{AmountBuilder, AmountFlags, AmountsResult, IngredientAmount};
pub use config::{AppConfig, ConfidenceAggregation, ParserConfig};
pub use errors::{ParseError, ParseResult, ParseWarning};
pub use labeling::{CommentLabeler, Label, LabeledToken, RuleBasedLabeler, SequenceLabeler};
pub use parser::{IngredientParser, ParsedIngredient};
pub use text_processing::{NormalizedSentence, Normalizer, Token};
pub use units::{BuiltinUnits, PhysicalUnits, UnitHandle, UnitResolver, UnitValue};
