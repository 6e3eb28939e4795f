//! # Unit Resolver
//!
//! Maps a unit token or phrase to the unit value reported on an amount.
//!
//! Three mutually exclusive modes:
//!
//! - [`UnitMode::Plain`]: string output, pluralised per quantity
//! - [`UnitMode::StringUnits`]: string output, explicitly requested by configuration
//! - [`UnitMode::Physical`]: resolved through a [`PhysicalUnits`] registry, falling
//!   back to the plain string when the registry has no match
//!
//! The `imperial_units` flag prefers imperial variants of ambiguous volume units
//! ("cup" → "imperial_cup") and only affects physical mode.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::config::ParserConfig;
use crate::tables;

/// Physical dimension of a unit handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Volume,
    Mass,
    Length,
}

/// A dimensioned unit resolved by a physical-unit registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitHandle {
    /// Canonical unit name ("cup", "imperial_cup", "ounce").
    pub name: String,
    pub dimension: Dimension,
    /// Whether the handle should be displayed in plural form.
    pub plural: bool,
}

impl UnitHandle {
    pub fn new(name: impl Into<String>, dimension: Dimension) -> Self {
        Self {
            name: name.into(),
            dimension,
            plural: false,
        }
    }
}

impl fmt::Display for UnitHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.plural {
            write!(f, "{}", pluralize_name(&self.name))
        } else {
            write!(f, "{}", self.name)
        }
    }
}

fn pluralize_name(name: &str) -> String {
    let (prefix, last) = match name.rsplit_once('_') {
        Some((prefix, last)) => (Some(prefix), last),
        None => (None, name),
    };
    let plural = match tables::unit_entry(last) {
        Some(entry) => entry.plural.clone(),
        None => format!("{}s", last),
    };
    match prefix {
        Some(prefix) => format!("{}_{}", prefix, plural),
        None => plural,
    }
}

/// The unit reported on an amount: plain text or a resolved handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum UnitValue {
    String(String),
    Handle(UnitHandle),
}

impl UnitValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, UnitValue::String(s) if s.is_empty())
    }

    pub fn as_handle(&self) -> Option<&UnitHandle> {
        match self {
            UnitValue::Handle(handle) => Some(handle),
            UnitValue::String(_) => None,
        }
    }
}

impl Default for UnitValue {
    fn default() -> Self {
        UnitValue::String(String::new())
    }
}

impl fmt::Display for UnitValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitValue::String(s) => write!(f, "{}", s),
            UnitValue::Handle(handle) => write!(f, "{}", handle),
        }
    }
}

/// Minimal capability set required from a physical-unit library.
pub trait PhysicalUnits: Send + Sync {
    /// Resolve a unit name or alias; `None` when the library has no such unit.
    fn resolve(&self, name: &str) -> Option<UnitHandle>;

    fn pluralize(&self, handle: &UnitHandle) -> UnitHandle {
        UnitHandle {
            plural: true,
            ..handle.clone()
        }
    }

    /// The imperial variant of a unit, or the unit itself when it has none.
    fn imperial_variant(&self, handle: &UnitHandle) -> UnitHandle;
}

/// (alias, canonical name, dimension)
const BUILTIN_UNIT_ALIASES: &[(&str, &str, Dimension)] = &[
    ("cup", "cup", Dimension::Volume),
    ("c", "cup", Dimension::Volume),
    ("tablespoon", "tablespoon", Dimension::Volume),
    ("tbsp", "tablespoon", Dimension::Volume),
    ("tb", "tablespoon", Dimension::Volume),
    ("tbs", "tablespoon", Dimension::Volume),
    ("teaspoon", "teaspoon", Dimension::Volume),
    ("tsp", "teaspoon", Dimension::Volume),
    ("pint", "pint", Dimension::Volume),
    ("pt", "pint", Dimension::Volume),
    ("quart", "quart", Dimension::Volume),
    ("qt", "quart", Dimension::Volume),
    ("gallon", "gallon", Dimension::Volume),
    ("gal", "gallon", Dimension::Volume),
    ("fluid ounce", "fluid_ounce", Dimension::Volume),
    ("fl oz", "fluid_ounce", Dimension::Volume),
    ("floz", "fluid_ounce", Dimension::Volume),
    ("milliliter", "milliliter", Dimension::Volume),
    ("millilitre", "milliliter", Dimension::Volume),
    ("ml", "milliliter", Dimension::Volume),
    ("liter", "liter", Dimension::Volume),
    ("litre", "liter", Dimension::Volume),
    ("l", "liter", Dimension::Volume),
    ("gram", "gram", Dimension::Mass),
    ("g", "gram", Dimension::Mass),
    ("kilogram", "kilogram", Dimension::Mass),
    ("kg", "kilogram", Dimension::Mass),
    ("milligram", "milligram", Dimension::Mass),
    ("mg", "milligram", Dimension::Mass),
    ("ounce", "ounce", Dimension::Mass),
    ("oz", "ounce", Dimension::Mass),
    ("pound", "pound", Dimension::Mass),
    ("lb", "pound", Dimension::Mass),
    ("inch", "inch", Dimension::Length),
    ("in", "inch", Dimension::Length),
    ("foot", "foot", Dimension::Length),
    ("ft", "foot", Dimension::Length),
    ("centimeter", "centimeter", Dimension::Length),
    ("centimetre", "centimeter", Dimension::Length),
    ("cm", "centimeter", Dimension::Length),
    ("millimeter", "millimeter", Dimension::Length),
    ("mm", "millimeter", Dimension::Length),
];

/// Volume units with a distinct imperial measure.
const IMPERIAL_VARIANTS: &[&str] = &["cup", "pint", "quart", "gallon", "fluid_ounce"];

/// Built-in registry of common culinary units.
///
/// Lookup is case-insensitive and accepts plural spellings known to the unit
/// tables ("Cups", "ounces", "lbs").
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinUnits;

impl PhysicalUnits for BuiltinUnits {
    fn resolve(&self, name: &str) -> Option<UnitHandle> {
        let lowered = name.trim().to_lowercase();
        let singular = tables::singularize_unit(&lowered);
        [lowered.as_str(), singular.as_str()]
            .iter()
            .find_map(|candidate| {
                BUILTIN_UNIT_ALIASES
                    .iter()
                    .find(|(alias, _, _)| alias == candidate)
            })
            .map(|(_, canonical, dimension)| UnitHandle::new(*canonical, *dimension))
    }

    fn imperial_variant(&self, handle: &UnitHandle) -> UnitHandle {
        if IMPERIAL_VARIANTS.contains(&handle.name.as_str()) {
            UnitHandle {
                name: format!("imperial_{}", handle.name),
                ..handle.clone()
            }
        } else {
            handle.clone()
        }
    }
}

/// Which representation the resolver produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitMode {
    Plain,
    StringUnits,
    Physical,
}

/// Renders unit phrases according to the configured [`UnitMode`].
#[derive(Clone)]
pub struct UnitResolver {
    mode: UnitMode,
    imperial: bool,
    physical: Option<Arc<dyn PhysicalUnits>>,
}

impl fmt::Debug for UnitResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitResolver")
            .field("mode", &self.mode)
            .field("imperial", &self.imperial)
            .field("has_physical_units", &self.physical.is_some())
            .finish()
    }
}

impl UnitResolver {
    /// Resolver for `config`, using the built-in physical-unit registry.
    pub fn new(config: &ParserConfig) -> Self {
        Self::with_physical_units(config, Some(Arc::new(BuiltinUnits)))
    }

    /// Resolver with an explicit physical-unit registry (or none, for plain mode).
    pub fn with_physical_units(
        config: &ParserConfig,
        physical: Option<Arc<dyn PhysicalUnits>>,
    ) -> Self {
        let mode = if config.string_units {
            UnitMode::StringUnits
        } else if physical.is_some() {
            UnitMode::Physical
        } else {
            UnitMode::Plain
        };
        debug!(?mode, imperial = config.imperial_units, "Created UnitResolver");
        Self {
            mode,
            imperial: config.imperial_units,
            physical,
        }
    }

    pub fn mode(&self) -> UnitMode {
        self.mode
    }

    /// Render a unit phrase for an amount.
    ///
    /// `words` are the unit tokens in order; leading words are modifiers
    /// ("large", "heaped") and the last word is the unit proper. The last word is
    /// pluralised when `plural` is set. An empty phrase renders as an empty string.
    pub fn resolve(&self, words: &[&str], plural: bool) -> UnitValue {
        let Some((last, modifiers)) = words.split_last() else {
            return UnitValue::default();
        };

        let last = if plural {
            tables::pluralize_unit(last)
        } else {
            last.to_string()
        };
        let text = modifiers
            .iter()
            .map(|w| w.to_string())
            .chain(std::iter::once(last))
            .collect::<Vec<_>>()
            .join(" ");

        match (self.mode, &self.physical) {
            (UnitMode::Physical, Some(registry)) if modifiers.is_empty() => {
                match registry.resolve(&text) {
                    Some(handle) => {
                        let handle = if self.imperial {
                            registry.imperial_variant(&handle)
                        } else {
                            handle
                        };
                        let handle = if plural {
                            registry.pluralize(&handle)
                        } else {
                            handle
                        };
                        trace!(unit = %text, handle = %handle.name, "Resolved physical unit");
                        UnitValue::Handle(handle)
                    }
                    None => {
                        debug!(unit = %text, "No physical unit found, using string unit");
                        UnitValue::String(text)
                    }
                }
            }
            _ => UnitValue::String(text),
        }
    }
}

/// Whether a unit should be rendered in plural form.
///
/// Plural unless the quantity is exactly one and is neither a range nor a
/// multiplier. An amount without a numeric quantity keeps the unit as written.
pub fn should_pluralize(value: Option<f64>, is_range: bool, is_multiplier: bool) -> bool {
    match value {
        None => false,
        Some(v) => is_range || is_multiplier || (v - 1.0).abs() > f64::EPSILON,
    }
}
