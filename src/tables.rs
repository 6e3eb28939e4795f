//! # Lookup Tables
//!
//! Immutable static data shared by every stage of the pipeline: unit spellings,
//! unit modifiers, ambiguous units, spelled numbers, unicode fractions, stop
//! words and approximation markers.
//!
//! All tables are built once on first access via `lazy_static` and are never
//! written afterwards, so they can be read concurrently from any thread.

use lazy_static::lazy_static;
use std::collections::{HashMap, HashSet};

/// Plural and singular forms of every recognised unit.
const UNIT_FORMS: &[(&str, &str)] = &[
    ("bags", "bag"),
    ("bars", "bar"),
    ("baskets", "basket"),
    ("batches", "batch"),
    ("blocks", "block"),
    ("bottles", "bottle"),
    ("boxes", "box"),
    ("branches", "branch"),
    ("bulbs", "bulb"),
    ("bunches", "bunch"),
    ("bundles", "bundle"),
    ("cans", "can"),
    ("chops", "chop"),
    ("chunks", "chunk"),
    ("cloves", "clove"),
    ("clusters", "cluster"),
    ("cm", "cm"),
    ("cubes", "cube"),
    ("cups", "cup"),
    ("cutlets", "cutlet"),
    ("dashes", "dash"),
    ("dollops", "dollop"),
    ("drops", "drop"),
    ("ears", "ear"),
    ("envelopes", "envelope"),
    ("feet", "foot"),
    ("fillets", "fillet"),
    ("g", "g"),
    ("gallons", "gallon"),
    ("glasses", "glass"),
    ("grams", "gram"),
    ("grinds", "grind"),
    ("handfuls", "handful"),
    ("heads", "head"),
    ("inches", "inch"),
    ("jars", "jar"),
    ("kg", "kg"),
    ("kilograms", "kilogram"),
    ("knobs", "knob"),
    ("lbs", "lb"),
    ("leaves", "leaf"),
    ("lengths", "length"),
    ("links", "link"),
    ("l", "l"),
    ("liters", "liter"),
    ("litres", "litre"),
    ("loaves", "loaf"),
    ("milliliters", "milliliter"),
    ("ml", "ml"),
    ("mugs", "mug"),
    ("ounces", "ounce"),
    ("oz", "oz"),
    ("packs", "pack"),
    ("packages", "package"),
    ("packets", "packet"),
    ("pairs", "pair"),
    ("pieces", "piece"),
    ("pinches", "pinch"),
    ("pints", "pint"),
    ("pods", "pod"),
    ("pounds", "pound"),
    ("racks", "rack"),
    ("rashers", "rasher"),
    ("recipes", "recipe"),
    ("rectangles", "rectangle"),
    ("ribs", "rib"),
    ("quarts", "quart"),
    ("scoops", "scoop"),
    ("segments", "segment"),
    ("shakes", "shake"),
    ("sheets", "sheet"),
    ("shots", "shot"),
    ("shoots", "shoot"),
    ("slabs", "slab"),
    ("slices", "slice"),
    ("sprigs", "sprig"),
    ("squares", "square"),
    ("stalks", "stalk"),
    ("steaks", "steak"),
    ("stems", "stem"),
    ("sticks", "stick"),
    ("strips", "strip"),
    ("tablespoons", "tablespoon"),
    ("tbsps", "tbsp"),
    ("tbs", "tb"),
    ("teaspoons", "teaspoon"),
    ("tsps", "tsp"),
    ("twists", "twist"),
    ("wedges", "wedge"),
    ("wheels", "wheel"),
];

/// Units whose token can also be part of the ingredient name
/// ("1 teaspoon ground cloves", "5 bay leaves").
const AMBIGUOUS_UNIT_PLURALS: &[&str] = &["cloves", "leaves", "slabs", "wedges"];

/// Words that qualify a unit and are merged into its text ("large handfuls").
const UNIT_MODIFIER_WORDS: &[&str] = &[
    "big", "fat", "generous", "good", "heaped", "heaping", "large", "level", "medium",
    "rounded", "scant", "small", "thick", "thin",
];

/// Spelled-out numbers rewritten to digits by the normalizer.
pub const STRING_NUMBERS: &[(&str, &str)] = &[
    ("one", "1"),
    ("two", "2"),
    ("three", "3"),
    ("four", "4"),
    ("five", "5"),
    ("six", "6"),
    ("seven", "7"),
    ("eight", "8"),
    ("nine", "9"),
    ("ten", "10"),
    ("eleven", "11"),
    ("twelve", "12"),
    ("thirteen", "13"),
    ("fourteen", "14"),
    ("fifteen", "15"),
    ("sixteen", "16"),
    ("seventeen", "17"),
    ("eighteen", "18"),
    ("nineteen", "19"),
];

/// Unicode vulgar fractions and their ASCII replacement.
pub const UNICODE_FRACTIONS: &[(char, &str)] = &[
    ('½', "1/2"),
    ('⅓', "1/3"),
    ('⅔', "2/3"),
    ('¼', "1/4"),
    ('¾', "3/4"),
    ('⅕', "1/5"),
    ('⅖', "2/5"),
    ('⅗', "3/5"),
    ('⅘', "4/5"),
    ('⅙', "1/6"),
    ('⅚', "5/6"),
    ('⅐', "1/7"),
    ('⅛', "1/8"),
    ('⅜', "3/8"),
    ('⅝', "5/8"),
    ('⅞', "7/8"),
    ('⅑', "1/9"),
    ('⅒', "1/10"),
];

/// Words that mark a quantity as inexact.
const APPROXIMATE_MARKER_WORDS: &[&str] = &[
    "about",
    "approx",
    "approx.",
    "approximately",
    "around",
    "roughly",
    "~",
];

/// Words accepted as a quantity on their own, with their numeric value.
const WORD_QUANTITY_VALUES: &[(&str, f64)] = &[
    ("a", 1.0),
    ("an", 1.0),
    ("half", 0.5),
    ("quarter", 0.25),
    ("dozen", 12.0),
];

/// High frequency grammatical words (NLTK English list).
const STOP_WORD_LIST: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his",
    "himself", "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they",
    "them", "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that",
    "that'll", "these", "those", "am", "is", "are", "was", "were", "be", "been", "being",
    "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and",
    "but", "if", "or", "because", "as", "until", "while", "of", "at", "by", "for", "with",
    "about", "against", "between", "into", "through", "during", "before", "after", "above",
    "below", "to", "from", "up", "down", "in", "out", "on", "off", "over", "under", "again",
    "further", "then", "once", "here", "there", "when", "where", "why", "how", "all", "any",
    "both", "each", "few", "more", "most", "other", "some", "such", "no", "nor", "not",
    "only", "own", "same", "so", "than", "too", "very", "s", "t", "can", "will", "just",
    "don", "don't", "should", "should've", "now", "d", "ll", "m", "o", "re", "ve", "y", "ain",
    "aren", "aren't", "couldn", "couldn't", "didn", "didn't", "doesn", "doesn't", "hadn",
    "hadn't", "hasn", "hasn't", "haven", "haven't", "isn", "isn't", "ma", "mightn",
    "mightn't", "mustn", "mustn't", "needn", "needn't", "shan", "shan't", "shouldn",
    "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't", "wouldn", "wouldn't",
];

/// A unit's plural and singular spellings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitEntry {
    pub plural: String,
    pub singular: String,
}

lazy_static! {
    /// Any spelling of a unit, lower-case or capitalised, mapped to its entry.
    static ref UNIT_LOOKUP: HashMap<String, UnitEntry> = {
        let mut lookup = HashMap::new();
        for &(plural, singular) in UNIT_FORMS {
            let lower = UnitEntry {
                plural: plural.to_string(),
                singular: singular.to_string(),
            };
            let capitalised = UnitEntry {
                plural: capitalize(plural),
                singular: capitalize(singular),
            };
            for entry in [lower, capitalised] {
                lookup.insert(entry.plural.clone(), entry.clone());
                lookup.insert(entry.singular.clone(), entry);
            }
        }
        lookup
    };

    /// Every spelling of every unit, longest first, for building regex alternations.
    pub static ref UNIT_SPELLINGS_LONGEST_FIRST: Vec<&'static str> = {
        let mut spellings: Vec<&'static str> = UNIT_LOOKUP.keys().map(|s| s.as_str()).collect();
        spellings.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        spellings
    };

    static ref AMBIGUOUS_UNITS: HashSet<String> = {
        let mut set = HashSet::new();
        for plural in AMBIGUOUS_UNIT_PLURALS {
            if let Some(entry) = UNIT_LOOKUP.get(*plural) {
                set.insert(entry.plural.clone());
                set.insert(entry.singular.clone());
                set.insert(capitalize(&entry.plural));
                set.insert(capitalize(&entry.singular));
            }
        }
        set
    };

    static ref UNIT_MODIFIERS: HashSet<&'static str> =
        UNIT_MODIFIER_WORDS.iter().copied().collect();
    static ref STOP_WORDS: HashSet<&'static str> = STOP_WORD_LIST.iter().copied().collect();
    static ref APPROXIMATE_MARKERS: HashSet<&'static str> =
        APPROXIMATE_MARKER_WORDS.iter().copied().collect();
    static ref WORD_QUANTITIES: HashMap<&'static str, f64> =
        WORD_QUANTITY_VALUES.iter().copied().collect();
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Look up a unit by any of its spellings ("cup", "cups", "Cups").
pub fn unit_entry(word: &str) -> Option<&'static UnitEntry> {
    UNIT_LOOKUP.get(word)
}

/// Whether `word` is a spelling of a known unit.
pub fn is_unit(word: &str) -> bool {
    UNIT_LOOKUP.contains_key(word)
}

/// Whether `word` is a unit that can also belong to the ingredient name.
pub fn is_ambiguous_unit(word: &str) -> bool {
    AMBIGUOUS_UNITS.contains(word)
}

pub fn is_unit_modifier(word: &str) -> bool {
    UNIT_MODIFIERS.contains(word.to_lowercase().as_str())
}

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(word.to_lowercase().as_str())
}

pub fn is_approximate_marker(word: &str) -> bool {
    APPROXIMATE_MARKERS.contains(word.to_lowercase().as_str())
}

/// Numeric value of a quantity word ("dozen" → 12).
pub fn word_quantity(word: &str) -> Option<f64> {
    WORD_QUANTITIES.get(word.to_lowercase().as_str()).copied()
}

/// Plural spelling of a unit, keeping unknown words unchanged.
pub fn pluralize_unit(word: &str) -> String {
    unit_entry(word)
        .map(|entry| entry.plural.clone())
        .unwrap_or_else(|| word.to_string())
}

/// Singular spelling of a unit, keeping unknown words unchanged.
pub fn singularize_unit(word: &str) -> String {
    unit_entry(word)
        .map(|entry| entry.singular.clone())
        .unwrap_or_else(|| word.to_string())
}

/// Replacement text for a unicode vulgar fraction.
pub fn unicode_fraction(c: char) -> Option<&'static str> {
    UNICODE_FRACTIONS
        .iter()
        .find(|(fraction, _)| *fraction == c)
        .map(|(_, ascii)| *ascii)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_lookup_covers_both_forms() {
        assert_eq!(unit_entry("cups").map(|e| e.singular.as_str()), Some("cup"));
        assert_eq!(unit_entry("cup").map(|e| e.plural.as_str()), Some("cups"));
        assert_eq!(unit_entry("Cups").map(|e| e.singular.as_str()), Some("Cup"));
        assert!(unit_entry("flour").is_none());
    }

    #[test]
    fn test_pluralize_and_singularize() {
        assert_eq!(pluralize_unit("tablespoon"), "tablespoons");
        assert_eq!(pluralize_unit("leaf"), "leaves");
        assert_eq!(pluralize_unit("g"), "g");
        assert_eq!(pluralize_unit("tin"), "tin");
        assert_eq!(singularize_unit("ounces"), "ounce");
        assert_eq!(singularize_unit("Handfuls"), "Handful");
    }

    #[test]
    fn test_ambiguous_units_include_all_spellings() {
        for word in ["cloves", "clove", "Cloves", "Clove", "leaf", "Leaves", "wedge", "Slabs"] {
            assert!(is_ambiguous_unit(word), "{} should be ambiguous", word);
        }
        assert!(!is_ambiguous_unit("cup"));
    }

    #[test]
    fn test_spellings_sorted_longest_first() {
        let lengths: Vec<usize> = UNIT_SPELLINGS_LONGEST_FIRST.iter().map(|s| s.len()).collect();
        assert!(lengths.windows(2).all(|w| w[0] >= w[1]));
        assert!(UNIT_SPELLINGS_LONGEST_FIRST.contains(&"Tablespoons"));
    }

    #[test]
    fn test_word_sets() {
        assert!(is_unit_modifier("Large"));
        assert!(!is_unit_modifier("cup"));
        assert!(is_stop_word("The"));
        assert!(is_approximate_marker("Approximately"));
        assert_eq!(word_quantity("dozen"), Some(12.0));
        assert_eq!(unicode_fraction('¾'), Some("3/4"));
        assert_eq!(unicode_fraction('a'), None);
    }
}
