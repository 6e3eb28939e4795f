#[cfg(test)]
mod tests {
    use ingredient_amounts::config::ParserConfig;
    use ingredient_amounts::labeling::{Label, LabeledToken};
    use ingredient_amounts::text_processing::Token;
    use ingredient_amounts::units::{UnitResolver, UnitValue};
    use ingredient_amounts::{AmountBuilder, ConfidenceAggregation, ParseWarning};
    use std::collections::BTreeSet;

    use Label::*;

    fn labeled(tokens: &[&str], labels: &[Label]) -> Vec<LabeledToken> {
        assert_eq!(tokens.len(), labels.len());
        tokens
            .iter()
            .zip(labels)
            .enumerate()
            .map(|(i, (text, label))| LabeledToken::new(Token::new(*text, i), *label, 0.8))
            .collect()
    }

    fn create_builder() -> AmountBuilder {
        let config = ParserConfig {
            string_units: true,
            ..Default::default()
        };
        AmountBuilder::from_config(&config)
    }

    fn unit(text: &str) -> UnitValue {
        UnitValue::String(text.to_string())
    }

    #[test]
    fn test_range_fixture() {
        let tokens = labeled(
            &["1-2", "tablespoons", "local", "honey"],
            &[Qty, Unit, Name, Name],
        );
        let mut consumed = BTreeSet::new();
        let result = create_builder().build(&tokens, &mut consumed);

        assert_eq!(result.amounts.len(), 1);
        let amount = &result.amounts[0];
        assert!(amount.flags.range);
        assert_eq!(amount.quantity, "1");
        assert_eq!(amount.quantity_value, Some(1.0));
        assert_eq!(amount.quantity_max, Some(2.0));
        assert_eq!(amount.unit, unit("tablespoons"));
        assert_eq!(amount.text, "1-2 tablespoons");
    }

    #[test]
    fn test_range_with_connector() {
        let tokens = labeled(&["1", "to", "2", "cups", "stock"], &[Qty, Comment, Qty, Unit, Name]);
        let mut consumed = BTreeSet::new();
        let result = create_builder().build(&tokens, &mut consumed);

        assert_eq!(result.amounts.len(), 1);
        let amount = &result.amounts[0];
        assert!(amount.flags.range);
        assert_eq!(amount.quantity_max, Some(2.0));
        assert_eq!(amount.text, "1 to 2 cups");
        assert_eq!(amount.token_indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_reversed_range_swaps_bounds() {
        let tokens = labeled(&["3-2", "cups"], &[Qty, Unit]);
        let mut consumed = BTreeSet::new();
        let result = create_builder().build(&tokens, &mut consumed);
        let amount = &result.amounts[0];
        assert_eq!(amount.quantity, "2");
        assert_eq!(amount.quantity_value, Some(2.0));
        assert_eq!(amount.quantity_max, Some(3.0));
    }

    #[test]
    fn test_multiplier_fixture() {
        let tokens = labeled(
            &["1x", "tin", "condensed", "milk"],
            &[Qty, Unit, Name, Name],
        );
        let mut consumed = BTreeSet::new();
        let result = create_builder().build(&tokens, &mut consumed);

        assert_eq!(result.amounts.len(), 1);
        let amount = &result.amounts[0];
        assert!(amount.flags.multiplier);
        assert!(!amount.flags.range);
        assert_eq!(amount.quantity, "1");
        assert_eq!(amount.quantity_max, None);
        assert_eq!(amount.unit, unit("tin"));
    }

    #[test]
    fn test_standalone_x_multiplier() {
        let tokens = labeled(&["2", "x", "cans", "beans"], &[Qty, Comment, Unit, Name]);
        let mut consumed = BTreeSet::new();
        let result = create_builder().build(&tokens, &mut consumed);
        let amount = &result.amounts[0];
        assert!(amount.flags.multiplier);
        assert_eq!(amount.quantity, "2");
        assert_eq!(amount.text, "2 x cans");
    }

    #[test]
    fn test_comma_before_unit_fixture() {
        let tokens = labeled(
            &["1", "green", ",", "large", "pepper"],
            &[Qty, Name, Punc, Unit, Name],
        );
        let mut consumed = BTreeSet::new();
        let result = create_builder().build(&tokens, &mut consumed);

        assert_eq!(result.amounts.len(), 1);
        let amount = &result.amounts[0];
        assert_eq!(amount.quantity, "1");
        assert_eq!(amount.unit, unit("large"));
        assert_eq!(amount.text, "1 large");
        assert_eq!(amount.starting_index, 0);
    }

    #[test]
    fn test_comma_before_ambiguous_unit_stays_in_name() {
        let tokens = labeled(
            &["1", "bulb", "garlic", ",", "cloves", "separated"],
            &[Qty, Unit, Name, Punc, Unit, Prep],
        );
        let mut consumed = BTreeSet::new();
        let result = create_builder().build(&tokens, &mut consumed);
        assert_eq!(result.amounts.len(), 1);
        assert_eq!(result.amounts[0].unit, unit("bulb"));

        let tokens = labeled(
            &["1", "head", "garlic", ",", "cloves"],
            &[Qty, Name, Name, Punc, Unit],
        );
        let mut consumed = BTreeSet::new();
        let result = create_builder().build(&tokens, &mut consumed);
        assert_eq!(result.amounts.len(), 1);
        assert_eq!(result.amounts[0].unit, unit(""));
        assert!(!consumed.contains(&4));
    }

    #[test]
    fn test_bare_unit_fixture() {
        let tokens = labeled(
            &["bunch", "of", "basil", "leaves"],
            &[Unit, Comment, Name, Unit],
        );
        let mut consumed = BTreeSet::new();
        let result = create_builder().build(&tokens, &mut consumed);

        assert_eq!(result.amounts.len(), 1);
        let amount = &result.amounts[0];
        assert_eq!(amount.quantity, "");
        assert_eq!(amount.quantity_value, None);
        assert_eq!(amount.unit, unit("bunch"));
        assert_eq!(amount.text, "bunch");
    }

    #[test]
    fn test_singular_approximate_fixture() {
        let tokens = labeled(
            &["2", "bananas", ",", "each", "about", "4", "ounce"],
            &[Qty, Name, Punc, Comment, Comment, Qty, Unit],
        );
        let mut consumed = BTreeSet::new();
        let result = create_builder().build(&tokens, &mut consumed);

        assert_eq!(result.amounts.len(), 2);
        let count = &result.amounts[0];
        assert_eq!(count.quantity, "2");
        assert_eq!(count.unit, unit(""));
        assert!(!count.flags.singular);

        let size = &result.amounts[1];
        assert_eq!(size.quantity, "4");
        assert_eq!(size.unit, unit("ounces"));
        assert!(size.flags.singular);
        assert!(size.flags.approximate);
        assert_eq!(size.starting_index, 5);
    }

    #[test]
    fn test_singular_without_marker_is_not_approximate() {
        let tokens = labeled(
            &["2", "steaks", ",", "each", "8", "ounce"],
            &[Qty, Name, Punc, Comment, Qty, Unit],
        );
        let mut consumed = BTreeSet::new();
        let result = create_builder().build(&tokens, &mut consumed);
        assert_eq!(result.amounts.len(), 2);
        assert!(result.amounts[1].flags.singular);
        assert!(!result.amounts[1].flags.approximate);
    }

    #[test]
    fn test_dozen_fixture() {
        let tokens = labeled(&["2", "dozen", "bananas"], &[Qty, Qty, Name]);
        let mut consumed = BTreeSet::new();
        let result = create_builder().build(&tokens, &mut consumed);

        assert_eq!(result.amounts.len(), 1);
        let amount = &result.amounts[0];
        assert_eq!(amount.quantity, "2 dozen");
        assert_eq!(amount.quantity_value, Some(24.0));
        assert_eq!(amount.text, "2 dozen");
    }

    #[test]
    fn test_sizable_unit_pattern() {
        let tokens = labeled(
            &["2", "14", "ounce", "cans", "coconut", "milk"],
            &[Qty, Qty, Unit, Unit, Name, Name],
        );
        let mut consumed = BTreeSet::new();
        let result = create_builder().build(&tokens, &mut consumed);

        assert_eq!(result.amounts.len(), 2);
        assert_eq!(result.amounts[0].quantity, "2");
        assert_eq!(result.amounts[0].unit, unit("cans"));
        assert_eq!(result.amounts[0].text, "2 cans");
        assert!(!result.amounts[0].flags.singular);

        assert_eq!(result.amounts[1].quantity, "14");
        assert_eq!(result.amounts[1].unit, unit("ounces"));
        assert!(result.amounts[1].flags.singular);
        assert_eq!(result.amounts[1].starting_index, 1);
    }

    #[test]
    fn test_unit_modifiers_merge() {
        let tokens = labeled(
            &["2", "large", "handfuls", "spinach"],
            &[Qty, Size, Unit, Name],
        );
        let mut consumed = BTreeSet::new();
        let result = create_builder().build(&tokens, &mut consumed);
        assert_eq!(result.amounts[0].unit, unit("large handfuls"));
        assert_eq!(result.amounts[0].text, "2 large handfuls");
    }

    #[test]
    fn test_ambiguous_unit_after_name_is_name() {
        let tokens = labeled(&["5", "bay", "leaves"], &[Qty, Name, Unit]);
        let mut consumed = BTreeSet::new();
        let result = create_builder().build(&tokens, &mut consumed);
        assert_eq!(result.amounts.len(), 1);
        assert_eq!(result.amounts[0].unit, unit(""));
        assert_eq!(result.amounts[0].text, "5");

        let tokens = labeled(&["3", "cloves", "garlic"], &[Qty, Unit, Name]);
        let mut consumed = BTreeSet::new();
        let result = create_builder().build(&tokens, &mut consumed);
        assert_eq!(result.amounts[0].unit, unit("cloves"));
    }

    #[test]
    fn test_leading_approximation_marker() {
        let tokens = labeled(&["about", "2", "cups", "rice"], &[Comment, Qty, Unit, Name]);
        let mut consumed = BTreeSet::new();
        let result = create_builder().build(&tokens, &mut consumed);
        assert!(result.amounts[0].flags.approximate);
        assert_eq!(result.amounts[0].starting_index, 1);
        assert_eq!(result.amounts[0].text, "2 cups");
    }

    #[test]
    fn test_pluralization() {
        let tokens = labeled(&["1", "cup", "milk"], &[Qty, Unit, Name]);
        let mut consumed = BTreeSet::new();
        let result = create_builder().build(&tokens, &mut consumed);
        assert_eq!(result.amounts[0].unit, unit("cup"));

        let tokens = labeled(&["1/2", "cup", "milk"], &[Qty, Unit, Name]);
        let mut consumed = BTreeSet::new();
        let result = create_builder().build(&tokens, &mut consumed);
        assert_eq!(result.amounts[0].unit, unit("cups"));
    }

    #[test]
    fn test_malformed_quantity_is_dropped_with_warning() {
        let tokens = labeled(
            &["1/0", "cups", "flour", ",", "2", "tbsp", "sugar"],
            &[Qty, Unit, Name, Punc, Qty, Unit, Name],
        );
        let mut consumed = BTreeSet::new();
        let result = create_builder().build(&tokens, &mut consumed);

        assert_eq!(result.amounts.len(), 1);
        assert_eq!(result.amounts[0].quantity, "2");
        assert_eq!(result.warnings.len(), 1);
        assert!(matches!(
            &result.warnings[0],
            ParseWarning::QuantityDropped { quantity, starting_index: 0, .. } if quantity == "1/0"
        ));
        assert!(consumed.contains(&0));
    }

    #[test]
    fn test_confidence_aggregation_modes() {
        let mut tokens = labeled(&["2", "cups", "flour"], &[Qty, Unit, Name]);
        tokens[0].confidence = 0.9;
        tokens[1].confidence = 0.5;

        let config = ParserConfig {
            string_units: true,
            ..Default::default()
        };
        let min = AmountBuilder::new(UnitResolver::new(&config), ConfidenceAggregation::Min);
        let mean = AmountBuilder::new(UnitResolver::new(&config), ConfidenceAggregation::Mean);

        let result = min.build(&tokens, &mut BTreeSet::new());
        assert_eq!(result.amounts[0].confidence, 0.5);
        let result = mean.build(&tokens, &mut BTreeSet::new());
        assert!((result.amounts[0].confidence - 0.7).abs() < 1e-9);
        let result = min.build_fallback(&tokens, &mut BTreeSet::new());
        assert_eq!(result.amounts[0].confidence, 0.0);
    }

    #[test]
    fn test_fallback_pass_respects_primary_consumption() {
        let builder = create_builder();
        let tokens = labeled(
            &["2", "cups", "flour", "1", "tsp", "salt"],
            &[Qty, Unit, Name, Qty, Unit, Name],
        );
        let mut consumed = BTreeSet::new();
        let primary = builder.build(&tokens[..3], &mut consumed);
        assert_eq!(primary.amounts.len(), 1);

        let fallback = builder.build_fallback(&tokens, &mut consumed);
        assert_eq!(fallback.amounts.len(), 1);
        assert_eq!(fallback.amounts[0].starting_index, 3);
        assert_eq!(consumed.len(), 4);
    }

    #[test]
    fn test_all_comment_labels_yield_nothing() {
        let tokens = labeled(&["2", "cups", "flour"], &[Comment, Comment, Comment]);
        let mut consumed = BTreeSet::new();
        let result = create_builder().build(&tokens, &mut consumed);
        assert!(result.amounts.is_empty());
        assert!(consumed.is_empty());
    }

    #[test]
    fn test_physical_units() {
        let builder = AmountBuilder::from_config(&ParserConfig::default());
        let tokens = labeled(&["2", "cups", "flour"], &[Qty, Unit, Name]);
        let result = builder.build(&tokens, &mut BTreeSet::new());
        let handle = result.amounts[0].unit.as_handle().expect("cup resolves to a handle");
        assert_eq!(handle.name, "cup");
        assert!(handle.plural);

        let imperial = AmountBuilder::from_config(&ParserConfig {
            imperial_units: true,
            ..Default::default()
        });
        let result = imperial.build(&tokens, &mut BTreeSet::new());
        assert_eq!(result.amounts[0].unit.to_string(), "imperial_cups");

        let tokens = labeled(&["1x", "tin"], &[Qty, Unit]);
        let result = builder.build(&tokens, &mut BTreeSet::new());
        assert_eq!(result.amounts[0].unit, unit("tin"));
    }
}
