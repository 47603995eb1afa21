/// Morphology property tests: regular rules and irregular precedence.

use proptest::prelude::*;
use surface_realizer::core::config::ComparisonRule;
use surface_realizer::core::morphology::{
    regular_graded, regular_past, regular_plural, regular_present_participle, Morphology,
};
use surface_realizer::schema::element::{InflectedForm, LexicalUnit};
use surface_realizer::schema::features::{FeatureSet, Form, Number, Tense};
use surface_realizer::schema::lexicon::{
    IrregularForms, LexicalCategory, LexicalEntry, MemoryLexicon,
};

fn plural() -> FeatureSet {
    FeatureSet {
        number: Some(Number::Plural),
        ..FeatureSet::default()
    }
}

proptest! {
    #[test]
    fn regular_suffixes(word in "[a-z]{1,12}") {
        prop_assert!(regular_plural(&word).ends_with('s'));
        prop_assert!(regular_past(&word).ends_with("ed"));
        prop_assert!(regular_present_participle(&word).ends_with("ing"));
        prop_assert!(regular_graded(&word, "er").ends_with("er"));
    }

    #[test]
    fn regular_forms_keep_the_stem(word in "[a-z]{3,12}") {
        // At most the final letter is rewritten.
        let stem = &word[..word.len() - 1];
        prop_assert!(regular_plural(&word).starts_with(stem));
        prop_assert!(regular_past(&word).starts_with(stem));
    }

    #[test]
    fn irregular_override_wins(word in "[a-z]{2,10}", form in "[a-z]{2,10}") {
        let mut lexicon = MemoryLexicon::new();
        lexicon.insert(LexicalEntry::new(&word, LexicalCategory::Noun).with_irregular(
            IrregularForms {
                plural: Some(form.clone()),
                ..IrregularForms::default()
            },
        ));
        let rule = ComparisonRule::default();
        let morph = Morphology::new(&lexicon, &rule);
        let request = InflectedForm::new(LexicalUnit::new(&word, LexicalCategory::Noun), plural());
        prop_assert_eq!(morph.inflect(&request), form);
    }

    #[test]
    fn singular_nouns_pass_through(word in "[a-z]{1,10}") {
        let lexicon = MemoryLexicon::new();
        let rule = ComparisonRule::default();
        let morph = Morphology::new(&lexicon, &rule);
        let request = InflectedForm::new(
            LexicalUnit::new(&word, LexicalCategory::Noun),
            FeatureSet::default(),
        );
        prop_assert_eq!(morph.inflect(&request), word);
    }
}

#[test]
fn be_paradigm() {
    let lexicon = MemoryLexicon::new();
    let rule = ComparisonRule::default();
    let morph = Morphology::new(&lexicon, &rule);
    let be = |features: FeatureSet| {
        morph.inflect(&InflectedForm::new(
            LexicalUnit::new("be", LexicalCategory::Verb),
            features,
        ))
    };

    assert_eq!(be(FeatureSet::default()), "is");
    assert_eq!(be(plural()), "are");
    assert_eq!(
        be(FeatureSet {
            tense: Some(Tense::Past),
            ..plural()
        }),
        "were"
    );
    assert_eq!(
        be(FeatureSet {
            form: Some(Form::PastParticiple),
            ..FeatureSet::default()
        }),
        "been"
    );
}

#[test]
fn regular_rule_examples() {
    assert_eq!(regular_plural("box"), "boxes");
    assert_eq!(regular_plural("city"), "cities");
    assert_eq!(regular_plural("day"), "days");
    assert_eq!(regular_past("stop"), "stopped");
    assert_eq!(regular_past("like"), "liked");
    assert_eq!(regular_past("carry"), "carried");
    assert_eq!(regular_present_participle("die"), "dying");
    assert_eq!(regular_present_participle("make"), "making");
    assert_eq!(regular_present_participle("run"), "running");
    assert_eq!(regular_graded("big", "est"), "biggest");
    assert_eq!(regular_graded("large", "er"), "larger");
}
