/// Morphology engine: turns inflection requests into surface words.
///
/// Each lexical category has its own rule. Irregular forms from the
/// lexicon always win; a missing irregular falls back to the regular rule.

use tracing::debug;

use crate::core::config::{count_syllables, ComparisonRule};
use crate::core::pipeline::RealizeError;
use crate::core::syntax::{Leaf, LeafContent};
use crate::schema::element::{ComparisonStrategy, InflectedForm, LexicalUnit};
use crate::schema::features::{FeatureSet, Form, Number, Person, Tense};
use crate::schema::lexicon::{InflectionKind, IrregularForms, LexicalCategory, Lexicon};

pub struct Morphology<'a> {
    lexicon: &'a dyn Lexicon,
    comparison: &'a ComparisonRule,
}

impl<'a> Morphology<'a> {
    pub fn new(lexicon: &'a dyn Lexicon, comparison: &'a ComparisonRule) -> Self {
        Self {
            lexicon,
            comparison,
        }
    }

    /// Inflect every leaf of a sentence, then fix up the indefinite article
    /// against the word that follows it.
    pub fn inflect_all(&self, leaves: &[Leaf]) -> Vec<String> {
        let mut tokens: Vec<String> = leaves
            .iter()
            .map(|leaf| match &leaf.content {
                LeafContent::Form(form) => self.inflect(form),
                LeafContent::Text(text) => text.clone(),
            })
            .collect();

        for i in 0..leaves.len() {
            if !is_indefinite_article(&leaves[i]) {
                continue;
            }
            let before_vowel = tokens[i + 1..]
                .iter()
                .find(|t| !t.trim().is_empty())
                .map_or(false, |next| starts_with_vowel(next));
            if before_vowel {
                tokens[i] = if tokens[i].starts_with('A') {
                    "An".to_string()
                } else {
                    "an".to_string()
                };
            }
        }
        tokens
    }

    pub fn inflect(&self, form: &InflectedForm) -> String {
        let unit = &form.unit;
        let features = &form.features;
        match unit.category {
            LexicalCategory::Noun => noun(&unit.base, features, self.irregulars(unit)),
            LexicalCategory::Verb => verb(&unit.base, features, self.irregulars(unit)),
            LexicalCategory::Adjective | LexicalCategory::Adverb => {
                let superlative = features.is_superlative();
                if !superlative && !features.is_comparative() {
                    return unit.base.clone();
                }
                let irregular = self.irregulars(unit);
                let strategy = form.comparison.unwrap_or_else(|| {
                    comparison_strategy(unit, irregular, superlative, self.comparison)
                });
                compare(&unit.base, superlative, strategy, irregular)
            }
            LexicalCategory::Preposition
            | LexicalCategory::Determiner
            | LexicalCategory::Pronoun
            | LexicalCategory::Conjunction
            | LexicalCategory::Complementiser => unit.base.clone(),
        }
    }

    /// Irregulars carried on the unit, else the lexicon's.
    fn irregulars<'u>(&'u self, unit: &'u LexicalUnit) -> Option<&'u IrregularForms> {
        if let Some(irregular) = &unit.irregular {
            return Some(irregular);
        }
        match self.lexicon.lookup(&unit.base, unit.category) {
            Some(entry) => Some(&entry.irregular),
            None => {
                let miss = RealizeError::LexiconMiss {
                    base: unit.base.clone(),
                    category: unit.category,
                };
                debug!(error = %miss, "falling back to regular inflection");
                None
            }
        }
    }
}

/// Decide how an adjective or adverb forms its comparative or superlative.
pub fn comparison_strategy(
    unit: &LexicalUnit,
    irregular: Option<&IrregularForms>,
    superlative: bool,
    rule: &ComparisonRule,
) -> ComparisonStrategy {
    let kind = if superlative {
        InflectionKind::Superlative
    } else {
        InflectionKind::Comparative
    };
    if irregular.and_then(|i| i.get(kind)).is_some() {
        ComparisonStrategy::Irregular
    } else if rule.takes_suffix(&unit.base, unit.category) {
        ComparisonStrategy::Suffix
    } else {
        ComparisonStrategy::Periphrastic
    }
}

fn irregular<'i>(
    base: &str,
    irregular: Option<&'i IrregularForms>,
    kind: InflectionKind,
) -> Option<&'i str> {
    irregular
        .and_then(|i| i.get(kind))
        .or_else(|| auxiliary_form(base, kind))
}

/// Paradigms of the auxiliaries the syntax stage synthesizes, so that
/// "does"/"has" come out right even with an empty lexicon.
fn auxiliary_form(base: &str, kind: InflectionKind) -> Option<&'static str> {
    match (base.to_lowercase().as_str(), kind) {
        ("have", InflectionKind::ThirdSingular) => Some("has"),
        ("have", InflectionKind::Past | InflectionKind::PastParticiple) => Some("had"),
        ("do", InflectionKind::ThirdSingular) => Some("does"),
        ("do", InflectionKind::Past) => Some("did"),
        ("do", InflectionKind::PastParticiple) => Some("done"),
        _ => None,
    }
}

fn noun(base: &str, features: &FeatureSet, irregular: Option<&IrregularForms>) -> String {
    let plural = features.is_plural();
    let mut word = if plural {
        irregular
            .and_then(|i| i.get(InflectionKind::Plural))
            .map(str::to_string)
            .unwrap_or_else(|| regular_plural(base))
    } else {
        base.to_string()
    };

    if features.is_possessive() {
        if plural && word.ends_with('s') {
            word.push('\'');
        } else {
            word.push_str("'s");
        }
    }
    word
}

fn verb(base: &str, features: &FeatureSet, irr: Option<&IrregularForms>) -> String {
    if base.eq_ignore_ascii_case("be") {
        return be_form(features).to_string();
    }

    match features.form() {
        Form::Infinitive | Form::BareInfinitive | Form::Imperative => base.to_string(),
        Form::PresentParticiple | Form::Gerund => {
            irregular(base, irr, InflectionKind::PresentParticiple)
                .map(str::to_string)
                .unwrap_or_else(|| regular_present_participle(base))
        }
        Form::PastParticiple => irregular(base, irr, InflectionKind::PastParticiple)
            .map(str::to_string)
            .unwrap_or_else(|| regular_past(base)),
        Form::Normal => match features.tense() {
            Tense::Past => irregular(base, irr, InflectionKind::Past)
                .map(str::to_string)
                .unwrap_or_else(|| regular_past(base)),
            Tense::Present if features.is_third_singular() => {
                irregular(base, irr, InflectionKind::ThirdSingular)
                    .map(str::to_string)
                    .unwrap_or_else(|| regular_third_singular(base))
            }
            Tense::Present | Tense::Future => base.to_string(),
        },
    }
}

fn be_form(features: &FeatureSet) -> &'static str {
    match features.form() {
        Form::Infinitive | Form::BareInfinitive | Form::Imperative => "be",
        Form::PresentParticiple | Form::Gerund => "being",
        Form::PastParticiple => "been",
        Form::Normal => match (features.tense(), features.person(), features.number()) {
            (Tense::Present, Person::First, Number::Singular) => "am",
            (Tense::Present, Person::Third, Number::Singular) => "is",
            (Tense::Present, _, _) => "are",
            (Tense::Past, Person::First | Person::Third, Number::Singular) => "was",
            (Tense::Past, _, _) => "were",
            (Tense::Future, _, _) => "be",
        },
    }
}

fn compare(
    base: &str,
    superlative: bool,
    strategy: ComparisonStrategy,
    irr: Option<&IrregularForms>,
) -> String {
    let (kind, suffix, adverb) = if superlative {
        (InflectionKind::Superlative, "est", "most")
    } else {
        (InflectionKind::Comparative, "er", "more")
    };
    match strategy {
        ComparisonStrategy::Irregular => irr
            .and_then(|i| i.get(kind))
            .map(str::to_string)
            .unwrap_or_else(|| regular_graded(base, suffix)),
        ComparisonStrategy::Suffix => regular_graded(base, suffix),
        ComparisonStrategy::Periphrastic => format!("{} {}", adverb, base),
    }
}

fn is_vowel(c: char) -> bool {
    matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u')
}

fn ends_with_consonant_y(word: &str) -> bool {
    let mut rev = word.chars().rev();
    matches!(
        (rev.next(), rev.next()),
        (Some('y'), Some(prev)) if !is_vowel(prev)
    )
}

/// One-syllable words ending consonant-vowel-consonant double the final
/// consonant before a vowel suffix ("stop" → "stopped", "big" → "bigger").
fn doubles_final_consonant(word: &str) -> Option<char> {
    let chars: Vec<char> = word.chars().collect();
    if chars.len() < 3 || count_syllables(word) != 1 {
        return None;
    }
    let last = chars[chars.len() - 1];
    let vowel = chars[chars.len() - 2];
    let before = chars[chars.len() - 3];
    let doubles = last.is_ascii_alphabetic()
        && !is_vowel(last)
        && !matches!(last, 'w' | 'x' | 'y')
        && is_vowel(vowel)
        && !is_vowel(before);
    doubles.then_some(last)
}

fn is_sibilant(word: &str) -> bool {
    ["s", "x", "z", "ch", "sh"]
        .iter()
        .any(|ending| word.ends_with(ending))
}

pub fn regular_plural(base: &str) -> String {
    if is_sibilant(base) {
        format!("{}es", base)
    } else if ends_with_consonant_y(base) {
        format!("{}ies", &base[..base.len() - 1])
    } else {
        format!("{}s", base)
    }
}

pub fn regular_third_singular(base: &str) -> String {
    let consonant_o = {
        let mut rev = base.chars().rev();
        matches!((rev.next(), rev.next()), (Some('o'), Some(prev)) if !is_vowel(prev))
    };
    if consonant_o {
        format!("{}es", base)
    } else {
        regular_plural(base)
    }
}

pub fn regular_past(base: &str) -> String {
    if base.ends_with('e') {
        format!("{}d", base)
    } else if ends_with_consonant_y(base) {
        format!("{}ied", &base[..base.len() - 1])
    } else if let Some(last) = doubles_final_consonant(base) {
        format!("{}{}ed", base, last)
    } else {
        format!("{}ed", base)
    }
}

pub fn regular_present_participle(base: &str) -> String {
    if let Some(stem) = base.strip_suffix("ie") {
        format!("{}ying", stem)
    } else if ["ee", "ye", "oe"].iter().any(|e| base.ends_with(e)) {
        format!("{}ing", base)
    } else if let (Some(stem), true) = (base.strip_suffix('e'), base.chars().count() > 2) {
        format!("{}ing", stem)
    } else if let Some(last) = doubles_final_consonant(base) {
        format!("{}{}ing", base, last)
    } else {
        format!("{}ing", base)
    }
}

/// "-er"/"-est" with e-elision, y→i and consonant doubling.
pub fn regular_graded(base: &str, suffix: &str) -> String {
    if base.ends_with('e') {
        format!("{}{}", base, &suffix[1..])
    } else if ends_with_consonant_y(base) {
        format!("{}i{}", &base[..base.len() - 1], suffix)
    } else if let Some(last) = doubles_final_consonant(base) {
        format!("{}{}{}", base, last, suffix)
    } else {
        format!("{}{}", base, suffix)
    }
}

fn is_indefinite_article(leaf: &Leaf) -> bool {
    matches!(
        &leaf.content,
        LeafContent::Form(form)
            if form.unit.category == LexicalCategory::Determiner
                && form.unit.base.eq_ignore_ascii_case("a")
    )
}

fn starts_with_vowel(token: &str) -> bool {
    token
        .chars()
        .find(|c| c.is_alphabetic())
        .map_or(false, is_vowel)
}
