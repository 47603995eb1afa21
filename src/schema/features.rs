use serde::{Deserialize, Serialize};

/// Grammatical tense of a clause or verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Tense {
    Past,
    #[default]
    Present,
    Future,
}

/// Grammatical number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Number {
    #[default]
    Singular,
    Plural,
}

/// Grammatical person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Person {
    First,
    Second,
    #[default]
    Third,
}

/// Discourse form of a verb group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Form {
    /// Finite form carrying tense and agreement.
    #[default]
    Normal,
    /// "to go"
    Infinitive,
    /// "go"
    BareInfinitive,
    /// "go!", subject omitted.
    Imperative,
    /// "going"
    PresentParticiple,
    /// "gone"
    PastParticiple,
    /// "going", used nominally.
    Gerund,
}

impl Form {
    /// Returns true for forms that carry tense and subject agreement.
    pub fn is_finite(&self) -> bool {
        matches!(self, Self::Normal)
    }
}

/// The role a constituent plays in its parent phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiscourseFunction {
    Subject,
    Head,
    Auxiliary,
    Specifier,
    FrontModifier,
    PreModifier,
    PostModifier,
    Complement,
    Object,
    IndirectObject,
    Conjunction,
    Complementiser,
}

/// The fixed set of grammatical features a node may carry.
///
/// Every field is optional; an unset field falls through to the next layer
/// (`phrase → word → lexicon entry → category default`) via [`FeatureSet::or`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tense: Option<Tense>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person: Option<Person>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<Form>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passive: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub perfect: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progressive: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interrogative: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparative: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub superlative: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub possessive: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proper: Option<bool>,
    /// Coordinator used by a coordinated phrase ("and", "or").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conjunction: Option<String>,
    /// Word introducing an embedded clause ("that", "whether").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complementiser: Option<String>,
}

impl FeatureSet {
    /// Layer `self` over `fallback`: every field set in `self` wins, unset
    /// fields are taken from `fallback`. Neither input is modified.
    pub fn or(&self, fallback: &FeatureSet) -> FeatureSet {
        FeatureSet {
            tense: self.tense.or(fallback.tense),
            number: self.number.or(fallback.number),
            person: self.person.or(fallback.person),
            form: self.form.or(fallback.form),
            negated: self.negated.or(fallback.negated),
            passive: self.passive.or(fallback.passive),
            perfect: self.perfect.or(fallback.perfect),
            progressive: self.progressive.or(fallback.progressive),
            interrogative: self.interrogative.or(fallback.interrogative),
            modal: self.modal.clone().or_else(|| fallback.modal.clone()),
            comparative: self.comparative.or(fallback.comparative),
            superlative: self.superlative.or(fallback.superlative),
            possessive: self.possessive.or(fallback.possessive),
            proper: self.proper.or(fallback.proper),
            conjunction: self
                .conjunction
                .clone()
                .or_else(|| fallback.conjunction.clone()),
            complementiser: self
                .complementiser
                .clone()
                .or_else(|| fallback.complementiser.clone()),
        }
    }

    /// The subset of features a verb group passes down to nested verb
    /// phrases and coordinates.
    pub fn verbal(&self) -> FeatureSet {
        FeatureSet {
            tense: self.tense,
            number: self.number,
            person: self.person,
            form: self.form,
            negated: self.negated,
            passive: self.passive,
            perfect: self.perfect,
            progressive: self.progressive,
            modal: self.modal.clone(),
            ..FeatureSet::default()
        }
    }

    pub fn tense(&self) -> Tense {
        self.tense.unwrap_or_default()
    }

    pub fn number(&self) -> Number {
        self.number.unwrap_or_default()
    }

    pub fn person(&self) -> Person {
        self.person.unwrap_or_default()
    }

    pub fn form(&self) -> Form {
        self.form.unwrap_or_default()
    }

    pub fn is_negated(&self) -> bool {
        self.negated.unwrap_or(false)
    }

    pub fn is_passive(&self) -> bool {
        self.passive.unwrap_or(false)
    }

    pub fn is_perfect(&self) -> bool {
        self.perfect.unwrap_or(false)
    }

    pub fn is_progressive(&self) -> bool {
        self.progressive.unwrap_or(false)
    }

    pub fn is_interrogative(&self) -> bool {
        self.interrogative.unwrap_or(false)
    }

    pub fn is_comparative(&self) -> bool {
        self.comparative.unwrap_or(false)
    }

    pub fn is_superlative(&self) -> bool {
        self.superlative.unwrap_or(false)
    }

    pub fn is_possessive(&self) -> bool {
        self.possessive.unwrap_or(false)
    }

    pub fn is_plural(&self) -> bool {
        self.number() == Number::Plural
    }

    /// Present tense, third person singular: the "-s" slot of the paradigm.
    pub fn is_third_singular(&self) -> bool {
        self.person() == Person::Third && self.number() == Number::Singular
    }
}
