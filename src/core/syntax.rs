/// Syntax processor: orders constituents and builds verb groups.
///
/// Walks a phrase tree top-down and flattens it into an ordered sequence of
/// leaves. Each leaf is either an inflection request for the morphology
/// stage or literal text. The input tree is only read.

use tracing::warn;

use crate::core::config::RealizerConfig;
use crate::core::morphology::comparison_strategy;
use crate::core::pipeline::RealizeError;
use crate::schema::element::{
    DocumentCategory, DocumentNode, InflectedForm, LexicalUnit, Node, PhraseCategory, PhraseNode,
};
use crate::schema::features::{DiscourseFunction, FeatureSet, Form, Number, Person, Tense};
use crate::schema::lexicon::{LexicalCategory, Lexicon};

/// What a leaf holds: a word still to be inflected, or finished text.
#[derive(Debug, Clone, PartialEq)]
pub enum LeafContent {
    Form(InflectedForm),
    Text(String),
}

/// One element of the flattened sentence, tagged with the role it plays.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    pub function: DiscourseFunction,
    pub content: LeafContent,
}

impl Leaf {
    pub fn form(function: DiscourseFunction, form: InflectedForm) -> Self {
        Self {
            function,
            content: LeafContent::Form(form),
        }
    }

    pub fn text(function: DiscourseFunction, text: &str) -> Self {
        Self {
            function,
            content: LeafContent::Text(text.to_string()),
        }
    }

    /// Base form of a word leaf, or the literal text.
    pub fn base(&self) -> &str {
        match &self.content {
            LeafContent::Form(form) => &form.unit.base,
            LeafContent::Text(text) => text,
        }
    }
}

/// Output of resolving one node.
#[derive(Debug, Default)]
pub struct Resolved {
    pub leaves: Vec<Leaf>,
    pub warnings: Vec<RealizeError>,
    /// Set when a top-level clause was realized as a question.
    pub question: bool,
}

pub struct SyntaxProcessor<'a> {
    lexicon: &'a dyn Lexicon,
    config: &'a RealizerConfig,
}

impl<'a> SyntaxProcessor<'a> {
    pub fn new(lexicon: &'a dyn Lexicon, config: &'a RealizerConfig) -> Self {
        Self { lexicon, config }
    }

    pub fn resolve(&self, node: &Node) -> Result<Resolved, RealizeError> {
        let mut out = Resolved::default();
        self.node(node, DiscourseFunction::Head, &FeatureSet::default(), 0, &mut out)?;
        Ok(out)
    }

    fn node(
        &self,
        node: &Node,
        function: DiscourseFunction,
        inherited: &FeatureSet,
        depth: usize,
        out: &mut Resolved,
    ) -> Result<(), RealizeError> {
        if depth > self.config.max_depth {
            return Err(RealizeError::DepthExceeded(self.config.max_depth));
        }

        match node {
            Node::Word(unit) => {
                let form = self.request(unit, &FeatureSet::default(), out);
                out.leaves.push(Leaf::form(function, form));
            }
            Node::Inflected(form) => out.leaves.push(Leaf::form(function, form.clone())),
            Node::Text(text) => out.leaves.push(Leaf::text(function, text)),
            Node::Phrase(phrase) => self.phrase(phrase, function, inherited, depth + 1, out)?,
            Node::Document(doc) => self.inline_document(doc, function, inherited, depth + 1, out)?,
        }
        Ok(())
    }

    /// Lists and raw text may sit inside a sentence; larger structures may not.
    fn inline_document(
        &self,
        doc: &DocumentNode,
        function: DiscourseFunction,
        inherited: &FeatureSet,
        depth: usize,
        out: &mut Resolved,
    ) -> Result<(), RealizeError> {
        match doc.category {
            DocumentCategory::List => {
                let items: Vec<&Node> = doc.children.iter().collect();
                self.coordinate(&items, "and", function, inherited, depth, out)
            }
            DocumentCategory::RawText => self.slot(&doc.children, function, inherited, depth, out),
            DocumentCategory::Sentence | DocumentCategory::Paragraph | DocumentCategory::Section => {
                Err(RealizeError::MisplacedDocument(doc.category))
            }
        }
    }

    fn phrase(
        &self,
        phrase: &PhraseNode,
        function: DiscourseFunction,
        inherited: &FeatureSet,
        depth: usize,
        out: &mut Resolved,
    ) -> Result<(), RealizeError> {
        if !phrase.has_head() {
            return Err(RealizeError::MissingHead {
                category: phrase.category,
            });
        }

        match phrase.category {
            PhraseCategory::Noun => self.noun_phrase(phrase, function, depth, out),
            PhraseCategory::Verb => self
                .verb_phrase(phrase, inherited, false, depth, out)
                .map(|_| ()),
            PhraseCategory::Preposition => self.prepositional_phrase(phrase, function, depth, out),
            PhraseCategory::Adjective | PhraseCategory::Adverb => {
                self.modifier_phrase(phrase, function, depth, out)
            }
            PhraseCategory::Clause => self.clause(phrase, function, inherited, depth, out),
            PhraseCategory::Coordinated => self
                .coordinated(phrase, function, inherited, depth, out)
                .map(|_| ()),
        }
    }

    fn slot(
        &self,
        nodes: &[Node],
        function: DiscourseFunction,
        inherited: &FeatureSet,
        depth: usize,
        out: &mut Resolved,
    ) -> Result<(), RealizeError> {
        for node in nodes {
            self.node(node, function, inherited, depth, out)?;
        }
        Ok(())
    }

    /// "A", "A and B", "A, B and C".
    fn coordinate(
        &self,
        items: &[&Node],
        conjunction: &str,
        function: DiscourseFunction,
        inherited: &FeatureSet,
        depth: usize,
        out: &mut Resolved,
    ) -> Result<(), RealizeError> {
        let last = items.len().saturating_sub(1);
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                let separator = if i == last { conjunction } else { "," };
                out.leaves
                    .push(Leaf::text(DiscourseFunction::Conjunction, separator));
            }
            self.node(item, function, inherited, depth, out)?;
        }
        Ok(())
    }

    /// The head takes the function of the slot the phrase fills.
    fn noun_phrase(
        &self,
        phrase: &PhraseNode,
        function: DiscourseFunction,
        depth: usize,
        out: &mut Resolved,
    ) -> Result<(), RealizeError> {
        let none = FeatureSet::default();
        let number = self.noun_phrase_number(phrase);

        for spec in &phrase.specifier {
            match spec {
                Node::Word(unit) if unit.category == LexicalCategory::Determiner => {
                    let mut form = self.request(unit, &none, out);
                    if number == Number::Plural {
                        if let Some(plural) = plural_determiner(&unit.base) {
                            form.unit.base = plural.to_string();
                        }
                    }
                    out.leaves.push(Leaf::form(DiscourseFunction::Specifier, form));
                }
                other => self.node(other, DiscourseFunction::Specifier, &none, depth, out)?,
            }
        }

        self.slot(&phrase.pre_modifiers, DiscourseFunction::PreModifier, &none, depth, out)?;

        // Plural always inflects the head, proper noun or not.
        let head_features = FeatureSet {
            number: Some(number),
            possessive: phrase.features.possessive,
            ..FeatureSet::default()
        };
        for head in &phrase.head {
            match head {
                Node::Word(unit) if unit.category == LexicalCategory::Noun => {
                    let form = self.request(unit, &head_features, out);
                    out.leaves.push(Leaf::form(function, form));
                }
                other => self.node(other, function, &none, depth, out)?,
            }
        }

        self.slot(&phrase.complements, DiscourseFunction::Complement, &none, depth, out)?;
        self.slot(&phrase.post_modifiers, DiscourseFunction::PostModifier, &none, depth, out)
    }

    /// Phrase override, then the head word, then a plural determiner.
    fn noun_phrase_number(&self, phrase: &PhraseNode) -> Number {
        if let Some(number) = phrase.features.number {
            return number;
        }
        for head in &phrase.head {
            let number = match head {
                Node::Word(unit) => self.word_features(unit).number,
                Node::Inflected(form) => form.features.number,
                _ => None,
            };
            if let Some(number) = number {
                return number;
            }
        }
        let plural_specifier = phrase.specifier.iter().any(|spec| {
            matches!(spec, Node::Word(unit)
                if unit.category == LexicalCategory::Determiner && implies_plural(&unit.base))
        });
        if plural_specifier {
            Number::Plural
        } else {
            Number::Singular
        }
    }

    fn prepositional_phrase(
        &self,
        phrase: &PhraseNode,
        function: DiscourseFunction,
        depth: usize,
        out: &mut Resolved,
    ) -> Result<(), RealizeError> {
        let none = FeatureSet::default();
        self.slot(&phrase.pre_modifiers, DiscourseFunction::PreModifier, &none, depth, out)?;
        self.slot(&phrase.head, function, &none, depth, out)?;
        self.slot(&phrase.objects, DiscourseFunction::Object, &none, depth, out)?;
        self.slot(&phrase.complements, DiscourseFunction::Complement, &none, depth, out)?;
        self.slot(&phrase.post_modifiers, DiscourseFunction::PostModifier, &none, depth, out)
    }

    /// Adjective and adverb phrases: grading features go to the head word.
    fn modifier_phrase(
        &self,
        phrase: &PhraseNode,
        function: DiscourseFunction,
        depth: usize,
        out: &mut Resolved,
    ) -> Result<(), RealizeError> {
        let none = FeatureSet::default();
        let grading = FeatureSet {
            comparative: phrase.features.comparative,
            superlative: phrase.features.superlative,
            ..FeatureSet::default()
        };

        self.slot(&phrase.pre_modifiers, DiscourseFunction::PreModifier, &none, depth, out)?;
        for head in &phrase.head {
            match head {
                Node::Word(unit)
                    if matches!(
                        unit.category,
                        LexicalCategory::Adjective | LexicalCategory::Adverb
                    ) =>
                {
                    let form = self.request(unit, &grading, out);
                    out.leaves.push(Leaf::form(function, form));
                }
                other => self.node(other, function, &none, depth, out)?,
            }
        }
        self.slot(&phrase.complements, DiscourseFunction::Complement, &none, depth, out)?;
        self.slot(&phrase.post_modifiers, DiscourseFunction::PostModifier, &none, depth, out)
    }

    /// Verb coordinates each get their own verb group from the inherited
    /// verb features. In a question the later coordinates share the fronted
    /// auxiliary of the first. Returns the first coordinate's finite index.
    fn coordinated(
        &self,
        phrase: &PhraseNode,
        function: DiscourseFunction,
        inherited: &FeatureSet,
        depth: usize,
        out: &mut Resolved,
    ) -> Result<Option<usize>, RealizeError> {
        let none = FeatureSet::default();
        let features = phrase.features.or(inherited);
        let conjunction = features.conjunction.as_deref().unwrap_or("and");
        let mut verb_features = features.verbal();
        verb_features.interrogative = features.interrogative;
        let shared_auxiliary =
            verb_features.is_interrogative() && verb_features.form() == Form::Normal;

        self.slot(&phrase.pre_modifiers, DiscourseFunction::PreModifier, &none, depth, out)?;

        let last = phrase.head.len().saturating_sub(1);
        let mut first_finite = None;
        for (i, coordinate) in phrase.head.iter().enumerate() {
            if i > 0 {
                let separator = if i == last { conjunction } else { "," };
                out.leaves
                    .push(Leaf::text(DiscourseFunction::Conjunction, separator));
            }
            let finite_at = match coordinate {
                Node::Word(unit) if unit.category == LexicalCategory::Verb => {
                    Some(self.verb_group(unit, &verb_features, &[], depth, out)?)
                }
                Node::Phrase(vp) if vp.category == PhraseCategory::Verb => {
                    self.verb_phrase(vp, &verb_features, false, depth + 1, out)?
                }
                other => {
                    self.node(other, function, &features.verbal(), depth, out)?;
                    None
                }
            };
            if i == 0 {
                first_finite = finite_at;
            } else if let Some(at) = finite_at.filter(|_| shared_auxiliary) {
                if out.leaves[at].function == DiscourseFunction::Auxiliary {
                    out.leaves.remove(at);
                }
            }
        }

        self.slot(&phrase.complements, DiscourseFunction::Complement, &none, depth, out)?;
        self.slot(&phrase.post_modifiers, DiscourseFunction::PostModifier, &none, depth, out)?;
        Ok(first_finite)
    }

    fn clause(
        &self,
        phrase: &PhraseNode,
        function: DiscourseFunction,
        inherited: &FeatureSet,
        depth: usize,
        out: &mut Resolved,
    ) -> Result<(), RealizeError> {
        let none = FeatureSet::default();
        let verb = &phrase.head[0];
        let verb_phrase = match verb {
            Node::Phrase(vp) if vp.category == PhraseCategory::Verb => Some(vp),
            _ => None,
        };

        let mut features = phrase.features.or(inherited);
        if let Some(vp) = verb_phrase {
            features = vp.features.or(&features);
        }
        let passive = features.is_passive();
        let form = features.form();

        // Passive promotes the direct objects to subject and demotes the
        // logical subject to a "by" agent.
        let vp_objects: &[Node] = verb_phrase
            .map(|vp| vp.objects.as_slice())
            .unwrap_or_default();
        let (subjects, agents): (Vec<&Node>, Vec<&Node>) = if passive {
            (
                phrase.objects.iter().chain(vp_objects.iter()).collect(),
                phrase.specifier.iter().collect(),
            )
        } else {
            (phrase.specifier.iter().collect(), Vec::new())
        };

        let (person, number) = self.agreement(&subjects);
        let mut verb_features = features.verbal();
        verb_features.person = features.person.or(Some(person));
        verb_features.number = features.number.or(Some(number));
        verb_features.interrogative = features.interrogative;

        if function != DiscourseFunction::Head {
            if let Some(complementiser) = &features.complementiser {
                out.leaves
                    .push(Leaf::text(DiscourseFunction::Complementiser, complementiser));
            }
        }

        self.slot(&phrase.pre_modifiers, DiscourseFunction::FrontModifier, &none, depth, out)?;

        let subject_start = out.leaves.len();
        if form != Form::Imperative {
            self.coordinate(&subjects, "and", DiscourseFunction::Subject, &none, depth, out)?;
        }

        let finite_at = match verb {
            Node::Phrase(vp) if vp.category == PhraseCategory::Verb => {
                self.verb_phrase(vp, &verb_features, passive, depth + 1, out)?
            }
            Node::Word(unit) if unit.category == LexicalCategory::Verb => {
                Some(self.verb_group(unit, &verb_features, &[], depth, out)?)
            }
            Node::Phrase(cp) if cp.category == PhraseCategory::Coordinated => {
                if !cp.has_head() {
                    return Err(RealizeError::MissingHead {
                        category: cp.category,
                    });
                }
                self.coordinated(cp, DiscourseFunction::Head, &verb_features, depth + 1, out)?
            }
            other => {
                self.node(other, DiscourseFunction::Head, &verb_features, depth, out)?;
                None
            }
        };
        self.slot(&phrase.head[1..], DiscourseFunction::Head, &none, depth, out)?;

        if features.is_interrogative() && form == Form::Normal {
            if let Some(at) = finite_at {
                out.leaves[subject_start..=at].rotate_right(1);
                if depth == 1 {
                    out.question = true;
                }
            }
        }

        self.slot(&phrase.indirect_objects, DiscourseFunction::IndirectObject, &none, depth, out)?;
        if !passive {
            self.slot(&phrase.objects, DiscourseFunction::Object, &none, depth, out)?;
        }
        if !agents.is_empty() {
            let by = self.function_word("by", LexicalCategory::Preposition, out);
            out.leaves.push(Leaf::form(DiscourseFunction::Complement, by));
            self.coordinate(&agents, "and", DiscourseFunction::Complement, &none, depth, out)?;
        }
        self.slot(&phrase.complements, DiscourseFunction::Complement, &none, depth, out)?;
        self.slot(&phrase.post_modifiers, DiscourseFunction::PostModifier, &none, depth, out)
    }

    /// Lays out a verb phrase and returns the index of its finite element,
    /// when the head is a verb the chain was built for.
    fn verb_phrase(
        &self,
        phrase: &PhraseNode,
        inherited: &FeatureSet,
        objects_moved: bool,
        depth: usize,
        out: &mut Resolved,
    ) -> Result<Option<usize>, RealizeError> {
        if !phrase.has_head() {
            return Err(RealizeError::MissingHead {
                category: phrase.category,
            });
        }
        let none = FeatureSet::default();
        let mut features = phrase.features.or(inherited);
        features.interrogative = inherited.interrogative;

        let finite_at = match &phrase.head[0] {
            Node::Word(unit) if unit.category == LexicalCategory::Verb => Some(self.verb_group(
                unit,
                &features,
                &phrase.pre_modifiers,
                depth,
                out,
            )?),
            other => {
                self.slot(&phrase.pre_modifiers, DiscourseFunction::PreModifier, &none, depth, out)?;
                self.node(other, DiscourseFunction::Head, &features.verbal(), depth, out)?;
                None
            }
        };
        self.slot(&phrase.head[1..], DiscourseFunction::Head, &none, depth, out)?;

        self.slot(&phrase.indirect_objects, DiscourseFunction::IndirectObject, &none, depth, out)?;
        if !objects_moved {
            self.slot(&phrase.objects, DiscourseFunction::Object, &none, depth, out)?;
        }
        self.slot(&phrase.complements, DiscourseFunction::Complement, &none, depth, out)?;
        self.slot(&phrase.post_modifiers, DiscourseFunction::PostModifier, &none, depth, out)?;
        Ok(finite_at)
    }

    /// Emits the auxiliary chain and main verb with the verb phrase's
    /// pre-modifiers placed after the first auxiliary (and "not"), or before
    /// the whole chain for infinitives.
    /// Returns the index of the first chain element.
    fn verb_group(
        &self,
        verb: &LexicalUnit,
        features: &FeatureSet,
        pre_modifiers: &[Node],
        depth: usize,
        out: &mut Resolved,
    ) -> Result<usize, RealizeError> {
        let none = FeatureSet::default();
        let features = self.normalise(features, out);
        let chain = self.verb_chain(verb, &features, out);

        // Infinitive pre-modifiers go in front of "to".
        let split = if features.form() == Form::Infinitive || chain.len() < 2 {
            0
        } else if chain[1].base() == "not" {
            2
        } else {
            1
        };

        let mut chain = chain.into_iter();
        let first_at = if split == 0 {
            self.slot(pre_modifiers, DiscourseFunction::PreModifier, &none, depth, out)?;
            out.leaves.len()
        } else {
            let at = out.leaves.len();
            out.leaves.extend(chain.by_ref().take(split));
            self.slot(pre_modifiers, DiscourseFunction::PreModifier, &none, depth, out)?;
            at
        };
        out.leaves.extend(chain);
        Ok(first_at)
    }

    /// Builds the verb chain inside-out: each aspect or voice wraps the
    /// current front element and pushes its own auxiliary in front.
    fn verb_chain(&self, verb: &LexicalUnit, features: &FeatureSet, out: &mut Resolved) -> Vec<Leaf> {
        let form = features.form();
        let negated = features.is_negated();
        let target = |form: Form| FeatureSet {
            form: Some(form),
            ..FeatureSet::default()
        };

        // Last element is the current front of the chain.
        let mut chain: Vec<(LexicalUnit, FeatureSet, DiscourseFunction)> =
            vec![(verb.clone(), FeatureSet::default(), DiscourseFunction::Head)];
        let set_front = |chain: &mut Vec<(LexicalUnit, FeatureSet, DiscourseFunction)>,
                         features: FeatureSet| {
            if let Some(front) = chain.last_mut() {
                front.1 = features;
            }
        };

        if features.is_passive() {
            set_front(&mut chain, target(Form::PastParticiple));
            chain.push((self.auxiliary("be"), FeatureSet::default(), DiscourseFunction::Auxiliary));
        }
        if features.is_progressive() {
            set_front(&mut chain, target(Form::PresentParticiple));
            chain.push((self.auxiliary("be"), FeatureSet::default(), DiscourseFunction::Auxiliary));
        }
        if features.is_perfect() {
            set_front(&mut chain, target(Form::PastParticiple));
            chain.push((self.auxiliary("have"), FeatureSet::default(), DiscourseFunction::Auxiliary));
        }

        let modal = if form.is_finite() {
            features
                .modal
                .clone()
                .or_else(|| (features.tense() == Tense::Future).then(|| "will".to_string()))
        } else {
            None
        };
        if let Some(modal) = &modal {
            set_front(&mut chain, target(Form::BareInfinitive));
            chain.push((
                self.auxiliary(modal),
                target(Form::BareInfinitive),
                DiscourseFunction::Auxiliary,
            ));
        }

        match form {
            Form::Normal => {
                if modal.is_none() {
                    let lexical = chain.len() == 1 && !is_be(&verb.base);
                    let finite = FeatureSet {
                        form: Some(Form::Normal),
                        tense: Some(features.tense()),
                        person: Some(features.person()),
                        number: Some(features.number()),
                        ..FeatureSet::default()
                    };
                    if lexical && (negated || features.is_interrogative()) {
                        set_front(&mut chain, target(Form::BareInfinitive));
                        chain.push((self.auxiliary("do"), finite, DiscourseFunction::Auxiliary));
                    } else {
                        set_front(&mut chain, finite);
                    }
                }
            }
            Form::Imperative => {
                set_front(&mut chain, target(Form::BareInfinitive));
                if negated {
                    chain.push((
                        self.auxiliary("do"),
                        target(Form::BareInfinitive),
                        DiscourseFunction::Auxiliary,
                    ));
                }
            }
            Form::Infinitive | Form::BareInfinitive => {
                set_front(&mut chain, target(Form::BareInfinitive))
            }
            Form::PresentParticiple | Form::Gerund => {
                set_front(&mut chain, target(Form::PresentParticiple))
            }
            Form::PastParticiple => set_front(&mut chain, target(Form::PastParticiple)),
        }

        let mut leaves: Vec<Leaf> = chain
            .iter()
            .rev()
            .map(|(unit, target, function)| Leaf::form(*function, self.request(unit, target, out)))
            .collect();

        let not = || {
            Leaf::form(
                DiscourseFunction::PreModifier,
                InflectedForm::new(
                    LexicalUnit::new("not", LexicalCategory::Adverb),
                    FeatureSet::default(),
                ),
            )
        };
        match form {
            Form::Normal | Form::Imperative => {
                if negated {
                    leaves.insert(leaves.len().min(1), not());
                }
            }
            Form::Infinitive => {
                leaves.insert(
                    0,
                    Leaf::form(
                        DiscourseFunction::Auxiliary,
                        InflectedForm::new(
                            LexicalUnit::new("to", LexicalCategory::Preposition),
                            FeatureSet::default(),
                        ),
                    ),
                );
                if negated {
                    leaves.insert(0, not());
                }
            }
            Form::BareInfinitive
            | Form::PresentParticiple
            | Form::Gerund
            | Form::PastParticiple => {
                if negated {
                    leaves.insert(0, not());
                }
            }
        }
        leaves
    }

    /// Resolves feature combinations that have no grammar rule by dropping
    /// the less specific feature, and reports each one as a warning.
    fn normalise(&self, features: &FeatureSet, out: &mut Resolved) -> FeatureSet {
        let mut features = features.clone();
        let form = features.form();

        if form == Form::Imperative {
            if features.is_perfect() || features.is_progressive() {
                self.unsupported(out, "imperative with perfect or progressive aspect; aspect dropped");
                features.perfect = None;
                features.progressive = None;
            }
            if matches!(features.tense, Some(Tense::Past | Tense::Future)) {
                self.unsupported(out, "imperative with past or future tense; tense dropped");
                features.tense = None;
            }
            if features.modal.is_some() {
                self.unsupported(out, "imperative with a modal; modal dropped");
                features.modal = None;
            }
        }
        if !form.is_finite() {
            if features.is_interrogative() {
                self.unsupported(out, "interrogative on a non-finite verb form; question dropped");
                features.interrogative = None;
            }
            if features.modal.is_some() {
                self.unsupported(out, "modal on a non-finite verb form; modal dropped");
                features.modal = None;
            }
        }
        if features.modal.is_some() && features.tense == Some(Tense::Future) {
            self.unsupported(out, "modal with future tense; future dropped");
            features.tense = None;
        }
        features
    }

    fn unsupported(&self, out: &mut Resolved, detail: &str) {
        let warning = RealizeError::UnsupportedFeatureCombination(detail.to_string());
        if !out.warnings.contains(&warning) {
            warn!(%warning, "using default feature resolution");
            out.warnings.push(warning);
        }
    }

    /// Person and number of the subject(s), for verb agreement.
    fn agreement(&self, subjects: &[&Node]) -> (Person, Number) {
        match subjects {
            [] => (Person::Third, Number::Singular),
            [single] => self.node_agreement(single),
            _ => (Person::Third, Number::Plural),
        }
    }

    fn node_agreement(&self, node: &Node) -> (Person, Number) {
        match node {
            Node::Word(unit) => {
                let features = self.word_features(unit);
                (features.person(), features.number())
            }
            Node::Inflected(form) => (form.features.person(), form.features.number()),
            Node::Phrase(phrase) => match phrase.category {
                PhraseCategory::Noun => {
                    let head_person = phrase.head.iter().find_map(|head| match head {
                        Node::Word(unit) => self.word_features(unit).person,
                        _ => None,
                    });
                    let person = phrase.features.person.or(head_person).unwrap_or_default();
                    (person, self.noun_phrase_number(phrase))
                }
                PhraseCategory::Coordinated => {
                    let conjunction = phrase.features.conjunction.as_deref().unwrap_or("and");
                    if phrase.head.len() > 1 && conjunction == "and" {
                        (Person::Third, Number::Plural)
                    } else {
                        phrase
                            .head
                            .last()
                            .map(|last| self.node_agreement(last))
                            .unwrap_or_default()
                    }
                }
                _ => (Person::Third, Number::Singular),
            },
            Node::Text(_) | Node::Document(_) => (Person::Third, Number::Singular),
        }
    }

    /// Word features layered over its lexicon defaults and, for personal
    /// pronouns, their built-in person and number.
    fn word_features(&self, unit: &LexicalUnit) -> FeatureSet {
        let defaults = self
            .lexicon
            .lookup(&unit.base, unit.category)
            .map(|entry| entry.features.clone())
            .unwrap_or_default();
        let features = unit.features.or(&defaults);
        if unit.category == LexicalCategory::Pronoun {
            features.or(&pronoun_features(&unit.base))
        } else {
            features
        }
    }

    /// Build an inflection request: `overrides → unit → lexicon defaults`,
    /// with lexicon irregulars copied onto the unit and the comparison
    /// strategy decided for graded adjectives and adverbs.
    fn request(
        &self,
        unit: &LexicalUnit,
        overrides: &FeatureSet,
        out: &mut Resolved,
    ) -> InflectedForm {
        let entry = self.lexicon.lookup(&unit.base, unit.category);
        let defaults = entry.map(|e| e.features.clone()).unwrap_or_default();
        let mut features = overrides.or(&unit.features).or(&defaults);

        let mut resolved = unit.clone();
        if resolved.irregular.is_none() {
            resolved.irregular = entry.map(|e| e.irregular.clone());
        }

        let graded = matches!(
            unit.category,
            LexicalCategory::Adjective | LexicalCategory::Adverb
        ) && (features.is_comparative() || features.is_superlative());
        let comparison = if graded {
            if features.is_comparative() && features.is_superlative() {
                self.unsupported(out, "comparative and superlative together; comparative dropped");
                features.comparative = None;
            }
            Some(comparison_strategy(
                &resolved,
                resolved.irregular.as_ref(),
                features.is_superlative(),
                &self.config.comparison,
            ))
        } else {
            None
        };

        InflectedForm {
            unit: resolved,
            features,
            comparison,
        }
    }

    fn function_word(&self, base: &str, category: LexicalCategory, out: &mut Resolved) -> InflectedForm {
        let unit = LexicalUnit::from_lexicon(self.lexicon, base, category);
        self.request(&unit, &FeatureSet::default(), out)
    }

    fn auxiliary(&self, base: &str) -> LexicalUnit {
        LexicalUnit::from_lexicon(self.lexicon, base, LexicalCategory::Verb)
    }
}

fn is_be(base: &str) -> bool {
    base.eq_ignore_ascii_case("be")
}

fn implies_plural(determiner: &str) -> bool {
    matches!(
        determiner.to_lowercase().as_str(),
        "these" | "those" | "both" | "many" | "several" | "few"
    )
}

fn plural_determiner(determiner: &str) -> Option<&'static str> {
    match determiner.to_lowercase().as_str() {
        "a" | "an" => Some("some"),
        "this" => Some("these"),
        "that" => Some("those"),
        _ => None,
    }
}

fn pronoun_features(base: &str) -> FeatureSet {
    let (person, number) = match base.to_lowercase().as_str() {
        "i" | "me" | "myself" => (Person::First, Number::Singular),
        "we" | "us" | "ourselves" => (Person::First, Number::Plural),
        "you" | "yourself" => (Person::Second, Number::Singular),
        "yourselves" => (Person::Second, Number::Plural),
        "they" | "them" | "themselves" => (Person::Third, Number::Plural),
        _ => (Person::Third, Number::Singular),
    };
    FeatureSet {
        person: Some(person),
        number: Some(number),
        ..FeatureSet::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::lexicon::MemoryLexicon;

    fn word(base: &str, category: LexicalCategory) -> Node {
        Node::word(base, category)
    }

    fn np(det: Option<&str>, noun: &str) -> PhraseNode {
        let mut phrase = PhraseNode::new(PhraseCategory::Noun);
        if let Some(det) = det {
            phrase.specifier.push(word(det, LexicalCategory::Determiner));
        }
        phrase.head.push(word(noun, LexicalCategory::Noun));
        phrase
    }

    fn clause(subject: Node, verb: &str, features: FeatureSet) -> PhraseNode {
        let mut phrase = PhraseNode::new(PhraseCategory::Clause);
        phrase.features = features;
        phrase.specifier.push(subject);
        phrase.head.push(word(verb, LexicalCategory::Verb));
        phrase
    }

    fn bases(resolved: &Resolved) -> Vec<&str> {
        resolved.leaves.iter().map(Leaf::base).collect()
    }

    fn resolve(node: &Node) -> Resolved {
        let lexicon = MemoryLexicon::new();
        let config = RealizerConfig::default();
        SyntaxProcessor::new(&lexicon, &config).resolve(node).unwrap()
    }

    #[test]
    fn noun_phrase_ordering() {
        let mut phrase = np(Some("the"), "park");
        let mut adj = PhraseNode::new(PhraseCategory::Adjective);
        adj.head.push(word("big", LexicalCategory::Adjective));
        phrase.pre_modifiers.push(adj.into());

        let resolved = resolve(&phrase.into());
        assert_eq!(bases(&resolved), vec!["the", "big", "park"]);
        assert_eq!(resolved.leaves[0].function, DiscourseFunction::Specifier);
        assert_eq!(resolved.leaves[1].function, DiscourseFunction::PreModifier);
        assert_eq!(resolved.leaves[2].function, DiscourseFunction::Head);
    }

    #[test]
    fn negated_present_uses_do_support() {
        let features = FeatureSet {
            negated: Some(true),
            ..FeatureSet::default()
        };
        let node = clause(np(None, "John").into(), "go", features).into();
        let resolved = resolve(&node);
        assert_eq!(bases(&resolved), vec!["John", "do", "not", "go"]);

        let LeafContent::Form(aux) = &resolved.leaves[1].content else {
            panic!("expected an inflection request");
        };
        assert_eq!(aux.features.tense, Some(Tense::Present));
        assert_eq!(aux.features.number, Some(Number::Singular));
        let LeafContent::Form(main) = &resolved.leaves[3].content else {
            panic!("expected an inflection request");
        };
        assert_eq!(main.features.form, Some(Form::BareInfinitive));
    }

    #[test]
    fn be_takes_negation_directly() {
        let features = FeatureSet {
            negated: Some(true),
            ..FeatureSet::default()
        };
        let resolved = resolve(&clause(np(None, "John").into(), "be", features).into());
        assert_eq!(bases(&resolved), vec!["John", "be", "not"]);
    }

    #[test]
    fn perfect_progressive_passive_chain() {
        let features = FeatureSet {
            perfect: Some(true),
            progressive: Some(true),
            passive: Some(true),
            modal: Some("may".to_string()),
            ..FeatureSet::default()
        };
        let mut phrase = clause(np(None, "John").into(), "watch", features);
        phrase.objects.push(np(Some("the"), "game").into());

        let resolved = resolve(&phrase.into());
        assert_eq!(
            bases(&resolved),
            vec!["the", "game", "may", "have", "be", "be", "watch", "by", "John"]
        );
        assert_eq!(resolved.leaves[1].function, DiscourseFunction::Subject);
        assert_eq!(resolved.leaves[7].function, DiscourseFunction::Complement);
    }

    #[test]
    fn future_inserts_will() {
        let features = FeatureSet {
            tense: Some(Tense::Future),
            ..FeatureSet::default()
        };
        let resolved = resolve(&clause(np(None, "John").into(), "go", features).into());
        assert_eq!(bases(&resolved), vec!["John", "will", "go"]);
    }

    #[test]
    fn interrogative_inverts_first_auxiliary() {
        let features = FeatureSet {
            tense: Some(Tense::Past),
            interrogative: Some(true),
            ..FeatureSet::default()
        };
        let resolved = resolve(&clause(np(None, "John").into(), "go", features).into());
        assert_eq!(bases(&resolved), vec!["do", "John", "go"]);
        assert!(resolved.question);
    }

    #[test]
    fn imperative_omits_subject() {
        let features = FeatureSet {
            form: Some(Form::Imperative),
            negated: Some(true),
            ..FeatureSet::default()
        };
        let resolved = resolve(&clause(word("you", LexicalCategory::Pronoun), "go", features).into());
        assert_eq!(bases(&resolved), vec!["do", "not", "go"]);
    }

    #[test]
    fn infinitive_negation_precedes_to() {
        let features = FeatureSet {
            form: Some(Form::Infinitive),
            negated: Some(true),
            ..FeatureSet::default()
        };
        let mut vp = PhraseNode::new(PhraseCategory::Verb);
        vp.features = features;
        vp.head.push(word("go", LexicalCategory::Verb));
        assert_eq!(bases(&resolve(&vp.into())), vec!["not", "to", "go"]);
    }

    #[test]
    fn infinitive_pre_modifiers_precede_to() {
        let mut vp = PhraseNode::new(PhraseCategory::Verb);
        vp.features.form = Some(Form::Infinitive);
        vp.head.push(word("go", LexicalCategory::Verb));
        vp.pre_modifiers.push(word("quickly", LexicalCategory::Adverb));
        assert_eq!(bases(&resolve(&vp.clone().into())), vec!["quickly", "to", "go"]);

        vp.features.negated = Some(true);
        assert_eq!(
            bases(&resolve(&vp.into())),
            vec!["quickly", "not", "to", "go"]
        );
    }

    #[test]
    fn verb_phrase_pre_modifiers_follow_first_auxiliary() {
        let mut vp = PhraseNode::new(PhraseCategory::Verb);
        vp.head.push(word("leave", LexicalCategory::Verb));
        vp.pre_modifiers.push(word("quickly", LexicalCategory::Adverb));

        let features = FeatureSet {
            perfect: Some(true),
            ..FeatureSet::default()
        };
        let mut phrase = PhraseNode::new(PhraseCategory::Clause);
        phrase.features = features;
        phrase.specifier.push(np(None, "John").into());
        phrase.head.push(vp.into());

        let resolved = resolve(&phrase.into());
        assert_eq!(bases(&resolved), vec!["John", "have", "quickly", "leave"]);
    }

    #[test]
    fn coordination_join_rule() {
        let mut two = PhraseNode::new(PhraseCategory::Coordinated);
        two.head = vec![np(None, "cats").into(), np(None, "dogs").into()];
        assert_eq!(bases(&resolve(&two.clone().into())), vec!["cats", "and", "dogs"]);

        let mut three = two;
        three.head.push(np(None, "birds").into());
        three.features.conjunction = Some("or".to_string());
        assert_eq!(
            bases(&resolve(&three.into())),
            vec!["cats", ",", "dogs", "or", "birds"]
        );
    }

    fn coordinated_verbs(subject: Node, features: FeatureSet) -> PhraseNode {
        let mut verbs = PhraseNode::new(PhraseCategory::Coordinated);
        verbs.head = vec![
            word("eat", LexicalCategory::Verb),
            word("run", LexicalCategory::Verb),
        ];
        let mut phrase = PhraseNode::new(PhraseCategory::Clause);
        phrase.features = features;
        phrase.specifier.push(subject);
        phrase.head.push(verbs.into());
        phrase
    }

    #[test]
    fn coordinated_verbs_inherit_verb_features() {
        let past = FeatureSet {
            tense: Some(Tense::Past),
            ..FeatureSet::default()
        };
        let resolved = resolve(&coordinated_verbs(np(None, "John").into(), past).into());
        assert_eq!(bases(&resolved), vec!["John", "eat", "and", "run"]);
        for at in [1, 3] {
            let LeafContent::Form(verb) = &resolved.leaves[at].content else {
                panic!("expected an inflection request");
            };
            assert_eq!(verb.features.tense, Some(Tense::Past));
        }

        let negated = FeatureSet {
            negated: Some(true),
            ..FeatureSet::default()
        };
        let they = word("they", LexicalCategory::Pronoun);
        let resolved = resolve(&coordinated_verbs(they, negated).into());
        assert_eq!(
            bases(&resolved),
            vec!["they", "do", "not", "eat", "and", "do", "not", "run"]
        );
        let LeafContent::Form(aux) = &resolved.leaves[5].content else {
            panic!("expected an inflection request");
        };
        assert_eq!(aux.features.number, Some(Number::Plural));
    }

    #[test]
    fn coordinated_verbs_invert_once() {
        let features = FeatureSet {
            tense: Some(Tense::Past),
            interrogative: Some(true),
            ..FeatureSet::default()
        };
        let resolved = resolve(&coordinated_verbs(np(None, "John").into(), features).into());
        assert_eq!(bases(&resolved), vec!["do", "John", "eat", "and", "run"]);
        assert_eq!(resolved.leaves[0].function, DiscourseFunction::Auxiliary);
        assert!(resolved.question);
    }

    #[test]
    fn clause_lays_out_every_head() {
        let past = FeatureSet {
            tense: Some(Tense::Past),
            ..FeatureSet::default()
        };
        let mut phrase = clause(np(None, "John").into(), "give", past);
        phrase.head.push(word("up", LexicalCategory::Preposition));
        assert_eq!(bases(&resolve(&phrase.into())), vec!["John", "give", "up"]);
    }

    #[test]
    fn coordinated_subject_is_plural() {
        let mut subject = PhraseNode::new(PhraseCategory::Coordinated);
        subject.head = vec![np(None, "John").into(), np(None, "Mary").into()];
        let resolved = resolve(&clause(subject.into(), "go", FeatureSet::default()).into());

        let LeafContent::Form(verb) = &resolved.leaves[3].content else {
            panic!("expected an inflection request");
        };
        assert_eq!(verb.features.number, Some(Number::Plural));
    }

    #[test]
    fn plural_noun_phrase_inflects_head_and_determiner() {
        let mut phrase = np(Some("this"), "London");
        phrase.features.number = Some(Number::Plural);
        phrase.features.proper = Some(true);

        let resolved = resolve(&phrase.into());
        assert_eq!(bases(&resolved), vec!["these", "London"]);
        let LeafContent::Form(head) = &resolved.leaves[1].content else {
            panic!("expected an inflection request");
        };
        assert_eq!(head.features.number, Some(Number::Plural));
    }

    #[test]
    fn plural_determiner_sets_number() {
        let resolved = resolve(&np(Some("those"), "dog").into());
        let LeafContent::Form(head) = &resolved.leaves[1].content else {
            panic!("expected an inflection request");
        };
        assert_eq!(head.features.number, Some(Number::Plural));
    }

    #[test]
    fn missing_head_is_reported() {
        let lexicon = MemoryLexicon::new();
        let config = RealizerConfig::default();
        let empty = PhraseNode::new(PhraseCategory::Noun);
        let result = SyntaxProcessor::new(&lexicon, &config).resolve(&empty.into());
        assert_eq!(
            result.unwrap_err(),
            RealizeError::MissingHead {
                category: PhraseCategory::Noun
            }
        );
    }

    #[test]
    fn nested_sentence_is_fatal() {
        let lexicon = MemoryLexicon::new();
        let config = RealizerConfig::default();
        let mut phrase = np(Some("the"), "park");
        phrase
            .post_modifiers
            .push(Node::sentence(vec![Node::text("oops")]));
        let err = SyntaxProcessor::new(&lexicon, &config)
            .resolve(&phrase.into())
            .unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn depth_limit() {
        let lexicon = MemoryLexicon::new();
        let config = RealizerConfig {
            max_depth: 4,
            ..RealizerConfig::default()
        };
        let mut node: Node = np(None, "park").into();
        for _ in 0..10 {
            let mut outer = np(None, "park");
            outer.post_modifiers.push(node);
            node = outer.into();
        }
        let err = SyntaxProcessor::new(&lexicon, &config)
            .resolve(&node)
            .unwrap_err();
        assert_eq!(err, RealizeError::DepthExceeded(4));
    }

    #[test]
    fn unsupported_combination_warns_once() {
        let features = FeatureSet {
            form: Some(Form::Imperative),
            perfect: Some(true),
            ..FeatureSet::default()
        };
        let resolved = resolve(&clause(word("you", LexicalCategory::Pronoun), "go", features).into());
        assert_eq!(bases(&resolved), vec!["go"]);
        assert_eq!(resolved.warnings.len(), 1);
    }

    #[test]
    fn embedded_clause_takes_complementiser() {
        let mut embedded = clause(np(None, "Mary").into(), "win", FeatureSet::default());
        embedded.features.complementiser = Some("that".to_string());
        let mut vp = PhraseNode::new(PhraseCategory::Verb);
        vp.head.push(word("say", LexicalCategory::Verb));
        vp.objects.push(embedded.into());
        let mut outer = PhraseNode::new(PhraseCategory::Clause);
        outer.specifier.push(np(None, "John").into());
        outer.head.push(vp.into());

        let resolved = resolve(&outer.into());
        assert_eq!(bases(&resolved), vec!["John", "say", "that", "Mary", "win"]);
    }
}
