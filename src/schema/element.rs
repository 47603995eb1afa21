use serde::{Deserialize, Serialize};
use std::fmt;

use super::features::FeatureSet;
use super::lexicon::{IrregularForms, LexicalCategory, Lexicon};

/// A word as placed in a tree, before inflection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexicalUnit {
    pub base: String,
    pub category: LexicalCategory,
    #[serde(default)]
    pub features: FeatureSet,
    /// Irregular forms copied from the lexicon when the unit was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub irregular: Option<IrregularForms>,
}

impl LexicalUnit {
    pub fn new(base: &str, category: LexicalCategory) -> Self {
        Self {
            base: base.to_string(),
            category,
            features: FeatureSet::default(),
            irregular: None,
        }
    }

    /// Create a unit, copying default features and irregular forms from the
    /// lexicon entry when one exists.
    pub fn from_lexicon(lexicon: &dyn Lexicon, base: &str, category: LexicalCategory) -> Self {
        match lexicon.lookup(base, category) {
            Some(entry) => Self {
                base: entry.base.clone(),
                category,
                features: entry.features.clone(),
                irregular: Some(entry.irregular.clone()),
            },
            None => Self::new(base, category),
        }
    }

    pub fn with_features(mut self, features: FeatureSet) -> Self {
        self.features = features;
        self
    }
}

/// How a comparative or superlative is to be formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonStrategy {
    /// Use the lexicon's irregular form ("better").
    Irregular,
    /// Add "-er"/"-est" ("bigger").
    Suffix,
    /// Prefix "more"/"most" ("more beautiful").
    Periphrastic,
}

/// A word with its resolved target features, ready for morphology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InflectedForm {
    pub unit: LexicalUnit,
    #[serde(default)]
    pub features: FeatureSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison: Option<ComparisonStrategy>,
}

impl InflectedForm {
    pub fn new(unit: LexicalUnit, features: FeatureSet) -> Self {
        Self {
            unit,
            features,
            comparison: None,
        }
    }
}

/// Phrase categories, each with its own constituent ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhraseCategory {
    Noun,
    Verb,
    Preposition,
    Adjective,
    Adverb,
    Clause,
    Coordinated,
}

impl fmt::Display for PhraseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Noun => "noun phrase",
            Self::Verb => "verb phrase",
            Self::Preposition => "prepositional phrase",
            Self::Adjective => "adjective phrase",
            Self::Adverb => "adverb phrase",
            Self::Clause => "clause",
            Self::Coordinated => "coordinated phrase",
        };
        f.write_str(name)
    }
}

/// A phrase with named constituent slots.
///
/// For a clause, `specifier` holds the subjects, `pre_modifiers` the front
/// modifiers and `head` the verb phrase. For a coordinated phrase, `head`
/// holds the coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhraseNode {
    pub category: PhraseCategory,
    #[serde(default)]
    pub features: FeatureSet,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub specifier: Vec<Node>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pre_modifiers: Vec<Node>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub head: Vec<Node>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indirect_objects: Vec<Node>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub objects: Vec<Node>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub complements: Vec<Node>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub post_modifiers: Vec<Node>,
}

impl PhraseNode {
    pub fn new(category: PhraseCategory) -> Self {
        Self {
            category,
            features: FeatureSet::default(),
            specifier: Vec::new(),
            pre_modifiers: Vec::new(),
            head: Vec::new(),
            indirect_objects: Vec::new(),
            objects: Vec::new(),
            complements: Vec::new(),
            post_modifiers: Vec::new(),
        }
    }

    /// Every category except `Coordinated` needs exactly one head; a
    /// coordinated phrase needs at least one coordinate.
    pub fn has_head(&self) -> bool {
        !self.head.is_empty()
    }
}

/// Document structure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentCategory {
    Sentence,
    Paragraph,
    Section,
    List,
    RawText,
}

impl fmt::Display for DocumentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sentence => "sentence",
            Self::Paragraph => "paragraph",
            Self::Section => "section",
            Self::List => "list",
            Self::RawText => "raw text",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentNode {
    pub category: DocumentCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub children: Vec<Node>,
}

impl DocumentNode {
    pub fn new(category: DocumentCategory, children: Vec<Node>) -> Self {
        Self {
            category,
            title: None,
            children,
        }
    }
}

/// A node of the input tree. The tree is owned top-down and is never
/// modified by realization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Word(LexicalUnit),
    Inflected(InflectedForm),
    Text(String),
    Phrase(PhraseNode),
    Document(DocumentNode),
}

impl Node {
    pub fn word(base: &str, category: LexicalCategory) -> Node {
        Node::Word(LexicalUnit::new(base, category))
    }

    pub fn text(text: &str) -> Node {
        Node::Text(text.to_string())
    }

    pub fn sentence(children: Vec<Node>) -> Node {
        Node::Document(DocumentNode::new(DocumentCategory::Sentence, children))
    }

    pub fn paragraph(children: Vec<Node>) -> Node {
        Node::Document(DocumentNode::new(DocumentCategory::Paragraph, children))
    }

    pub fn as_phrase(&self) -> Option<&PhraseNode> {
        match self {
            Node::Phrase(p) => Some(p),
            _ => None,
        }
    }
}

impl From<PhraseNode> for Node {
    fn from(phrase: PhraseNode) -> Self {
        Node::Phrase(phrase)
    }
}

impl From<LexicalUnit> for Node {
    fn from(unit: LexicalUnit) -> Self {
        Node::Word(unit)
    }
}

impl From<DocumentNode> for Node {
    fn from(doc: DocumentNode) -> Self {
        Node::Document(doc)
    }
}
