/// Lexicon port: word lookups by base form and category.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

use super::features::FeatureSet;

#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Closed set of word classes the engine knows how to order and inflect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LexicalCategory {
    Noun,
    Verb,
    Adjective,
    Adverb,
    Preposition,
    Determiner,
    Pronoun,
    Conjunction,
    Complementiser,
}

impl LexicalCategory {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Noun => "noun",
            Self::Verb => "verb",
            Self::Adjective => "adjective",
            Self::Adverb => "adverb",
            Self::Preposition => "preposition",
            Self::Determiner => "determiner",
            Self::Pronoun => "pronoun",
            Self::Conjunction => "conjunction",
            Self::Complementiser => "complementiser",
        }
    }
}

impl fmt::Display for LexicalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The inflections a lexicon may override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InflectionKind {
    Plural,
    Past,
    PastParticiple,
    PresentParticiple,
    ThirdSingular,
    Comparative,
    Superlative,
}

/// Irregular inflections known for a word. Any subset may be absent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IrregularForms {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plural: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub past: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub past_participle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub present_participle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub third_singular: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparative: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub superlative: Option<String>,
}

impl IrregularForms {
    pub fn get(&self, kind: InflectionKind) -> Option<&str> {
        let form = match kind {
            InflectionKind::Plural => &self.plural,
            InflectionKind::Past => &self.past,
            InflectionKind::PastParticiple => &self.past_participle,
            InflectionKind::PresentParticiple => &self.present_participle,
            InflectionKind::ThirdSingular => &self.third_singular,
            InflectionKind::Comparative => &self.comparative,
            InflectionKind::Superlative => &self.superlative,
        };
        form.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        *self == IrregularForms::default()
    }
}

/// A lexicon record: base form, category, default features and irregulars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexicalEntry {
    pub base: String,
    pub category: LexicalCategory,
    #[serde(default)]
    pub features: FeatureSet,
    #[serde(default)]
    pub irregular: IrregularForms,
}

impl LexicalEntry {
    pub fn new(base: &str, category: LexicalCategory) -> Self {
        Self {
            base: base.to_string(),
            category,
            features: FeatureSet::default(),
            irregular: IrregularForms::default(),
        }
    }

    pub fn with_irregular(mut self, irregular: IrregularForms) -> Self {
        self.irregular = irregular;
        self
    }

    pub fn with_features(mut self, features: FeatureSet) -> Self {
        self.features = features;
        self
    }
}

/// Read-only word lookups consumed by the realizer.
///
/// Implementations must not mutate state on lookup so that one lexicon can
/// back realizations running on several threads.
pub trait Lexicon: Send + Sync {
    fn lookup(&self, base: &str, category: LexicalCategory) -> Option<&LexicalEntry>;
}

/// A lexicon held entirely in memory, keyed by base form.
#[derive(Debug, Clone, Default)]
pub struct MemoryLexicon {
    entries: FxHashMap<String, Vec<LexicalEntry>>,
}

impl MemoryLexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, replacing any existing entry with the same base
    /// form and category.
    pub fn insert(&mut self, entry: LexicalEntry) {
        let slot = self.entries.entry(entry.base.clone()).or_default();
        slot.retain(|e| e.category != entry.category);
        slot.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load entries from a RON file containing a list of `LexicalEntry`.
    pub fn load_from_ron(path: &Path) -> Result<MemoryLexicon, LexiconError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse entries from a RON string.
    pub fn parse_ron(input: &str) -> Result<MemoryLexicon, LexiconError> {
        let raw: Vec<LexicalEntry> = ron::from_str(input)?;
        let mut lexicon = MemoryLexicon::new();
        for entry in raw {
            lexicon.insert(entry);
        }
        Ok(lexicon)
    }

    /// Merge another lexicon into this one. Entries from `other` win.
    pub fn merge(&mut self, other: MemoryLexicon) {
        for entry in other.entries.into_values().flatten() {
            self.insert(entry);
        }
    }
}

impl Lexicon for MemoryLexicon {
    fn lookup(&self, base: &str, category: LexicalCategory) -> Option<&LexicalEntry> {
        self.entries
            .get(base)
            .and_then(|entries| entries.iter().find(|e| e.category == category))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::features::Number;

    const LEXICON_RON: &str = r#"[
        (
            base: "child",
            category: Noun,
            irregular: (plural: Some("children")),
        ),
        (
            base: "go",
            category: Verb,
            irregular: (past: Some("went"), past_participle: Some("gone")),
        ),
        (
            base: "they",
            category: Pronoun,
            features: (number: Some(Plural)),
        ),
    ]"#;

    #[test]
    fn parse_entries_from_ron() {
        let lexicon = MemoryLexicon::parse_ron(LEXICON_RON).unwrap();
        assert_eq!(lexicon.len(), 3);

        let child = lexicon.lookup("child", LexicalCategory::Noun).unwrap();
        assert_eq!(child.irregular.get(InflectionKind::Plural), Some("children"));
        assert_eq!(child.irregular.get(InflectionKind::Past), None);

        let they = lexicon.lookup("they", LexicalCategory::Pronoun).unwrap();
        assert_eq!(they.features.number, Some(Number::Plural));
    }

    #[test]
    fn lookup_respects_category() {
        let lexicon = MemoryLexicon::parse_ron(LEXICON_RON).unwrap();
        assert!(lexicon.lookup("go", LexicalCategory::Verb).is_some());
        assert!(lexicon.lookup("go", LexicalCategory::Noun).is_none());
        assert!(lexicon.lookup("missing", LexicalCategory::Verb).is_none());
    }

    #[test]
    fn insert_replaces_same_category() {
        let mut lexicon = MemoryLexicon::new();
        lexicon.insert(LexicalEntry::new("run", LexicalCategory::Verb));
        lexicon.insert(LexicalEntry::new("run", LexicalCategory::Noun));
        lexicon.insert(
            LexicalEntry::new("run", LexicalCategory::Verb).with_irregular(IrregularForms {
                past: Some("ran".to_string()),
                ..IrregularForms::default()
            }),
        );

        assert_eq!(lexicon.len(), 2);
        let verb = lexicon.lookup("run", LexicalCategory::Verb).unwrap();
        assert_eq!(verb.irregular.get(InflectionKind::Past), Some("ran"));
    }

    #[test]
    fn merge_precedence() {
        let mut base = MemoryLexicon::new();
        base.insert(LexicalEntry::new("ox", LexicalCategory::Noun));
        base.insert(LexicalEntry::new("cat", LexicalCategory::Noun));

        let mut other = MemoryLexicon::new();
        other.insert(
            LexicalEntry::new("ox", LexicalCategory::Noun).with_irregular(IrregularForms {
                plural: Some("oxen".to_string()),
                ..IrregularForms::default()
            }),
        );

        base.merge(other);
        let ox = base.lookup("ox", LexicalCategory::Noun).unwrap();
        assert_eq!(ox.irregular.get(InflectionKind::Plural), Some("oxen"));
        assert!(base.lookup("cat", LexicalCategory::Noun).is_some());
    }

    #[test]
    fn ron_round_trip() {
        let entry = LexicalEntry::new("good", LexicalCategory::Adjective).with_irregular(
            IrregularForms {
                comparative: Some("better".to_string()),
                superlative: Some("best".to_string()),
                ..IrregularForms::default()
            },
        );
        let serialized = ron::to_string(&vec![entry.clone()]).unwrap();
        let lexicon = MemoryLexicon::parse_ron(&serialized).unwrap();
        assert_eq!(
            lexicon.lookup("good", LexicalCategory::Adjective),
            Some(&entry)
        );
    }
}
