/// Realizer configuration: orthography options and the comparison heuristic.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::schema::lexicon::LexicalCategory;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Separator placed between sentences of a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SentenceJoin {
    #[default]
    Space,
    Newline,
}

impl SentenceJoin {
    pub fn separator(&self) -> &'static str {
        match self {
            Self::Space => " ",
            Self::Newline => "\n",
        }
    }
}

/// How list documents are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ListStyle {
    /// "A, B and C"
    #[default]
    Prose,
    /// One "* item" per line.
    Lines,
}

/// Punctuation appended to sentences that do not already end in one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TerminalPunctuation {
    #[default]
    DefaultPeriod,
    Explicit(String),
}

/// Chooses between "-er/-est" and "more/most" for regular adjectives and
/// adverbs.
///
/// A word takes the suffix when it is listed in `suffix_words`, or when it
/// has at most `max_suffix_syllables` syllables, or exactly one more than
/// that and ends in one of `suffix_endings`. Words in `periphrastic_words`
/// and adverbs ending in "-ly" always take "more/most".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonRule {
    pub max_suffix_syllables: usize,
    pub suffix_endings: Vec<String>,
    pub suffix_words: Vec<String>,
    pub periphrastic_words: Vec<String>,
}

impl Default for ComparisonRule {
    fn default() -> Self {
        Self {
            max_suffix_syllables: 1,
            suffix_endings: ["y", "le", "er", "ow"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            suffix_words: Vec::new(),
            periphrastic_words: Vec::new(),
        }
    }
}

impl ComparisonRule {
    pub fn takes_suffix(&self, base: &str, category: LexicalCategory) -> bool {
        let word = base.to_lowercase();
        if self.periphrastic_words.iter().any(|w| *w == word) {
            return false;
        }
        if self.suffix_words.iter().any(|w| *w == word) {
            return true;
        }
        if category == LexicalCategory::Adverb && word.ends_with("ly") {
            return false;
        }

        let syllables = count_syllables(&word);
        syllables <= self.max_suffix_syllables
            || (syllables == self.max_suffix_syllables + 1
                && self.suffix_endings.iter().any(|e| word.ends_with(e.as_str())))
    }
}

/// Approximate syllable count: vowel groups, minus a silent final "e".
pub fn count_syllables(word: &str) -> usize {
    let chars: Vec<char> = word.to_lowercase().chars().collect();
    let mut groups = 0;
    let mut in_vowel = false;
    for (i, &c) in chars.iter().enumerate() {
        let vowel = matches!(c, 'a' | 'e' | 'i' | 'o' | 'u') || (c == 'y' && i > 0);
        if vowel && !in_vowel {
            groups += 1;
        }
        in_vowel = vowel;
    }

    let silent_e = chars.len() > 2
        && chars[chars.len() - 1] == 'e'
        && !(chars[chars.len() - 2] == 'l' && !is_vowel_char(chars[chars.len() - 3]))
        && !is_vowel_char(chars[chars.len() - 2]);
    if silent_e && groups > 1 {
        groups -= 1;
    }
    groups.max(1)
}

fn is_vowel_char(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

/// Options recognized by the realizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RealizerConfig {
    pub sentence_join: SentenceJoin,
    pub list_style: ListStyle,
    pub terminal_punctuation: TerminalPunctuation,
    pub comparison: ComparisonRule,
    /// Maximum nesting depth of the input tree.
    pub max_depth: usize,
}

impl Default for RealizerConfig {
    fn default() -> Self {
        Self {
            sentence_join: SentenceJoin::default(),
            list_style: ListStyle::default(),
            terminal_punctuation: TerminalPunctuation::default(),
            comparison: ComparisonRule::default(),
            max_depth: 64,
        }
    }
}

impl RealizerConfig {
    /// Load a configuration from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<RealizerConfig, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a configuration from a RON string. Omitted fields keep their
    /// defaults.
    pub fn parse_ron(input: &str) -> Result<RealizerConfig, ConfigError> {
        Ok(ron::from_str(input)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syllable_counts() {
        assert_eq!(count_syllables("big"), 1);
        assert_eq!(count_syllables("large"), 1);
        assert_eq!(count_syllables("happy"), 2);
        assert_eq!(count_syllables("simple"), 2);
        assert_eq!(count_syllables("modern"), 2);
        assert_eq!(count_syllables("beautiful"), 3);
        assert_eq!(count_syllables("a"), 1);
    }

    #[test]
    fn default_rule_choices() {
        let rule = ComparisonRule::default();
        assert!(rule.takes_suffix("big", LexicalCategory::Adjective));
        assert!(rule.takes_suffix("happy", LexicalCategory::Adjective));
        assert!(rule.takes_suffix("simple", LexicalCategory::Adjective));
        assert!(!rule.takes_suffix("modern", LexicalCategory::Adjective));
        assert!(!rule.takes_suffix("beautiful", LexicalCategory::Adjective));
        assert!(rule.takes_suffix("fast", LexicalCategory::Adverb));
        assert!(!rule.takes_suffix("quickly", LexicalCategory::Adverb));
    }

    #[test]
    fn exception_lists_win() {
        let rule = ComparisonRule {
            suffix_words: vec!["modern".to_string()],
            periphrastic_words: vec!["big".to_string()],
            ..ComparisonRule::default()
        };
        assert!(rule.takes_suffix("modern", LexicalCategory::Adjective));
        assert!(!rule.takes_suffix("big", LexicalCategory::Adjective));
    }

    #[test]
    fn wider_syllable_limit() {
        let rule = ComparisonRule {
            max_suffix_syllables: 2,
            ..ComparisonRule::default()
        };
        assert!(rule.takes_suffix("modern", LexicalCategory::Adjective));
        assert!(!rule.takes_suffix("beautiful", LexicalCategory::Adjective));
    }

    #[test]
    fn parse_partial_config() {
        let config =
            RealizerConfig::parse_ron("(sentence_join: Newline, list_style: Lines)").unwrap();
        assert_eq!(config.sentence_join, SentenceJoin::Newline);
        assert_eq!(config.list_style, ListStyle::Lines);
        assert_eq!(config.terminal_punctuation, TerminalPunctuation::DefaultPeriod);
        assert_eq!(config.max_depth, 64);
    }

    #[test]
    fn parse_explicit_punctuation() {
        let config =
            RealizerConfig::parse_ron(r#"(terminal_punctuation: Explicit("!"))"#).unwrap();
        assert_eq!(
            config.terminal_punctuation,
            TerminalPunctuation::Explicit("!".to_string())
        );
    }

    #[test]
    fn ron_round_trip() {
        let config = RealizerConfig {
            sentence_join: SentenceJoin::Newline,
            comparison: ComparisonRule {
                max_suffix_syllables: 2,
                ..ComparisonRule::default()
            },
            ..RealizerConfig::default()
        };
        let serialized = ron::to_string(&config).unwrap();
        assert_eq!(RealizerConfig::parse_ron(&serialized).unwrap(), config);
    }
}
