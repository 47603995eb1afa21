/// The realization pipeline: Node tree → text.
///
/// Wires together syntax resolution, morphology and orthography, and lays
/// out documents (sentences, paragraphs, sections, lists).

use std::fmt;
use std::ops::Range;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::config::{ConfigError, ListStyle, RealizerConfig};
use crate::core::morphology::Morphology;
use crate::core::orthography::{coordination_separator, join_tokens, Orthography};
use crate::core::syntax::SyntaxProcessor;
use crate::schema::element::{DocumentCategory, DocumentNode, Node, PhraseCategory};
use crate::schema::lexicon::{LexicalCategory, Lexicon, LexiconError, MemoryLexicon};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RealizeError {
    #[error("no lexicon entry for {base:?} ({category})")]
    LexiconMiss {
        base: String,
        category: LexicalCategory,
    },
    #[error("{category} has no head")]
    MissingHead { category: PhraseCategory },
    #[error("unsupported feature combination: {0}")]
    UnsupportedFeatureCombination(String),
    #[error("{0} cannot appear inside a sentence or paragraph")]
    MisplacedDocument(DocumentCategory),
    #[error("tree nesting exceeds the maximum depth of {0}")]
    DepthExceeded(usize),
}

impl RealizeError {
    /// Fatal errors abort the whole realization; the rest are confined to
    /// the sentence they occur in.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::MisplacedDocument(_) | Self::DepthExceeded(_) => true,
            Self::LexiconMiss { .. }
            | Self::MissingHead { .. }
            | Self::UnsupportedFeatureCombination(_) => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("lexicon error: {0}")]
    Lexicon(#[from] LexiconError),
    #[error("realization error: {0}")]
    Realize(#[from] RealizeError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// One sentence of the output, located by its byte span in the text.
#[derive(Debug, Clone, PartialEq)]
pub struct RealizedSentence {
    pub index: usize,
    pub span: Range<usize>,
    /// Set when the sentence failed and was realized as empty.
    pub error: Option<RealizeError>,
}

/// Result of realizing a document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RealizedText {
    pub text: String,
    pub sentences: Vec<RealizedSentence>,
    pub warnings: Vec<RealizeError>,
}

impl RealizedText {
    /// Structural errors of the sentences that failed.
    pub fn errors(&self) -> impl Iterator<Item = &RealizeError> {
        self.sentences.iter().filter_map(|s| s.error.as_ref())
    }

    pub fn sentence_text(&self, index: usize) -> Option<&str> {
        self.sentences
            .get(index)
            .and_then(|s| self.text.get(s.span.clone()))
    }
}

impl fmt::Display for RealizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Accumulates realized text while keeping sentence spans in step.
#[derive(Debug, Default)]
struct Writer {
    text: String,
    sentences: Vec<RealizedSentence>,
    warnings: Vec<RealizeError>,
}

impl Writer {
    fn plain(text: String) -> Self {
        Self {
            text,
            ..Self::default()
        }
    }

    fn sentence(text: String, warnings: Vec<RealizeError>) -> Self {
        let span = 0..text.len();
        Self {
            text,
            sentences: vec![RealizedSentence {
                index: 0,
                span,
                error: None,
            }],
            warnings,
        }
    }

    fn failed(error: RealizeError) -> Self {
        Self {
            text: String::new(),
            sentences: vec![RealizedSentence {
                index: 0,
                span: 0..0,
                error: Some(error),
            }],
            warnings: Vec::new(),
        }
    }

    /// Append `other`, with `separator` between them when both sides have
    /// text.
    fn append(&mut self, separator: &str, other: Writer) {
        if !self.text.is_empty() && !other.text.is_empty() {
            self.text.push_str(separator);
        }
        let offset = self.text.len();
        let first_index = self.sentences.len();
        self.text.push_str(&other.text);
        self.sentences
            .extend(other.sentences.into_iter().enumerate().map(|(i, s)| {
                RealizedSentence {
                    index: first_index + i,
                    span: s.span.start + offset..s.span.end + offset,
                    error: s.error,
                }
            }));
        for warning in other.warnings {
            if !self.warnings.contains(&warning) {
                self.warnings.push(warning);
            }
        }
    }

    fn finish(self) -> RealizedText {
        RealizedText {
            text: self.text,
            sentences: self.sentences,
            warnings: self.warnings,
        }
    }
}

/// The surface realizer. Built via `Realizer::builder()` or `Realizer::new`.
///
/// Holds only a shared lexicon reference and its configuration, so one
/// realizer can serve any number of trees, from any number of threads.
pub struct Realizer<'l> {
    lexicon: &'l dyn Lexicon,
    config: RealizerConfig,
}

/// Builder for constructing a `Realizer`.
pub struct RealizerBuilder<'l> {
    lexicon: &'l dyn Lexicon,
    config: Option<RealizerConfig>,
    config_path: Option<String>,
}

impl<'l> Realizer<'l> {
    pub fn new(lexicon: &'l dyn Lexicon, config: RealizerConfig) -> Self {
        Self { lexicon, config }
    }

    pub fn builder(lexicon: &'l dyn Lexicon) -> RealizerBuilder<'l> {
        RealizerBuilder {
            lexicon,
            config: None,
            config_path: None,
        }
    }

    pub fn config(&self) -> &RealizerConfig {
        &self.config
    }

    /// Realize a tree. Document nodes are laid out per their category; any
    /// other node is realized as a one-sentence document.
    ///
    /// A sentence with a structural problem is realized as empty and its
    /// error recorded in `RealizedText::sentences`; its siblings are still
    /// realized. Misplaced documents and over-deep trees return `Err`.
    pub fn realize(&self, node: &Node) -> Result<RealizedText, RealizeError> {
        let writer = match node {
            Node::Document(doc) => self.document(doc, 0)?,
            other => self.sentence(std::slice::from_ref(other))?,
        };
        Ok(writer.finish())
    }

    /// Realize a phrase or word without sentence orthography: no
    /// capitalization and no terminal punctuation.
    pub fn realize_fragment(&self, node: &Node) -> Result<String, RealizeError> {
        let resolved = SyntaxProcessor::new(self.lexicon, &self.config).resolve(node)?;
        let tokens = Morphology::new(self.lexicon, &self.config.comparison)
            .inflect_all(&resolved.leaves);
        Ok(join_tokens(&tokens))
    }

    fn document(&self, doc: &DocumentNode, depth: usize) -> Result<Writer, RealizeError> {
        if depth > self.config.max_depth {
            return Err(RealizeError::DepthExceeded(self.config.max_depth));
        }

        match doc.category {
            DocumentCategory::Sentence => self.sentence(&doc.children),
            DocumentCategory::Paragraph => {
                let mut out = Writer::default();
                for child in &doc.children {
                    let part = match child {
                        Node::Document(inner)
                            if matches!(
                                inner.category,
                                DocumentCategory::Paragraph | DocumentCategory::Section
                            ) =>
                        {
                            return Err(RealizeError::MisplacedDocument(inner.category));
                        }
                        Node::Document(inner) => self.document(inner, depth + 1)?,
                        other => self.sentence(std::slice::from_ref(other))?,
                    };
                    out.append(self.config.sentence_join.separator(), part);
                }
                Ok(out)
            }
            DocumentCategory::Section => {
                let mut body = Writer::default();
                for child in &doc.children {
                    let part = match child {
                        Node::Document(inner) => self.document(inner, depth + 1)?,
                        other => self.sentence(std::slice::from_ref(other))?,
                    };
                    body.append("\n\n", part);
                }
                let mut out = doc
                    .title
                    .as_ref()
                    .map(|title| Writer::plain(title.clone()))
                    .unwrap_or_default();
                out.append("\n", body);
                Ok(out)
            }
            DocumentCategory::List => {
                let count = doc.children.len();
                let mut out = Writer::default();
                for (i, child) in doc.children.iter().enumerate() {
                    let item = self.inline(child, depth)?;
                    match self.config.list_style {
                        ListStyle::Prose => {
                            out.append(&coordination_separator(i, count, "and"), item)
                        }
                        ListStyle::Lines => {
                            let mut line = Writer::plain("* ".to_string());
                            line.append("", item);
                            out.append("\n", line);
                        }
                    }
                }
                Ok(out)
            }
            DocumentCategory::RawText => {
                let mut out = Writer::default();
                for child in &doc.children {
                    out.append(" ", self.inline(child, depth)?);
                }
                Ok(out)
            }
        }
    }

    /// List items and raw text parts: nested documents keep their own
    /// layout, anything else is a fragment.
    fn inline(&self, node: &Node, depth: usize) -> Result<Writer, RealizeError> {
        match node {
            Node::Document(inner) => self.document(inner, depth + 1),
            other => match self.realize_fragment(other) {
                Ok(text) => Ok(Writer::plain(text)),
                Err(err) if err.is_fatal() => Err(err),
                Err(err) => {
                    warn!(error = %err, "list item realized as empty");
                    Ok(Writer::failed(err))
                }
            },
        }
    }

    /// Realize the children of one sentence. A non-fatal error empties the
    /// sentence but does not propagate.
    fn sentence(&self, children: &[Node]) -> Result<Writer, RealizeError> {
        let syntax = SyntaxProcessor::new(self.lexicon, &self.config);
        let mut leaves = Vec::new();
        let mut warnings = Vec::new();
        let mut question = false;

        for child in children {
            match syntax.resolve(child) {
                Ok(resolved) => {
                    leaves.extend(resolved.leaves);
                    warnings.extend(resolved.warnings);
                    question |= resolved.question;
                }
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    warn!(error = %err, "sentence realized as empty");
                    return Ok(Writer::failed(err));
                }
            }
        }
        debug!(leaves = leaves.len(), question, "resolved sentence");

        let tokens = Morphology::new(self.lexicon, &self.config.comparison).inflect_all(&leaves);
        let text = Orthography::new(&self.config).sentence(&tokens, question);
        Ok(Writer::sentence(text, warnings))
    }
}

impl<'l> RealizerBuilder<'l> {
    /// Provide a configuration directly (for testing without files).
    pub fn config(mut self, config: RealizerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Load the configuration from a RON file. Takes precedence over
    /// `config`.
    pub fn config_path(mut self, path: &str) -> Self {
        self.config_path = Some(path.to_string());
        self
    }

    pub fn build(self) -> Result<Realizer<'l>, PipelineError> {
        let config = match self.config_path {
            Some(ref path) => RealizerConfig::load_from_ron(Path::new(path))?,
            None => self.config.unwrap_or_default(),
        };
        Ok(Realizer {
            lexicon: self.lexicon,
            config,
        })
    }
}

/// Load every .ron lexicon file in a directory into one lexicon. Later
/// files (in directory order) override earlier entries.
pub fn load_lexicon_dir(dir: &str) -> Result<MemoryLexicon, PipelineError> {
    let mut lexicon = MemoryLexicon::new();
    load_ron_files_from_dir(dir, |path| {
        lexicon.merge(MemoryLexicon::load_from_ron(path)?);
        Ok(())
    })?;
    Ok(lexicon)
}

/// Load all .ron files from a directory, calling `loader` for each.
fn load_ron_files_from_dir<F>(dir: &str, mut loader: F) -> Result<(), PipelineError>
where
    F: FnMut(&Path) -> Result<(), PipelineError>,
{
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|s| s.to_str()) == Some("ron") {
            paths.push(path);
        }
    }
    paths.sort();
    for path in &paths {
        loader(path)?;
    }
    Ok(())
}
