/// Orthography: token joining, capitalization and terminal punctuation.

use crate::core::config::{RealizerConfig, TerminalPunctuation};

/// Attach to the preceding token without a space.
const CLOSING: &[char] = &['.', ',', ';', ':', '!', '?', ')', ']', '}', '”', '’', '%'];
/// The following token attaches without a space.
const OPENING: &[char] = &['(', '[', '{', '“', '‘'];
const TRAILING: &[char] = &['"', '\'', '”', '’', ')', ']'];
const TERMINAL: &[char] = &['.', '!', '?'];

fn closes(token: &str) -> bool {
    token.starts_with(CLOSING)
}

fn opens(token: &str) -> bool {
    token.ends_with(OPENING)
}

/// Join inflected tokens into text with single spaces, attaching
/// punctuation to its neighbour. Straight double quotes alternate between
/// opening and closing.
pub fn join_tokens(tokens: &[String]) -> String {
    let mut out = String::new();
    let mut glue_next = false;
    let mut quote_open = false;

    for token in tokens {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }

        let is_quote = token == "\"";
        let attach = glue_next || closes(token) || (is_quote && quote_open);
        if !out.is_empty() && !attach {
            out.push(' ');
        }
        out.push_str(token);

        glue_next = opens(token) || (is_quote && !quote_open);
        if is_quote {
            quote_open = !quote_open;
        }
    }
    out
}

/// Upper-case the first alphabetic character.
pub fn capitalize_first(text: &str) -> String {
    match text.char_indices().find(|(_, c)| c.is_alphabetic()) {
        Some((i, c)) => {
            let mut out = String::with_capacity(text.len());
            out.push_str(&text[..i]);
            out.extend(c.to_uppercase());
            out.push_str(&text[i + c.len_utf8()..]);
            out
        }
        None => text.to_string(),
    }
}

/// Separator placed before item `index` of a coordination of `count`.
pub fn coordination_separator(index: usize, count: usize, conjunction: &str) -> String {
    if index == 0 {
        String::new()
    } else if index + 1 == count {
        format!(" {conjunction} ")
    } else {
        ", ".to_string()
    }
}

/// "A", "A and B", "A, B and C".
pub fn join_coordinated(items: &[String], conjunction: &str) -> String {
    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        out.push_str(&coordination_separator(i, items.len(), conjunction));
        out.push_str(item);
    }
    out
}

fn has_terminal_mark(text: &str) -> bool {
    text.trim_end_matches(TRAILING).ends_with(TERMINAL)
}

pub struct Orthography<'a> {
    config: &'a RealizerConfig,
}

impl<'a> Orthography<'a> {
    pub fn new(config: &'a RealizerConfig) -> Self {
        Self { config }
    }

    /// Finish a sentence: join, capitalize and punctuate. Questions take
    /// "?"; other sentences take the configured mark unless they already end
    /// in one.
    pub fn sentence(&self, tokens: &[String], question: bool) -> String {
        let text = join_tokens(tokens);
        if text.is_empty() {
            return text;
        }
        let mut text = capitalize_first(&text);
        if !has_terminal_mark(&text) {
            let mark = if question {
                "?"
            } else {
                match &self.config.terminal_punctuation {
                    TerminalPunctuation::DefaultPeriod => ".",
                    TerminalPunctuation::Explicit(mark) => mark.as_str(),
                }
            };
            text.push_str(mark);
        }
        text
    }
}
