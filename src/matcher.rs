//! Color token extraction and matching against the variable table.
use std::ops::Range;

use regex::Regex;

use crate::color::Rgba;
use crate::variables::{VariableEntry, VariableTable};

/// Candidate spans inside a declaration value, leftmost alternative first.
///
/// Strings, `url()` bodies, comments and variable references are matched so
/// they can be skipped as a whole; only the last three alternatives can be colors.
const VALUE_TOKENS: &str = r#"(?x)
    "(?:[^"\\]|\\.)*"
  | '(?:[^'\\]|\\.)*'
  | (?i:url)\([^)]*\)
  | /\*(?s:.*?)\*/
  | //[^\n]*
  | [@$]\{?[\w-]+\}?
  | (?P<function>(?i:\b(?:rgba?|hsla?))\([^()]*\))
  | (?P<hex>\#[0-9A-Fa-f]+\b)
  | (?P<word>[A-Za-z_][\w-]*)
"#;

/// A color literal found in a declaration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorToken {
    /// Canonical value of the literal.
    pub color: Rgba,
    /// Byte range of the literal in the source.
    pub range: Range<usize>,
    /// The literal exactly as written.
    pub text: String,
}

/// Compiled tokenizer for declaration values. Build once per file.
pub struct ValueTokenizer {
    /// Whether bare CSS color names count as colors.
    named_colors: bool,
    /// The [`VALUE_TOKENS`] pattern.
    pattern: Regex,
}

/// A piece of a declaration value: either a color literal or anything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSpan {
    /// A recognized color literal.
    Color(ColorToken),
    /// Non-color text, including whitespace and already-converted references.
    Text(Range<usize>),
}

impl ValueTokenizer {
    /// Compile the tokenizer.
    ///
    /// # Panics
    ///
    /// Panics if the hardcoded token regex is invalid (compile-time invariant).
    pub fn new(named_colors: bool) -> Self {
        return Self {
            named_colors,
            pattern: Regex::new(VALUE_TOKENS).expect("valid regex"),
        };
    }

    /// Split a value that starts at byte `offset` of the source into color and
    /// text spans. The spans cover the value in order with no gaps.
    ///
    /// Color-shaped text that does not parse (`#12`, `rgb(@r, 0, 0)`) is text.
    pub fn spans(&self, value: &str, offset: usize) -> Vec<ValueSpan> {
        let mut spans = Vec::new();
        let mut cursor = 0_usize;
        for captures in self.pattern.captures_iter(value) {
            let Some(whole) = captures.get(0) else {
                continue;
            };
            let color = if let Some(m) = captures.name("function") {
                Rgba::from_function(m.as_str())
            } else if let Some(m) = captures.name("hex") {
                Rgba::from_hex(m.as_str())
            } else if captures.name("word").is_some() && self.named_colors && is_standalone_word(value, &whole) {
                Rgba::from_name(whole.as_str())
            } else {
                None
            };
            let Some(color) = color else {
                continue;
            };

            if whole.start() > cursor {
                spans.push(ValueSpan::Text(offset.saturating_add(cursor)..offset.saturating_add(whole.start())));
            }
            spans.push(ValueSpan::Color(ColorToken {
                color,
                range: offset.saturating_add(whole.start())..offset.saturating_add(whole.end()),
                text: whole.as_str().to_string(),
            }));
            cursor = whole.end();
        }
        if cursor < value.len() {
            spans.push(ValueSpan::Text(offset.saturating_add(cursor)..offset.saturating_add(value.len())));
        }
        return spans;
    }
}

/// Whether a word is a value on its own rather than part of a selector,
/// function name or longer identifier.
fn is_standalone_word(value: &str, word: &regex::Match<'_>) -> bool {
    let before = value.get(..word.start()).and_then(|head| return head.chars().next_back());
    let after = value.get(word.end()..).and_then(|tail| return tail.chars().next());
    let attached_before = before.is_some_and(|c| return matches!(c, '#' | '.' | '-' | '@' | '$' | '%' | '&'));
    return !attached_before && after != Some('(');
}

/// Find the variable whose canonical value equals the token's.
pub fn match_color<'t>(token: &ColorToken, table: &'t VariableTable) -> Option<&'t VariableEntry> {
    return table.get(&token.color);
}
