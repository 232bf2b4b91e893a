//! Matchers that look at the input directly.
//!
//! None of these commit partially: on failure `consumed` is empty and
//! `remaining` is the whole input.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::value::Value;
use crate::{count_invocation, MatchResult, Parser};

/// Exactly one character.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnyChar;

impl Parser for AnyChar {
    fn parse<'i>(&self, input: &'i str) -> MatchResult<'i> {
        count_invocation();
        match input.chars().next() {
            Some(c) => MatchResult::success(input, c.len_utf8(), Value::Str(c.to_string())),
            None => MatchResult::failure(input, "EOF"),
        }
    }
}

/// A fixed piece of text.
#[derive(Clone, Debug)]
pub struct Literal {
    text: String,
}

impl Literal {
    pub fn new(text: impl Into<String>) -> Literal {
        Literal { text: text.into() }
    }
}

impl Parser for Literal {
    fn parse<'i>(&self, input: &'i str) -> MatchResult<'i> {
        count_invocation();
        if input.starts_with(&self.text) {
            MatchResult::success(input, self.text.len(), Value::Str(self.text.clone()))
        } else {
            MatchResult::failure(input, format!("Expected {}", self.text))
        }
    }
}

/// The first of several literals that matches, tried in order.
#[derive(Clone, Debug)]
pub struct OneOf {
    options: Vec<String>,
}

impl OneOf {
    pub fn new<S: Into<String>>(options: impl IntoIterator<Item = S>) -> OneOf {
        OneOf { options: options.into_iter().map(Into::into).collect() }
    }
}

impl Parser for OneOf {
    fn parse<'i>(&self, input: &'i str) -> MatchResult<'i> {
        count_invocation();
        match self.options.iter().find(|option| input.starts_with(option.as_str())) {
            Some(option) => MatchResult::success(input, option.len(), Value::Str(option.clone())),
            None => MatchResult::failure(input, format!("Expected one of {:?}", self.options)),
        }
    }
}

/// One character from a set.
#[derive(Clone, Debug)]
pub struct CharSet {
    chars: String,
}

impl CharSet {
    pub fn new(chars: impl Into<String>) -> CharSet {
        CharSet { chars: chars.into() }
    }
}

impl Parser for CharSet {
    fn parse<'i>(&self, input: &'i str) -> MatchResult<'i> {
        count_invocation();
        match input.chars().next() {
            Some(c) if self.chars.contains(c) => MatchResult::success(input, c.len_utf8(), Value::Str(c.to_string())),
            _ => MatchResult::failure(input, format!("Expected one of {:?}", self.chars)),
        }
    }
}

/// One character outside a set.
#[derive(Clone, Debug)]
pub struct NegatedCharSet {
    chars: String,
}

impl NegatedCharSet {
    pub fn new(chars: impl Into<String>) -> NegatedCharSet {
        NegatedCharSet { chars: chars.into() }
    }
}

impl Parser for NegatedCharSet {
    fn parse<'i>(&self, input: &'i str) -> MatchResult<'i> {
        count_invocation();
        match input.chars().next() {
            Some(c) if !self.chars.contains(c) => MatchResult::success(input, c.len_utf8(), Value::Str(c.to_string())),
            _ => MatchResult::failure(input, format!("Expected any character except {:?}", self.chars)),
        }
    }
}

/// Which part of a regex match becomes the value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Group {
    /// The first capture group if the pattern has one, else the whole match.
    Auto,
    Whole,
    Index(usize),
}

/// A regular expression, anchored at the start of the input.
#[derive(Clone, Debug)]
pub struct Pattern {
    source: String,
    regex: Regex,
    group: Group,
}

impl Pattern {
    pub fn new(pattern: &str) -> Result<Pattern, regex::Error> {
        Pattern::with_group(pattern, Group::Auto)
    }

    pub fn with_group(pattern: &str, group: Group) -> Result<Pattern, regex::Error> {
        let regex = Regex::new(&format!("^(?:{})", pattern))?;
        Ok(Pattern { source: pattern.to_owned(), regex, group })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    fn selected<'i>(&self, captures: &regex::Captures<'i>) -> &'i str {
        let index = match self.group {
            Group::Auto if captures.len() > 1 => 1,
            Group::Auto | Group::Whole => 0,
            Group::Index(i) => i,
        };
        captures.get(index).map_or("", |m| m.as_str())
    }
}

impl Parser for Pattern {
    fn parse<'i>(&self, input: &'i str) -> MatchResult<'i> {
        count_invocation();
        match self.regex.captures(input) {
            Some(captures) => {
                let len = captures.get(0).map_or(0, |m| m.end());
                let text = self.selected(&captures).to_owned();
                MatchResult::success(input, len, Value::Str(text))
            }
            None => MatchResult::failure(input, format!("Expected match of /{}/", self.source)),
        }
    }
}

/// Succeed without consuming anything.
#[derive(Clone, Debug)]
pub struct Always {
    value: Value,
}

impl Always {
    pub fn new(value: Value) -> Always {
        Always { value }
    }
}

impl Parser for Always {
    fn parse<'i>(&self, input: &'i str) -> MatchResult<'i> {
        count_invocation();
        MatchResult::success(input, 0, self.value.clone())
    }
}

/// The end of the input.
#[derive(Clone, Copy, Debug, Default)]
pub struct End;

impl Parser for End {
    fn parse<'i>(&self, input: &'i str) -> MatchResult<'i> {
        count_invocation();
        if input.is_empty() {
            MatchResult::success(input, 0, Value::Discard)
        } else {
            MatchResult::failure(input, "Expected end of input")
        }
    }
}

macro_rules! atom {
    ($(#[$doc:meta])* $name:ident, $pattern:expr, $expected:expr, |$text:ident| $convert:expr) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, Default)]
        pub struct $name;

        impl Parser for $name {
            fn parse<'i>(&self, input: &'i str) -> MatchResult<'i> {
                static PATTERN: Lazy<Pattern> = Lazy::new(|| Pattern::new($pattern).expect("atom pattern is valid"));
                match PATTERN.parse(input) {
                    MatchResult { consumed, remaining, outcome: Ok(Value::Str($text)) } => match $convert {
                        Some(value) => MatchResult { consumed, remaining, outcome: Ok(value) },
                        None => MatchResult::failure(input, $expected),
                    },
                    other => other,
                }
            }
        }
    };
}

atom!(
    /// A decimal integer with an optional minus sign. Digits outside the
    /// `i64` range do not match.
    Int, r"-?[0-9]+", "Expected integer in i64 range", |text| text.parse().ok().map(Value::Int)
);
atom!(
    /// A decimal number, fraction optional.
    Float, r"-?[0-9]*\.?[0-9]+", "Expected number", |text| text.parse().ok().map(Value::Float)
);
atom!(
    /// `true` or `false`.
    Bool, r"(true|false)", "Expected boolean", |text| Some(Value::Bool(text == "true"))
);
atom!(
    /// A double-quoted string without escapes; the value is the text between the quotes.
    QuotedString, r#""([^"]*)""#, "Expected string", |text| Some(Value::Str(text))
);
atom!(
    /// Any run of spaces, tabs and newlines, possibly empty. Always discarded.
    Spaces, r"[ \t\r\n]*", "Expected whitespace", |_text| Some(Value::Discard)
);
