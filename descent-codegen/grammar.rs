//! The grammar-description parser, written with the runtime's own
//! combinators.
//!
//! ```text
//! grammar   :: rules "%%" trailer
//! rules     :: rule ";" rules | rule ";"
//! rule      :: id "::" sequences
//! sequences :: sequence "|" sequences | sequence
//! sequence  :: lexitems action?
//! lexitems  :: lexitem lexitems | lexitem
//! lexitem   :: id | string | regex
//! action    :: "{" code "}"
//! ```
//!
//! The list rules are right-recursive and collect their elements back to
//! front; each list is put in order once by the rule that owns it.

use once_cell::sync::Lazy;

use descent_runtime::{
    Alternative, Discard, Group, LineCol, Literal, MatchResult, Padded, ParseError, Parser, ParserExt, Pattern,
    Sequence, Spaces, Value,
};

use crate::ast::{Grammar, LexItem, Rule, Sequence as SequenceDef};

/// Parse a grammar description.
pub fn parse_grammar(input: &str) -> Result<Grammar, ParseError> {
    let result = GrammarParser.parse(input);
    match result.outcome {
        Ok(value) => decode_grammar(value).map_err(|message| ParseError {
            location: LineCol::of(input, input),
            expected: message,
        }),
        Err(message) => Err(ParseError { location: LineCol::of(input, result.remaining), expected: message }),
    }
}

fn pattern(source: &str) -> Pattern {
    Pattern::new(source).expect("grammar pattern is valid")
}

/// A punctuation token with surrounding whitespace, left out of the value.
fn delim(text: &str) -> Discard {
    Literal::new(text).padded().discard()
}

fn single<P: Parser + Send + Sync + 'static>(parser: P) -> Sequence {
    Sequence::new(vec![parser.boxed()])
}

/// Value of a right-recursive list rule `x sep? xs | x sep?`, as the
/// elements in reverse order.
fn collect_reversed(value: Value) -> Value {
    match value {
        Value::Choice(choice) if choice.index == 0 => {
            let mut parts = (*choice.value).into_list();
            let rest = parts.pop().unwrap_or_default();
            let head = parts.pop().unwrap_or_default();
            rest.push(head)
        }
        Value::Choice(choice) => Value::List((*choice.value).into_list()),
        other => other,
    }
}

fn reversed(value: Value) -> Value {
    let mut items = value.into_list();
    items.reverse();
    Value::List(items)
}

struct GrammarParser;

impl Parser for GrammarParser {
    fn parse<'i>(&self, input: &'i str) -> MatchResult<'i> {
        static PARSER: Lazy<Sequence> = Lazy::new(|| {
            Rules
                .and(Spaces)
                .and(Literal::new("%%").discard())
                .and(Pattern::with_group(r"(?s).*", Group::Whole).expect("grammar pattern is valid"))
        });
        PARSER.parse(input).map(|value| {
            let mut parts = value.into_list();
            let trailer = parts.pop().unwrap_or_default();
            let rules = parts.pop().unwrap_or_default();
            Value::List(vec![reversed(rules), trailer])
        })
    }
}

struct Rules;

impl Parser for Rules {
    fn parse<'i>(&self, input: &'i str) -> MatchResult<'i> {
        static PARSER: Lazy<Alternative> =
            Lazy::new(|| RuleParser.and(delim(";")).and(Rules).or(RuleParser.and(delim(";"))));
        PARSER.parse(input).map(collect_reversed)
    }
}

struct RuleParser;

impl Parser for RuleParser {
    fn parse<'i>(&self, input: &'i str) -> MatchResult<'i> {
        static PARSER: Lazy<Sequence> = Lazy::new(|| Identifier.padded().and(delim("::")).and(Sequences));
        PARSER.parse(input).map(|value| {
            let mut parts = value.into_list();
            let sequences = parts.pop().unwrap_or_default();
            let name = parts.pop().unwrap_or_default();
            Value::List(vec![name, reversed(sequences)])
        })
    }
}

struct Sequences;

impl Parser for Sequences {
    fn parse<'i>(&self, input: &'i str) -> MatchResult<'i> {
        static PARSER: Lazy<Alternative> =
            Lazy::new(|| SequenceParser.and(delim("|")).and(Sequences).or(single(SequenceParser)));
        PARSER.parse(input).map(collect_reversed)
    }
}

struct SequenceParser;

impl Parser for SequenceParser {
    fn parse<'i>(&self, input: &'i str) -> MatchResult<'i> {
        static PARSER: Lazy<Sequence> = Lazy::new(|| LexItems.and(Action.optional()));
        PARSER.parse(input).map(|value| {
            let mut parts = value.into_list();
            let action = match parts.pop() {
                Some(Value::Choice(choice)) if choice.index == 0 => *choice.value,
                _ => Value::Nil,
            };
            let items = parts.pop().unwrap_or_default();
            Value::List(vec![reversed(items), action])
        })
    }
}

struct LexItems;

impl Parser for LexItems {
    fn parse<'i>(&self, input: &'i str) -> MatchResult<'i> {
        static PARSER: Lazy<Alternative> = Lazy::new(|| LexItemParser.and(LexItems).or(single(LexItemParser)));
        PARSER.parse(input).map(collect_reversed)
    }
}

/// `Choice(0, id)`, `Choice(1, string body)` or `Choice(2, regex body)`.
struct LexItemParser;

impl Parser for LexItemParser {
    fn parse<'i>(&self, input: &'i str) -> MatchResult<'i> {
        static PARSER: Lazy<Padded> = Lazy::new(|| {
            Identifier
                .or(pattern(r#""((?:\\.|[^"\\])*)""#))
                .or(pattern(r"/((?:\\.|[^/\\])*)/"))
                .padded()
        });
        PARSER.parse(input)
    }
}

struct Identifier;

impl Parser for Identifier {
    fn parse<'i>(&self, input: &'i str) -> MatchResult<'i> {
        static PARSER: Lazy<Pattern> = Lazy::new(|| pattern("[a-zA-Z_][a-zA-Z0-9_]*"));
        PARSER.parse(input)
    }
}

/// `{ code }`; the value is the code, trimmed.
struct Action;

impl Parser for Action {
    fn parse<'i>(&self, input: &'i str) -> MatchResult<'i> {
        static PARSER: Lazy<Sequence> = Lazy::new(|| delim("{").and(Code).and(delim("}")));
        PARSER.parse(input).map(|value| match value.into_list().pop() {
            Some(Value::Str(code)) => Value::Str(code.trim().to_owned()),
            _ => Value::Str(String::new()),
        })
    }
}

/// Text with balanced braces, kept verbatim.
struct Code;

impl Parser for Code {
    fn parse<'i>(&self, input: &'i str) -> MatchResult<'i> {
        static PARSER: Lazy<Alternative> = Lazy::new(|| {
            let text = || pattern("[^{}]*");
            text()
                .and(Literal::new("{"))
                .and(Code)
                .and(Literal::new("}"))
                .and(Code)
                .or(single(text()))
        });
        PARSER.parse(input).map(|value| {
            let choice = match value {
                Value::Choice(choice) => choice,
                other => return other,
            };
            let text: String = (*choice.value)
                .into_list()
                .iter()
                .filter_map(Value::as_str)
                .collect();
            Value::Str(text)
        })
    }
}

fn unescape_string(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn decode_grammar(value: Value) -> Result<Grammar, String> {
    let mut parts = value.into_list().into_iter();
    let rules = parts.next().ok_or("missing rule list")?;
    let trailer = match parts.next() {
        Some(Value::Str(text)) => text,
        _ => String::new(),
    };
    let rules = rules.into_list().into_iter().map(decode_rule).collect::<Result<_, _>>()?;
    Ok(Grammar { rules, trailer })
}

fn decode_rule(value: Value) -> Result<Rule, String> {
    let mut parts = value.into_list().into_iter();
    let name = match parts.next() {
        Some(Value::Str(name)) => name,
        other => return Err(format!("expected rule name, found {:?}", other)),
    };
    let sequences = parts
        .next()
        .ok_or_else(|| format!("rule `{}` has no alternatives", name))?
        .into_list()
        .into_iter()
        .map(decode_sequence)
        .collect::<Result<_, _>>()?;
    Ok(Rule { name, sequences })
}

fn decode_sequence(value: Value) -> Result<SequenceDef, String> {
    let mut parts = value.into_list().into_iter();
    let items = parts
        .next()
        .ok_or("empty sequence")?
        .into_list()
        .into_iter()
        .map(decode_item)
        .collect::<Result<_, _>>()?;
    let action = match parts.next() {
        Some(Value::Str(code)) => Some(code),
        _ => None,
    };
    Ok(SequenceDef::new(items, action))
}

fn decode_item(value: Value) -> Result<LexItem, String> {
    let choice = match value {
        Value::Choice(choice) => choice,
        other => return Err(format!("expected a lexical item, found {:?}", other)),
    };
    let text = match *choice.value {
        Value::Str(text) => text,
        other => return Err(format!("expected item text, found {:?}", other)),
    };
    Ok(match choice.index {
        0 => LexItem::Reference(text),
        1 => LexItem::Literal(unescape_string(&text)),
        _ => LexItem::Pattern(text.replace(r"\/", "/")),
    })
}
