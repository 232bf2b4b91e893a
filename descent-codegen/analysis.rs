use std::collections::BTreeSet;
use std::fmt::{self, Display};

use crate::ast::*;

/// A problem found in a grammar, either fatal or advisory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    DuplicateRule(String),
    /// The rule's first alternative-item is the rule itself.
    LeftRecursion(String),
    UndefinedRules(Vec<String>),
    UnusedRules(Vec<String>),
    InvalidPattern { rule: String, pattern: String, error: String },
    InvalidAction { rule: String, error: String },
    /// Two rules, or a rule and a prelude item, would produce the same
    /// Rust name.
    NameCollision { rule: String, generated: String, other: String },
    ReservedName(String),
    /// The rule's binding would be the same identifier as its struct.
    UncasedName(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl Display for Severity {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Severity::Error => write!(fmt, "error"),
            Severity::Warning => write!(fmt, "warning"),
        }
    }
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::UnusedRules(_) => Severity::Warning,
            _ => Severity::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }

    pub fn msg(&self) -> String {
        match self {
            Diagnostic::DuplicateRule(name) => format!("duplicate rule `{}`", name),
            Diagnostic::LeftRecursion(name) => {
                format!("left recursion in rule `{}`: it would call itself without consuming input", name)
            }
            Diagnostic::UndefinedRules(names) => format!("undefined rules: {}", names.join(", ")),
            Diagnostic::UnusedRules(names) => format!("unused rules: {}", names.join(", ")),
            Diagnostic::InvalidPattern { rule, pattern, error } => {
                format!("invalid regex /{}/ in rule `{}`: {}", pattern, rule, error)
            }
            Diagnostic::InvalidAction { rule, error } => {
                format!("action in rule `{}` is not valid Rust: {}", rule, error)
            }
            Diagnostic::NameCollision { rule, generated, other } => {
                format!("rule `{}` generates `{}`, which collides with {}", rule, generated, other)
            }
            Diagnostic::ReservedName(name) => format!("`{}` cannot be used as a rule name", name),
            Diagnostic::UncasedName(name) => format!("rule name `{}` must start with a lowercase letter", name),
        }
    }
}

impl Display for Diagnostic {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}: {}", self.severity(), self.msg())
    }
}

pub struct GrammarAnalysis {
    pub diagnostics: Vec<Diagnostic>,
}

impl GrammarAnalysis {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

#[derive(Default)]
struct Context {
    defined: BTreeSet<String>,
    referenced: BTreeSet<String>,
    diagnostics: Vec<Diagnostic>,
}

/// Check the grammar and mark its right-recursive sequences.
///
/// Every rule is examined even after an error so that all problems are
/// reported together.
pub fn check(grammar: &mut Grammar) -> GrammarAnalysis {
    let mut context = Context::default();

    for rule in grammar.iter_rules() {
        if !context.defined.insert(rule.name.clone()) {
            context.diagnostics.push(Diagnostic::DuplicateRule(rule.name.clone()));
        }
    }

    for rule in &mut grammar.rules {
        context.walk_rule(rule);
    }

    let undefined: Vec<String> = context.referenced.difference(&context.defined).cloned().collect();
    if !undefined.is_empty() {
        context.diagnostics.push(Diagnostic::UndefinedRules(undefined));
    }

    let unused: Vec<String> = context.defined.difference(&context.referenced).cloned().collect();
    if !unused.is_empty() {
        context.diagnostics.push(Diagnostic::UnusedRules(unused));
    }

    GrammarAnalysis { diagnostics: context.diagnostics }
}

impl Context {
    fn walk_rule(&mut self, rule: &mut Rule) {
        let mut left_recursive = false;
        for sequence in &mut rule.sequences {
            for item in &sequence.items {
                if let Some(name) = item.reference() {
                    self.referenced.insert(name.to_owned());
                }
            }

            if sequence.items.first().and_then(LexItem::reference) == Some(rule.name.as_str()) {
                left_recursive = true;
                continue;
            }

            sequence.right_recursive = sequence.items.last().and_then(LexItem::reference) == Some(rule.name.as_str());
        }

        if left_recursive {
            self.diagnostics.push(Diagnostic::LeftRecursion(rule.name.clone()));
        }
    }
}
