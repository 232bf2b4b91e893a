/// A parsed grammar description: its rules in declaration order and the
/// text that followed the `%%` marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Grammar {
    pub rules: Vec<Rule>,
    pub trailer: String,
}

impl Grammar {
    pub fn iter_rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn find_rule(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub name: String,
    /// Alternatives, tried in this order.
    pub sequences: Vec<Sequence>,
}

impl Rule {
    pub fn has_right_recursion(&self) -> bool {
        self.sequences.iter().any(|seq| seq.right_recursive)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    pub items: Vec<LexItem>,
    /// Rust expression text from the `{ ... }` block.
    pub action: Option<String>,
    /// Set by analysis: the last item refers back to the enclosing rule.
    pub right_recursive: bool,
}

impl Sequence {
    pub fn new(items: Vec<LexItem>, action: Option<String>) -> Sequence {
        Sequence { items, action, right_recursive: false }
    }

    /// Items before the trailing self-reference of a right-recursive
    /// sequence.
    pub fn prefix(&self) -> &[LexItem] {
        match self.items.split_last() {
            Some((_, prefix)) if self.right_recursive => prefix,
            _ => &self.items,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexItem {
    /// Another rule, by name.
    Reference(String),
    Literal(String),
    Pattern(String),
}

impl LexItem {
    pub fn reference(&self) -> Option<&str> {
        match self {
            LexItem::Reference(name) => Some(name),
            _ => None,
        }
    }
}
