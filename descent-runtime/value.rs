use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::num::IntErrorKind;

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// The structured value a successful match carries.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// Produced by [`Discard`](crate::Discard); sequences and repetitions
    /// drop it instead of storing it.
    Discard,
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    /// Which alternative of an [`Alternative`](crate::Alternative) matched.
    Choice(Choice),
}

/// The winning branch of an alternation, tagged with its position among
/// the alternatives (declaration order, starting at 0).
#[derive(Clone, Debug, PartialEq)]
pub struct Choice {
    pub index: usize,
    pub value: Box<Value>,
}

impl Choice {
    pub fn new(index: usize, value: Value) -> Choice {
        Choice { index, value: Box::new(value) }
    }
}

impl Value {
    pub fn is_discard(&self) -> bool {
        matches!(self, Value::Discard)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Look up `key` in a map value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(map) => map.get(key),
            _ => None,
        }
    }

    /// The elements of a list; a discard is empty and anything else is a
    /// list of one.
    pub fn into_list(self) -> Vec<Value> {
        match self {
            Value::List(items) => items,
            Value::Discard => Vec::new(),
            other => vec![other],
        }
    }

    /// Integer reading of a scalar, `Nil` when there is none.
    ///
    /// A string of digits too large for `i64` reads as a `Float` of the
    /// same magnitude.
    pub fn to_int(&self) -> Value {
        match self {
            Value::Int(i) => Value::Int(*i),
            Value::Float(f) => Value::Int(*f as i64),
            Value::Bool(b) => Value::Int(i64::from(*b)),
            Value::Str(s) => {
                let s = s.trim();
                match s.parse::<i64>() {
                    Ok(i) => Value::Int(i),
                    Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
                        s.parse().map(Value::Float).unwrap_or(Value::Nil)
                    }
                    Err(_) => Value::Nil,
                }
            }
            _ => Value::Nil,
        }
    }

    /// Float reading of a scalar, `Nil` when there is none.
    pub fn to_float(&self) -> Value {
        match self {
            Value::Int(i) => Value::Float(*i as f64),
            Value::Float(f) => Value::Float(*f),
            Value::Str(s) => s.trim().parse().map(Value::Float).unwrap_or(Value::Nil),
            _ => Value::Nil,
        }
    }

    /// `item` followed by the elements of `self`.
    pub fn prepend(self, item: Value) -> Value {
        if item.is_discard() {
            return self;
        }
        let mut items = vec![item];
        items.extend(self.into_list());
        Value::List(items)
    }

    /// The elements of `self` followed by `item`.
    pub fn push(self, item: Value) -> Value {
        let mut items = self.into_list();
        if !item.is_discard() {
            items.push(item);
        }
        Value::List(items)
    }

    /// Combine two maps or two lists. Keys of `other` win.
    pub fn merge(self, other: Value) -> Value {
        match (self, other) {
            (Value::Map(mut left), Value::Map(right)) => {
                left.extend(right);
                Value::Map(left)
            }
            (left, right) => {
                let mut items = left.into_list();
                items.extend(right.into_list());
                Value::List(items)
            }
        }
    }

    /// A single-entry map.
    pub fn entry(key: Value, value: Value) -> Value {
        let key = match key {
            Value::Str(s) => s,
            other => other.to_string(),
        };
        let mut map = BTreeMap::new();
        map.insert(key, value);
        Value::Map(map)
    }
}

impl Display for Value {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Discard => write!(fmt, "<discard>"),
            Value::Nil => write!(fmt, "null"),
            Value::Bool(b) => write!(fmt, "{}", b),
            Value::Int(i) => write!(fmt, "{}", i),
            Value::Float(f) => write!(fmt, "{:?}", f),
            Value::Str(s) => write!(fmt, "{:?}", s),
            Value::List(items) => {
                write!(fmt, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(fmt, ", ")?;
                    }
                    write!(fmt, "{}", item)?;
                }
                write!(fmt, "]")
            }
            Value::Map(map) => {
                write!(fmt, "{{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(fmt, ", ")?;
                    }
                    write!(fmt, "{:?}: {}", key, value)?;
                }
                write!(fmt, "}}")
            }
            Value::Choice(choice) => write!(fmt, "Option({}: {})", choice.index, choice.value),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Discard | Value::Nil => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Str(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Value::Choice(choice) => choice.value.serialize(serializer),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Value {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Value {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Value {
        Value::Float(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Value {
        Value::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Value {
        Value::Str(s.to_owned())
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Value {
        Value::Nil
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Value {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<BTreeMap<String, T>> for Value {
    fn from(entries: BTreeMap<String, T>) -> Value {
        Value::Map(entries.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Value {
        value.map_or(Value::Nil, Into::into)
    }
}

impl From<Choice> for Value {
    fn from(choice: Choice) -> Value {
        Value::Choice(choice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prepend_builds_in_order() {
        let list = Value::List(vec![Value::Int(3)]);
        let list = list.prepend(Value::Int(2)).prepend(Value::Int(1));
        assert_eq!(list, Value::from(vec![1i64, 2, 3]));
        assert_eq!(Value::Nil.prepend(Value::Discard), Value::Nil);
    }

    #[test]
    fn merge_prefers_later_keys() {
        let a = Value::entry("k".into(), Value::Int(1));
        let b = Value::entry("k".into(), Value::Int(2));
        assert_eq!(a.merge(b).get("k"), Some(&Value::Int(2)));
    }

    #[test]
    fn scalar_conversions() {
        assert_eq!(Value::from("-12").to_int(), Value::Int(-12));
        assert_eq!(Value::from("1.5").to_float(), Value::Float(1.5));
        assert_eq!(Value::from("x").to_int(), Value::Nil);
        assert_eq!(Value::from("99999999999999999999").to_int(), Value::Float(1e20));
        assert_eq!(Value::from("-99999999999999999999").to_int(), Value::Float(-1e20));
    }

    #[test]
    fn serializes_as_json() {
        let value = Value::entry("a".into(), Value::Choice(Choice::new(1, Value::from(vec![1i64, 2]))));
        assert_eq!(serde_json::to_value(&value).unwrap(), json!({"a": [1, 2]}));
    }

    #[test]
    fn display() {
        let value = Value::List(vec![Value::Int(1), Value::from("a"), Value::Nil]);
        assert_eq!(value.to_string(), r#"[1, "a", null]"#);
    }
}
