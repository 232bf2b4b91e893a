use crate::error::{LineCol, ParseError};
use crate::value::Value;

/// The outcome of running one matcher over some input.
///
/// `consumed` and `remaining` always partition the input the matcher was
/// given: `consumed` is a prefix of it and `remaining` the suffix that
/// follows. On failure `remaining` marks how far matching got before it
/// stopped, and `consumed` is whatever was committed before that point
/// (empty for primitives).
#[derive(Clone, Debug, PartialEq)]
pub struct MatchResult<'i> {
    pub consumed: &'i str,
    pub remaining: &'i str,
    pub outcome: Result<Value, String>,
}

impl<'i> MatchResult<'i> {
    /// Success after matching the first `len` bytes of `input`.
    pub fn success(input: &'i str, len: usize, value: Value) -> Self {
        let (consumed, remaining) = input.split_at(len);
        MatchResult { consumed, remaining, outcome: Ok(value) }
    }

    /// Failure at the start of `input`.
    pub fn failure(input: &'i str, message: impl Into<String>) -> Self {
        MatchResult {
            consumed: &input[..0],
            remaining: input,
            outcome: Err(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn value(&self) -> Option<&Value> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&str> {
        self.outcome.as_ref().err().map(String::as_str)
    }

    /// Transform the value of a successful match.
    pub fn map(self, f: impl FnOnce(Value) -> Value) -> Self {
        MatchResult {
            consumed: self.consumed,
            remaining: self.remaining,
            outcome: self.outcome.map(f),
        }
    }

    /// Re-express this result relative to `input`, of which `remaining`
    /// must be a suffix. `consumed` becomes everything in `input` before
    /// `remaining`.
    pub(crate) fn rebase(self, input: &'i str) -> Self {
        debug_assert!(input.ends_with(self.remaining));
        let split = input.len() - self.remaining.len();
        MatchResult {
            consumed: &input[..split],
            remaining: self.remaining,
            outcome: self.outcome,
        }
    }

    /// Where `remaining` starts within `original`.
    ///
    /// Returns `None` when `original` is not the text this result was
    /// produced from.
    pub fn position_in(&self, original: &str) -> Option<LineCol> {
        if original.ends_with(self.remaining) {
            Some(LineCol::of(original, self.remaining))
        } else {
            None
        }
    }

    /// The failure of this result as a positioned error, or `None` if it
    /// succeeded or `original` is the wrong text.
    pub fn err(&self, original: &str) -> Option<ParseError> {
        let expected = self.error()?.to_owned();
        let location = self.position_in(original)?;
        Some(ParseError { location, expected })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rebase_extends_consumed() {
        let input = "abcdef";
        let inner = MatchResult::failure(&input[3..], "Expected x");
        let outer = inner.rebase(input);
        assert_eq!(outer.consumed, "abc");
        assert_eq!(outer.remaining, "def");
        assert_eq!(outer.error(), Some("Expected x"));
    }

    #[test]
    fn position_rejects_foreign_text() {
        let result = MatchResult::failure("xyz", "Expected a");
        assert!(result.position_in("abc").is_none());
        assert_eq!(result.position_in("ab\nxyz").map(|p| p.line), Some(2));
    }

    #[test]
    fn err_needs_failure() {
        let ok = MatchResult::success("abc", 1, Value::Nil);
        assert!(ok.err("abc").is_none());
        let failed = MatchResult::failure("c", "Expected d");
        assert_eq!(failed.err("ab\nc").unwrap().to_string(), "Line 2: Expected d");
    }
}
