//! Parsers built out of other parsers.

use crate::primitives::{Always, Spaces};
use crate::value::{Choice, Value};
use crate::{count_invocation, BoxedParser, MatchResult, Parser, ParserExt};

/// Every operand in order, each starting where the previous one stopped.
///
/// The value is the list of operand values with discards left out. The
/// first failing operand ends the sequence; its failure is returned with
/// `consumed` covering everything matched before it, so `remaining` shows
/// how far the sequence got.
pub struct Sequence {
    parsers: Vec<BoxedParser>,
}

impl Sequence {
    pub fn new(parsers: Vec<BoxedParser>) -> Sequence {
        Sequence { parsers }
    }

    /// Append another operand.
    pub fn and<P: Parser + Send + Sync + 'static>(mut self, next: P) -> Sequence {
        self.parsers.push(Box::new(next));
        self
    }
}

impl Parser for Sequence {
    fn parse<'i>(&self, input: &'i str) -> MatchResult<'i> {
        count_invocation();
        let mut rest = input;
        let mut values = Vec::with_capacity(self.parsers.len());
        for parser in &self.parsers {
            let result = parser.parse(rest);
            match result.outcome {
                Ok(value) => {
                    if !value.is_discard() {
                        values.push(value);
                    }
                    rest = result.remaining;
                }
                Err(_) => return result.rebase(input),
            }
        }
        MatchResult::success(input, input.len() - rest.len(), Value::List(values))
    }
}

/// The first operand that succeeds, tagged with its index.
///
/// When every operand fails, the failure of the last one tried is
/// returned.
pub struct Alternative {
    parsers: Vec<BoxedParser>,
}

impl Alternative {
    pub fn new(parsers: Vec<BoxedParser>) -> Alternative {
        Alternative { parsers }
    }

    /// Append another operand, tried after the existing ones.
    pub fn or<P: Parser + Send + Sync + 'static>(mut self, other: P) -> Alternative {
        self.parsers.push(Box::new(other));
        self
    }
}

impl Parser for Alternative {
    fn parse<'i>(&self, input: &'i str) -> MatchResult<'i> {
        count_invocation();
        let mut last = MatchResult::failure(input, "Expected one of no alternatives");
        for (index, parser) in self.parsers.iter().enumerate() {
            let result = parser.parse(input);
            if result.is_success() {
                return result.map(|value| Value::Choice(Choice::new(index, value)));
            }
            last = result;
        }
        last
    }
}

/// Match like the operand, but contribute nothing to an enclosing value.
pub struct Discard {
    inner: BoxedParser,
}

impl Discard {
    pub fn new<P: Parser + Send + Sync + 'static>(inner: P) -> Discard {
        Discard { inner: Box::new(inner) }
    }
}

impl Parser for Discard {
    fn parse<'i>(&self, input: &'i str) -> MatchResult<'i> {
        count_invocation();
        self.inner.parse(input).map(|_| Value::Discard)
    }
}

/// The operand, or nothing.
///
/// Built as an alternation with a zero-width match, so the value is a
/// [`Choice`]: index 0 with the operand's value, or index 1 with a discard.
pub struct Optional {
    inner: Alternative,
}

impl Optional {
    pub fn new<P: Parser + Send + Sync + 'static>(inner: P) -> Optional {
        Optional {
            inner: inner.or(Always::new(Value::Discard)),
        }
    }
}

impl Parser for Optional {
    fn parse<'i>(&self, input: &'i str) -> MatchResult<'i> {
        self.inner.parse(input)
    }
}

/// Greedy repetition.
///
/// Stops at the first failure, or at a match that consumed nothing.
pub struct Repeat {
    inner: BoxedParser,
    min: usize,
}

impl Repeat {
    pub fn zero_or_more<P: Parser + Send + Sync + 'static>(inner: P) -> Repeat {
        Repeat { inner: Box::new(inner), min: 0 }
    }

    pub fn one_or_more<P: Parser + Send + Sync + 'static>(inner: P) -> Repeat {
        Repeat { inner: Box::new(inner), min: 1 }
    }
}

impl Parser for Repeat {
    fn parse<'i>(&self, input: &'i str) -> MatchResult<'i> {
        count_invocation();
        let mut rest = input;
        let mut values = Vec::new();
        let mut count = 0;
        loop {
            let result = self.inner.parse(rest);
            match result.outcome {
                Ok(value) => {
                    count += 1;
                    if !value.is_discard() {
                        values.push(value);
                    }
                    let progressed = result.remaining.len() < rest.len();
                    rest = result.remaining;
                    if !progressed {
                        break;
                    }
                }
                Err(_) if count < self.min => return result.rebase(input),
                Err(_) => break,
            }
        }
        MatchResult::success(input, input.len() - rest.len(), Value::List(values))
    }
}

/// The operand with any surrounding whitespace skipped. The value is the
/// operand's own.
pub struct Padded {
    inner: BoxedParser,
}

impl Padded {
    pub fn new<P: Parser + Send + Sync + 'static>(inner: P) -> Padded {
        Padded { inner: Box::new(inner) }
    }
}

impl Parser for Padded {
    fn parse<'i>(&self, input: &'i str) -> MatchResult<'i> {
        count_invocation();
        let before = Spaces.parse(input).remaining;
        let result = self.inner.parse(before);
        let value = match result.outcome {
            Ok(value) => value,
            Err(_) => return result.rebase(input),
        };
        let after = Spaces.parse(result.remaining).remaining;
        MatchResult::success(input, input.len() - after.len(), value)
    }
}

/// One alternative of a rule driven by [`Unrolled`].
pub enum Branch {
    /// Everything before a trailing reference to the rule itself.
    Recursive(BoxedParser),
    /// A complete alternative that does not end in the rule itself.
    Base(BoxedParser),
}

impl Branch {
    fn parser(&self) -> &BoxedParser {
        match self {
            Branch::Recursive(p) | Branch::Base(p) => p,
        }
    }
}

struct Frame<'i> {
    at: &'i str,
    branch: usize,
    value: Value,
}

/// A right-recursive rule matched with a loop instead of the call stack.
///
/// For a rule `r :: p0 r | b1 | p2 r | b3` the branches are
/// `[Recursive(p0), Base(b1), Recursive(p2), Base(b3)]`, in declaration
/// order. Matching follows the ordered choice of the recursive form
/// exactly: at each position the branches are tried in order, a recursive
/// prefix that matches moves on to the text after it, and when nothing
/// matches at a position the search resumes one level up with the branch
/// after the one that led there. Stack use is constant; the pending
/// repetitions live in a vector.
///
/// The value is a list of [`Choice`]s, one per repetition with the value
/// of its prefix (outermost first), and last the base branch that ended the
/// chain.
pub struct Unrolled {
    branches: Vec<Branch>,
}

impl Unrolled {
    pub fn new(branches: Vec<Branch>) -> Unrolled {
        Unrolled { branches }
    }
}

impl Parser for Unrolled {
    fn parse<'i>(&self, input: &'i str) -> MatchResult<'i> {
        count_invocation();
        let mut frames: Vec<Frame<'i>> = Vec::new();
        let mut at = input;
        let mut start = 0;
        let mut failure: Option<MatchResult<'i>> = None;

        loop {
            let mut descended = false;
            for (index, branch) in self.branches.iter().enumerate().skip(start) {
                let result = branch.parser().parse(at);
                let value = match result.outcome {
                    Ok(value) => value,
                    Err(_) => {
                        failure = Some(result);
                        continue;
                    }
                };
                match branch {
                    Branch::Base(_) => {
                        let mut steps: Vec<Value> = frames
                            .into_iter()
                            .map(|frame| Value::Choice(Choice::new(frame.branch, frame.value)))
                            .collect();
                        steps.push(Value::Choice(Choice::new(index, value)));
                        let len = input.len() - result.remaining.len();
                        return MatchResult::success(input, len, Value::List(steps));
                    }
                    Branch::Recursive(_) if result.remaining.len() == at.len() => {
                        failure = Some(MatchResult::failure(at, "Expected progress before recursion"));
                    }
                    Branch::Recursive(_) => {
                        frames.push(Frame { at, branch: index, value });
                        at = result.remaining;
                        descended = true;
                        break;
                    }
                }
            }

            if descended {
                start = 0;
                failure = None;
                continue;
            }

            // Nothing matched here: the level above retries with its next
            // branch, keeping this failure unless a later branch replaces it.
            match frames.pop() {
                Some(frame) => {
                    at = frame.at;
                    start = frame.branch + 1;
                }
                None => {
                    let failure = failure
                        .unwrap_or_else(|| MatchResult::failure(at, "Expected one of no alternatives"));
                    return failure.rebase(input);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{Int, Literal, Pattern};
    use pretty_assertions::assert_eq;

    fn ints(values: &[i64]) -> Value {
        Value::from(values.to_vec())
    }

    #[test]
    fn sequence_accumulates() {
        let p = Literal::new("[").and(Int).and(Literal::new("]"));
        let r = p.parse("[5]x");
        assert_eq!(r.consumed, "[5]");
        assert_eq!(r.remaining, "x");
        assert_eq!(r.value(), Some(&Value::List(vec!["[".into(), Value::Int(5), "]".into()])));
    }

    #[test]
    fn sequence_drops_discards() {
        let p = Literal::new("[").discard().and(Int).and(Literal::new("]").discard());
        assert_eq!(p.parse("[5]").value(), Some(&ints(&[5])));
    }

    #[test]
    fn sequence_failure_reports_depth() {
        let p = Literal::new("a").and(Literal::new("b")).and(Literal::new("c"));
        let r = p.parse("abx");
        assert_eq!(r.error(), Some("Expected c"));
        assert_eq!(r.remaining, "x");
        assert_eq!(r.consumed, "ab");
    }

    #[test]
    fn sequence_identity() {
        let a = Pattern::new("[a-z]+").unwrap();
        let b = Pattern::new("[0-9]+").unwrap();
        for s in ["abc123", "abc", "123", "ab12cd", ""] {
            let whole = Pattern::new("[a-z]+").unwrap().and(Pattern::new("[0-9]+").unwrap()).parse(s);
            let first = a.parse(s);
            let expect_ok = first.is_success() && b.parse(first.remaining).is_success();
            assert_eq!(whole.is_success(), expect_ok, "input {:?}", s);
            if expect_ok {
                let second = b.parse(first.remaining);
                assert_eq!(whole.consumed, format!("{}{}", first.consumed, second.consumed));
            }
            assert_eq!(format!("{}{}", whole.consumed, whole.remaining), s);
        }
    }

    #[test]
    fn alternative_is_left_biased() {
        let p = Pattern::new("[a-z]+").unwrap().or(Literal::new("abc"));
        let r = p.parse("abcd");
        assert_eq!(r.consumed, "abcd");
        assert_eq!(r.value(), Some(&Value::Choice(Choice::new(0, "abcd".into()))));
    }

    #[test]
    fn alternative_reports_last_failure() {
        let p = Literal::new("a").or(Literal::new("b")).or(Literal::new("c"));
        assert_eq!(p.parse("x").error(), Some("Expected c"));
        assert_eq!(p.parse("c").value(), Some(&Value::Choice(Choice::new(2, "c".into()))));
    }

    #[test]
    fn optional_is_tagged() {
        let p = Literal::new("a").optional();
        assert_eq!(p.parse("ab").value(), Some(&Value::Choice(Choice::new(0, "a".into()))));
        let r = p.parse("b");
        assert_eq!(r.consumed, "");
        assert_eq!(r.value(), Some(&Value::Choice(Choice::new(1, Value::Discard))));
    }

    #[test]
    fn repeats() {
        let many = Int.and(Literal::new(",").discard()).repeated();
        let r = many.parse("1,2,3,x");
        assert_eq!(r.remaining, "x");
        assert_eq!(r.value(), Some(&Value::List(vec![ints(&[1]), ints(&[2]), ints(&[3])])));

        assert_eq!(Int.repeated().parse("x").value(), Some(&Value::List(vec![])));
        assert!(!Int.at_least_once().parse("x").is_success());
        assert_eq!(Int.at_least_once().parse("7").value(), Some(&ints(&[7])));
    }

    #[test]
    fn repeat_stops_on_empty_match() {
        let r = Pattern::new("a*").unwrap().repeated().parse("bbb");
        assert!(r.is_success());
        assert_eq!(r.remaining, "bbb");
    }

    #[test]
    fn padded_skips_whitespace() {
        let p = Literal::new("::").padded();
        let r = p.parse("  \n::\t x");
        assert_eq!(r.remaining, "x");
        assert_eq!(r.value(), Some(&Value::from("::")));

        let r = p.parse("  x");
        assert_eq!(r.remaining, "x");
        assert_eq!(r.consumed, "  ");
        assert!(!r.is_success());
    }

    #[test]
    fn partition_holds() {
        let p = Literal::new("a").and(Literal::new("b").padded()).or(Literal::new("a").repeated());
        for s in ["ab", "a b c", "aaa", "x", "", "a x"] {
            let r = p.parse(s);
            assert_eq!(format!("{}{}", r.consumed, r.remaining), s);
        }
    }

    // list :: item "," list | item
    fn unrolled_list() -> Unrolled {
        Unrolled::new(vec![
            Branch::Recursive(Int.padded().and(Literal::new(",").padded()).boxed()),
            Branch::Base(Sequence::new(vec![Int.padded().boxed()]).boxed()),
        ])
    }

    #[test]
    fn unrolled_steps_in_order() {
        let r = unrolled_list().parse("1,2,3");
        assert_eq!(r.remaining, "");
        let steps = r.value().cloned().unwrap().into_list();
        assert_eq!(
            steps,
            vec![
                Value::Choice(Choice::new(0, Value::List(vec![Value::Int(1), ",".into()]))),
                Value::Choice(Choice::new(0, Value::List(vec![Value::Int(2), ",".into()]))),
                Value::Choice(Choice::new(1, ints(&[3]))),
            ]
        );
    }

    #[test]
    fn unrolled_backtracks_like_recursion() {
        // As with plain recursion, the trailing comma is left unmatched.
        let r = unrolled_list().parse("1,2,");
        assert_eq!(r.consumed, "1,2");
        assert_eq!(r.remaining, ",");
        assert_eq!(r.value().cloned().unwrap().into_list().len(), 2);
    }

    #[test]
    fn unrolled_failure() {
        let r = unrolled_list().parse("x");
        assert_eq!(r.remaining, "x");
        assert_eq!(r.error(), Some("Expected match of /-?[0-9]+/"));
    }

    #[test]
    fn unrolled_handles_long_input() {
        let input = vec!["1"; 100_000].join(",");
        let r = unrolled_list().parse(&input);
        assert_eq!(r.remaining, "");
        assert_eq!(r.value().cloned().unwrap().into_list().len(), 100_000);
    }
}
