use std::sync::atomic::{AtomicU64, Ordering};

pub mod combinators;
pub mod error;
pub mod primitives;
mod result;
mod value;

pub use crate::combinators::{Alternative, Branch, Discard, Optional, Padded, Repeat, Sequence, Unrolled};
pub use crate::error::{LineCol, ParseError};
pub use crate::primitives::{
    Always, AnyChar, Bool, CharSet, End, Float, Group, Int, Literal, NegatedCharSet, OneOf, Pattern,
    QuotedString, Spaces,
};
pub use crate::result::MatchResult;
pub use crate::value::{Choice, Value};

/// Items generated parsers import with a glob.
pub mod prelude {
    pub use crate::{Choice, MatchResult, Parser, ParserExt, Value};
}

// Generated code reaches these through `::descent::__private`.
#[doc(hidden)]
pub mod __private {
    pub use once_cell::sync::Lazy;
    pub use tracing;
}

static INVOCATIONS: AtomicU64 = AtomicU64::new(0);

/// Number of `parse` calls made by any matcher in this process.
///
/// Diagnostic only: nothing in the runtime reads it back.
pub fn invocations() -> u64 {
    INVOCATIONS.load(Ordering::Relaxed)
}

#[inline]
pub(crate) fn count_invocation() {
    INVOCATIONS.fetch_add(1, Ordering::Relaxed);
}

/// A matcher: a pure function from input text to a [`MatchResult`].
///
/// Parsers hold no per-call state, so one value can be shared between
/// threads and reused for any number of inputs.
pub trait Parser {
    fn parse<'i>(&self, input: &'i str) -> MatchResult<'i>;

    /// Parse `input` and require that nothing is left over.
    fn parse_complete(&self, input: &str) -> Result<Value, ParseError> {
        let result = self.parse(input);
        match result.outcome {
            Ok(value) if result.remaining.is_empty() => Ok(value),
            Ok(_) => Err(ParseError {
                location: LineCol::of(input, result.remaining),
                expected: "Expected end of input".to_owned(),
            }),
            Err(message) => Err(ParseError {
                location: LineCol::of(input, result.remaining),
                expected: message,
            }),
        }
    }
}

/// The owned, shareable form every combinator stores its operands in.
pub type BoxedParser = Box<dyn Parser + Send + Sync>;

impl<P: Parser + ?Sized> Parser for Box<P> {
    fn parse<'i>(&self, input: &'i str) -> MatchResult<'i> {
        (**self).parse(input)
    }
}

impl<P: Parser + ?Sized> Parser for &P {
    fn parse<'i>(&self, input: &'i str) -> MatchResult<'i> {
        (**self).parse(input)
    }
}

/// Builder methods for composing parsers.
pub trait ParserExt: Parser + Sized + Send + Sync + 'static {
    fn boxed(self) -> BoxedParser {
        Box::new(self)
    }

    /// `self` followed by `next`.
    fn and<P: Parser + Send + Sync + 'static>(self, next: P) -> Sequence {
        Sequence::new(vec![self.boxed(), next.boxed()])
    }

    /// `self`, or `other` if `self` fails.
    fn or<P: Parser + Send + Sync + 'static>(self, other: P) -> Alternative {
        Alternative::new(vec![self.boxed(), other.boxed()])
    }

    fn discard(self) -> Discard {
        Discard::new(self)
    }

    fn optional(self) -> Optional {
        Optional::new(self)
    }

    fn repeated(self) -> Repeat {
        Repeat::zero_or_more(self)
    }

    fn at_least_once(self) -> Repeat {
        Repeat::one_or_more(self)
    }

    /// Skip whitespace before and after `self`.
    fn padded(self) -> Padded {
        Padded::new(self)
    }
}

impl<P: Parser + Send + Sync + 'static> ParserExt for P {}
