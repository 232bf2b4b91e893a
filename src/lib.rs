//! Recursive-descent parser combinators, and a compiler from grammar
//! descriptions to parsers built on them.
//!
//! Parsers can be composed by hand:
//!
//! ```
//! use descent::prelude::*;
//! use descent::{Int, Literal};
//!
//! let pair = Int.and(Literal::new(",").discard()).and(Int);
//! let value = pair.parse_complete("3,4").unwrap();
//! assert_eq!(value, Value::from(vec![3i64, 4]));
//! ```
//!
//! or generated from a grammar with the `descent` command or, in a build
//! script, [`codegen::cargo_build`]. Generated code refers to this crate
//! as `::descent`.

pub use descent_runtime::*;

pub use descent_codegen as codegen;
