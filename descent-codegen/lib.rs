//! Compiles grammar descriptions into Rust source for the `descent`
//! runtime.
//!
//! A grammar is a list of rules followed by `%%` and a trailer that is
//! copied into the output unchanged:
//!
//! ```text
//! list :: item "," list { list.prepend(item) }
//!       | item { Value::List(vec![item]) };
//! item :: /[0-9]+/ { matched[0].to_int() };
//! %%
//! ```
//!
//! Each rule becomes a unit struct implementing `descent::Parser`. The
//! generated code refers to the runtime as `::descent`.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::exit;

use descent_runtime::ParseError;
use tracing::{debug, info, warn};

mod analysis;
mod ast;
mod grammar;
mod translate;

#[cfg(test)]
mod test;

pub use crate::analysis::{Diagnostic, Severity};
pub use crate::ast::{Grammar, LexItem, Rule, Sequence};
pub use crate::grammar::parse_grammar;

/// Settings for one compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    /// Drive right-recursive rules with a loop instead of recursion.
    pub unroll_right_recursion: bool,
    /// Emit `tracing` events when generated rules are entered and left.
    pub trace: bool,
}

impl Default for CompileOptions {
    fn default() -> CompileOptions {
        CompileOptions { unroll_right_recursion: true, trace: false }
    }
}

/// Output of a successful compilation.
#[derive(Debug, Clone)]
pub struct Compiled {
    pub code: String,
    /// Advisory diagnostics; none of them are errors.
    pub warnings: Vec<Diagnostic>,
}

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("{0}")]
    Syntax(#[from] ParseError),
    #[error("{}", format_diagnostics(.0))]
    Semantic(Vec<Diagnostic>),
    #[error("`{}`: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
}

impl CompileError {
    /// The error diagnostics of a semantic failure, without warnings.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        let diagnostics = match self {
            CompileError::Semantic(diagnostics) => &diagnostics[..],
            _ => &[],
        };
        diagnostics.iter().filter(|d| d.is_error())
    }
}

fn format_diagnostics(diagnostics: &[Diagnostic]) -> String {
    diagnostics.iter().map(Diagnostic::to_string).collect::<Vec<_>>().join("\n")
}

/// Compile grammar text to Rust source.
///
/// All semantic problems are collected before failing; on failure the
/// returned [`CompileError::Semantic`] carries the warnings too.
pub fn compile(input: &str, options: &CompileOptions) -> Result<Compiled, CompileError> {
    let mut grammar = parse_grammar(input)?;
    debug!(rules = grammar.rules.len(), "grammar parsed");

    let analysis = analysis::check(&mut grammar);
    for rule in grammar.iter_rules().filter(|rule| rule.has_right_recursion()) {
        debug!(rule = %rule.name, unrolled = options.unroll_right_recursion, "right-recursive rule");
    }
    if analysis.has_errors() {
        return Err(CompileError::Semantic(analysis.diagnostics));
    }
    let mut diagnostics = analysis.diagnostics;

    let tokens = match translate::compile_grammar(&grammar, options) {
        Ok(tokens) => tokens,
        Err(errors) => {
            diagnostics.extend(errors);
            return Err(CompileError::Semantic(diagnostics));
        }
    };

    let mut code = String::from("// Generated by descent. Do not edit.\n");
    code.push_str(&tokens.to_string());
    code.push('\n');
    code.push_str(&grammar.trailer);
    info!(rules = grammar.rules.len(), bytes = code.len(), "parser generated");

    Ok(Compiled { code, warnings: diagnostics })
}

/// Compile the grammar at `input` and write the parser to `output`.
/// Returns the warnings.
pub fn compile_file(input: &Path, output: &Path, options: &CompileOptions) -> Result<Vec<Diagnostic>, CompileError> {
    let source = fs::read_to_string(input).map_err(|source| CompileError::Io { path: input.to_owned(), source })?;
    let compiled = compile(&source, options)?;
    fs::write(output, &compiled.code).map_err(|source| CompileError::Io { path: output.to_owned(), source })?;
    Ok(compiled.warnings)
}

/// Compile a grammar from a cargo build script into `OUT_DIR`, naming the
/// output after the input file with an `.rs` extension.
///
/// ```ignore
/// // build.rs
/// fn main() {
///     descent_codegen::cargo_build("src/grammar.rdg");
/// }
/// ```
///
/// and then `include!(concat!(env!("OUT_DIR"), "/grammar.rs"));`.
pub fn cargo_build<T: AsRef<Path> + ?Sized>(input_path: &T) {
    let input_path = input_path.as_ref();
    let name = match input_path.file_stem() {
        Some(stem) => Path::new(stem).with_extension("rs"),
        None => {
            eprintln!("Grammar path `{}` has no file name", input_path.display());
            exit(1);
        }
    };
    cargo_build_with(input_path, &name, &CompileOptions::default());
}

/// Like [`cargo_build`], with an explicit output file name and options.
pub fn cargo_build_with(input_path: &Path, output_name: &Path, options: &CompileOptions) {
    println!("cargo:rerun-if-changed={}", input_path.display());

    let out_dir: PathBuf = match env::var_os("OUT_DIR") {
        Some(dir) => dir.into(),
        None => {
            eprintln!("OUT_DIR is not set; cargo_build must run from a build script");
            exit(1);
        }
    };

    match compile_file(input_path, &out_dir.join(output_name), options) {
        Ok(warnings) => {
            for warning in warnings {
                warn!(grammar = %input_path.display(), "{}", warning.msg());
                println!("cargo:warning={}: {}", input_path.display(), warning.msg());
            }
        }
        Err(e) => {
            eprintln!("Error compiling grammar `{}`:\n{}", input_path.display(), e);
            exit(1);
        }
    }
}
