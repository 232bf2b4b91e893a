use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use descent_codegen::{compile_file, CompileOptions};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compile a grammar description into a Rust recursive-descent parser.
#[derive(Debug, Parser)]
#[command(name = "descent", version, about)]
struct Args {
    /// Grammar description to read
    grammar: PathBuf,

    /// Where to write the generated Rust source
    output: PathBuf,

    /// Generate right-recursive rules as plain recursion
    #[arg(long)]
    no_unroll: bool,

    /// Make the generated parser emit tracing events per rule
    #[arg(long)]
    trace: bool,
}

fn init_tracing() {
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();
    let options = CompileOptions { unroll_right_recursion: !args.no_unroll, trace: args.trace };
    tracing::debug!(?args, "compiling grammar");

    match compile_file(&args.grammar, &args.output, &options) {
        Ok(warnings) => {
            for warning in warnings {
                eprintln!("{}", warning);
            }
            println!("Grammar compiled successfully.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
