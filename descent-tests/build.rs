use std::path::Path;

use descent_codegen::{cargo_build, cargo_build_with, CompileOptions};

fn main() {
    cargo_build("grammars/list.rdg");
    cargo_build_with(
        Path::new("grammars/list.rdg"),
        Path::new("list_naive.rs"),
        &CompileOptions { unroll_right_recursion: false, trace: false },
    );
    cargo_build_with(
        Path::new("grammars/json.rdg"),
        Path::new("json.rs"),
        &CompileOptions { unroll_right_recursion: true, trace: true },
    );
}
