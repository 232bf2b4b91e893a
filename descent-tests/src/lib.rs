//! Parsers generated by the build script from `grammars/`.

/// `grammars/list.rdg`, right recursion unrolled.
pub mod list {
    include!(concat!(env!("OUT_DIR"), "/list.rs"));
}

/// `grammars/list.rdg` again, generated as plain recursion.
pub mod list_naive {
    include!(concat!(env!("OUT_DIR"), "/list_naive.rs"));
}

/// `grammars/json.rdg`, with tracing events enabled.
pub mod json {
    include!(concat!(env!("OUT_DIR"), "/json.rs"));
}
