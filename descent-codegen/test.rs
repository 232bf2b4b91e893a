use pretty_assertions::assert_eq;

use crate::analysis::{self, Diagnostic};
use crate::ast::*;
use crate::{compile, parse_grammar, CompileError, CompileOptions};

const LIST: &str = r#"
list :: item "," list { list.prepend(item) }
      | item;
item :: /[0-9]+/;
%%
fn trailer() {}
"#;

fn errors(src: &str) -> Vec<Diagnostic> {
    match compile(src, &CompileOptions::default()) {
        Err(e @ CompileError::Semantic(_)) => e.errors().cloned().collect(),
        Err(e) => panic!("expected semantic errors, got {}", e),
        Ok(_) => panic!("expected semantic errors, compiled fine"),
    }
}

#[test]
fn parses_rules_in_order() {
    let grammar = parse_grammar(LIST).unwrap();
    assert_eq!(
        grammar,
        Grammar {
            rules: vec![
                Rule {
                    name: "list".into(),
                    sequences: vec![
                        Sequence::new(
                            vec![
                                LexItem::Reference("item".into()),
                                LexItem::Literal(",".into()),
                                LexItem::Reference("list".into()),
                            ],
                            Some("list.prepend(item)".into()),
                        ),
                        Sequence::new(vec![LexItem::Reference("item".into())], None),
                    ],
                },
                Rule {
                    name: "item".into(),
                    sequences: vec![Sequence::new(vec![LexItem::Pattern("[0-9]+".into())], None)],
                },
            ],
            trailer: "\nfn trailer() {}\n".into(),
        }
    );
}

#[test]
fn string_escapes_and_regex_slashes() {
    let grammar = parse_grammar(r#"r :: "a\"b" /x\/y/ "\n";%%"#).unwrap();
    assert_eq!(
        grammar.rules[0].sequences[0].items,
        vec![
            LexItem::Literal("a\"b".into()),
            LexItem::Pattern("x/y".into()),
            LexItem::Literal("\n".into()),
        ]
    );
    assert_eq!(grammar.trailer, "");
}

#[test]
fn actions_keep_nested_braces() {
    let grammar = parse_grammar("r :: \"a\" { { let x = 1; x } } ;%%").unwrap();
    assert_eq!(grammar.rules[0].sequences[0].action.as_deref(), Some("{ let x = 1; x }"));
}

#[test]
fn syntax_error_names_the_line() {
    let err = parse_grammar("a :: b;\nc :: ;\n%%").unwrap_err();
    assert_eq!(err.location.line, 2);
    assert!(err.to_string().starts_with("Line 2: "));
}

#[test]
fn missing_trailer_marker_is_an_error() {
    assert!(parse_grammar("a :: \"x\";\n").is_err());
}

#[test]
fn marks_right_recursion() {
    let mut grammar = parse_grammar(LIST).unwrap();
    let analysis = analysis::check(&mut grammar);
    assert!(!analysis.has_errors());
    let list = grammar.find_rule("list").unwrap();
    assert!(list.sequences[0].right_recursive);
    assert!(!list.sequences[1].right_recursive);
    assert_eq!(list.sequences[0].prefix().len(), 2);
    assert!(!grammar.find_rule("item").unwrap().has_right_recursion());
}

#[test]
fn finds_left_recursion() {
    assert_eq!(errors("r :: r \"x\" | \"y\";\n%%"), vec![Diagnostic::LeftRecursion("r".into())]);
}

#[test]
fn reports_every_left_recursive_rule() {
    let found = errors("a :: a \"x\" | b;\nb :: b \"y\" | \"z\";\n%%");
    assert_eq!(
        found,
        vec![Diagnostic::LeftRecursion("a".into()), Diagnostic::LeftRecursion("b".into())]
    );
}

#[test]
fn finds_undefined_rules() {
    let found = errors("a :: foo b baz;\nb :: \"x\";\n%%");
    assert_eq!(found, vec![Diagnostic::UndefinedRules(vec!["baz".into(), "foo".into()])]);
    assert!(found[0].msg().contains("foo"));
}

#[test]
fn unused_rules_only_warn() {
    let compiled = compile("a :: \"x\";\nbar :: \"y\";\n%%", &CompileOptions::default()).unwrap();
    assert_eq!(compiled.warnings, vec![Diagnostic::UnusedRules(vec!["a".into(), "bar".into()])]);
    assert!(compiled.warnings[0].to_string().starts_with("warning: "));
}

#[test]
fn duplicate_rules() {
    assert_eq!(errors("a :: \"x\";\na :: \"y\";\n%%"), vec![Diagnostic::DuplicateRule("a".into())]);
}

#[test]
fn invalid_pattern() {
    let found = errors("a :: /(/;\n%%");
    assert!(matches!(&found[..], [Diagnostic::InvalidPattern { rule, pattern, .. }] if rule == "a" && pattern == "("));
}

#[test]
fn invalid_action() {
    let found = errors("a :: \"x\" { ) };\n%%");
    assert!(matches!(&found[..], [Diagnostic::InvalidAction { rule, .. }] if rule == "a"));
}

#[test]
fn generated_names_must_be_distinct() {
    let found = errors("foo :: \"x\" fooAlt;\nfooAlt :: \"y\";\n%%");
    assert!(matches!(
        &found[..],
        [Diagnostic::NameCollision { rule, generated, .. }] if rule == "fooAlt" && generated == "FooAlt"
    ));

    let found = errors("value :: \"x\";\n%%");
    assert!(matches!(&found[..], [Diagnostic::NameCollision { generated, .. }] if generated == "Value"));
}

#[test]
fn reserved_rule_names() {
    assert_eq!(errors("self :: \"x\";\n%%"), vec![Diagnostic::ReservedName("self".into())]);
    assert_eq!(
        errors("a :: Item _b;\nItem :: \"x\";\n_b :: \"y\";\n%%"),
        vec![Diagnostic::UncasedName("Item".into()), Diagnostic::UncasedName("_b".into())]
    );
}

#[test]
fn keywords_bind_as_raw_identifiers() {
    let compiled = compile("a :: type;\ntype :: \"t\";\n%%", &CompileOptions::default()).unwrap();
    assert!(compiled.code.contains("r#type"));
    assert!(compiled.code.contains("pub struct Type"));
}

#[test]
fn unrolls_right_recursion_on_request() {
    let unrolled = compile(LIST, &CompileOptions::default()).unwrap();
    assert!(unrolled.code.contains("Unrolled"));
    assert!(unrolled.code.contains("handle_repetition"));

    let naive = compile(LIST, &CompileOptions { unroll_right_recursion: false, trace: false }).unwrap();
    assert!(!naive.code.contains("Unrolled"));
    assert!(!naive.code.contains("handle_repetition"));
}

#[test]
fn trace_option_emits_events() {
    let traced = compile(LIST, &CompileOptions { unroll_right_recursion: true, trace: true }).unwrap();
    assert!(traced.code.contains("tracing"));
    let quiet = compile(LIST, &CompileOptions::default()).unwrap();
    assert!(!quiet.code.contains("tracing"));
}

#[test]
fn trailer_is_copied_verbatim() {
    let compiled = compile(LIST, &CompileOptions::default()).unwrap();
    assert!(compiled.code.ends_with("\nfn trailer() {}\n"));
}
